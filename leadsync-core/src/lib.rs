//! leadsync core library: domain types, contact shaping, checkpoint store.
//!
//! - [`types`]: record ids, contacts, match rules
//! - [`shape`]: best-effort field lookup and validation
//! - [`direction`]: the two migration directions
//! - [`checkpoint`]: single-slot resume point persistence

pub mod checkpoint;
pub mod direction;
pub mod error;
pub mod shape;
pub mod types;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use direction::Direction;
pub use error::CheckpointError;
pub use shape::{ContactDraft, ContactShape};
pub use types::{Contact, MatchRule, RecordId, SourceRecord};
