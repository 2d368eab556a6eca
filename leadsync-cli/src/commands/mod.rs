pub mod checkpoint;
pub mod migrate;
