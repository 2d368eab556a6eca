//! Resume, abort and idempotence behaviour of a migration run.

mod common;

use common::{contact, notion_page, run, salesforce_lead, Call, FakeSource, FakeTarget};
use leadsync_core::{CheckpointStore, Direction, RecordId};
use leadsync_sync::{CheckpointWrite, RunOptions, RunOutcome};
use tempfile::TempDir;

const A_TO_B: Direction = Direction::NotionToSalesforce;
const B_TO_A: Direction = Direction::SalesforceToNotion;

fn store(home: &TempDir, direction: Direction) -> CheckpointStore {
    CheckpointStore::in_dir(home.path(), direction)
}

fn three_pages() -> FakeSource {
    FakeSource::new(vec![
        notion_page("R1", "Adams", "555-0001", "Acme"),
        notion_page("R2", "Baker", "555-0002", "Globex"),
        notion_page("R3", "Clark", "555-0003", "Initech"),
    ])
}

#[test]
fn no_checkpoint_attempts_every_record_in_order() {
    let home = TempDir::new().unwrap();
    let source = three_pages();
    let target = FakeTarget::new();

    let report = run(A_TO_B, &source, &target, &store(&home, A_TO_B), RunOptions::default());

    assert!(report.is_completed());
    assert_eq!(report.attempted, 3);
    assert_eq!(report.skipped_before_checkpoint, 0);
    assert_eq!(
        target.calls(),
        vec![
            Call::Exists("Adams".into()),
            Call::Create("Adams".into()),
            Call::Exists("Baker".into()),
            Call::Create("Baker".into()),
            Call::Exists("Clark".into()),
            Call::Create("Clark".into()),
        ]
    );
    assert_eq!(source.fetches(), 1);
}

#[test]
fn resume_retries_the_checkpointed_record_and_continues() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    checkpoint.save(&RecordId::from("R2")).unwrap();
    let target = FakeTarget::new();

    let report = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    assert!(report.is_completed());
    assert_eq!(report.resumed_from, Some(RecordId::from("R2")));
    assert_eq!(report.skipped_before_checkpoint, 1);
    assert!(!target.touched("Adams"), "R1 must not be attempted");
    assert_eq!(
        target.calls(),
        vec![
            Call::Exists("Baker".into()),
            Call::Create("Baker".into()),
            Call::Exists("Clark".into()),
            Call::Create("Clark".into()),
        ]
    );
}

#[test]
fn write_rejection_checkpoints_the_failing_record() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    let target = FakeTarget::new().rejecting("Baker", &["REQUIRED_FIELD_MISSING", "Bad phone"]);

    let report = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    assert_eq!(
        report.outcome,
        RunOutcome::Aborted {
            error: "contact creation failed for R2: REQUIRED_FIELD_MISSING,Bad phone".into(),
            write_rejected: true,
            checkpoint: CheckpointWrite::Saved {
                record_id: RecordId::from("R2")
            },
        }
    );
    assert_eq!(checkpoint.load().unwrap(), Some(RecordId::from("R2")));
    assert!(!target.touched("Clark"), "R3 must never be attempted");
    assert_eq!(target.created(), vec!["Adams".to_string(), "Baker".to_string()]);
}

#[test]
fn failed_checkpoint_save_still_reports_the_original_error() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    // A directory where the temp file goes makes every save fail.
    std::fs::create_dir_all(checkpoint.path().with_extension("json.tmp")).unwrap();
    let target = FakeTarget::new().rejecting("Baker", &["UNABLE_TO_LOCK_ROW"]);

    let report = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    match &report.outcome {
        RunOutcome::Aborted {
            error,
            write_rejected,
            checkpoint: CheckpointWrite::Failed { record_id, error: save_error },
        } => {
            assert_eq!(error, "contact creation failed for R2: UNABLE_TO_LOCK_ROW");
            assert!(write_rejected);
            assert_eq!(record_id, &RecordId::from("R2"));
            assert!(save_error.contains("json.tmp"), "{save_error}");
        }
        other => panic!("expected abort with failed checkpoint save, got {other:?}"),
    }
    assert!(!checkpoint.path().exists());
    assert!(!target.touched("Clark"));
}

#[test]
fn transport_failure_mid_run_checkpoints_the_current_record() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    let target = FakeTarget::new().unreachable_on("Clark");

    let report = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    match &report.outcome {
        RunOutcome::Aborted {
            write_rejected,
            checkpoint: write,
            ..
        } => {
            assert!(!write_rejected);
            assert_eq!(
                write,
                &CheckpointWrite::Saved {
                    record_id: RecordId::from("R3")
                }
            );
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(checkpoint.load().unwrap(), Some(RecordId::from("R3")));
}

#[test]
fn rerun_after_abort_picks_up_where_it_failed() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);

    let flaky = FakeTarget::new().rejecting("Baker", &["UNABLE_TO_LOCK_ROW"]);
    let first = run(A_TO_B, &three_pages(), &flaky, &checkpoint, RunOptions::default());
    assert!(!first.is_completed());

    let healthy = FakeTarget::with_existing(flaky.contacts());
    let second = run(A_TO_B, &three_pages(), &healthy, &checkpoint, RunOptions::default());

    assert!(second.is_completed());
    assert_eq!(healthy.created(), vec!["Baker".to_string(), "Clark".to_string()]);
    assert!(!healthy.touched("Adams"));
}

#[test]
fn missing_phone_skips_without_touching_the_target() {
    let home = TempDir::new().unwrap();
    let source = FakeSource::new(vec![
        notion_page("R1", "Adams", "", "Acme"),
        notion_page("R2", "", "555-0002", "Globex"),
        notion_page("R3", "Clark", "555-0003", "Initech"),
    ]);
    let target = FakeTarget::new();

    let report = run(A_TO_B, &source, &target, &store(&home, A_TO_B), RunOptions::default());

    assert!(report.is_completed());
    assert_eq!(report.skipped_invalid, 2);
    assert!(!target.touched("Adams"));
    assert_eq!(
        target.calls(),
        vec![Call::Exists("Clark".into()), Call::Create("Clark".into())]
    );
}

#[test]
fn replaying_against_populated_target_writes_nothing() {
    let home = TempDir::new().unwrap();
    let target = FakeTarget::new();
    let checkpoint = store(&home, A_TO_B);

    run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());
    let created_once = target.created().len();
    let replay = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    assert!(replay.is_completed());
    assert_eq!(replay.skipped_duplicate, 3);
    assert!(replay.created.is_empty());
    assert_eq!(target.created().len(), created_once);
}

#[test]
fn success_without_prior_checkpoint_leaves_no_file() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, B_TO_A);
    let source = FakeSource::new(vec![
        salesforce_lead("00Q1", "Adams", "555-0001", "Acme"),
        salesforce_lead("00Q2", "Baker", "555-0002", "Globex"),
    ]);

    for options in [
        RunOptions::default(),
        RunOptions {
            clear_checkpoint_on_success: false,
        },
    ] {
        let target = FakeTarget::new();
        let report = run(B_TO_A, &source, &target, &checkpoint, options);
        assert!(report.is_completed());
        assert!(!checkpoint.path().exists(), "{options:?}");
    }
}

#[test]
fn success_clears_a_consumed_checkpoint_by_default() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    checkpoint.save(&RecordId::from("R2")).unwrap();

    let report = run(A_TO_B, &three_pages(), &FakeTarget::new(), &checkpoint, RunOptions::default());

    assert!(report.is_completed());
    assert_eq!(checkpoint.load().unwrap(), None);
}

#[test]
fn keep_checkpoint_option_leaves_it_on_disk() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    checkpoint.save(&RecordId::from("R2")).unwrap();
    let options = RunOptions {
        clear_checkpoint_on_success: false,
    };

    let first = run(A_TO_B, &three_pages(), &FakeTarget::new(), &checkpoint, options);
    assert!(first.is_completed());
    assert_eq!(checkpoint.load().unwrap(), Some(RecordId::from("R2")));

    // The stale checkpoint still truncates the next run.
    let target = FakeTarget::new();
    let second = run(A_TO_B, &three_pages(), &target, &checkpoint, options);
    assert_eq!(second.skipped_before_checkpoint, 1);
    assert!(!target.touched("Adams"));
}

#[test]
fn checkpoint_missing_from_source_attempts_nothing() {
    let home = TempDir::new().unwrap();
    let checkpoint = store(&home, A_TO_B);
    checkpoint.save(&RecordId::from("deleted-page")).unwrap();
    let target = FakeTarget::new();

    let report = run(A_TO_B, &three_pages(), &target, &checkpoint, RunOptions::default());

    assert!(report.is_completed());
    assert_eq!(report.attempted, 0);
    assert_eq!(report.skipped_before_checkpoint, 3);
    assert!(target.calls().is_empty());
}

#[test]
fn duplicate_inside_one_listing_is_created_once() {
    let home = TempDir::new().unwrap();
    let source = FakeSource::new(vec![
        notion_page("R1", "Adams", "555-0001", "Acme"),
        notion_page("R2", "Adams", "555-0001", "Acme"),
    ]);
    let target = FakeTarget::new();

    let report = run(A_TO_B, &source, &target, &store(&home, A_TO_B), RunOptions::default());

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(target.contacts(), vec![contact("Adams", "555-0001", "Acme")]);
}
