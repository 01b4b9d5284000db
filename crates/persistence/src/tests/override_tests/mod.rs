// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Counter override, recount, and counter mode tests.

use super::{create_seeded_ledger, date, visit_count};
use crate::{CounterMode, ErrorKind, LedgerOptions, PersistenceError};

#[test]
fn test_administrative_override_is_taken_at_face_value() {
    let (mut ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(ann, park, date("2024-01-02"), 15).unwrap();

    ledger.update_place(park, "Park", Some(10)).unwrap();

    let place = ledger
        .list_places()
        .unwrap()
        .into_iter()
        .find(|place| place.place_id == park)
        .unwrap();
    assert_eq!(place.visit_count, 10);
    assert_eq!(ledger.get_user_visits(ann).unwrap().len(), 2);

    let summary = ledger.summary().unwrap();
    assert_eq!(summary.visits, 10);
    assert_eq!(summary.logged_visits, 2);
    assert!(summary.has_counter_drift());
}

#[test]
fn test_override_drives_the_ranking() {
    let (mut ledger, ann, _bob, park, museum) = create_seeded_ledger();
    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();

    ledger.update_place(museum, "Museum", Some(5)).unwrap();

    let ranking = ledger.most_visited_places().unwrap();
    assert_eq!(ranking[0].place_id, museum);
    assert_eq!(ranking[0].visit_count, 5);
}

#[test]
fn test_logging_after_override_increments_from_override() {
    let (mut ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    ledger.update_place(park, "Park", Some(10)).unwrap();

    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();

    assert_eq!(visit_count(&mut ledger, park), 11);
}

#[test]
fn test_recount_ends_override() {
    let (mut ledger, ann, _bob, park, museum) = create_seeded_ledger();
    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(ann, park, date("2024-01-02"), 15).unwrap();
    ledger.update_place(park, "Park", Some(10)).unwrap();

    let changed = ledger.recount_visit_counts().unwrap();

    assert_eq!(changed, 1);
    assert_eq!(visit_count(&mut ledger, park), 2);
    assert_eq!(visit_count(&mut ledger, museum), 0);
    assert!(!ledger.summary().unwrap().has_counter_drift());
}

#[test]
fn test_recount_repairs_cached_deletes() {
    let (mut ledger, ann, bob, park, museum) = create_seeded_ledger();
    let visit = ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(bob, museum, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(bob, park, date("2024-01-01"), 30).unwrap();

    ledger.delete_visit(visit).unwrap();
    ledger.delete_user(bob).unwrap();
    assert_eq!(visit_count(&mut ledger, park), 2);
    assert_eq!(visit_count(&mut ledger, museum), 1);

    assert_eq!(ledger.recount_visit_counts().unwrap(), 2);
    assert_eq!(visit_count(&mut ledger, park), 0);
    assert_eq!(visit_count(&mut ledger, museum), 0);
}

#[test]
fn test_recount_when_in_sync_changes_nothing() {
    let (mut ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();

    assert_eq!(ledger.recount_visit_counts().unwrap(), 0);
    assert_eq!(visit_count(&mut ledger, park), 1);
}

#[test]
fn test_exact_mode_decrements_on_visit_delete() {
    let (ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    let mut ledger = ledger.with_options(LedgerOptions::with_counter_mode(CounterMode::Exact));
    let visit = ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(ann, park, date("2024-01-02"), 30).unwrap();

    ledger.delete_visit(visit).unwrap();

    assert_eq!(visit_count(&mut ledger, park), 1);
}

#[test]
fn test_exact_mode_recounts_after_user_cascade() {
    let (ledger, ann, bob, park, museum) = create_seeded_ledger();
    let mut ledger = ledger.with_options(LedgerOptions::with_counter_mode(CounterMode::Exact));
    ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(ann, museum, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(bob, park, date("2024-01-01"), 30).unwrap();

    ledger.delete_user(ann).unwrap();

    assert_eq!(visit_count(&mut ledger, park), 1);
    assert_eq!(visit_count(&mut ledger, museum), 0);
    assert!(!ledger.summary().unwrap().has_counter_drift());
}

#[test]
fn test_exact_mode_recount_also_clears_override_on_touched_place() {
    let (ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    let mut ledger = ledger.with_options(LedgerOptions::with_counter_mode(CounterMode::Exact));
    let first = ledger.log_visit(ann, park, date("2024-01-01"), 30).unwrap();
    ledger.log_visit(ann, park, date("2024-01-02"), 30).unwrap();
    ledger.update_place(park, "Park", Some(10)).unwrap();

    ledger.delete_visit(first).unwrap();

    assert_eq!(visit_count(&mut ledger, park), 1);
}

#[test]
fn test_summary_reports_overflowing_counter_total_as_error() {
    let (mut ledger, _ann, _bob, park, museum) = create_seeded_ledger();
    ledger.update_place(park, "Park", Some(i64::MAX)).unwrap();
    ledger.update_place(museum, "Museum", Some(1)).unwrap();

    let err = ledger.summary().unwrap_err();

    assert_eq!(err, PersistenceError::CounterTotalOverflow);
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn test_summary_accepts_counter_total_of_exactly_max() {
    let (mut ledger, _ann, _bob, park, museum) = create_seeded_ledger();
    ledger.update_place(park, "Park", Some(i64::MAX - 1)).unwrap();
    ledger.update_place(museum, "Museum", Some(1)).unwrap();

    assert_eq!(ledger.summary().unwrap().visits, i64::MAX);
}

#[test]
fn test_log_visit_at_maximum_counter_is_rejected_without_storing() {
    let (mut ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    ledger.update_place(park, "Park", Some(i64::MAX)).unwrap();

    let err = ledger
        .log_visit(ann, park, date("2024-01-01"), 1)
        .unwrap_err();

    assert_eq!(err, PersistenceError::VisitCounterOverflow(park));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ledger.get_user_visits(ann).unwrap().is_empty());
    assert_eq!(visit_count(&mut ledger, park), i64::MAX);
}

#[test]
fn test_log_visit_reaches_maximum_counter_exactly() {
    let (mut ledger, ann, _bob, park, _museum) = create_seeded_ledger();
    ledger.update_place(park, "Park", Some(i64::MAX - 1)).unwrap();

    ledger.log_visit(ann, park, date("2024-01-01"), 1).unwrap();

    assert_eq!(visit_count(&mut ledger, park), i64::MAX);
    assert_eq!(ledger.get_user_visits(ann).unwrap().len(), 1);
}
