// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger initialization tests.
//!
//! Every other test module opens `Ledger::new_in_memory()`, which already
//! exercises connection setup, migrations, and foreign key enforcement.
//! These tests cover what the rest cannot: isolation between instances,
//! reopening a file-backed ledger, and adopting a file written by an older
//! tool with nullable counter and duration columns.

use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use visit_ledger_domain::{PlaceId, UserId};

use super::date;
use crate::backend::PersistenceBackend;
use crate::{CounterMode, Ledger, LedgerOptions, PersistenceError};

#[test]
fn test_ledger_initialization() {
    let result: Result<Ledger, PersistenceError> = Ledger::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_default_options_use_cached_counters() {
    let ledger = Ledger::new_in_memory().unwrap();
    assert_eq!(ledger.options().counter_mode, CounterMode::Cached);

    let ledger = ledger.with_options(LedgerOptions::with_counter_mode(CounterMode::Exact));
    assert_eq!(ledger.options().counter_mode, CounterMode::Exact);
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Ledger::new_in_memory().unwrap();
    let mut db2 = Ledger::new_in_memory().unwrap();

    db1.add_user("Ann").unwrap();

    assert_eq!(db1.list_users().unwrap().len(), 1, "db1 should have 1 user");
    assert!(db2.list_users().unwrap().is_empty(), "db2 should be empty");
}

#[test]
fn test_foreign_key_enforcement_is_active() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    assert!(ledger.conn.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_empty_ledger_queries_return_nothing() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    assert!(ledger.list_users().unwrap().is_empty());
    assert!(ledger.list_places().unwrap().is_empty());
    assert!(ledger.most_visited_places().unwrap().is_empty());

    let summary = ledger.summary().unwrap();
    assert_eq!(summary.users, 0);
    assert_eq!(summary.places, 0);
    assert_eq!(summary.visits, 0);
    assert_eq!(summary.logged_visits, 0);
}

#[test]
fn test_file_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visited_places.db");

    let (user_id, place_id) = {
        let mut ledger = Ledger::new_with_file(&path).unwrap();
        let user_id = ledger.add_user("Ann").unwrap();
        let place_id = ledger.add_place("Park").unwrap();
        ledger
            .log_visit(user_id, place_id, super::date("2024-01-01"), 30)
            .unwrap();
        (user_id, place_id)
    };

    // Reopening runs schema initialization again; it must not disturb data.
    let mut ledger = Ledger::new_with_file(&path).unwrap();
    let users = ledger.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_id, user_id);

    let place = ledger.get_place(place_id).unwrap().unwrap();
    assert_eq!(place.visit_count, 1);
    assert_eq!(ledger.get_user_visits(user_id).unwrap().len(), 1);
}

#[test]
fn test_ids_are_not_reused_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ids.db");

    let first = {
        let mut ledger = Ledger::new_with_file(&path).unwrap();
        let first = ledger.add_user("Ann").unwrap();
        ledger.delete_user(first).unwrap();
        first
    };

    let mut ledger = Ledger::new_with_file(&path).unwrap();
    let second = ledger.add_user("Bob").unwrap();
    assert!(second > first, "deleted ids must never be handed out again");
}

/// Schema written by earlier tools: no NOT NULL or CHECK on the counter and
/// duration columns.
const LEGACY_SCHEMA: &str = "
    CREATE TABLE users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE TABLE places (
        place_id INTEGER PRIMARY KEY AUTOINCREMENT,
        place_name TEXT NOT NULL,
        number_of_visits INTEGER DEFAULT 0
    );
    CREATE TABLE visits (
        visit_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        place_id INTEGER NOT NULL,
        visit_date TEXT NOT NULL,
        stay_duration INTEGER,
        FOREIGN KEY (user_id) REFERENCES users (user_id),
        FOREIGN KEY (place_id) REFERENCES places (place_id)
    );
    INSERT INTO users (name) VALUES ('Ann');
    INSERT INTO places (place_name, number_of_visits) VALUES ('Park', NULL);
    INSERT INTO visits (user_id, place_id, visit_date, stay_duration)
        VALUES (1, 1, '2024-01-01', NULL);
";

#[test]
fn test_legacy_file_with_null_columns_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let mut conn = SqliteConnection::establish(path.to_str().unwrap()).unwrap();
        conn.batch_execute(LEGACY_SCHEMA).unwrap();
    }

    let mut ledger = Ledger::new_with_file(&path).unwrap();
    let ann = UserId::new(1);
    let park = PlaceId::new(1);

    let history = ledger.get_user_visits(ann).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].duration_minutes, 0);
    let visit = ledger.get_visit(history[0].visit_id).unwrap().unwrap();
    assert_eq!(visit.duration_minutes, 0);

    assert_eq!(ledger.get_place(park).unwrap().unwrap().visit_count, 0);
    assert_eq!(ledger.summary().unwrap().visits, 0);

    ledger.log_visit(ann, park, date("2024-01-02"), 10).unwrap();
    assert_eq!(ledger.get_place(park).unwrap().unwrap().visit_count, 1);
}

#[test]
fn test_recount_fills_null_counter_in_legacy_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let mut conn = SqliteConnection::establish(path.to_str().unwrap()).unwrap();
        conn.batch_execute(LEGACY_SCHEMA).unwrap();
    }

    let mut ledger = Ledger::new_with_file(&path).unwrap();

    assert_eq!(ledger.recount_visit_counts().unwrap(), 1);
    let place = ledger.get_place(PlaceId::new(1)).unwrap().unwrap();
    assert_eq!(place.visit_count, 1);
}
