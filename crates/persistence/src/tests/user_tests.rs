// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User lifecycle tests.

use visit_ledger_domain::{DomainError, User, UserId};

use crate::{ErrorKind, Ledger, PersistenceError};

#[test]
fn test_add_user_assigns_sequential_ids() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let ann = ledger.add_user("Ann").unwrap();
    let bob = ledger.add_user("Bob").unwrap();

    assert_eq!(ann, UserId::new(1));
    assert_eq!(bob, UserId::new(2));
}

#[test]
fn test_add_user_trims_name() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let user_id = ledger.add_user("  Ann  ").unwrap();
    let user = ledger.get_user(user_id).unwrap().unwrap();

    assert_eq!(user.name, "Ann");
}

#[test]
fn test_add_user_rejects_empty_name_without_consuming_an_id() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let err = ledger.add_user("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err,
        PersistenceError::Validation(DomainError::EmptyName { field: "user name" })
    );
    assert!(ledger.list_users().unwrap().is_empty());

    let bob = ledger.add_user("Bob").unwrap();
    assert_eq!(bob, UserId::new(1));
}

#[test]
fn test_add_user_rejects_whitespace_only_name() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let err = ledger.add_user("   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_duplicate_user_names_are_allowed() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let first = ledger.add_user("Ann").unwrap();
    let second = ledger.add_user("Ann").unwrap();

    assert_ne!(first, second);
    assert_eq!(ledger.list_users().unwrap().len(), 2);
}

#[test]
fn test_list_users_sorted_by_name() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    ledger.add_user("Carol").unwrap();
    ledger.add_user("Ann").unwrap();
    ledger.add_user("Bob").unwrap();

    let names: Vec<String> = ledger
        .list_users()
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();

    assert_eq!(names, vec!["Ann", "Bob", "Carol"]);
}

#[test]
fn test_list_users_is_idempotent() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    ledger.add_user("Bob").unwrap();
    ledger.add_user("Ann").unwrap();
    ledger.add_user("Ann").unwrap();

    let first: Vec<User> = ledger.list_users().unwrap();
    let second: Vec<User> = ledger.list_users().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_update_user_name() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    let user_id = ledger.add_user("Ann").unwrap();

    ledger.update_user_name(user_id, "Annie").unwrap();

    let user = ledger.get_user(user_id).unwrap().unwrap();
    assert_eq!(user.name, "Annie");
}

#[test]
fn test_update_user_name_unknown_user_is_not_found() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let err = ledger.update_user_name(UserId::new(42), "Ghost").unwrap_err();
    assert_eq!(err, PersistenceError::UserNotFound(UserId::new(42)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_update_user_name_rejects_empty_name() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    let user_id = ledger.add_user("Ann").unwrap();

    let err = ledger.update_user_name(user_id, " ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let user = ledger.get_user(user_id).unwrap().unwrap();
    assert_eq!(user.name, "Ann");
}

#[test]
fn test_get_user_unknown_returns_none() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    assert!(ledger.get_user(UserId::new(1)).unwrap().is_none());
}

#[test]
fn test_delete_user_unknown_is_not_found() {
    let mut ledger = Ledger::new_in_memory().unwrap();

    let err = ledger.delete_user(UserId::new(9)).unwrap_err();
    assert_eq!(err, PersistenceError::UserNotFound(UserId::new(9)));
}

#[test]
fn test_delete_user_without_visits() {
    let mut ledger = Ledger::new_in_memory().unwrap();
    let user_id = ledger.add_user("Ann").unwrap();

    let removed = ledger.delete_user(user_id).unwrap();

    assert_eq!(removed, 0);
    assert!(ledger.get_user(user_id).unwrap().is_none());
}
