// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod initialization_tests;
mod override_tests;
mod user_tests;

use visit_ledger_domain::{PlaceId, UserId, VisitDate};

use crate::Ledger;

/// Parses a test date, panicking on malformed input.
pub fn date(s: &str) -> VisitDate {
    VisitDate::parse(s).expect("Valid test date")
}

/// A ledger seeded with two users and two places, no visits.
///
/// Returns `(ledger, ann, bob, park, museum)`.
pub fn create_seeded_ledger() -> (Ledger, UserId, UserId, PlaceId, PlaceId) {
    let mut ledger = Ledger::new_in_memory().unwrap();
    let ann = ledger.add_user("Ann").unwrap();
    let bob = ledger.add_user("Bob").unwrap();
    let park = ledger.add_place("Park").unwrap();
    let museum = ledger.add_place("Museum").unwrap();
    (ledger, ann, bob, park, museum)
}

/// Returns the cached counter of a place that must exist.
pub fn visit_count(ledger: &mut Ledger, place_id: PlaceId) -> i64 {
    ledger
        .get_place(place_id)
        .unwrap()
        .expect("Place should exist")
        .visit_count
}
