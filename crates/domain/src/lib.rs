// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types for the Visit Ledger.
//!
//! This crate holds the entities the ledger stores (users, places, visits),
//! their store-assigned identifiers, the read models returned by ledger
//! queries, and the pure field rules applied before any write.
//!
//! Nothing in this crate touches storage.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use types::{
    LedgerSummary, Place, PlaceId, PlaceRanking, User, UserId, UserVisit, Visit, VisitDate,
    VisitId,
};
pub use validation::{validate_duration, validate_name, validate_visit_count};
