// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Visit Ledger.
//!
//! The [`Ledger`] is the sole owner of three tables (users, places, visits)
//! and the only way callers read or change them. It is built on Diesel over
//! `SQLite`.
//!
//! ## Invariants
//!
//! - Ids are assigned by the store, increase monotonically, and are never
//!   reused (`AUTOINCREMENT`).
//! - A visit never references a missing user or place. The ledger checks
//!   references before inserting, and `SQLite` foreign key enforcement is
//!   verified at startup as a backstop.
//! - Logging a visit inserts the row and increments the place's cached
//!   counter in one transaction.
//! - Deleting a user or place removes their visits in the same transaction.
//!
//! ## Cached counters
//!
//! `Place::visit_count` is a denormalized cache. With the default
//! [`CounterMode::Cached`], deleting visits (directly or through a cascade)
//! does not shrink it, and an administrative override through
//! [`Ledger::update_place`] stands until [`Ledger::recount_visit_counts`].
//! [`CounterMode::Exact`] recounts affected places on every delete.
//!
//! ## Testing
//!
//! Tests use [`Ledger::new_in_memory`], which opens a uniquely named
//! shared-cache in-memory database, so every test is isolated and needs no
//! external infrastructure.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use visit_ledger_domain::{
    LedgerSummary, Place, PlaceId, PlaceRanking, User, UserId, UserVisit, Visit, VisitDate,
    VisitId, validate_duration, validate_name, validate_visit_count,
};

mod backend;
mod diesel_schema;
mod error;
mod mutations;
mod options;
mod queries;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, PersistenceError};
pub use options::{CounterMode, LedgerOptions};

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Field label used when validating user names.
const USER_NAME_FIELD: &str = "user name";

/// Field label used when validating place names.
const PLACE_NAME_FIELD: &str = "place name";

/// The Visit Ledger: an embedded store of users, places, and visits.
///
/// One ledger is meant to be constructed at process start and kept for the
/// life of the process. Every method is a short, self-contained operation;
/// mutating methods take `&mut self`, so a ledger has a single writer.
pub struct Ledger {
    pub(crate) conn: SqliteConnection,
    options: LedgerOptions,
}

impl Ledger {
    /// Creates a ledger backed by a fresh in-memory `SQLite` database.
    ///
    /// Each call receives its own database, ensuring test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:visit_ledger_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self {
            conn,
            options: LedgerOptions::default(),
        })
    }

    /// Opens (or creates) a ledger stored in a `SQLite` file.
    ///
    /// The schema is created if absent; reopening an existing ledger file
    /// is safe and leaves its data untouched.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self {
            conn,
            options: LedgerOptions::default(),
        })
    }

    /// Replaces this ledger's runtime options.
    #[must_use]
    pub fn with_options(mut self, options: LedgerOptions) -> Self {
        info!(counter_mode = ?options.counter_mode, "Ledger options set");
        self.options = options;
        self
    }

    /// Returns this ledger's runtime options.
    #[must_use]
    pub const fn options(&self) -> LedgerOptions {
        self.options
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Adds a user and returns the assigned id.
    ///
    /// The name is trimmed before storage. A rejected name creates no row
    /// and consumes no id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or whitespace-only.
    pub fn add_user(&mut self, name: &str) -> Result<UserId, PersistenceError> {
        let name: String = validate_name(USER_NAME_FIELD, name)?;
        mutations::users::insert_user(&mut self.conn, &name)
    }

    /// Renames a user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, or
    /// `PersistenceError::UserNotFound` if the user does not exist.
    pub fn update_user_name(
        &mut self,
        user_id: UserId,
        new_name: &str,
    ) -> Result<(), PersistenceError> {
        let new_name: String = validate_name(USER_NAME_FIELD, new_name)?;
        mutations::users::update_user_name(&mut self.conn, user_id, &new_name)
    }

    /// Deletes a user and all of their visits.
    ///
    /// Returns the number of visits removed with the user.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UserNotFound` if the user does not exist.
    pub fn delete_user(&mut self, user_id: UserId) -> Result<usize, PersistenceError> {
        mutations::users::delete_user(&mut self.conn, user_id, self.options.counter_mode)
    }

    /// Lists all users sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users(&mut self) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: UserId) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    // ========================================================================
    // Places
    // ========================================================================

    /// Adds a place with a zero visit counter and returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or whitespace-only.
    pub fn add_place(&mut self, name: &str) -> Result<PlaceId, PersistenceError> {
        let name: String = validate_name(PLACE_NAME_FIELD, name)?;
        mutations::places::insert_place(&mut self.conn, &name)
    }

    /// Renames a place and optionally overrides its cached visit counter.
    ///
    /// With `Some(count)` the counter is overwritten as-is, even if it no
    /// longer matches the visit rows.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or negative count, or
    /// `PersistenceError::PlaceNotFound` if the place does not exist.
    pub fn update_place(
        &mut self,
        place_id: PlaceId,
        new_name: &str,
        new_visit_count: Option<i64>,
    ) -> Result<(), PersistenceError> {
        let new_name: String = validate_name(PLACE_NAME_FIELD, new_name)?;
        let new_visit_count: Option<i64> =
            new_visit_count.map(validate_visit_count).transpose()?;
        mutations::places::update_place(&mut self.conn, place_id, &new_name, new_visit_count)
    }

    /// Deletes a place and all visits logged there.
    ///
    /// Returns the number of visits removed with the place.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::PlaceNotFound` if the place does not exist.
    pub fn delete_place(&mut self, place_id: PlaceId) -> Result<usize, PersistenceError> {
        mutations::places::delete_place(&mut self.conn, place_id)
    }

    /// Lists all places sorted by name, with cached visit counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_places(&mut self) -> Result<Vec<Place>, PersistenceError> {
        queries::places::list_places(&mut self.conn)
    }

    /// Retrieves a place by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_place(&mut self, place_id: PlaceId) -> Result<Option<Place>, PersistenceError> {
        queries::places::get_place(&mut self.conn, place_id)
    }

    // ========================================================================
    // Visits
    // ========================================================================

    /// Logs a visit and increments the place's visit counter atomically.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative duration, or a not-found
    /// error if the user or place does not exist. Nothing is written on
    /// error.
    pub fn log_visit(
        &mut self,
        user_id: UserId,
        place_id: PlaceId,
        date: VisitDate,
        duration_minutes: i64,
    ) -> Result<VisitId, PersistenceError> {
        let duration_minutes: i64 = validate_duration(duration_minutes)?;
        mutations::visits::insert_visit(&mut self.conn, user_id, place_id, date, duration_minutes)
    }

    /// Changes a visit's date and/or duration.
    ///
    /// Passing `None` for both is accepted and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative duration, or
    /// `PersistenceError::VisitNotFound` if the visit does not exist.
    pub fn update_visit(
        &mut self,
        visit_id: VisitId,
        new_date: Option<VisitDate>,
        new_duration: Option<i64>,
    ) -> Result<(), PersistenceError> {
        let new_duration: Option<i64> = new_duration.map(validate_duration).transpose()?;
        mutations::visits::update_visit(&mut self.conn, visit_id, new_date, new_duration)
    }

    /// Deletes one visit by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::VisitNotFound` if the visit does not exist.
    pub fn delete_visit(&mut self, visit_id: VisitId) -> Result<(), PersistenceError> {
        mutations::visits::delete_visit(&mut self.conn, visit_id, self.options.counter_mode)
    }

    /// Retrieves a visit by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_visit(&mut self, visit_id: VisitId) -> Result<Option<Visit>, PersistenceError> {
        queries::visits::get_visit(&mut self.conn, visit_id)
    }

    /// Returns a user's visit history in storage order.
    ///
    /// Each row carries the visit id, so callers can update or delete a
    /// specific visit without matching on display fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_visits(&mut self, user_id: UserId) -> Result<Vec<UserVisit>, PersistenceError> {
        queries::visits::get_user_visits(&mut self.conn, user_id)
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Ranks every place by cached visit counter, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn most_visited_places(&mut self) -> Result<Vec<PlaceRanking>, PersistenceError> {
        queries::places::most_visited_places(&mut self.conn, None)
    }

    /// Returns the top `limit` rows of [`Ledger::most_visited_places`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn most_visited_places_limited(
        &mut self,
        limit: usize,
    ) -> Result<Vec<PlaceRanking>, PersistenceError> {
        let limit: i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        queries::places::most_visited_places(&mut self.conn, Some(limit))
    }

    /// Returns user, place, and visit totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn summary(&mut self) -> Result<LedgerSummary, PersistenceError> {
        queries::summary::summarize(&mut self.conn)
    }

    /// Recomputes every place's cached counter from its visit rows.
    ///
    /// Returns the number of places whose counter changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the recount fails; counters are left unchanged.
    pub fn recount_visit_counts(&mut self) -> Result<usize, PersistenceError> {
        mutations::counters::recount_all(&mut self.conn)
    }
}
