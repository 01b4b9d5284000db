// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;
use visit_ledger_domain::{PlaceId, UserId};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{users, visits};
use crate::error::PersistenceError;
use crate::mutations::counters::recount_places;
use crate::options::CounterMode;
use crate::queries::visits::places_visited_by_user;

/// Inserts a new user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `name` - The validated, trimmed user name
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_user(conn: &mut SqliteConnection, name: &str) -> Result<UserId, PersistenceError> {
    diesel::insert_into(users::table)
        .values(users::name.eq(name))
        .execute(conn)?;

    let user_id: UserId = UserId::new(conn.get_last_insert_rowid()?);

    info!(%user_id, name, "Added user");
    Ok(user_id)
}

/// Renames a user.
///
/// # Errors
///
/// Returns `PersistenceError::UserNotFound` if no user has this ID, or an
/// error if the update fails.
pub fn update_user_name(
    conn: &mut SqliteConnection,
    user_id: UserId,
    new_name: &str,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id.value()))
        .set(users::name.eq(new_name))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }

    info!(%user_id, new_name, "Renamed user");
    Ok(())
}

/// Deletes a user together with every visit they logged.
///
/// Visits are removed first so the foreign keys never dangle, then the
/// user row. Under [`CounterMode::Exact`] the places those visits pointed
/// at are recounted before commit; under [`CounterMode::Cached`] their
/// counters are left as they were.
///
/// Returns the number of visits removed.
///
/// # Errors
///
/// Returns `PersistenceError::UserNotFound` if no user has this ID, or an
/// error if any statement fails. Nothing is deleted on error.
pub fn delete_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
    counter_mode: CounterMode,
) -> Result<usize, PersistenceError> {
    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let affected_places: Vec<PlaceId> = match counter_mode {
            CounterMode::Exact => places_visited_by_user(conn, user_id)?,
            CounterMode::Cached => Vec::new(),
        };

        let visits_removed: usize = diesel::delete(visits::table)
            .filter(visits::user_id.eq(user_id.value()))
            .execute(conn)?;

        let rows_affected: usize = diesel::delete(users::table)
            .filter(users::user_id.eq(user_id.value()))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::UserNotFound(user_id));
        }

        recount_places(conn, &affected_places)?;

        info!(%user_id, visits_removed, "Deleted user");
        Ok(visits_removed)
    })
}
