// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Place mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{info, warn};
use visit_ledger_domain::PlaceId;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{places, visits};
use crate::error::PersistenceError;

/// Inserts a new place with a zero visit counter.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_place(conn: &mut SqliteConnection, name: &str) -> Result<PlaceId, PersistenceError> {
    diesel::insert_into(places::table)
        .values((places::place_name.eq(name), places::number_of_visits.eq(0_i64)))
        .execute(conn)?;

    let place_id: PlaceId = PlaceId::new(conn.get_last_insert_rowid()?);

    info!(%place_id, name, "Added place");
    Ok(place_id)
}

/// Renames a place and optionally overwrites its cached visit counter.
///
/// An override is taken at face value: the counter no longer has to match
/// the visit rows until the next recount.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `place_id` - The place to update
/// * `new_name` - The validated, trimmed name
/// * `new_visit_count` - Validated counter override, if any
///
/// # Errors
///
/// Returns `PersistenceError::PlaceNotFound` if no place has this ID, or an
/// error if the update fails.
pub fn update_place(
    conn: &mut SqliteConnection,
    place_id: PlaceId,
    new_name: &str,
    new_visit_count: Option<i64>,
) -> Result<(), PersistenceError> {
    let target = places::table.filter(places::place_id.eq(place_id.value()));

    let rows_affected: usize = match new_visit_count {
        Some(count) => diesel::update(target)
            .set((
                places::place_name.eq(new_name),
                places::number_of_visits.eq(count),
            ))
            .execute(conn)?,
        None => diesel::update(target)
            .set(places::place_name.eq(new_name))
            .execute(conn)?,
    };

    if rows_affected == 0 {
        return Err(PersistenceError::PlaceNotFound(place_id));
    }

    if let Some(count) = new_visit_count {
        warn!(%place_id, count, "Visit counter overridden");
    }
    info!(%place_id, new_name, "Updated place");
    Ok(())
}

/// Deletes a place together with every visit logged there.
///
/// Returns the number of visits removed.
///
/// # Errors
///
/// Returns `PersistenceError::PlaceNotFound` if no place has this ID, or an
/// error if any statement fails. Nothing is deleted on error.
pub fn delete_place(
    conn: &mut SqliteConnection,
    place_id: PlaceId,
) -> Result<usize, PersistenceError> {
    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let visits_removed: usize = diesel::delete(visits::table)
            .filter(visits::place_id.eq(place_id.value()))
            .execute(conn)?;

        let rows_affected: usize = diesel::delete(places::table)
            .filter(places::place_id.eq(place_id.value()))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::PlaceNotFound(place_id));
        }

        info!(%place_id, visits_removed, "Deleted place");
        Ok(visits_removed)
    })
}
