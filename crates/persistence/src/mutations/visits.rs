// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visit mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};
use visit_ledger_domain::{PlaceId, UserId, VisitDate, VisitId};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{places, visits};
use crate::error::PersistenceError;
use crate::mutations::counters::recount_places;
use crate::options::CounterMode;
use crate::queries::users::user_exists;
use crate::queries::visits::get_visit_place_id;

/// Logs a visit and bumps the place's cached counter.
///
/// The existence checks, the insert, and the increment share one
/// transaction: either the visit is stored and counted, or neither. The
/// counter is read and written back inside that transaction, so a counter
/// already at `i64::MAX` (reachable only by override) rejects the visit
/// instead of storing it uncounted.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The visiting user
/// * `place_id` - The visited place
/// * `date` - The day of the visit
/// * `duration_minutes` - The validated, non-negative stay duration
///
/// # Errors
///
/// Returns `PersistenceError::UserNotFound` or
/// `PersistenceError::PlaceNotFound` if a reference does not resolve,
/// `PersistenceError::VisitCounterOverflow` if the place's counter is at its
/// maximum, or an error if either statement fails.
pub fn insert_visit(
    conn: &mut SqliteConnection,
    user_id: UserId,
    place_id: PlaceId,
    date: VisitDate,
    duration_minutes: i64,
) -> Result<VisitId, PersistenceError> {
    conn.transaction::<VisitId, PersistenceError, _>(|conn| {
        if !user_exists(conn, user_id)? {
            return Err(PersistenceError::UserNotFound(user_id));
        }
        let current_count: Option<i64> = places::table
            .filter(places::place_id.eq(place_id.value()))
            .select(places::number_of_visits)
            .first::<Option<i64>>(conn)
            .optional()?
            .ok_or(PersistenceError::PlaceNotFound(place_id))?;
        let next_count: i64 = current_count
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(PersistenceError::VisitCounterOverflow(place_id))?;

        diesel::insert_into(visits::table)
            .values((
                visits::user_id.eq(user_id.value()),
                visits::place_id.eq(place_id.value()),
                visits::visit_date.eq(date.to_string()),
                visits::stay_duration.eq(duration_minutes),
            ))
            .execute(conn)?;

        let visit_id: VisitId = VisitId::new(conn.get_last_insert_rowid()?);

        diesel::update(places::table.filter(places::place_id.eq(place_id.value())))
            .set(places::number_of_visits.eq(next_count))
            .execute(conn)?;

        info!(%visit_id, %user_id, %place_id, %date, duration_minutes, "Logged visit");
        Ok(visit_id)
    })
}

/// Changes a visit's date and/or duration.
///
/// Supplying neither field leaves the visit untouched and succeeds, as
/// long as the visit exists.
///
/// # Errors
///
/// Returns `PersistenceError::VisitNotFound` if no visit has this ID, or an
/// error if the update fails.
pub fn update_visit(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
    new_date: Option<VisitDate>,
    new_duration: Option<i64>,
) -> Result<(), PersistenceError> {
    let target = visits::table.filter(visits::visit_id.eq(visit_id.value()));

    let rows_affected: usize = match (new_date, new_duration) {
        (Some(date), Some(minutes)) => diesel::update(target)
            .set((
                visits::visit_date.eq(date.to_string()),
                visits::stay_duration.eq(minutes),
            ))
            .execute(conn)?,
        (Some(date), None) => diesel::update(target)
            .set(visits::visit_date.eq(date.to_string()))
            .execute(conn)?,
        (None, Some(minutes)) => diesel::update(target)
            .set(visits::stay_duration.eq(minutes))
            .execute(conn)?,
        (None, None) => {
            if get_visit_place_id(conn, visit_id)?.is_none() {
                return Err(PersistenceError::VisitNotFound(visit_id));
            }
            debug!(%visit_id, "Visit update carried no changes");
            return Ok(());
        }
    };

    if rows_affected == 0 {
        return Err(PersistenceError::VisitNotFound(visit_id));
    }

    info!(%visit_id, "Updated visit");
    Ok(())
}

/// Deletes a single visit by its identifier.
///
/// Under [`CounterMode::Cached`] the place counter is not decremented.
/// Under [`CounterMode::Exact`] the place is recounted before commit.
///
/// # Errors
///
/// Returns `PersistenceError::VisitNotFound` if no visit has this ID, or an
/// error if any statement fails.
pub fn delete_visit(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
    counter_mode: CounterMode,
) -> Result<(), PersistenceError> {
    conn.transaction::<(), PersistenceError, _>(|conn| {
        let Some(place_id) = get_visit_place_id(conn, visit_id)? else {
            return Err(PersistenceError::VisitNotFound(visit_id));
        };

        diesel::delete(visits::table.filter(visits::visit_id.eq(visit_id.value())))
            .execute(conn)?;

        if counter_mode == CounterMode::Exact {
            recount_places(conn, &[place_id])?;
        }

        info!(%visit_id, %place_id, "Deleted visit");
        Ok(())
    })
}
