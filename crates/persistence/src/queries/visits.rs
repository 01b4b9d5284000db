// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visit queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use visit_ledger_domain::{PlaceId, UserId, UserVisit, Visit, VisitDate, VisitId};

use crate::diesel_schema::{places, visits};
use crate::error::PersistenceError;

/// Diesel Queryable struct for visit rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = visits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct VisitRow {
    visit_id: i64,
    user_id: i64,
    place_id: i64,
    visit_date: String,
    stay_duration: Option<i64>,
}

impl TryFrom<VisitRow> for Visit {
    type Error = PersistenceError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(Self {
            visit_id: VisitId::new(row.visit_id),
            user_id: UserId::new(row.user_id),
            place_id: PlaceId::new(row.place_id),
            date: parse_stored_date(row.visit_id, &row.visit_date)?,
            duration_minutes: row.stay_duration.unwrap_or(0),
        })
    }
}

/// Converts a stored `visit_date` back into a [`VisitDate`].
fn parse_stored_date(visit_id: i64, stored: &str) -> Result<VisitDate, PersistenceError> {
    VisitDate::parse(stored).map_err(|e| {
        PersistenceError::SerializationError(format!("visit {visit_id} has unreadable date: {e}"))
    })
}

/// Retrieves a visit by ID.
///
/// # Errors
///
/// Returns an error if the database query fails or the stored date is
/// unreadable.
/// Returns `Ok(None)` if the visit is not found.
pub fn get_visit(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
) -> Result<Option<Visit>, PersistenceError> {
    debug!("Looking up visit by ID: {}", visit_id);

    let row: Option<VisitRow> = visits::table
        .filter(visits::visit_id.eq(visit_id.value()))
        .select(VisitRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Visit::try_from).transpose()
}

/// Returns the place a visit belongs to, if the visit exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_visit_place_id(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
) -> Result<Option<PlaceId>, PersistenceError> {
    let place_id: Option<i64> = visits::table
        .filter(visits::visit_id.eq(visit_id.value()))
        .select(visits::place_id)
        .first(conn)
        .optional()?;

    Ok(place_id.map(PlaceId::new))
}

/// Returns every visit of a user joined with the visited place's name.
///
/// Rows come back in storage order (ascending visit id). An unknown user
/// simply has no visits.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored date is
/// unreadable.
pub fn get_user_visits(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Vec<UserVisit>, PersistenceError> {
    debug!("Loading visits for user ID: {}", user_id);

    let rows: Vec<(i64, i64, String, String, Option<i64>)> = visits::table
        .inner_join(places::table)
        .filter(visits::user_id.eq(user_id.value()))
        .select((
            visits::visit_id,
            visits::place_id,
            places::place_name,
            visits::visit_date,
            visits::stay_duration,
        ))
        .order(visits::visit_id.asc())
        .load(conn)?;

    let mut history: Vec<UserVisit> = Vec::with_capacity(rows.len());
    for (visit_id, place_id, place_name, visit_date, stay_duration) in rows {
        history.push(UserVisit {
            visit_id: VisitId::new(visit_id),
            place_id: PlaceId::new(place_id),
            place_name,
            date: parse_stored_date(visit_id, &visit_date)?,
            duration_minutes: stay_duration.unwrap_or(0),
        });
    }

    Ok(history)
}

/// Returns the distinct places visited by a user, in id order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn places_visited_by_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Vec<PlaceId>, PersistenceError> {
    let place_ids: Vec<i64> = visits::table
        .filter(visits::user_id.eq(user_id.value()))
        .select(visits::place_id)
        .distinct()
        .order(visits::place_id.asc())
        .load(conn)?;

    Ok(place_ids.into_iter().map(PlaceId::new).collect())
}

/// Counts the visit rows referencing a place.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_visits_for_place(
    conn: &mut SqliteConnection,
    place_id: PlaceId,
) -> Result<i64, PersistenceError> {
    Ok(visits::table
        .filter(visits::place_id.eq(place_id.value()))
        .count()
        .get_result(conn)?)
}

/// Counts all visit rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_visits(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(visits::table.count().get_result(conn)?)
}
