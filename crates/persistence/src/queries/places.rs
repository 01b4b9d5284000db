// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Place queries, including the most-visited ranking.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use visit_ledger_domain::{Place, PlaceId, PlaceRanking};

use crate::diesel_schema::places;
use crate::error::PersistenceError;

/// Diesel Queryable struct for place rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = places)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PlaceRow {
    place_id: i64,
    place_name: String,
    number_of_visits: Option<i64>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Self {
            place_id: PlaceId::new(row.place_id),
            name: row.place_name,
            visit_count: row.number_of_visits.unwrap_or(0),
        }
    }
}

impl From<PlaceRow> for PlaceRanking {
    fn from(row: PlaceRow) -> Self {
        Self {
            place_id: PlaceId::new(row.place_id),
            place_name: row.place_name,
            visit_count: row.number_of_visits.unwrap_or(0),
        }
    }
}

/// Lists all places sorted by name ascending, with their cached counters.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_places(conn: &mut SqliteConnection) -> Result<Vec<Place>, PersistenceError> {
    debug!("Listing places");

    let rows: Vec<PlaceRow> = places::table
        .select(PlaceRow::as_select())
        .order((places::place_name.asc(), places::place_id.asc()))
        .load(conn)?;

    Ok(rows.into_iter().map(Place::from).collect())
}

/// Retrieves a place by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the place is not found.
pub fn get_place(
    conn: &mut SqliteConnection,
    place_id: PlaceId,
) -> Result<Option<Place>, PersistenceError> {
    debug!("Looking up place by ID: {}", place_id);

    let row: Option<PlaceRow> = places::table
        .filter(places::place_id.eq(place_id.value()))
        .select(PlaceRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Place::from))
}

/// Ranks places by cached visit counter, highest first.
///
/// Places with equal counters keep storage (id) order. The ranking reads
/// the cached counter, so an administrative override is reflected as-is.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `limit` - Optional maximum number of rows to return
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn most_visited_places(
    conn: &mut SqliteConnection,
    limit: Option<i64>,
) -> Result<Vec<PlaceRanking>, PersistenceError> {
    debug!(?limit, "Ranking places by visit count");

    let mut query = places::table
        .select(PlaceRow::as_select())
        .order((places::number_of_visits.desc(), places::place_id.asc()))
        .into_boxed();

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let rows: Vec<PlaceRow> = query.load(conn)?;
    Ok(rows.into_iter().map(PlaceRanking::from).collect())
}

/// Counts all places.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_places(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(places::table.count().get_result(conn)?)
}

/// Returns each place's ID paired with its cached counter, in id order.
///
/// A NULL counter (possible only in adopted legacy files) reads as zero.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn cached_visit_counts(
    conn: &mut SqliteConnection,
) -> Result<Vec<(PlaceId, i64)>, PersistenceError> {
    let rows: Vec<(i64, Option<i64>)> = places::table
        .select((places::place_id, places::number_of_visits))
        .order(places::place_id.asc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(place_id, count)| (PlaceId::new(place_id), count.unwrap_or(0)))
        .collect())
}
