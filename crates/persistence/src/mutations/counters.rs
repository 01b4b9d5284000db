// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recomputing cached place counters from the visit rows.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info, warn};
use visit_ledger_domain::PlaceId;

use crate::diesel_schema::places;
use crate::error::PersistenceError;
use crate::queries::places::cached_visit_counts;
use crate::queries::visits::count_visits_for_place;

/// Rewrites one place's counter to its live visit count.
///
/// Returns `true` if the stored counter changed.
///
/// # Errors
///
/// Returns an error if the count or update fails.
pub fn recount_place(
    conn: &mut SqliteConnection,
    place_id: PlaceId,
) -> Result<bool, PersistenceError> {
    let live_count: i64 = count_visits_for_place(conn, place_id)?;

    let rows_affected: usize = diesel::update(
        places::table
            .filter(places::place_id.eq(place_id.value()))
            .filter(
                places::number_of_visits
                    .ne(live_count)
                    .or(places::number_of_visits.is_null()),
            ),
    )
    .set(places::number_of_visits.eq(live_count))
    .execute(conn)?;

    if rows_affected > 0 {
        debug!(%place_id, live_count, "Recounted place");
    }
    Ok(rows_affected > 0)
}

/// Recounts a set of places. Callers are expected to hold a transaction.
///
/// # Errors
///
/// Returns an error if any recount fails.
pub fn recount_places(
    conn: &mut SqliteConnection,
    place_ids: &[PlaceId],
) -> Result<usize, PersistenceError> {
    let mut changed: usize = 0;
    for place_id in place_ids {
        if recount_place(conn, *place_id)? {
            changed += 1;
        }
    }
    Ok(changed)
}

/// Recounts every place in one transaction.
///
/// This is what ends an administrative override. Returns the number of
/// places whose counter changed.
///
/// # Errors
///
/// Returns an error if any statement fails; no counter is changed then.
pub fn recount_all(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let place_ids: Vec<PlaceId> = cached_visit_counts(conn)?
            .into_iter()
            .map(|(place_id, _)| place_id)
            .collect();

        let changed: usize = recount_places(conn, &place_ids)?;

        if changed > 0 {
            warn!(changed, "Visit counters had drifted and were recounted");
        } else {
            info!(places = place_ids.len(), "Visit counters already in sync");
        }
        Ok(changed)
    })
}
