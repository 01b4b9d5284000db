// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store-wide totals.

use diesel::SqliteConnection;
use tracing::debug;
use visit_ledger_domain::LedgerSummary;

use crate::error::PersistenceError;
use crate::queries::{places, users, visits};

/// Computes user, place, and visit totals.
///
/// `visits` sums the cached place counters while `logged_visits` counts
/// the visit rows, so callers can tell when the two have drifted apart.
///
/// # Errors
///
/// Returns an error if any of the underlying queries fail, or
/// `PersistenceError::CounterTotalOverflow` if overridden counters sum past
/// `i64::MAX`.
pub fn summarize(conn: &mut SqliteConnection) -> Result<LedgerSummary, PersistenceError> {
    let user_count: i64 = users::count_users(conn)?;
    let place_count: i64 = places::count_places(conn)?;
    let cached_total: i64 = places::cached_visit_counts(conn)?
        .into_iter()
        .try_fold(0_i64, |total, (_, count)| total.checked_add(count))
        .ok_or(PersistenceError::CounterTotalOverflow)?;
    let logged_visits: i64 = visits::count_visits(conn)?;

    debug!(
        users = user_count,
        places = place_count,
        visits = cached_total,
        logged_visits,
        "Computed ledger summary"
    );

    Ok(LedgerSummary {
        users: user_count,
        places: place_count,
        visits: cached_total,
        logged_visits,
    })
}
