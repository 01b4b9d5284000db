// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-readable and JSON rendering of command outcomes and errors.

use std::fmt;

use visit_ledger_persistence::{ErrorKind, PersistenceError};

use crate::commands::Outcome;

/// Plain-text view of an [`Outcome`], one record per line.
pub struct TextOutcome<'a>(pub &'a Outcome);

impl fmt::Display for TextOutcome<'_> {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Outcome::UserAdded { user_id, name } => writeln!(out, "Added user {user_id}: {name}"),
            Outcome::PlaceAdded { place_id, name } => {
                writeln!(out, "Added place {place_id}: {name}")
            }
            Outcome::VisitLogged {
                visit_id,
                user_id,
                place_id,
            } => writeln!(
                out,
                "Logged visit {visit_id} (user {user_id} at place {place_id})"
            ),
            Outcome::UserRenamed { user_id } => writeln!(out, "Renamed user {user_id}"),
            Outcome::PlaceUpdated {
                place_id,
                visit_count_overridden,
            } => {
                if *visit_count_overridden {
                    writeln!(out, "Updated place {place_id} (visit count overridden)")
                } else {
                    writeln!(out, "Updated place {place_id}")
                }
            }
            Outcome::VisitUpdated { visit_id } => writeln!(out, "Updated visit {visit_id}"),
            Outcome::UserDeleted {
                user_id,
                visits_removed,
            } => writeln!(
                out,
                "Deleted user {user_id} and {visits_removed} visit(s)"
            ),
            Outcome::PlaceDeleted {
                place_id,
                visits_removed,
            } => writeln!(
                out,
                "Deleted place {place_id} and {visits_removed} visit(s)"
            ),
            Outcome::VisitDeleted { visit_id } => writeln!(out, "Deleted visit {visit_id}"),
            Outcome::Users { users } => {
                if users.is_empty() {
                    writeln!(out, "No users.")
                } else {
                    users.iter().try_for_each(|user| {
                        writeln!(out, "{:>6}  {}", user.user_id.value(), user.name)
                    })
                }
            }
            Outcome::Places { places } => {
                if places.is_empty() {
                    writeln!(out, "No places.")
                } else {
                    places.iter().try_for_each(|place| {
                        writeln!(
                            out,
                            "{:>6}  {}  ({} visits)",
                            place.place_id.value(),
                            place.name,
                            place.visit_count
                        )
                    })
                }
            }
            Outcome::Visits { user_id, visits } => {
                if visits.is_empty() {
                    writeln!(out, "User {user_id} has no visits.")
                } else {
                    visits.iter().try_for_each(|visit| {
                        writeln!(
                            out,
                            "{:>6}  {}  {}  {} min",
                            visit.visit_id.value(),
                            visit.date,
                            visit.place_name,
                            visit.duration_minutes
                        )
                    })
                }
            }
            Outcome::Ranking { places } => {
                if places.is_empty() {
                    writeln!(out, "No places.")
                } else {
                    places.iter().enumerate().try_for_each(|(rank, place)| {
                        writeln!(
                            out,
                            "{:>3}. {}  ({} visits)",
                            rank + 1,
                            place.place_name,
                            place.visit_count
                        )
                    })
                }
            }
            Outcome::Summary { summary } => {
                writeln!(out, "Users:  {}", summary.users)?;
                writeln!(out, "Places: {}", summary.places)?;
                writeln!(out, "Visits: {}", summary.visits)?;
                if summary.has_counter_drift() {
                    writeln!(
                        out,
                        "Note: {} visit(s) are logged; run `recount` to resync counters",
                        summary.logged_visits
                    )?;
                }
                Ok(())
            }
            Outcome::Recounted { places_changed } => {
                writeln!(out, "Recounted visit counters; {places_changed} place(s) changed")
            }
        }
    }
}

/// Renders an outcome as plain text, one record per line.
#[must_use]
pub fn render_text(outcome: &Outcome) -> String {
    TextOutcome(outcome).to_string()
}

/// Renders an outcome as a single JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(outcome: &Outcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

/// Turns a ledger error into the message shown to the user.
#[must_use]
pub fn describe_error(err: &PersistenceError) -> String {
    match err.kind() {
        ErrorKind::Validation => format!("Invalid input: {err}"),
        ErrorKind::NotFound => format!("Not found: {err}"),
        ErrorKind::Storage => format!("Storage failure: {err}"),
    }
}
