// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Subcommands and their execution against the ledger.
//!
//! Each subcommand maps to exactly one ledger operation. Execution returns
//! an [`Outcome`] describing what happened; rendering it is left to
//! `render`.

use clap::Subcommand;
use serde::Serialize;
use tracing::debug;
use visit_ledger_domain::{
    LedgerSummary, Place, PlaceId, PlaceRanking, User, UserId, UserVisit, VisitDate, VisitId,
};
use visit_ledger_persistence::{Ledger, PersistenceError};

/// Ledger operations exposed on the command line.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a user
    AddUser {
        /// The user's name
        name: String,
    },
    /// Add a place
    AddPlace {
        /// The place's name
        name: String,
    },
    /// Log a visit of a user to a place
    LogVisit {
        /// The visiting user's id
        user_id: i64,
        /// The visited place's id
        place_id: i64,
        /// Day of the visit (YYYY-MM-DD)
        date: String,
        /// Length of stay in minutes
        #[arg(allow_negative_numbers = true)]
        duration: i64,
    },
    /// Rename a user
    RenameUser {
        /// The user's id
        user_id: i64,
        /// The new name
        name: String,
    },
    /// Rename a place, optionally overriding its visit counter
    UpdatePlace {
        /// The place's id
        place_id: i64,
        /// The new name
        name: String,
        /// Overwrite the cached visit counter with this value
        #[arg(long, allow_negative_numbers = true)]
        visits: Option<i64>,
    },
    /// Change a visit's date and/or duration
    UpdateVisit {
        /// The visit's id
        visit_id: i64,
        /// New day of the visit (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// New length of stay in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
    },
    /// Delete a user and all of their visits
    DeleteUser {
        /// The user's id
        user_id: i64,
    },
    /// Delete a place and all visits logged there
    DeletePlace {
        /// The place's id
        place_id: i64,
    },
    /// Delete a single visit
    DeleteVisit {
        /// The visit's id, as shown by `visits`
        visit_id: i64,
    },
    /// List users by name
    Users,
    /// List places by name with their visit counters
    Places,
    /// Show a user's visit history
    Visits {
        /// The user's id
        user_id: i64,
    },
    /// Rank places by visit count
    Top {
        /// Only show this many places
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show user, place, and visit totals
    Stats,
    /// Recompute every place's visit counter from the logged visits
    Recount,
}

/// The result of a successfully executed [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A user was created.
    UserAdded {
        /// Id assigned to the new user.
        user_id: UserId,
        /// The stored, trimmed name.
        name: String,
    },
    /// A place was created with a zero visit counter.
    PlaceAdded {
        /// Id assigned to the new place.
        place_id: PlaceId,
        /// The stored, trimmed name.
        name: String,
    },
    /// A visit was recorded and the place's counter bumped.
    VisitLogged {
        /// Id assigned to the new visit.
        visit_id: VisitId,
        /// The visiting user.
        user_id: UserId,
        /// The visited place.
        place_id: PlaceId,
    },
    /// A user's name was changed.
    UserRenamed {
        /// The renamed user.
        user_id: UserId,
    },
    /// A place was renamed, possibly with a new visit counter.
    PlaceUpdated {
        /// The updated place.
        place_id: PlaceId,
        /// Whether the cached visit counter was overwritten.
        visit_count_overridden: bool,
    },
    /// A visit's date or duration was changed.
    VisitUpdated {
        /// The updated visit.
        visit_id: VisitId,
    },
    /// A user and their visits were removed.
    UserDeleted {
        /// The removed user.
        user_id: UserId,
        /// Number of visits removed with the user.
        visits_removed: usize,
    },
    /// A place and the visits logged there were removed.
    PlaceDeleted {
        /// The removed place.
        place_id: PlaceId,
        /// Number of visits removed with the place.
        visits_removed: usize,
    },
    /// A single visit was removed.
    VisitDeleted {
        /// The removed visit.
        visit_id: VisitId,
    },
    /// All users, ordered by name.
    Users {
        /// The listed users.
        users: Vec<User>,
    },
    /// All places, ordered by name.
    Places {
        /// The listed places with their cached counters.
        places: Vec<Place>,
    },
    /// One user's visit history.
    Visits {
        /// The user whose history this is.
        user_id: UserId,
        /// Their visits in the order they were logged.
        visits: Vec<UserVisit>,
    },
    /// Places ranked by visit counter.
    Ranking {
        /// Ranked places, most visited first.
        places: Vec<PlaceRanking>,
    },
    /// Ledger-wide totals.
    Summary {
        /// The computed totals.
        summary: LedgerSummary,
    },
    /// Visit counters were recomputed from the logged visits.
    Recounted {
        /// Number of places whose counter changed.
        places_changed: usize,
    },
}

/// Parses a date argument, reporting failures as validation errors.
fn parse_date(raw: &str) -> Result<VisitDate, PersistenceError> {
    Ok(VisitDate::parse(raw)?)
}

/// Runs one command against the ledger.
///
/// # Errors
///
/// Returns whatever the underlying ledger operation returns, plus a
/// validation error for malformed date arguments.
#[allow(clippy::too_many_lines)]
pub fn execute(ledger: &mut Ledger, command: Command) -> Result<Outcome, PersistenceError> {
    debug!(?command, "Executing command");

    let outcome: Outcome = match command {
        Command::AddUser { name } => {
            let user_id: UserId = ledger.add_user(&name)?;
            Outcome::UserAdded {
                user_id,
                name: name.trim().to_string(),
            }
        }
        Command::AddPlace { name } => {
            let place_id: PlaceId = ledger.add_place(&name)?;
            Outcome::PlaceAdded {
                place_id,
                name: name.trim().to_string(),
            }
        }
        Command::LogVisit {
            user_id,
            place_id,
            date,
            duration,
        } => {
            let date: VisitDate = parse_date(&date)?;
            let user_id: UserId = UserId::new(user_id);
            let place_id: PlaceId = PlaceId::new(place_id);
            let visit_id: VisitId = ledger.log_visit(user_id, place_id, date, duration)?;
            Outcome::VisitLogged {
                visit_id,
                user_id,
                place_id,
            }
        }
        Command::RenameUser { user_id, name } => {
            let user_id: UserId = UserId::new(user_id);
            ledger.update_user_name(user_id, &name)?;
            Outcome::UserRenamed { user_id }
        }
        Command::UpdatePlace {
            place_id,
            name,
            visits,
        } => {
            let place_id: PlaceId = PlaceId::new(place_id);
            ledger.update_place(place_id, &name, visits)?;
            Outcome::PlaceUpdated {
                place_id,
                visit_count_overridden: visits.is_some(),
            }
        }
        Command::UpdateVisit {
            visit_id,
            date,
            duration,
        } => {
            let visit_id: VisitId = VisitId::new(visit_id);
            let date: Option<VisitDate> = date.as_deref().map(parse_date).transpose()?;
            ledger.update_visit(visit_id, date, duration)?;
            Outcome::VisitUpdated { visit_id }
        }
        Command::DeleteUser { user_id } => {
            let user_id: UserId = UserId::new(user_id);
            let visits_removed: usize = ledger.delete_user(user_id)?;
            Outcome::UserDeleted {
                user_id,
                visits_removed,
            }
        }
        Command::DeletePlace { place_id } => {
            let place_id: PlaceId = PlaceId::new(place_id);
            let visits_removed: usize = ledger.delete_place(place_id)?;
            Outcome::PlaceDeleted {
                place_id,
                visits_removed,
            }
        }
        Command::DeleteVisit { visit_id } => {
            let visit_id: VisitId = VisitId::new(visit_id);
            ledger.delete_visit(visit_id)?;
            Outcome::VisitDeleted { visit_id }
        }
        Command::Users => Outcome::Users {
            users: ledger.list_users()?,
        },
        Command::Places => Outcome::Places {
            places: ledger.list_places()?,
        },
        Command::Visits { user_id } => {
            let user_id: UserId = UserId::new(user_id);
            Outcome::Visits {
                user_id,
                visits: ledger.get_user_visits(user_id)?,
            }
        }
        Command::Top { limit } => Outcome::Ranking {
            places: match limit {
                Some(limit) => ledger.most_visited_places_limited(limit)?,
                None => ledger.most_visited_places()?,
            },
        },
        Command::Stats => Outcome::Summary {
            summary: ledger.summary()?,
        },
        Command::Recount => Outcome::Recounted {
            places_changed: ledger.recount_visit_counts()?,
        },
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use visit_ledger_persistence::ErrorKind;

    fn run(ledger: &mut Ledger, command: Command) -> Outcome {
        execute(ledger, command).unwrap()
    }

    fn seeded() -> Ledger {
        let mut ledger = Ledger::new_in_memory().unwrap();
        run(
            &mut ledger,
            Command::AddUser {
                name: String::from("Ann"),
            },
        );
        run(
            &mut ledger,
            Command::AddPlace {
                name: String::from("Park"),
            },
        );
        ledger
    }

    #[test]
    fn test_add_user_reports_trimmed_name_and_id() {
        let mut ledger = Ledger::new_in_memory().unwrap();

        let outcome = run(
            &mut ledger,
            Command::AddUser {
                name: String::from("  Jane Doe "),
            },
        );

        assert_eq!(
            outcome,
            Outcome::UserAdded {
                user_id: UserId::new(1),
                name: String::from("Jane Doe"),
            }
        );
    }

    #[test]
    fn test_log_visit_then_list_history() {
        let mut ledger = seeded();

        let outcome = run(
            &mut ledger,
            Command::LogVisit {
                user_id: 1,
                place_id: 1,
                date: String::from("2024-01-01"),
                duration: 30,
            },
        );
        assert_eq!(
            outcome,
            Outcome::VisitLogged {
                visit_id: VisitId::new(1),
                user_id: UserId::new(1),
                place_id: PlaceId::new(1),
            }
        );

        let Outcome::Visits { visits, .. } = run(&mut ledger, Command::Visits { user_id: 1 })
        else {
            panic!("expected visit history");
        };
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].place_name, "Park");
    }

    #[test]
    fn test_malformed_date_is_a_validation_error() {
        let mut ledger = seeded();

        let err = execute(
            &mut ledger,
            Command::LogVisit {
                user_id: 1,
                place_id: 1,
                date: String::from("01/02/2024"),
                duration: 30,
            },
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(ledger.summary().unwrap().logged_visits, 0);
    }

    #[test]
    fn test_update_visit_with_bad_date_changes_nothing() {
        let mut ledger = seeded();
        run(
            &mut ledger,
            Command::LogVisit {
                user_id: 1,
                place_id: 1,
                date: String::from("2024-01-01"),
                duration: 30,
            },
        );

        let err = execute(
            &mut ledger,
            Command::UpdateVisit {
                visit_id: 1,
                date: Some(String::from("not-a-date")),
                duration: Some(45),
            },
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        let visit = ledger.get_visit(VisitId::new(1)).unwrap().unwrap();
        assert_eq!(visit.duration_minutes, 30);
    }

    #[test]
    fn test_delete_unknown_visit_is_not_found() {
        let mut ledger = seeded();

        let err = execute(&mut ledger, Command::DeleteVisit { visit_id: 12 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_update_place_reports_override() {
        let mut ledger = seeded();

        let outcome = run(
            &mut ledger,
            Command::UpdatePlace {
                place_id: 1,
                name: String::from("Park"),
                visits: Some(10),
            },
        );

        assert_eq!(
            outcome,
            Outcome::PlaceUpdated {
                place_id: PlaceId::new(1),
                visit_count_overridden: true,
            }
        );
        let Outcome::Recounted { places_changed } = run(&mut ledger, Command::Recount) else {
            panic!("expected recount outcome");
        };
        assert_eq!(places_changed, 1);
    }

    #[test]
    fn test_top_respects_limit() {
        let mut ledger = seeded();
        run(
            &mut ledger,
            Command::AddPlace {
                name: String::from("Museum"),
            },
        );

        let Outcome::Ranking { places } = run(&mut ledger, Command::Top { limit: Some(1) })
        else {
            panic!("expected ranking");
        };
        assert_eq!(places.len(), 1);
    }
}
