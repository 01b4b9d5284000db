// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Storage and display format for visit dates.
const VISIT_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Generates a store-assigned identifier newtype.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id! {
    /// Identifier of a user, assigned by the ledger and never reused.
    UserId
}

entity_id! {
    /// Identifier of a place, assigned by the ledger and never reused.
    PlaceId
}

entity_id! {
    /// Identifier of a logged visit, assigned by the ledger and never reused.
    VisitId
}

/// A calendar date on which a visit happened.
///
/// Serialized as `YYYY-MM-DD`, which is also the storage representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisitDate(Date);

impl VisitDate {
    /// Wraps a calendar date.
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    /// Builds a visit date from its calendar components.
    ///
    /// # Errors
    ///
    /// Returns an error if the components do not name a real date.
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Result<Self, DomainError> {
        let month: time::Month =
            time::Month::try_from(month).map_err(|e| DomainError::DateParseError {
                date_string: format!("{year:04}-{month:02}-{day:02}"),
                error: e.to_string(),
            })?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|e| DomainError::DateParseError {
                date_string: format!("{year:04}-{:02}-{day:02}", u8::from(month)),
                error: e.to_string(),
            })
    }

    /// Parses a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateParseError` if the string is not a valid
    /// calendar date in that format.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Date::parse(s.trim(), VISIT_DATE_FORMAT)
            .map(Self)
            .map_err(|e| DomainError::DateParseError {
                date_string: s.to_string(),
                error: e.to_string(),
            })
    }

    /// Returns the underlying calendar date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.0
    }
}

impl std::fmt::Display for VisitDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted: String = self.0.format(VISIT_DATE_FORMAT).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for VisitDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VisitDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VisitDate> for String {
    fn from(value: VisitDate) -> Self {
        value.to_string()
    }
}

/// A person whose visits are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The store-assigned identifier.
    pub user_id: UserId,
    /// Display name. Not unique.
    pub name: String,
}

/// A place that can be visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// The store-assigned identifier.
    pub place_id: PlaceId,
    /// Display name. Not unique.
    pub name: String,
    /// Cached number of visits logged against this place.
    ///
    /// Normally equal to the number of visit rows, but administrative
    /// overrides and reference-mode deletes can make it drift until the
    /// next recount.
    pub visit_count: i64,
}

/// One occurrence of a user being at a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// The store-assigned identifier.
    pub visit_id: VisitId,
    /// The visiting user.
    pub user_id: UserId,
    /// The visited place.
    pub place_id: PlaceId,
    /// The day of the visit.
    pub date: VisitDate,
    /// How long the user stayed, in minutes.
    pub duration_minutes: i64,
}

/// A row of a user's visit history, joined against the place name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVisit {
    /// Stable identifier of the visit, used to target updates and deletes.
    pub visit_id: VisitId,
    /// The visited place.
    pub place_id: PlaceId,
    /// The visited place's current name.
    pub place_name: String,
    /// The day of the visit.
    pub date: VisitDate,
    /// How long the user stayed, in minutes.
    pub duration_minutes: i64,
}

/// A row of the most-visited ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRanking {
    /// The ranked place.
    pub place_id: PlaceId,
    /// The ranked place's name.
    pub place_name: String,
    /// The cached visit counter the ranking is ordered by.
    pub visit_count: i64,
}

/// Store-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Number of users.
    pub users: i64,
    /// Number of places.
    pub places: i64,
    /// Sum of every place's cached visit counter.
    pub visits: i64,
    /// Number of visit rows actually stored.
    pub logged_visits: i64,
}

impl LedgerSummary {
    /// Returns whether the cached counters disagree with the visit rows.
    #[must_use]
    pub const fn has_counter_drift(&self) -> bool {
        self.visits != self.logged_visits
    }
}
