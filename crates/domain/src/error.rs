// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur during domain validation.
///
/// Every variant describes a caller mistake: the ledger rejects the input
/// before any row is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required name field is empty or whitespace-only.
    #[error("{field} cannot be empty")]
    EmptyName {
        /// The field that was rejected (e.g. "user name").
        field: &'static str,
    },
    /// A visit duration was negative.
    #[error("Visit duration must be non-negative, got {minutes} minutes")]
    NegativeDuration {
        /// The rejected duration in minutes.
        minutes: i64,
    },
    /// An administrative visit count override was negative.
    #[error("Visit count must be non-negative, got {count}")]
    NegativeVisitCount {
        /// The rejected count.
        count: i64,
    },
    /// Failed to parse a calendar date.
    #[error("Failed to parse date '{date_string}': {error}")]
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}
