// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;
use visit_ledger_domain::{DomainError, PlaceId, UserId, VisitId};

/// Coarse classification of a [`PersistenceError`].
///
/// Presentation layers branch on this to pick user-facing feedback; the
/// ledger itself never formats messages for end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied invalid input (empty name, negative duration,
    /// malformed date).
    Validation,
    /// A referenced user, place, or visit does not exist.
    NotFound,
    /// The underlying store failed.
    Storage,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Input was rejected by a domain rule before touching the store.
    #[error(transparent)]
    Validation(#[from] DomainError),
    /// The requested user was not found.
    #[error("User {0} not found")]
    UserNotFound(UserId),
    /// The requested place was not found.
    #[error("Place {0} not found")]
    PlaceNotFound(PlaceId),
    /// The requested visit was not found.
    #[error("Visit {0} not found")]
    VisitNotFound(VisitId),
    /// A database error occurred.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Database connection failed.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// A stored row could not be converted back into a domain value.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Initialization error.
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// A place's cached counter is already at `i64::MAX`, so logging
    /// another visit there cannot be counted.
    #[error("Visit counter of place {0} cannot be incremented past its maximum")]
    VisitCounterOverflow(PlaceId),
    /// The sum of all cached counters does not fit in an `i64`.
    #[error("Total of cached visit counters overflows")]
    CounterTotalOverflow,
    /// Foreign key enforcement is not enabled.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
}

impl PersistenceError {
    /// Classifies this error for the presentation layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::VisitCounterOverflow(_) => ErrorKind::Validation,
            Self::UserNotFound(_) | Self::PlaceNotFound(_) | Self::VisitNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DatabaseError(_)
            | Self::DatabaseConnectionFailed(_)
            | Self::MigrationFailed(_)
            | Self::QueryFailed(_)
            | Self::SerializationError(_)
            | Self::InitializationError(_)
            | Self::CounterTotalOverflow
            | Self::ForeignKeyEnforcementNotEnabled => ErrorKind::Storage,
        }
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
