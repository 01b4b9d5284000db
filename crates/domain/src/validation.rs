// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Validates a required name and returns its trimmed form.
///
/// Names are not required to be unique. Leading and trailing whitespace is
/// dropped before storage.
///
/// # Arguments
///
/// * `field` - Human-readable field label used in the error
/// * `name` - The raw name supplied by the caller
///
/// # Errors
///
/// Returns `DomainError::EmptyName` if the name is empty or whitespace-only.
pub fn validate_name(field: &'static str, name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyName { field });
    }
    Ok(trimmed.to_string())
}

/// Validates a visit duration in minutes.
///
/// # Errors
///
/// Returns `DomainError::NegativeDuration` if `minutes` is below zero.
pub const fn validate_duration(minutes: i64) -> Result<i64, DomainError> {
    if minutes < 0 {
        return Err(DomainError::NegativeDuration { minutes });
    }
    Ok(minutes)
}

/// Validates an administrative visit counter override.
///
/// # Errors
///
/// Returns `DomainError::NegativeVisitCount` if `count` is below zero.
pub const fn validate_visit_count(count: i64) -> Result<i64, DomainError> {
    if count < 0 {
        return Err(DomainError::NegativeVisitCount { count });
    }
    Ok(count)
}
