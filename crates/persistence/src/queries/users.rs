// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use visit_ledger_domain::{User, UserId};

use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserRow {
    user_id: i64,
    name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            name: row.name,
        }
    }
}

/// Lists all users sorted by name ascending.
///
/// Users sharing a name are ordered by id so repeated calls return the
/// same sequence.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>, PersistenceError> {
    debug!("Listing users");

    let rows: Vec<UserRow> = users::table
        .select(UserRow::as_select())
        .order((users::name.asc(), users::user_id.asc()))
        .load(conn)?;

    Ok(rows.into_iter().map(User::from).collect())
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<User>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id.value()))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(User::from))
}

/// Returns whether a user with the given ID exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn user_exists(conn: &mut SqliteConnection, user_id: UserId) -> Result<bool, PersistenceError> {
    Ok(
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::user_id.eq(user_id.value())),
        ))
        .get_result(conn)?,
    )
}

/// Counts all users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(users::table.count().get_result(conn)?)
}
