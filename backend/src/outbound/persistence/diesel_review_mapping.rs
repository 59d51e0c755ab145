//! Error mapping and row conversion shared by the Diesel review store.

use std::collections::HashMap;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;
use crate::domain::{
    PullRequest, PullRequestId, PullRequestName, PullRequestParts, TeamName, User, UserId,
    Username,
};

use super::models::{PullRequestRow, UserRow};
use super::pool::PoolError;

/// Map pool errors to store connection errors.
pub(super) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to store errors, logging the database detail.
pub(super) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => StoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            StoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => StoreError::query("database error"),
        _ => StoreError::query("database error"),
    }
}

/// Map unique and foreign key violations to caller-specific errors; anything
/// else goes through [`map_diesel_error`].
pub(super) fn map_constraint_error<U, F>(error: DieselError, unique: U, foreign_key: F) -> StoreError
where
    U: FnOnce() -> StoreError,
    F: FnOnce() -> StoreError,
{
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
            debug!(constraint = info.constraint_name(), "unique violation");
            unique()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info) => {
            debug!(constraint = info.constraint_name(), "foreign key violation");
            foreign_key()
        }
        other => map_diesel_error(other),
    }
}

fn corrupt(entity: &str, key: &str, reason: impl std::fmt::Display) -> StoreError {
    StoreError::query(format!("stored {entity} {key} is invalid: {reason}"))
}

/// Cast the domain version to the database column type.
#[expect(
    clippy::cast_possible_wrap,
    reason = "versions are small positive integers"
)]
pub(super) fn version_for_db(version: u32) -> i32 {
    version as i32
}

/// Cast the database version to the domain type.
#[expect(
    clippy::cast_sign_loss,
    reason = "version is constrained positive in the database"
)]
pub(super) fn version_from_db(version: i32) -> u32 {
    version as u32
}

/// Convert a database count; negative values read as zero.
pub(super) fn count_from_db(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

pub(super) fn user_id_from_db(raw: String) -> Result<UserId, StoreError> {
    UserId::new(raw.clone()).map_err(|err| corrupt("user id", &raw, err))
}

pub(super) fn row_to_user(row: UserRow) -> Result<User, StoreError> {
    let username = Username::new(row.username).map_err(|err| corrupt("user", &row.user_id, err))?;
    let team_name =
        TeamName::new(row.team_name).map_err(|err| corrupt("user", &row.user_id, err))?;
    let id = user_id_from_db(row.user_id)?;
    Ok(User::new(id, username, team_name, row.is_active))
}

pub(super) fn row_to_pull_request(
    row: PullRequestRow,
    reviewers: Vec<String>,
) -> Result<PullRequest, StoreError> {
    let key = row.pull_request_id.clone();
    let assigned_reviewers = reviewers
        .into_iter()
        .map(user_id_from_db)
        .collect::<Result<Vec<_>, _>>()?;
    PullRequest::restore(PullRequestParts {
        id: PullRequestId::new(row.pull_request_id).map_err(|err| corrupt("pull request", &key, err))?,
        name: PullRequestName::new(row.pull_request_name)
            .map_err(|err| corrupt("pull request", &key, err))?,
        author_id: user_id_from_db(row.author_id)?,
        status: row
            .status
            .parse()
            .map_err(|err| corrupt("pull request", &key, err))?,
        assigned_reviewers,
        created_at: row.created_at,
        merged_at: row.merged_at,
        version: version_from_db(row.version),
    })
    .map_err(|err| corrupt("pull request", &key, err))
}

/// Group `(pull_request_id, user_id)` pairs, already in assignment order.
pub(super) fn group_reviewers(pairs: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (pull_request_id, user_id) in pairs {
        grouped.entry(pull_request_id).or_default().push(user_id);
    }
    grouped
}
