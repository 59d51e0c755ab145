//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{assignment_stats, pr_reviewers, pull_requests, teams, users};

/// Row read from `teams`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamRow {
    pub team_name: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable team record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teams)]
pub(crate) struct NewTeamRow<'a> {
    pub team_name: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

/// Insertable user record; conflicts overwrite from `excluded`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub team_name: &'a str,
    pub is_active: bool,
}

/// Row read from `pull_requests`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pull_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Insertable pull request record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pull_requests)]
pub(crate) struct NewPullRequestRow<'a> {
    pub pull_request_id: &'a str,
    pub pull_request_name: &'a str,
    pub author_id: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Changeset applied by version-checked updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = pull_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PullRequestUpdate<'a> {
    pub pull_request_name: &'a str,
    pub status: &'a str,
    pub merged_at: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Insertable assignment edge.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pr_reviewers)]
pub(crate) struct NewReviewerRow<'a> {
    pub pull_request_id: &'a str,
    pub user_id: &'a str,
    pub assigned_at: DateTime<Utc>,
}

/// Row read from `assignment_stats`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignment_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentStatsRow {
    pub assignment_count: i64,
    pub last_assigned_at: Option<DateTime<Utc>>,
}

/// Insertable first assignment for a user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignment_stats)]
pub(crate) struct NewAssignmentStatsRow<'a> {
    pub user_id: &'a str,
    pub assignment_count: i64,
    pub last_assigned_at: Option<DateTime<Utc>>,
}
