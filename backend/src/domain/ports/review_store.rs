//! Transactional store port backing the review domain.
//!
//! A [`ReviewStore`] opens transactions. Each [`ReviewTransaction`] is a
//! capability bundle: one handle exposing entity sub-stores for users, teams,
//! pull requests and statistics, all reading and writing through the same
//! transaction. Every call receives the handle explicitly; there is no
//! ambient transaction state.
//!
//! Dropping a transaction without calling [`ReviewTransaction::commit`]
//! discards its writes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    PullRequest, PullRequestId, Team, TeamName, TeamStats, User, UserId, UserStats,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review store adapters.
    pub enum StoreError {
        /// The store could not be reached or the transaction broke.
        Connection { message: String } =>
            "review store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "review store query failed: {message}",
        /// Unique key violation on the pull request id.
        PullRequestExists { id: String } =>
            "pull request {id} already exists",
        /// Unique key violation on the team name.
        TeamExists { name: String } =>
            "team {name} already exists",
        /// A foreign key referenced a user that does not exist.
        UnknownUser { id: String } =>
            "user {id} does not exist",
        /// The row targeted by an update does not exist.
        Missing { message: String } =>
            "{message}",
        /// Optimistic concurrency check failed.
        VersionConflict { expected: u32, actual: u32 } =>
            "version mismatch: expected {expected}, found {actual}",
        /// The assignment edge to replace or remove does not exist.
        NotAssigned { pull_request_id: String, user_id: String } =>
            "user {user_id} is not assigned to pull request {pull_request_id}",
    }
}

/// Open-review counts keyed by user id.
pub type ReviewCounts = HashMap<UserId, u64>;

/// Opens transactions against the backing store.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Begin a read-committed transaction.
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, StoreError>;
}

/// One open transaction exposing every entity sub-store.
#[async_trait]
pub trait ReviewTransaction: Send {
    /// User records.
    fn users(&mut self) -> &mut dyn UserStore;

    /// Team records.
    fn teams(&mut self) -> &mut dyn TeamStore;

    /// Pull requests and their assignment edges.
    fn pull_requests(&mut self) -> &mut dyn PullRequestStore;

    /// Workload and assignment statistics.
    fn stats(&mut self) -> &mut dyn StatsStore;

    /// Make every write visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every write.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// User access within a transaction.
#[async_trait]
pub trait UserStore: Send {
    /// Fetch one user.
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Insert a user or overwrite username, team and activity of an existing one.
    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError>;

    /// Set the activity flag, returning the updated user when it exists.
    async fn set_active(&mut self, id: &UserId, is_active: bool)
    -> Result<Option<User>, StoreError>;

    /// All members of `team`, ordered by username.
    async fn team_members(&mut self, team: &TeamName) -> Result<Vec<User>, StoreError>;

    /// Active members of `team` other than `excluded`, ordered by username.
    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        excluded: &UserId,
    ) -> Result<Vec<User>, StoreError>;
}

/// Team access within a transaction.
#[async_trait]
pub trait TeamStore: Send {
    /// Whether a team row exists.
    async fn team_exists(&mut self, name: &TeamName) -> Result<bool, StoreError>;

    /// Insert the team row; fails with [`StoreError::TeamExists`] on conflict.
    async fn insert_team(
        &mut self,
        name: &TeamName,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Fetch a team with its roster ordered by username.
    async fn find_team(&mut self, name: &TeamName) -> Result<Option<Team>, StoreError>;
}

/// Pull request and assignment edge access within a transaction.
#[async_trait]
pub trait PullRequestStore: Send {
    /// Insert the pull request row (reviewers are written as edges separately).
    ///
    /// Fails with [`StoreError::PullRequestExists`] on a duplicate id and
    /// [`StoreError::UnknownUser`] when the author does not exist.
    async fn insert_pull_request(&mut self, pull_request: &PullRequest) -> Result<(), StoreError>;

    /// Persist name, status, `merged_at` and version of `pull_request`,
    /// provided the stored version still equals `expected_version`.
    ///
    /// Fails with [`StoreError::VersionConflict`] on a stale version and
    /// [`StoreError::Missing`] when the row does not exist.
    async fn update_pull_request(
        &mut self,
        pull_request: &PullRequest,
        expected_version: u32,
    ) -> Result<(), StoreError>;

    /// Take an exclusive row lock held until the transaction ends, then read
    /// the pull request with its reviewers.
    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequest>, StoreError>;

    /// Add assignment edges; edges that already exist are left untouched.
    async fn insert_assignment_edges(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewers: &[UserId],
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Replace the `old` edge with one for `new` in a single indivisible step.
    ///
    /// Fails with [`StoreError::NotAssigned`] (writing nothing) when `old` is
    /// not assigned.
    async fn replace_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Delete one edge, returning whether it existed.
    async fn remove_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError>;

    /// Whether an edge links `reviewer` to the pull request.
    async fn is_assigned(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError>;

    /// Pull requests `reviewer` has an edge on, newest first.
    async fn reviewed_by(&mut self, reviewer: &UserId) -> Result<Vec<PullRequest>, StoreError>;
}

/// Workload and statistics access within a transaction.
#[async_trait]
pub trait StatsStore: Send {
    /// Count of OPEN pull requests each user reviews.
    ///
    /// Users without open reviews may be absent from the result.
    async fn open_review_counts(&mut self, users: &[UserId]) -> Result<ReviewCounts, StoreError>;

    /// Bump the user's assignment counter and stamp `last_assigned_at`.
    async fn increment_assignment_counter(
        &mut self,
        user: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Statistics for one user.
    async fn user_stats(&mut self, user: &UserId) -> Result<Option<UserStats>, StoreError>;

    /// Statistics for one team.
    async fn team_stats(&mut self, team: &TeamName) -> Result<Option<TeamStats>, StoreError>;
}
