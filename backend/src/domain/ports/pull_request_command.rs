//! Driving port for the pull request lifecycle.
//!
//! HTTP handlers call [`PullRequestCommand`] to create, merge and reassign
//! pull requests. Each call runs as one atomic transaction: callers observe
//! either the full effect or none of it.

use async_trait::async_trait;

use crate::domain::{Error, PullRequest, PullRequestId, PullRequestName, UserId};

/// Request to open a pull request and pick its reviewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    /// Identifier chosen by the caller.
    pub id: PullRequestId,
    /// Title.
    pub name: PullRequestName,
    /// Author; must be an existing user.
    pub author_id: UserId,
}

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// Pull request with its updated reviewer list.
    pub pull_request: PullRequest,
    /// Reviewer chosen to take over from the departing one.
    pub replaced_by: UserId,
}

/// Driving port for pull request lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestCommand: Send + Sync {
    /// Open a pull request and assign up to two least-loaded reviewers from
    /// the author's team.
    ///
    /// # Errors
    ///
    /// `not_found` when the author does not exist, `pr_exists` when the id is
    /// taken.
    async fn create(&self, request: CreatePullRequest) -> Result<PullRequest, Error>;

    /// Merge the pull request. Merging an already merged pull request
    /// returns it unchanged.
    ///
    /// # Errors
    ///
    /// `not_found` when the pull request does not exist.
    async fn merge(&self, id: &PullRequestId) -> Result<PullRequest, Error>;

    /// Hand `old_reviewer`'s review to the least-loaded eligible teammate.
    ///
    /// # Errors
    ///
    /// `pr_merged`, `not_assigned`, `no_candidate` or `not_found`.
    async fn reassign(
        &self,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error>;
}
