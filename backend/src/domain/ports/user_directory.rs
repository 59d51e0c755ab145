//! Driving port for user activity and review listings.

use async_trait::async_trait;

use crate::domain::{Error, PullRequest, User, UserId, UserStats};

/// User-facing operations outside the pull request lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Toggle whether the user takes part in review rotation.
    ///
    /// Existing assignments are left as they are.
    ///
    /// # Errors
    ///
    /// `not_found` when the user does not exist.
    async fn set_is_active(&self, id: &UserId, is_active: bool) -> Result<User, Error>;

    /// Pull requests the user currently reviews, newest first.
    ///
    /// # Errors
    ///
    /// `not_found` when the user does not exist.
    async fn reviews(&self, id: &UserId) -> Result<Vec<PullRequest>, Error>;

    /// Review statistics for the user.
    ///
    /// # Errors
    ///
    /// `not_found` when the user does not exist.
    async fn user_stats(&self, id: &UserId) -> Result<UserStats, Error>;
}
