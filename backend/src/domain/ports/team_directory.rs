//! Driving port for team management.

use async_trait::async_trait;

use crate::domain::{Error, NewTeam, Team, TeamName, TeamStats};

/// Team creation and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Create the team and upsert its members in one transaction.
    ///
    /// # Errors
    ///
    /// `team_exists` when the name is taken.
    async fn create_team(&self, team: NewTeam) -> Result<Team, Error>;

    /// Fetch a team with its roster.
    ///
    /// # Errors
    ///
    /// `not_found` when the team does not exist.
    async fn team(&self, name: &TeamName) -> Result<Team, Error>;

    /// Aggregate review statistics for the team.
    ///
    /// # Errors
    ///
    /// `not_found` when the team does not exist.
    async fn team_stats(&self, name: &TeamName) -> Result<TeamStats, Error>;
}
