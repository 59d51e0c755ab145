//! Read models for review statistics.

use chrono::{DateTime, Utc};

use super::{TeamName, UserId, Username};

/// Review statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    /// User identifier.
    pub user_id: UserId,
    /// Handle.
    pub username: Username,
    /// Current team.
    pub team_name: TeamName,
    /// Assignment edges on open pull requests.
    pub open_reviews: u64,
    /// Assignment edges on any pull request.
    pub total_reviews: u64,
    /// Times the user was picked as a reviewer.
    pub assignment_count: u64,
    /// Most recent pick, if any.
    pub last_assigned_at: Option<DateTime<Utc>>,
}

/// Aggregate statistics for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStats {
    /// Team name.
    pub team_name: TeamName,
    /// Members, active or not.
    pub total_members: u64,
    /// Members in review rotation.
    pub active_members: u64,
    /// Pull requests authored by members.
    pub total_prs: u64,
    /// Open pull requests authored by members.
    pub open_prs: u64,
    /// Assignment edges on open pull requests held by members.
    pub open_reviews: u64,
}
