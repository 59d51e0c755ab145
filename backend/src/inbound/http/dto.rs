//! Response payloads shared by the review HTTP handlers.
//!
//! Field names are snake_case; timestamps are RFC 3339 strings.

use serde::{Deserialize, Serialize};

use crate::domain::{PullRequest, Team, TeamStats, User, UserStats};

/// Team member as returned inside a team payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberResponse {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// Team with its roster ordered by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team_name: String,
    pub members: Vec<TeamMemberResponse>,
}

impl From<Team> for TeamResponse {
    fn from(value: Team) -> Self {
        Self {
            team_name: value.name.to_string(),
            members: value
                .members
                .iter()
                .map(|member| TeamMemberResponse {
                    user_id: member.id().to_string(),
                    username: member.username().to_string(),
                    is_active: member.is_active(),
                })
                .collect(),
        }
    }
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            user_id: value.id().to_string(),
            username: value.username().to_string(),
            team_name: value.team_name().to_string(),
            is_active: value.is_active(),
        }
    }
}

/// Full pull request view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub assigned_reviewers: Vec<String>,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub version: u32,
}

impl From<PullRequest> for PullRequestResponse {
    fn from(value: PullRequest) -> Self {
        Self {
            pull_request_id: value.id().to_string(),
            pull_request_name: value.name().to_string(),
            author_id: value.author_id().to_string(),
            status: value.status().to_string(),
            assigned_reviewers: value
                .assigned_reviewers()
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: value.created_at().to_rfc3339(),
            merged_at: value.merged_at().map(|at| at.to_rfc3339()),
            version: value.version(),
        }
    }
}

/// Compact pull request view used in review listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShortResponse {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

impl From<PullRequest> for PullRequestShortResponse {
    fn from(value: PullRequest) -> Self {
        Self {
            pull_request_id: value.id().to_string(),
            pull_request_name: value.name().to_string(),
            author_id: value.author_id().to_string(),
            status: value.status().to_string(),
        }
    }
}

/// Review statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub open_reviews: u64,
    pub total_reviews: u64,
    pub assignment_count: u64,
    pub last_assigned_at: Option<String>,
}

impl From<UserStats> for UserStatsResponse {
    fn from(value: UserStats) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            username: value.username.to_string(),
            team_name: value.team_name.to_string(),
            open_reviews: value.open_reviews,
            total_reviews: value.total_reviews,
            assignment_count: value.assignment_count,
            last_assigned_at: value.last_assigned_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Aggregate statistics for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatsResponse {
    pub team_name: String,
    pub total_members: u64,
    pub active_members: u64,
    pub total_prs: u64,
    pub open_prs: u64,
    pub open_reviews: u64,
}

impl From<TeamStats> for TeamStatsResponse {
    fn from(value: TeamStats) -> Self {
        Self {
            team_name: value.team_name.to_string(),
            total_members: value.total_members,
            active_members: value.active_members,
            total_prs: value.total_prs,
            open_prs: value.open_prs,
            open_reviews: value.open_reviews,
        }
    }
}
