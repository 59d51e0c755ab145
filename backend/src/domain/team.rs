//! Team aggregate and the payload used to create one.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{TeamName, User, UserId, Username};

/// Validation errors raised while assembling a [`NewTeam`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TeamValidationError {
    /// The same user id appears more than once in the member list.
    #[error("user {id} is listed more than once")]
    DuplicateMember {
        /// Offending user id.
        id: String,
    },
}

/// Member entry supplied when creating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    /// User identifier.
    pub id: UserId,
    /// Human-readable handle.
    pub username: Username,
    /// Whether the member takes part in review rotation.
    pub is_active: bool,
}

/// Validated request to create a team together with its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    name: TeamName,
    members: Vec<TeamMember>,
}

impl NewTeam {
    /// Validate the member list and build the request.
    ///
    /// # Examples
    /// ```
    /// use reviewer_service::domain::{NewTeam, TeamMember, TeamName, UserId, Username};
    ///
    /// let member = TeamMember {
    ///     id: UserId::new("u1").expect("id"),
    ///     username: Username::new("alice").expect("username"),
    ///     is_active: true,
    /// };
    /// let team = NewTeam::try_new(TeamName::new("backend").expect("team"), vec![member])
    ///     .expect("valid team");
    /// assert_eq!(team.members().len(), 1);
    /// ```
    pub fn try_new(name: TeamName, members: Vec<TeamMember>) -> Result<Self, TeamValidationError> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(&member.id) {
                return Err(TeamValidationError::DuplicateMember {
                    id: member.id.to_string(),
                });
            }
        }
        Ok(Self { name, members })
    }

    /// Team name.
    pub fn name(&self) -> &TeamName {
        &self.name
    }

    /// Members to create or move into the team.
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// Members as users belonging to this team.
    pub fn users(&self) -> Vec<User> {
        self.members
            .iter()
            .map(|member| {
                User::new(
                    member.id.clone(),
                    member.username.clone(),
                    self.name.clone(),
                    member.is_active,
                )
            })
            .collect()
    }
}

/// Persisted team with its roster.
///
/// The roster is derived from users whose `team_name` matches; it is ordered
/// by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Team name.
    pub name: TeamName,
    /// Members ordered by username.
    pub members: Vec<User>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
