//! Team member eligible to author and review pull requests.

use super::{TeamName, UserId, Username};

/// Team member.
///
/// ## Invariants
/// - A user belongs to exactly one team at a time.
/// - Users are never deleted; leaving review rotation is modelled by
///   clearing `is_active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    team_name: TeamName,
    is_active: bool,
}

impl User {
    /// Build a user from validated parts.
    ///
    /// # Examples
    /// ```
    /// use reviewer_service::domain::{TeamName, User, UserId, Username};
    ///
    /// let user = User::new(
    ///     UserId::new("u1").expect("id"),
    ///     Username::new("alice").expect("username"),
    ///     TeamName::new("backend").expect("team"),
    ///     true,
    /// );
    /// assert!(user.is_active());
    /// ```
    pub fn new(id: UserId, username: Username, team_name: TeamName, is_active: bool) -> Self {
        Self {
            id,
            username,
            team_name,
            is_active,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Human-readable handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Team the user currently belongs to.
    pub fn team_name(&self) -> &TeamName {
        &self.team_name
    }

    /// Whether the user currently takes part in review rotation.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Return a copy with the activity flag replaced.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}
