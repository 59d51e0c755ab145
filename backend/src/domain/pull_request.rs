//! Pull request aggregate and its OPEN → MERGED lifecycle.
//!
//! ## Invariants
//! - `assigned_reviewers` never contains the author and has no duplicates.
//! - `status` only moves from `Open` to `Merged`; `merged_at` is set exactly
//!   once, on that transition.
//! - `version` starts at [`INITIAL_VERSION`] and grows by one on every
//!   mutating update of the pull request row.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PullRequestId, PullRequestName, UserId};

/// Version assigned to a freshly created pull request.
pub const INITIAL_VERSION: u32 = 1;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    /// Awaiting review; reviewers may be reassigned.
    Open,
    /// Terminal state.
    Merged,
}

impl PullRequestStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullRequestStatus {
    type Err = PullRequestValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(PullRequestValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Invariant violations detected on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PullRequestValidationError {
    /// The author was listed as one of the reviewers.
    #[error("author {id} cannot review their own pull request")]
    SelfReview {
        /// Author id.
        id: String,
    },
    /// A reviewer appears more than once.
    #[error("reviewer {id} is assigned more than once")]
    DuplicateReviewer {
        /// Duplicated reviewer id.
        id: String,
    },
    /// The reviewer to replace is not assigned.
    #[error("reviewer {id} is not assigned")]
    ReviewerNotAssigned {
        /// Missing reviewer id.
        id: String,
    },
    /// Status and `merged_at` disagree.
    #[error("merged_at must be set if and only if the pull request is merged")]
    MergedAtMismatch,
    /// Version is below [`INITIAL_VERSION`].
    #[error("version must be at least {INITIAL_VERSION}")]
    InvalidVersion,
    /// Stored status text is not recognised.
    #[error("unknown pull request status {value}")]
    UnknownStatus {
        /// Raw status value.
        value: String,
    },
}

/// Raw fields used to rebuild a [`PullRequest`] read back from storage.
#[derive(Debug, Clone)]
pub struct PullRequestParts {
    /// Identifier.
    pub id: PullRequestId,
    /// Title.
    pub name: PullRequestName,
    /// Author.
    pub author_id: UserId,
    /// Lifecycle state.
    pub status: PullRequestStatus,
    /// Reviewers in assignment order.
    pub assigned_reviewers: Vec<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token.
    pub version: u32,
}

/// Pull request with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    id: PullRequestId,
    name: PullRequestName,
    author_id: UserId,
    status: PullRequestStatus,
    assigned_reviewers: Vec<UserId>,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    version: u32,
}

fn ensure_reviewers(
    author_id: &UserId,
    reviewers: &[UserId],
) -> Result<(), PullRequestValidationError> {
    for (index, reviewer) in reviewers.iter().enumerate() {
        if reviewer == author_id {
            return Err(PullRequestValidationError::SelfReview {
                id: reviewer.to_string(),
            });
        }
        if reviewers.iter().take(index).any(|earlier| earlier == reviewer) {
            return Err(PullRequestValidationError::DuplicateReviewer {
                id: reviewer.to_string(),
            });
        }
    }
    Ok(())
}

impl PullRequest {
    /// Start a new open pull request without reviewers.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use reviewer_service::domain::{
    ///     PullRequest, PullRequestId, PullRequestName, PullRequestStatus, UserId,
    /// };
    ///
    /// let pr = PullRequest::open(
    ///     PullRequestId::new("pr-1").expect("id"),
    ///     PullRequestName::new("Add login").expect("name"),
    ///     UserId::new("u1").expect("author"),
    ///     Utc::now(),
    /// );
    /// assert_eq!(pr.status(), PullRequestStatus::Open);
    /// assert_eq!(pr.version(), 1);
    /// ```
    pub fn open(
        id: PullRequestId,
        name: PullRequestName,
        author_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: Vec::new(),
            created_at,
            merged_at: None,
            version: INITIAL_VERSION,
        }
    }

    /// Rebuild a pull request from stored fields, checking every invariant.
    pub fn restore(parts: PullRequestParts) -> Result<Self, PullRequestValidationError> {
        let PullRequestParts {
            id,
            name,
            author_id,
            status,
            assigned_reviewers,
            created_at,
            merged_at,
            version,
        } = parts;

        ensure_reviewers(&author_id, &assigned_reviewers)?;
        if (status == PullRequestStatus::Merged) != merged_at.is_some() {
            return Err(PullRequestValidationError::MergedAtMismatch);
        }
        if version < INITIAL_VERSION {
            return Err(PullRequestValidationError::InvalidVersion);
        }

        Ok(Self {
            id,
            name,
            author_id,
            status,
            assigned_reviewers,
            created_at,
            merged_at,
            version,
        })
    }

    /// Identifier.
    pub fn id(&self) -> &PullRequestId {
        &self.id
    }

    /// Title.
    pub fn name(&self) -> &PullRequestName {
        &self.name
    }

    /// Author.
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Lifecycle state.
    pub fn status(&self) -> PullRequestStatus {
        self.status
    }

    /// Reviewers in assignment order.
    pub fn assigned_reviewers(&self) -> &[UserId] {
        &self.assigned_reviewers
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Merge timestamp, present once merged.
    pub fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.merged_at
    }

    /// Optimistic concurrency token.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the pull request reached its terminal state.
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    /// Whether `user_id` is currently an assigned reviewer.
    pub fn has_reviewer(&self, user_id: &UserId) -> bool {
        self.assigned_reviewers.contains(user_id)
    }

    /// Record the initial reviewer set.
    pub fn assign_reviewers(
        &mut self,
        reviewers: Vec<UserId>,
    ) -> Result<(), PullRequestValidationError> {
        ensure_reviewers(&self.author_id, &reviewers)?;
        self.assigned_reviewers = reviewers;
        Ok(())
    }

    /// Move to `Merged`, stamping `merged_at` and bumping the version.
    ///
    /// Returns `false` and leaves the pull request untouched when it is
    /// already merged.
    pub fn mark_merged(&mut self, merged_at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(merged_at);
        self.version += 1;
        true
    }

    /// Swap `old` for `new`, keeping `old`'s position in the reviewer list.
    pub fn replace_reviewer(
        &mut self,
        old: &UserId,
        new: UserId,
    ) -> Result<(), PullRequestValidationError> {
        if new == self.author_id {
            return Err(PullRequestValidationError::SelfReview { id: new.to_string() });
        }
        if self.has_reviewer(&new) {
            return Err(PullRequestValidationError::DuplicateReviewer { id: new.to_string() });
        }
        let slot = self
            .assigned_reviewers
            .iter_mut()
            .find(|reviewer| *reviewer == old)
            .ok_or_else(|| PullRequestValidationError::ReviewerNotAssigned { id: old.to_string() })?;
        *slot = new;
        Ok(())
    }

    /// Drop `reviewer` from the list, returning whether it was present.
    pub fn remove_reviewer(&mut self, reviewer: &UserId) -> bool {
        let before = self.assigned_reviewers.len();
        self.assigned_reviewers.retain(|assigned| assigned != reviewer);
        before != self.assigned_reviewers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn user(id: &str) -> UserId {
        UserId::new(id).expect("user id")
    }

    #[fixture]
    fn open_pr() -> PullRequest {
        PullRequest::open(
            PullRequestId::new("pr-1").expect("id"),
            PullRequestName::new("Add login").expect("name"),
            user("author"),
            Utc::now(),
        )
    }

    #[rstest]
    fn assign_rejects_author(mut open_pr: PullRequest) {
        let err = open_pr
            .assign_reviewers(vec![user("u1"), user("author")])
            .expect_err("self review");
        assert!(matches!(err, PullRequestValidationError::SelfReview { .. }));
        assert!(open_pr.assigned_reviewers().is_empty());
    }

    #[rstest]
    fn assign_rejects_duplicates(mut open_pr: PullRequest) {
        let err = open_pr
            .assign_reviewers(vec![user("u1"), user("u1")])
            .expect_err("duplicate");
        assert!(matches!(err, PullRequestValidationError::DuplicateReviewer { .. }));
    }

    #[rstest]
    fn merge_is_one_way_and_bumps_version_once(mut open_pr: PullRequest) {
        let first = Utc::now();
        assert!(open_pr.mark_merged(first));
        assert_eq!(open_pr.version(), INITIAL_VERSION + 1);
        assert_eq!(open_pr.merged_at(), Some(first));

        assert!(!open_pr.mark_merged(Utc::now()));
        assert_eq!(open_pr.version(), INITIAL_VERSION + 1);
        assert_eq!(open_pr.merged_at(), Some(first));
        assert_eq!(open_pr.status(), PullRequestStatus::Merged);
    }

    #[rstest]
    fn replace_keeps_position(mut open_pr: PullRequest) {
        open_pr
            .assign_reviewers(vec![user("u1"), user("u2")])
            .expect("assign");
        open_pr
            .replace_reviewer(&user("u1"), user("u3"))
            .expect("replace");
        assert_eq!(open_pr.assigned_reviewers(), &[user("u3"), user("u2")]);
    }

    #[rstest]
    fn replace_rejects_existing_reviewer(mut open_pr: PullRequest) {
        open_pr
            .assign_reviewers(vec![user("u1"), user("u2")])
            .expect("assign");
        let err = open_pr
            .replace_reviewer(&user("u1"), user("u2"))
            .expect_err("duplicate");
        assert!(matches!(err, PullRequestValidationError::DuplicateReviewer { .. }));
    }

    #[rstest]
    fn replace_requires_old_reviewer(mut open_pr: PullRequest) {
        let err = open_pr
            .replace_reviewer(&user("u9"), user("u3"))
            .expect_err("not assigned");
        assert!(matches!(err, PullRequestValidationError::ReviewerNotAssigned { .. }));
    }

    #[rstest]
    fn restore_rejects_merged_without_timestamp() {
        let parts = PullRequestParts {
            id: PullRequestId::new("pr-2").expect("id"),
            name: PullRequestName::new("x").expect("name"),
            author_id: user("author"),
            status: PullRequestStatus::Merged,
            assigned_reviewers: Vec::new(),
            created_at: Utc::now(),
            merged_at: None,
            version: 2,
        };
        let err = PullRequest::restore(parts).expect_err("inconsistent");
        assert_eq!(err, PullRequestValidationError::MergedAtMismatch);
    }

    #[rstest]
    #[case("OPEN", PullRequestStatus::Open)]
    #[case("MERGED", PullRequestStatus::Merged)]
    fn status_parses_storage_values(#[case] raw: &str, #[case] expected: PullRequestStatus) {
        assert_eq!(raw.parse::<PullRequestStatus>().expect("status"), expected);
        assert_eq!(expected.as_str(), raw);
    }
}
