//! Workload snapshots used to rank reviewer candidates.

use std::collections::HashMap;

use crate::domain::ports::{StatsStore, StoreError};
use crate::domain::{User, UserId};

/// Open-review counts for a fixed set of candidates.
///
/// Candidates missing from the snapshot count as having no open reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    counts: HashMap<UserId, u64>,
}

impl Workload {
    /// Build a snapshot from `(user, open reviews)` pairs.
    ///
    /// # Examples
    /// ```
    /// use reviewer_service::domain::UserId;
    /// use reviewer_service::domain::review_assignment::Workload;
    ///
    /// let alice = UserId::new("alice").expect("id");
    /// let workload = Workload::from_counts([(alice.clone(), 3)]);
    /// assert_eq!(workload.open_reviews(&alice), 3);
    /// assert_eq!(workload.open_reviews(&UserId::new("bob").expect("id")), 0);
    /// ```
    pub fn from_counts(counts: impl IntoIterator<Item = (UserId, u64)>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    /// Open reviews held by `user`.
    pub fn open_reviews(&self, user: &UserId) -> u64 {
        self.counts.get(user).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Reads workload through the caller's transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkloadOracle;

impl WorkloadOracle {
    /// Snapshot covering exactly `candidates`, zero-filled.
    pub async fn snapshot(
        stats: &mut dyn StatsStore,
        candidates: &[User],
    ) -> Result<Workload, StoreError> {
        if candidates.is_empty() {
            return Ok(Workload::default());
        }
        let ids: Vec<UserId> = candidates.iter().map(|user| user.id().clone()).collect();
        let counts = stats.open_review_counts(&ids).await?;
        Ok(Workload::from_counts(ids.into_iter().map(|id| {
            let open = counts.get(&id).copied().unwrap_or(0);
            (id, open)
        })))
    }
}
