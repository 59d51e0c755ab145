//! In-memory implementation of the review store.
//!
//! Used when no database is configured and throughout the unit tests. A
//! transaction takes an exclusive lock on the whole state and works on a
//! private copy; commit swaps the copy in, rollback (or drop) discards it.
//! Transactions are therefore fully serialised, which satisfies the row-lock
//! contract of [`PullRequestStore::lock_pull_request`] trivially.

mod state;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ports::{
    PullRequestStore, ReviewCounts, ReviewStore, ReviewTransaction, StatsStore, StoreError,
    TeamStore, UserStore,
};
use crate::domain::{
    PullRequest, PullRequestId, Team, TeamName, TeamStats, User, UserId, UserStats,
};

use self::state::{MemoryState, PullRequestRow};

/// Review store keeping every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReviewStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryReviewStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

/// Transaction over a private copy of the store state.
struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl ReviewTransaction for MemoryTransaction {
    fn users(&mut self) -> &mut dyn UserStore {
        self
    }

    fn teams(&mut self) -> &mut dyn TeamStore {
        self
    }

    fn pull_requests(&mut self) -> &mut dyn PullRequestStore {
        self
    }

    fn stats(&mut self) -> &mut dyn StatsStore {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryTransaction {
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError> {
        if !self.working.teams.contains_key(user.team_name()) {
            return Err(StoreError::missing(format!(
                "team {} not found",
                user.team_name()
            )));
        }
        self.working.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn set_active(
        &mut self,
        id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, StoreError> {
        let Some(user) = self.working.users.remove(id) else {
            return Ok(None);
        };
        let updated = user.with_active(is_active);
        self.working.users.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }

    async fn team_members(&mut self, team: &TeamName) -> Result<Vec<User>, StoreError> {
        Ok(self.working.members_of(team))
    }

    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        excluded: &UserId,
    ) -> Result<Vec<User>, StoreError> {
        Ok(self
            .working
            .members_of(team)
            .into_iter()
            .filter(|user| user.is_active() && user.id() != excluded)
            .collect())
    }
}

#[async_trait]
impl TeamStore for MemoryTransaction {
    async fn team_exists(&mut self, name: &TeamName) -> Result<bool, StoreError> {
        Ok(self.working.teams.contains_key(name))
    }

    async fn insert_team(
        &mut self,
        name: &TeamName,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.working.teams.contains_key(name) {
            return Err(StoreError::team_exists(name.as_str()));
        }
        self.working.teams.insert(name.clone(), created_at);
        Ok(())
    }

    async fn find_team(&mut self, name: &TeamName) -> Result<Option<Team>, StoreError> {
        Ok(self.working.teams.get(name).map(|created_at| Team {
            name: name.clone(),
            members: self.working.members_of(name),
            created_at: *created_at,
        }))
    }
}

#[async_trait]
impl PullRequestStore for MemoryTransaction {
    async fn insert_pull_request(&mut self, pull_request: &PullRequest) -> Result<(), StoreError> {
        if self.working.pull_requests.contains_key(pull_request.id()) {
            return Err(StoreError::pull_request_exists(pull_request.id().as_str()));
        }
        if !self.working.users.contains_key(pull_request.author_id()) {
            return Err(StoreError::unknown_user(pull_request.author_id().as_str()));
        }
        self.working.pull_requests.insert(
            pull_request.id().clone(),
            PullRequestRow::from_domain(pull_request),
        );
        Ok(())
    }

    async fn update_pull_request(
        &mut self,
        pull_request: &PullRequest,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let Some(row) = self.working.pull_requests.get_mut(pull_request.id()) else {
            return Err(StoreError::missing(format!(
                "pull request {} not found",
                pull_request.id()
            )));
        };
        if row.version != expected_version {
            return Err(StoreError::version_conflict(expected_version, row.version));
        }
        *row = PullRequestRow::from_domain(pull_request);
        Ok(())
    }

    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequest>, StoreError> {
        self.working
            .pull_requests
            .get(id)
            .map(|row| self.working.assemble(row))
            .transpose()
    }

    async fn insert_assignment_edges(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewers: &[UserId],
        _assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if !self.working.pull_requests.contains_key(pull_request_id) {
            return Err(StoreError::missing(format!(
                "pull request {pull_request_id} not found"
            )));
        }
        for reviewer in reviewers {
            if !self.working.users.contains_key(reviewer) {
                return Err(StoreError::unknown_user(reviewer.as_str()));
            }
            if self.working.edge_position(pull_request_id, reviewer).is_none() {
                self.working.push_edge(pull_request_id, reviewer);
            }
        }
        Ok(())
    }

    async fn replace_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        _assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if !self.working.users.contains_key(new) {
            return Err(StoreError::unknown_user(new.as_str()));
        }
        if self.working.edge_position(pull_request_id, new).is_some() {
            return Err(StoreError::query(format!(
                "user {new} is already assigned to pull request {pull_request_id}"
            )));
        }
        let position = self
            .working
            .edge_position(pull_request_id, old)
            .ok_or_else(|| StoreError::not_assigned(pull_request_id.as_str(), old.as_str()))?;
        if let Some(edge) = self.working.edges.get_mut(position) {
            edge.user_id = new.clone();
        }
        Ok(())
    }

    async fn remove_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError> {
        match self.working.edge_position(pull_request_id, reviewer) {
            Some(position) => {
                self.working.edges.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn is_assigned(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .edge_position(pull_request_id, reviewer)
            .is_some())
    }

    async fn reviewed_by(&mut self, reviewer: &UserId) -> Result<Vec<PullRequest>, StoreError> {
        let mut rows: Vec<&PullRequestRow> = self
            .working
            .edges
            .iter()
            .filter(|edge| &edge.user_id == reviewer)
            .filter_map(|edge| self.working.pull_requests.get(&edge.pull_request_id))
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        rows.into_iter()
            .map(|row| self.working.assemble(row))
            .collect()
    }
}

#[async_trait]
impl StatsStore for MemoryTransaction {
    async fn open_review_counts(&mut self, users: &[UserId]) -> Result<ReviewCounts, StoreError> {
        Ok(users
            .iter()
            .map(|user| (user.clone(), self.working.open_reviews_of(user)))
            .filter(|(_, count)| *count > 0)
            .collect())
    }

    async fn increment_assignment_counter(
        &mut self,
        user: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if !self.working.users.contains_key(user) {
            return Err(StoreError::unknown_user(user.as_str()));
        }
        let counter = self.working.counters.entry(user.clone()).or_default();
        counter.assignment_count += 1;
        counter.last_assigned_at = Some(assigned_at);
        Ok(())
    }

    async fn user_stats(&mut self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
        let Some(found) = self.working.users.get(user) else {
            return Ok(None);
        };
        let counter = self.working.counters.get(user).cloned().unwrap_or_default();
        let total_reviews = self
            .working
            .edges
            .iter()
            .filter(|edge| &edge.user_id == user)
            .count() as u64;
        Ok(Some(UserStats {
            user_id: found.id().clone(),
            username: found.username().clone(),
            team_name: found.team_name().clone(),
            open_reviews: self.working.open_reviews_of(user),
            total_reviews,
            assignment_count: counter.assignment_count,
            last_assigned_at: counter.last_assigned_at,
        }))
    }

    async fn team_stats(&mut self, team: &TeamName) -> Result<Option<TeamStats>, StoreError> {
        if !self.working.teams.contains_key(team) {
            return Ok(None);
        }
        let members = self.working.members_of(team);
        let is_member = |id: &UserId| members.iter().any(|member| member.id() == id);
        let authored: Vec<&PullRequestRow> = self
            .working
            .pull_requests
            .values()
            .filter(|row| is_member(&row.author_id))
            .collect();
        let open_reviews = members
            .iter()
            .map(|member| self.working.open_reviews_of(member.id()))
            .sum();
        Ok(Some(TeamStats {
            team_name: team.clone(),
            total_members: members.len() as u64,
            active_members: members.iter().filter(|member| member.is_active()).count() as u64,
            total_prs: authored.len() as u64,
            open_prs: authored.iter().filter(|row| row.is_open()).count() as u64,
            open_reviews,
        }))
    }
}
