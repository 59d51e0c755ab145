//! Snapshot of every table held by the in-memory store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::ports::StoreError;
use crate::domain::{
    PullRequest, PullRequestId, PullRequestName, PullRequestParts, PullRequestStatus, TeamName,
    User, UserId,
};

/// Pull request row without its reviewers; those live in `edges`.
#[derive(Debug, Clone)]
pub(super) struct PullRequestRow {
    pub(super) id: PullRequestId,
    pub(super) name: PullRequestName,
    pub(super) author_id: UserId,
    pub(super) status: PullRequestStatus,
    pub(super) created_at: DateTime<Utc>,
    pub(super) merged_at: Option<DateTime<Utc>>,
    pub(super) version: u32,
}

impl PullRequestRow {
    pub(super) fn from_domain(pull_request: &PullRequest) -> Self {
        Self {
            id: pull_request.id().clone(),
            name: pull_request.name().clone(),
            author_id: pull_request.author_id().clone(),
            status: pull_request.status(),
            created_at: pull_request.created_at(),
            merged_at: pull_request.merged_at(),
            version: pull_request.version(),
        }
    }

    pub(super) fn is_open(&self) -> bool {
        self.status == PullRequestStatus::Open
    }
}

/// Assignment edge; `seq` preserves assignment order.
///
/// Assignment timestamps are only persisted by the Diesel adapter.
#[derive(Debug, Clone)]
pub(super) struct EdgeRow {
    pub(super) seq: u64,
    pub(super) pull_request_id: PullRequestId,
    pub(super) user_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub(super) struct CounterRow {
    pub(super) assignment_count: u64,
    pub(super) last_assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub(super) struct MemoryState {
    pub(super) teams: BTreeMap<TeamName, DateTime<Utc>>,
    pub(super) users: BTreeMap<UserId, User>,
    pub(super) pull_requests: BTreeMap<PullRequestId, PullRequestRow>,
    pub(super) edges: Vec<EdgeRow>,
    pub(super) next_edge_seq: u64,
    pub(super) counters: HashMap<UserId, CounterRow>,
}

impl MemoryState {
    pub(super) fn members_of(&self, team: &TeamName) -> Vec<User> {
        let mut members: Vec<User> = self
            .users
            .values()
            .filter(|user| user.team_name() == team)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.username()
                .cmp(b.username())
                .then_with(|| a.id().cmp(b.id()))
        });
        members
    }

    pub(super) fn edge_position(&self, pull_request_id: &PullRequestId, user: &UserId) -> Option<usize> {
        self.edges
            .iter()
            .position(|edge| &edge.pull_request_id == pull_request_id && &edge.user_id == user)
    }

    pub(super) fn push_edge(&mut self, pull_request_id: &PullRequestId, user_id: &UserId) {
        self.next_edge_seq += 1;
        self.edges.push(EdgeRow {
            seq: self.next_edge_seq,
            pull_request_id: pull_request_id.clone(),
            user_id: user_id.clone(),
        });
    }

    pub(super) fn reviewers_of(&self, pull_request_id: &PullRequestId) -> Vec<UserId> {
        let mut edges: Vec<&EdgeRow> = self
            .edges
            .iter()
            .filter(|edge| &edge.pull_request_id == pull_request_id)
            .collect();
        edges.sort_by_key(|edge| edge.seq);
        edges.into_iter().map(|edge| edge.user_id.clone()).collect()
    }

    pub(super) fn assemble(&self, row: &PullRequestRow) -> Result<PullRequest, StoreError> {
        PullRequest::restore(PullRequestParts {
            id: row.id.clone(),
            name: row.name.clone(),
            author_id: row.author_id.clone(),
            status: row.status,
            assigned_reviewers: self.reviewers_of(&row.id),
            created_at: row.created_at,
            merged_at: row.merged_at,
            version: row.version,
        })
        .map_err(|err| StoreError::query(format!("stored pull request {} is invalid: {err}", row.id)))
    }

    pub(super) fn is_open(&self, pull_request_id: &PullRequestId) -> bool {
        self.pull_requests
            .get(pull_request_id)
            .is_some_and(PullRequestRow::is_open)
    }

    pub(super) fn open_reviews_of(&self, user: &UserId) -> u64 {
        self.edges
            .iter()
            .filter(|edge| &edge.user_id == user && self.is_open(&edge.pull_request_id))
            .count() as u64
    }
}
