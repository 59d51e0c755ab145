//! Pull request lifecycle as atomic transactions.
//!
//! Every operation follows the same shape: open a deadline-bound
//! transaction, read what the decision needs through the transaction
//! handle, let [`ReviewerSelector`] decide, write the decision back and
//! commit. Any failure, including an elapsed deadline, rolls the whole
//! transaction back.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    CreatePullRequest, PullRequestCommand, Reassignment, ReviewTransaction,
};
use crate::domain::transaction::{TransactionRunner, map_store_error, store_timestamp};
use crate::domain::{
    Error, PullRequest, PullRequestId, PullRequestValidationError, User, UserId,
};

use super::{RandomSource, ReviewerSelector, WorkloadOracle};

fn invariant_error(error: PullRequestValidationError) -> Error {
    Error::internal(format!("pull request invariant violated: {error}"))
}

/// Service implementing [`PullRequestCommand`] over a transactional store.
#[derive(Clone)]
pub struct AssignmentWorkflow {
    transactions: TransactionRunner,
    selector: ReviewerSelector,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl AssignmentWorkflow {
    /// Build the workflow from its collaborators.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use reviewer_service::domain::review_assignment::{AssignmentWorkflow, EntropyRandom};
    /// # use reviewer_service::domain::transaction::{DEFAULT_TRANSACTION_TIMEOUT, TransactionRunner};
    /// # use reviewer_service::outbound::memory::MemoryReviewStore;
    /// let workflow = AssignmentWorkflow::new(
    ///     TransactionRunner::new(Arc::new(MemoryReviewStore::new()), DEFAULT_TRANSACTION_TIMEOUT),
    ///     Arc::new(EntropyRandom),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = workflow;
    /// ```
    pub fn new(
        transactions: TransactionRunner,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transactions,
            selector: ReviewerSelector,
            random,
            clock,
        }
    }

    async fn find_user(tx: &mut dyn ReviewTransaction, id: &UserId) -> Result<User, Error> {
        tx.users()
            .find_user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn lock_pull_request(
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
    ) -> Result<PullRequest, Error> {
        tx.pull_requests()
            .lock_pull_request(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("pull request {id} not found")))
    }

    async fn create_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        request: CreatePullRequest,
    ) -> Result<PullRequest, Error> {
        let author = Self::find_user(tx, &request.author_id).await?;
        let now = store_timestamp(self.clock.as_ref());

        let mut pull_request = PullRequest::open(request.id, request.name, request.author_id, now);
        tx.pull_requests()
            .insert_pull_request(&pull_request)
            .await
            .map_err(map_store_error)?;

        let candidates = tx
            .users()
            .active_team_members_excluding(author.team_name(), author.id())
            .await
            .map_err(map_store_error)?;
        let workload = WorkloadOracle::snapshot(tx.stats(), &candidates)
            .await
            .map_err(map_store_error)?;
        let reviewers: Vec<UserId> = self
            .selector
            .select(candidates, author.id(), &workload, &mut self.random.rng())
            .into_iter()
            .map(|reviewer| reviewer.id().clone())
            .collect();

        if !reviewers.is_empty() {
            tx.pull_requests()
                .insert_assignment_edges(pull_request.id(), &reviewers, now)
                .await
                .map_err(map_store_error)?;
            for reviewer in &reviewers {
                tx.stats()
                    .increment_assignment_counter(reviewer, now)
                    .await
                    .map_err(map_store_error)?;
            }
        }
        pull_request
            .assign_reviewers(reviewers)
            .map_err(invariant_error)?;

        info!(
            pull_request_id = %pull_request.id(),
            author_id = %pull_request.author_id(),
            reviewers = pull_request.assigned_reviewers().len(),
            "pull request created"
        );
        Ok(pull_request)
    }

    async fn merge_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
    ) -> Result<PullRequest, Error> {
        let mut pull_request = Self::lock_pull_request(tx, id).await?;
        let expected_version = pull_request.version();

        if !pull_request.mark_merged(store_timestamp(self.clock.as_ref())) {
            debug!(pull_request_id = %id, "pull request already merged");
            return Ok(pull_request);
        }
        tx.pull_requests()
            .update_pull_request(&pull_request, expected_version)
            .await
            .map_err(map_store_error)?;

        info!(pull_request_id = %id, version = pull_request.version(), "pull request merged");
        Ok(pull_request)
    }

    async fn reassign_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error> {
        let mut pull_request = Self::lock_pull_request(tx, id).await?;
        if pull_request.is_merged() {
            return Err(Error::pr_merged(format!(
                "pull request {id} is merged; reviewers can no longer change"
            )));
        }
        let assigned = tx
            .pull_requests()
            .is_assigned(id, old_reviewer)
            .await
            .map_err(map_store_error)?;
        if !assigned {
            return Err(Error::not_assigned(format!(
                "user {old_reviewer} is not assigned to pull request {id}"
            )));
        }

        let departing = Self::find_user(tx, old_reviewer).await?;
        let members = tx
            .users()
            .team_members(departing.team_name())
            .await
            .map_err(map_store_error)?;
        let exclude = [old_reviewer.clone(), pull_request.author_id().clone()];
        let eligible = self.selector.eligible_replacements(members, &exclude);
        let workload = WorkloadOracle::snapshot(tx.stats(), &eligible)
            .await
            .map_err(map_store_error)?;
        let replacement = self
            .selector
            .select_replacement(eligible, &workload, &mut self.random.rng())
            .ok_or_else(|| {
                Error::no_candidate(format!(
                    "no active replacement for {old_reviewer} in team {}",
                    departing.team_name()
                ))
            })?;
        let replaced_by = replacement.id().clone();
        let now = store_timestamp(self.clock.as_ref());

        if pull_request.has_reviewer(&replaced_by) {
            let removed = tx
                .pull_requests()
                .remove_assignment_edge(id, old_reviewer)
                .await
                .map_err(map_store_error)?;
            if !removed {
                return Err(Error::not_assigned(format!(
                    "user {old_reviewer} is not assigned to pull request {id}"
                )));
            }
            pull_request.remove_reviewer(old_reviewer);
            info!(
                pull_request_id = %id,
                old_reviewer = %old_reviewer,
                kept = %replaced_by,
                "reviewer removed; replacement already assigned"
            );
        } else {
            tx.pull_requests()
                .replace_assignment_edge(id, old_reviewer, &replaced_by, now)
                .await
                .map_err(map_store_error)?;
            tx.stats()
                .increment_assignment_counter(&replaced_by, now)
                .await
                .map_err(map_store_error)?;
            pull_request
                .replace_reviewer(old_reviewer, replaced_by.clone())
                .map_err(invariant_error)?;
            info!(
                pull_request_id = %id,
                old_reviewer = %old_reviewer,
                new_reviewer = %replaced_by,
                "reviewer reassigned"
            );
        }

        Ok(Reassignment {
            pull_request,
            replaced_by,
        })
    }
}

#[async_trait]
impl PullRequestCommand for AssignmentWorkflow {
    async fn create(&self, request: CreatePullRequest) -> Result<PullRequest, Error> {
        let mut tx = self.transactions.begin("create_pull_request").await?;
        let outcome = tx
            .deadline()
            .run(self.create_in(tx.handle(), request))
            .await;
        tx.finish(outcome).await
    }

    async fn merge(&self, id: &PullRequestId) -> Result<PullRequest, Error> {
        let mut tx = self.transactions.begin("merge_pull_request").await?;
        let outcome = tx.deadline().run(self.merge_in(tx.handle(), id)).await;
        tx.finish(outcome).await
    }

    async fn reassign(
        &self,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error> {
        let mut tx = self.transactions.begin("reassign_reviewer").await?;
        let outcome = tx
            .deadline()
            .run(self.reassign_in(tx.handle(), id, old_reviewer))
            .await;
        tx.finish(outcome).await
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
