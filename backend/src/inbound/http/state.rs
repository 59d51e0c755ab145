//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{PullRequestCommand, TeamDirectory, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub pull_requests: Arc<dyn PullRequestCommand>,
    pub teams: Arc<dyn TeamDirectory>,
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use reviewer_service::domain::review_assignment::{AssignmentWorkflow, EntropyRandom};
    /// use reviewer_service::domain::transaction::{DEFAULT_TRANSACTION_TIMEOUT, TransactionRunner};
    /// use reviewer_service::domain::{TeamService, UserService};
    /// use reviewer_service::inbound::http::state::HttpState;
    /// use reviewer_service::outbound::memory::MemoryReviewStore;
    ///
    /// let runner = TransactionRunner::new(
    ///     Arc::new(MemoryReviewStore::new()),
    ///     DEFAULT_TRANSACTION_TIMEOUT,
    /// );
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(
    ///     Arc::new(AssignmentWorkflow::new(
    ///         runner.clone(),
    ///         Arc::new(EntropyRandom),
    ///         clock.clone(),
    ///     )),
    ///     Arc::new(TeamService::new(runner.clone(), clock)),
    ///     Arc::new(UserService::new(runner)),
    /// );
    /// let _teams = state.teams.clone();
    /// ```
    pub fn new(
        pull_requests: Arc<dyn PullRequestCommand>,
        teams: Arc<dyn TeamDirectory>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            pull_requests,
            teams,
            users,
        }
    }
}
