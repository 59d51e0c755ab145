//! Builders for the HTTP state and the review store behind it.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use crate::domain::ports::ReviewStore;
use crate::domain::review_assignment::{AssignmentWorkflow, EntropyRandom};
use crate::domain::transaction::TransactionRunner;
use crate::domain::{TeamService, UserService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryReviewStore;
use crate::outbound::persistence::DieselReviewStore;

use super::ServerConfig;

/// Select the review store: PostgreSQL when a pool is configured, otherwise
/// the in-process store.
fn build_review_store(config: &ServerConfig) -> Arc<dyn ReviewStore> {
    match &config.db_pool {
        Some(pool) => {
            info!(store = "postgres", "review store selected");
            Arc::new(DieselReviewStore::new(pool.clone()))
        }
        None => {
            info!(store = "memory", "review store selected");
            Arc::new(MemoryReviewStore::new())
        }
    }
}

/// Wire the driving ports over one shared transaction runner.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let runner = TransactionRunner::new(build_review_store(config), config.transaction_timeout);
    let clock = Arc::new(DefaultClock);
    web::Data::new(HttpState::new(
        Arc::new(AssignmentWorkflow::new(
            runner.clone(),
            Arc::new(EntropyRandom),
            clock.clone(),
        )),
        Arc::new(TeamService::new(runner.clone(), clock)),
        Arc::new(UserService::new(runner)),
    ))
}

