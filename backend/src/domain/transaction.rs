//! Transaction boundary shared by every domain service.
//!
//! [`TransactionRunner::begin`] opens a store transaction bound to a
//! deadline. Services run their steps through [`Deadline::run`] and hand the
//! outcome to [`ActiveTransaction::finish`], which commits on success and
//! rolls back on any error, including an elapsed deadline. Partial writes are
//! never committed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde_json::json;
use tokio::time::Instant;
use tracing::{error, warn};

use crate::domain::Error;
use crate::domain::ports::{ReviewStore, ReviewTransaction, StoreError};

/// Deadline applied when configuration does not override it.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Current time truncated to the microsecond precision stores persist, so
/// values returned to callers match what a later read yields.
pub(crate) fn store_timestamp(clock: &dyn Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}

/// Translate a store failure into the domain error callers branch on.
///
/// Infrastructure failures collapse into `internal_error`; the detail is
/// logged here and redacted at the HTTP edge.
pub(crate) fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::Connection { message } => {
            error!(%message, "review store unavailable");
            Error::internal(format!("review store unavailable: {message}"))
        }
        StoreError::Query { message } => {
            error!(%message, "review store query failed");
            Error::internal(format!("review store error: {message}"))
        }
        StoreError::PullRequestExists { id } => {
            Error::pr_exists(format!("pull request {id} already exists"))
        }
        StoreError::TeamExists { name } => Error::team_exists(format!("team {name} already exists")),
        StoreError::UnknownUser { id } => Error::not_found(format!("user {id} not found")),
        StoreError::Missing { message } => Error::not_found(message),
        StoreError::VersionConflict { expected, actual } => Error::version_conflict(format!(
            "pull request was modified concurrently: expected version {expected}, found {actual}"
        ))
        .with_details(json!({
            "expected_version": expected,
            "actual_version": actual,
        })),
        StoreError::NotAssigned {
            pull_request_id,
            user_id,
        } => Error::not_assigned(format!(
            "user {user_id} is not assigned to pull request {pull_request_id}"
        )),
    }
}

/// Opens deadline-bound transactions against a [`ReviewStore`].
#[derive(Clone)]
pub struct TransactionRunner {
    store: Arc<dyn ReviewStore>,
    timeout: Duration,
}

impl TransactionRunner {
    /// Wrap `store`, bounding each transaction by `timeout`.
    pub fn new(store: Arc<dyn ReviewStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Deadline granted to each transaction.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a transaction for `operation`; the deadline starts now.
    ///
    /// # Errors
    ///
    /// `timeout` when the store cannot open a transaction in time, otherwise
    /// the mapped store failure.
    pub async fn begin(&self, operation: &'static str) -> Result<ActiveTransaction, Error> {
        let deadline = Deadline {
            at: Instant::now() + self.timeout,
            operation,
        };
        let handle = deadline
            .run(async { self.store.begin().await.map_err(map_store_error) })
            .await?;
        Ok(ActiveTransaction { handle, deadline })
    }
}

/// Point in time by which an operation must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    operation: &'static str,
}

impl Deadline {
    /// Drive `future` until it resolves or the deadline passes.
    ///
    /// An elapsed deadline drops `future` and yields a `timeout` error.
    pub async fn run<T, F>(self, future: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout_at(self.at, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation = self.operation, "transaction deadline elapsed");
                Err(Error::timeout(format!(
                    "{} did not finish before its deadline",
                    self.operation
                )))
            }
        }
    }
}

/// Open transaction paired with its deadline.
pub struct ActiveTransaction {
    handle: Box<dyn ReviewTransaction>,
    deadline: Deadline,
}

impl ActiveTransaction {
    /// Transaction handle passed explicitly to every store call.
    pub fn handle(&mut self) -> &mut dyn ReviewTransaction {
        self.handle.as_mut()
    }

    /// Deadline bound to this transaction.
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Commit on `Ok`, roll back on `Err`, and return `outcome`.
    ///
    /// A failed or late commit is reported instead of the value. A failed
    /// rollback is logged; the original error is still returned.
    pub async fn finish<T>(self, outcome: Result<T, Error>) -> Result<T, Error> {
        let Self { handle, deadline } = self;
        match outcome {
            Ok(value) => {
                deadline
                    .run(async move { handle.commit().await.map_err(map_store_error) })
                    .await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = handle.rollback().await {
                    warn!(
                        operation = deadline.operation,
                        error = %rollback,
                        "transaction rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}
