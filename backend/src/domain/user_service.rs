//! User activity toggles, review listings and statistics.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ReviewTransaction, UserDirectory};
use crate::domain::transaction::{TransactionRunner, map_store_error};
use crate::domain::{Error, PullRequest, User, UserId, UserStats};

fn missing_user(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserService {
    transactions: TransactionRunner,
}

impl UserService {
    /// Create the service over a transaction runner.
    pub fn new(transactions: TransactionRunner) -> Self {
        Self { transactions }
    }

    async fn set_active_in(
        tx: &mut dyn ReviewTransaction,
        id: &UserId,
        is_active: bool,
    ) -> Result<User, Error> {
        let user = tx
            .users()
            .set_active(id, is_active)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| missing_user(id))?;
        info!(user_id = %id, is_active, "user activity changed");
        Ok(user)
    }

    async fn reviews_in(
        tx: &mut dyn ReviewTransaction,
        id: &UserId,
    ) -> Result<Vec<PullRequest>, Error> {
        tx.users()
            .find_user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| missing_user(id))?;
        tx.pull_requests()
            .reviewed_by(id)
            .await
            .map_err(map_store_error)
    }

    async fn stats_in(tx: &mut dyn ReviewTransaction, id: &UserId) -> Result<UserStats, Error> {
        tx.stats()
            .user_stats(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| missing_user(id))
    }
}

#[async_trait]
impl UserDirectory for UserService {
    async fn set_is_active(&self, id: &UserId, is_active: bool) -> Result<User, Error> {
        let mut tx = self.transactions.begin("set_user_active").await?;
        let outcome = tx
            .deadline()
            .run(Self::set_active_in(tx.handle(), id, is_active))
            .await;
        tx.finish(outcome).await
    }

    async fn reviews(&self, id: &UserId) -> Result<Vec<PullRequest>, Error> {
        let mut tx = self.transactions.begin("user_reviews").await?;
        let outcome = tx.deadline().run(Self::reviews_in(tx.handle(), id)).await;
        tx.finish(outcome).await
    }

    async fn user_stats(&self, id: &UserId) -> Result<UserStats, Error> {
        let mut tx = self.transactions.begin("user_stats").await?;
        let outcome = tx.deadline().run(Self::stats_in(tx.handle(), id)).await;
        tx.finish(outcome).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{CreatePullRequest, PullRequestCommand, TeamDirectory};
    use crate::domain::review_assignment::{AssignmentWorkflow, SeededRandom};
    use crate::domain::transaction::DEFAULT_TRANSACTION_TIMEOUT;
    use crate::domain::{
        ErrorCode, NewTeam, PullRequestId, PullRequestName, TeamMember, TeamName, TeamService,
        Username,
    };
    use crate::outbound::memory::MemoryReviewStore;
    use mockable::DefaultClock;
    use rstest::rstest;

    struct Services {
        users: UserService,
        pull_requests: AssignmentWorkflow,
    }

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("user id")
    }

    async fn services() -> Services {
        let runner =
            TransactionRunner::new(Arc::new(MemoryReviewStore::new()), DEFAULT_TRANSACTION_TIMEOUT);
        let members = ["author", "r1", "r2"]
            .into_iter()
            .map(|id| TeamMember {
                id: uid(id),
                username: Username::new(id).expect("username"),
                is_active: true,
            })
            .collect();
        TeamService::new(runner.clone(), Arc::new(DefaultClock))
            .create_team(
                NewTeam::try_new(TeamName::new("backend").expect("team"), members)
                    .expect("team"),
            )
            .await
            .expect("create team");
        Services {
            users: UserService::new(runner.clone()),
            pull_requests: AssignmentWorkflow::new(
                runner,
                Arc::new(SeededRandom::new(1)),
                Arc::new(DefaultClock),
            ),
        }
    }

    async fn open(services: &Services, id: &str) {
        services
            .pull_requests
            .create(CreatePullRequest {
                id: PullRequestId::new(id).expect("id"),
                name: PullRequestName::new("work").expect("name"),
                author_id: uid("author"),
            })
            .await
            .expect("create");
    }

    #[rstest]
    #[tokio::test]
    async fn deactivated_users_keep_reviews_but_leave_rotation() {
        let services = services().await;
        open(&services, "pr-1").await;

        let user = services
            .users
            .set_is_active(&uid("r1"), false)
            .await
            .expect("deactivate");
        assert!(!user.is_active());

        let reviews = services.users.reviews(&uid("r1")).await.expect("reviews");
        assert_eq!(reviews.len(), 1);

        open(&services, "pr-2").await;
        let reviews = services.users.reviews(&uid("r1")).await.expect("reviews");
        assert_eq!(reviews.len(), 1);
        let reviews = services.users.reviews(&uid("r2")).await.expect("reviews");
        assert_eq!(reviews.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn stats_track_assignments_and_open_reviews() {
        let services = services().await;
        open(&services, "pr-1").await;
        services
            .pull_requests
            .merge(&PullRequestId::new("pr-1").expect("id"))
            .await
            .expect("merge");

        let stats = services.users.user_stats(&uid("r2")).await.expect("stats");
        assert_eq!(stats.assignment_count, 1);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.open_reviews, 0);
        assert!(stats.last_assigned_at.is_some());
    }

    #[rstest]
    #[case::set_active("set_active")]
    #[case::reviews("reviews")]
    #[case::stats("stats")]
    #[tokio::test]
    async fn unknown_users_are_not_found(#[case] operation: &str) {
        let services = services().await;
        let ghost = uid("ghost");
        let err = match operation {
            "set_active" => services.users.set_is_active(&ghost, true).await.map(|_| ()),
            "reviews" => services.users.reviews(&ghost).await.map(|_| ()),
            _ => services.users.user_stats(&ghost).await.map(|_| ()),
        }
        .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
