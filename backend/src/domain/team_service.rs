//! Team creation, lookup and statistics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ReviewTransaction, TeamDirectory};
use crate::domain::transaction::{TransactionRunner, map_store_error, store_timestamp};
use crate::domain::{Error, NewTeam, Team, TeamName, TeamStats};

/// Service implementing [`TeamDirectory`].
#[derive(Clone)]
pub struct TeamService {
    transactions: TransactionRunner,
    clock: Arc<dyn Clock>,
}

impl TeamService {
    /// Create the service over a transaction runner.
    pub fn new(transactions: TransactionRunner, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions,
            clock,
        }
    }

    fn missing_team(name: &TeamName) -> Error {
        Error::not_found(format!("team {name} not found"))
    }

    async fn create_in(&self, tx: &mut dyn ReviewTransaction, team: NewTeam) -> Result<Team, Error> {
        let exists = tx
            .teams()
            .team_exists(team.name())
            .await
            .map_err(map_store_error)?;
        if exists {
            return Err(Error::team_exists(format!("team {} already exists", team.name())));
        }
        tx.teams()
            .insert_team(team.name(), store_timestamp(self.clock.as_ref()))
            .await
            .map_err(map_store_error)?;
        for user in team.users() {
            tx.users()
                .upsert_user(&user)
                .await
                .map_err(map_store_error)?;
        }
        let created = tx
            .teams()
            .find_team(team.name())
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal(format!("team {} vanished after insert", team.name())))?;

        info!(team_name = %created.name, members = created.members.len(), "team created");
        Ok(created)
    }

    async fn team_in(tx: &mut dyn ReviewTransaction, name: &TeamName) -> Result<Team, Error> {
        tx.teams()
            .find_team(name)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Self::missing_team(name))
    }

    async fn stats_in(tx: &mut dyn ReviewTransaction, name: &TeamName) -> Result<TeamStats, Error> {
        tx.stats()
            .team_stats(name)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Self::missing_team(name))
    }
}

#[async_trait]
impl TeamDirectory for TeamService {
    async fn create_team(&self, team: NewTeam) -> Result<Team, Error> {
        let mut tx = self.transactions.begin("create_team").await?;
        let outcome = tx.deadline().run(self.create_in(tx.handle(), team)).await;
        tx.finish(outcome).await
    }

    async fn team(&self, name: &TeamName) -> Result<Team, Error> {
        let mut tx = self.transactions.begin("get_team").await?;
        let outcome = tx.deadline().run(Self::team_in(tx.handle(), name)).await;
        tx.finish(outcome).await
    }

    async fn team_stats(&self, name: &TeamName) -> Result<TeamStats, Error> {
        let mut tx = self.transactions.begin("team_stats").await?;
        let outcome = tx.deadline().run(Self::stats_in(tx.handle(), name)).await;
        tx.finish(outcome).await
    }
}
