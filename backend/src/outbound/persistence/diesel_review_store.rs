//! PostgreSQL-backed `ReviewStore` implementation using Diesel ORM.
//!
//! [`DieselReviewStore::begin`] checks an owned connection out of the pool
//! and opens a read-committed transaction on it. The returned
//! [`DieselTransaction`] implements every entity sub-store over that single
//! connection, so all reads and writes of one workflow step share the
//! transaction. Dropping the handle without commit leaves the transaction
//! open on the connection, which the pool then discards as broken.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, now};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::domain::ports::{
    PullRequestStore, ReviewStore, ReviewTransaction, StatsStore, StoreError, TeamStore, UserStore,
};
use crate::domain::{Team, TeamName, User, UserId};

use super::diesel_review_mapping::{
    map_constraint_error, map_diesel_error, map_pool_error, row_to_user,
};
use super::models::{NewTeamRow, NewUserRow, TeamRow, UserRow};
use super::pool::DbPool;
use super::schema::{teams, users};

type PgTransactionManager = AnsiTransactionManager;

/// Diesel-backed implementation of the [`ReviewStore`] port.
#[derive(Clone)]
pub struct DieselReviewStore {
    pool: DbPool,
}

impl DieselReviewStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for DieselReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, StoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::begin_transaction(
            &mut *conn,
        )
        .await
        .map_err(map_diesel_error)?;
        Ok(Box::new(DieselTransaction { conn }))
    }
}

/// One open PostgreSQL transaction.
pub struct DieselTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl DieselTransaction {
    pub(super) fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

pub(super) async fn load_members(
    conn: &mut AsyncPgConnection,
    team: &TeamName,
    active_excluding: Option<&UserId>,
) -> Result<Vec<User>, StoreError> {
    let mut query = users::table
        .filter(users::team_name.eq(team.as_str()))
        .order((users::username.asc(), users::user_id.asc()))
        .select(UserRow::as_select())
        .into_boxed();
    if let Some(excluded) = active_excluding {
        query = query
            .filter(users::is_active.eq(true))
            .filter(users::user_id.ne(excluded.as_str()));
    }
    let rows: Vec<UserRow> = query.load(conn).await.map_err(map_diesel_error)?;
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl ReviewTransaction for DieselTransaction {
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
        let mut this = self;
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::commit_transaction(
            this.conn(),
        )
        .await
        .map_err(map_diesel_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            this.conn(),
        )
        .await
        .map_err(map_diesel_error)
    }
}

#[async_trait]
impl UserStore for DieselTransaction {
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id.as_str()))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError> {
        let row = NewUserRow {
            user_id: user.id().as_str(),
            username: user.username().as_str(),
            team_name: user.team_name().as_str(),
            is_active: user.is_active(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::user_id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::team_name.eq(excluded(users::team_name)),
                users::is_active.eq(excluded(users::is_active)),
                users::updated_at.eq(now),
            ))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(|err| {
                map_constraint_error(
                    err,
                    || StoreError::query(format!("user {} conflicts", user.id())),
                    || StoreError::missing(format!("team {} not found", user.team_name())),
                )
            })
    }

    async fn set_active(
        &mut self,
        id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = diesel::update(users::table.filter(users::user_id.eq(id.as_str())))
            .set((users::is_active.eq(is_active), users::updated_at.eq(now)))
            .returning(UserRow::as_returning())
            .get_result(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn team_members(&mut self, team: &TeamName) -> Result<Vec<User>, StoreError> {
        load_members(self.conn(), team, None).await
    }

    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        excluded: &UserId,
    ) -> Result<Vec<User>, StoreError> {
        load_members(self.conn(), team, Some(excluded)).await
    }
}

#[async_trait]
impl TeamStore for DieselTransaction {
    async fn team_exists(&mut self, name: &TeamName) -> Result<bool, StoreError> {
        diesel::select(exists(teams::table.filter(teams::team_name.eq(name.as_str()))))
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_team(
        &mut self,
        name: &TeamName,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        diesel::insert_into(teams::table)
            .values(&NewTeamRow {
                team_name: name.as_str(),
                created_at,
            })
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(|err| {
                map_constraint_error(
                    err,
                    || StoreError::team_exists(name.as_str()),
                    || StoreError::query(format!("team {name} references missing rows")),
                )
            })
    }

    async fn find_team(&mut self, name: &TeamName) -> Result<Option<Team>, StoreError> {
        let row: Option<TeamRow> = teams::table
            .filter(teams::team_name.eq(name.as_str()))
            .select(TeamRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let members = load_members(self.conn(), name, None).await?;
        Ok(Some(Team {
            name: name.clone(),
            members,
            created_at: row.created_at,
        }))
    }
}
