//! Workload and statistics queries for [`DieselTransaction`].
//!
//! Team aggregates filter by member ids through a subquery on `users` rather
//! than joining it, so reviewer and author sides never join `users` twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReviewCounts, StatsStore, StoreError};
use crate::domain::{PullRequestStatus, TeamName, TeamStats, UserId, UserStats};

use super::diesel_review_mapping::{
    count_from_db, map_constraint_error, map_diesel_error, row_to_user, user_id_from_db,
};
use super::diesel_review_store::DieselTransaction;
use super::models::{AssignmentStatsRow, NewAssignmentStatsRow, UserRow};
use super::schema::{assignment_stats, pr_reviewers, pull_requests, teams, users};

const OPEN: &str = PullRequestStatus::Open.as_str();

#[async_trait]
impl StatsStore for DieselTransaction {
    async fn open_review_counts(&mut self, users: &[UserId]) -> Result<ReviewCounts, StoreError> {
        if users.is_empty() {
            return Ok(ReviewCounts::new());
        }
        let ids: Vec<&str> = users.iter().map(UserId::as_str).collect();
        let rows: Vec<(String, i64)> = pr_reviewers::table
            .inner_join(pull_requests::table)
            .filter(pull_requests::status.eq(OPEN))
            .filter(pr_reviewers::user_id.eq_any(ids))
            .group_by(pr_reviewers::user_id)
            .select((pr_reviewers::user_id, count_star()))
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(user_id, count)| Ok((user_id_from_db(user_id)?, count_from_db(count))))
            .collect()
    }

    async fn increment_assignment_counter(
        &mut self,
        user: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        diesel::insert_into(assignment_stats::table)
            .values(&NewAssignmentStatsRow {
                user_id: user.as_str(),
                assignment_count: 1,
                last_assigned_at: Some(assigned_at),
            })
            .on_conflict(assignment_stats::user_id)
            .do_update()
            .set((
                assignment_stats::assignment_count.eq(assignment_stats::assignment_count + 1_i64),
                assignment_stats::last_assigned_at.eq(excluded(assignment_stats::last_assigned_at)),
            ))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(|err| {
                map_constraint_error(
                    err,
                    || StoreError::query(format!("assignment counter for {user} conflicts")),
                    || StoreError::unknown_user(user.as_str()),
                )
            })
    }

    async fn user_stats(&mut self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
        let id = user.as_str();
        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let found = row_to_user(row)?;

        let counter: Option<AssignmentStatsRow> = assignment_stats::table
            .filter(assignment_stats::user_id.eq(id))
            .select(AssignmentStatsRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let open_reviews: i64 = pr_reviewers::table
            .inner_join(pull_requests::table)
            .filter(pr_reviewers::user_id.eq(id))
            .filter(pull_requests::status.eq(OPEN))
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let total_reviews: i64 = pr_reviewers::table
            .filter(pr_reviewers::user_id.eq(id))
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;

        let (assignment_count, last_assigned_at) = counter
            .map(|row| (count_from_db(row.assignment_count), row.last_assigned_at))
            .unwrap_or_default();
        Ok(Some(UserStats {
            user_id: found.id().clone(),
            username: found.username().clone(),
            team_name: found.team_name().clone(),
            open_reviews: count_from_db(open_reviews),
            total_reviews: count_from_db(total_reviews),
            assignment_count,
            last_assigned_at,
        }))
    }

    async fn team_stats(&mut self, team: &TeamName) -> Result<Option<TeamStats>, StoreError> {
        let name = team.as_str();
        let team_exists: bool =
            diesel::select(exists(teams::table.filter(teams::team_name.eq(name))))
                .get_result(self.conn())
                .await
                .map_err(map_diesel_error)?;
        if !team_exists {
            return Ok(None);
        }

        let total_members: i64 = users::table
            .filter(users::team_name.eq(name))
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let active_members: i64 = users::table
            .filter(users::team_name.eq(name))
            .filter(users::is_active.eq(true))
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let total_prs: i64 = pull_requests::table
            .filter(
                pull_requests::author_id.eq_any(
                    users::table
                        .filter(users::team_name.eq(name))
                        .select(users::user_id),
                ),
            )
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let open_prs: i64 = pull_requests::table
            .filter(pull_requests::status.eq(OPEN))
            .filter(
                pull_requests::author_id.eq_any(
                    users::table
                        .filter(users::team_name.eq(name))
                        .select(users::user_id),
                ),
            )
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let open_reviews: i64 = pr_reviewers::table
            .inner_join(pull_requests::table)
            .filter(pull_requests::status.eq(OPEN))
            .filter(
                pr_reviewers::user_id.eq_any(
                    users::table
                        .filter(users::team_name.eq(name))
                        .select(users::user_id),
                ),
            )
            .count()
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)?;

        Ok(Some(TeamStats {
            team_name: team.clone(),
            total_members: count_from_db(total_members),
            active_members: count_from_db(active_members),
            total_prs: count_from_db(total_prs),
            open_prs: count_from_db(open_prs),
            open_reviews: count_from_db(open_reviews),
        }))
    }
}
