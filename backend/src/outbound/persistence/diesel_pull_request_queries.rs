//! Pull request and assignment edge queries for [`DieselTransaction`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{PullRequestStore, StoreError};
use crate::domain::{PullRequest, PullRequestId, UserId};

use super::diesel_review_mapping::{
    group_reviewers, map_constraint_error, map_diesel_error, row_to_pull_request, version_for_db,
    version_from_db,
};
use super::diesel_review_store::DieselTransaction;
use super::models::{NewPullRequestRow, NewReviewerRow, PullRequestRow, PullRequestUpdate};
use super::schema::{pr_reviewers, pull_requests};

async fn reviewers_of(
    conn: &mut AsyncPgConnection,
    pull_request_id: &str,
) -> Result<Vec<String>, StoreError> {
    pr_reviewers::table
        .filter(pr_reviewers::pull_request_id.eq(pull_request_id))
        .order(pr_reviewers::id.asc())
        .select(pr_reviewers::user_id)
        .load(conn)
        .await
        .map_err(map_diesel_error)
}

#[async_trait]
impl PullRequestStore for DieselTransaction {
    async fn insert_pull_request(&mut self, pull_request: &PullRequest) -> Result<(), StoreError> {
        let row = NewPullRequestRow {
            pull_request_id: pull_request.id().as_str(),
            pull_request_name: pull_request.name().as_str(),
            author_id: pull_request.author_id().as_str(),
            status: pull_request.status().as_str(),
            created_at: pull_request.created_at(),
            merged_at: pull_request.merged_at(),
            version: version_for_db(pull_request.version()),
        };
        diesel::insert_into(pull_requests::table)
            .values(&row)
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(|err| {
                map_constraint_error(
                    err,
                    || StoreError::pull_request_exists(pull_request.id().as_str()),
                    || StoreError::unknown_user(pull_request.author_id().as_str()),
                )
            })
    }

    async fn update_pull_request(
        &mut self,
        pull_request: &PullRequest,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let id = pull_request.id().as_str();
        let changes = PullRequestUpdate {
            pull_request_name: pull_request.name().as_str(),
            status: pull_request.status().as_str(),
            merged_at: pull_request.merged_at(),
            version: version_for_db(pull_request.version()),
        };
        let updated = diesel::update(
            pull_requests::table
                .filter(pull_requests::pull_request_id.eq(id))
                .filter(pull_requests::version.eq(version_for_db(expected_version))),
        )
        .set(&changes)
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let actual: Option<i32> = pull_requests::table
            .filter(pull_requests::pull_request_id.eq(id))
            .select(pull_requests::version)
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(match actual {
            Some(actual) => StoreError::version_conflict(expected_version, version_from_db(actual)),
            None => StoreError::missing(format!("pull request {id} not found")),
        })
    }

    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequest>, StoreError> {
        let row: Option<PullRequestRow> = pull_requests::table
            .filter(pull_requests::pull_request_id.eq(id.as_str()))
            .select(PullRequestRow::as_select())
            .for_update()
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let reviewers = reviewers_of(self.conn(), id.as_str()).await?;
        row_to_pull_request(row, reviewers).map(Some)
    }

    async fn insert_assignment_edges(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewers: &[UserId],
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if reviewers.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewReviewerRow<'_>> = reviewers
            .iter()
            .map(|reviewer| NewReviewerRow {
                pull_request_id: pull_request_id.as_str(),
                user_id: reviewer.as_str(),
                assigned_at,
            })
            .collect();
        diesel::insert_into(pr_reviewers::table)
            .values(&rows)
            .on_conflict((pr_reviewers::pull_request_id, pr_reviewers::user_id))
            .do_nothing()
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(|err| {
                map_constraint_error(
                    err,
                    || StoreError::query("duplicate assignment edge"),
                    || {
                        StoreError::missing(format!(
                            "pull request {pull_request_id} or a reviewer not found"
                        ))
                    },
                )
            })
    }

    async fn replace_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let updated = diesel::update(
            pr_reviewers::table
                .filter(pr_reviewers::pull_request_id.eq(pull_request_id.as_str()))
                .filter(pr_reviewers::user_id.eq(old.as_str())),
        )
        .set((
            pr_reviewers::user_id.eq(new.as_str()),
            pr_reviewers::assigned_at.eq(assigned_at),
        ))
        .execute(self.conn())
        .await
        .map_err(|err| {
            map_constraint_error(
                err,
                || {
                    StoreError::query(format!(
                        "user {new} is already assigned to pull request {pull_request_id}"
                    ))
                },
                || StoreError::unknown_user(new.as_str()),
            )
        })?;
        if updated == 0 {
            return Err(StoreError::not_assigned(
                pull_request_id.as_str(),
                old.as_str(),
            ));
        }
        Ok(())
    }

    async fn remove_assignment_edge(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError> {
        let deleted = diesel::delete(
            pr_reviewers::table
                .filter(pr_reviewers::pull_request_id.eq(pull_request_id.as_str()))
                .filter(pr_reviewers::user_id.eq(reviewer.as_str())),
        )
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn is_assigned(
        &mut self,
        pull_request_id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, StoreError> {
        diesel::select(exists(
            pr_reviewers::table
                .filter(pr_reviewers::pull_request_id.eq(pull_request_id.as_str()))
                .filter(pr_reviewers::user_id.eq(reviewer.as_str())),
        ))
        .get_result(self.conn())
        .await
        .map_err(map_diesel_error)
    }

    async fn reviewed_by(&mut self, reviewer: &UserId) -> Result<Vec<PullRequest>, StoreError> {
        let rows: Vec<PullRequestRow> = pull_requests::table
            .inner_join(pr_reviewers::table)
            .filter(pr_reviewers::user_id.eq(reviewer.as_str()))
            .order((
                pull_requests::created_at.desc(),
                pull_requests::pull_request_id.asc(),
            ))
            .select(PullRequestRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = rows.iter().map(|row| row.pull_request_id.as_str()).collect();
        let edges: Vec<(String, String)> = pr_reviewers::table
            .filter(pr_reviewers::pull_request_id.eq_any(ids))
            .order(pr_reviewers::id.asc())
            .select((pr_reviewers::pull_request_id, pr_reviewers::user_id))
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let mut grouped = group_reviewers(edges);

        rows.into_iter()
            .map(|row| {
                let reviewers = grouped.remove(&row.pull_request_id).unwrap_or_default();
                row_to_pull_request(row, reviewers)
            })
            .collect()
    }
}
