//! Pull request lifecycle HTTP handlers.
//!
//! ```text
//! POST /pullRequest/create {"pull_request_id":"pr-1","pull_request_name":"Add search","author_id":"u1"}
//! POST /pullRequest/merge {"pull_request_id":"pr-1"}
//! POST /pullRequest/reassign {"pull_request_id":"pr-1","old_user_id":"u2"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::CreatePullRequest;
use crate::domain::{Error, PullRequestId, PullRequestName, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::PullRequestResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_identifier};

const PULL_REQUEST_ID: FieldName = FieldName::new("pull_request_id");
const PULL_REQUEST_NAME: FieldName = FieldName::new("pull_request_name");
const AUTHOR_ID: FieldName = FieldName::new("author_id");
const OLD_USER_ID: FieldName = FieldName::new("old_user_id");

/// Request body for `POST /pullRequest/create`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: Option<String>,
    pub pull_request_name: Option<String>,
    pub author_id: Option<String>,
}

/// Request body for `POST /pullRequest/merge`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: Option<String>,
}

/// Request body for `POST /pullRequest/reassign`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReassignRequest {
    pub pull_request_id: Option<String>,
    pub old_user_id: Option<String>,
}

/// Envelope for create and merge.
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestEnvelope {
    pub pr: PullRequestResponse,
}

/// Envelope for reassign.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequestResponse,
    pub replaced_by: String,
}

fn parse_create(payload: CreatePullRequestRequest) -> Result<CreatePullRequest, Error> {
    Ok(CreatePullRequest {
        id: parse_identifier(payload.pull_request_id, PULL_REQUEST_ID, PullRequestId::new)?,
        name: parse_identifier(
            payload.pull_request_name,
            PULL_REQUEST_NAME,
            PullRequestName::new,
        )?,
        author_id: parse_identifier(payload.author_id, AUTHOR_ID, UserId::new)?,
    })
}

/// Open a pull request and assign up to two reviewers from the author's team.
#[post("/pullRequest/create")]
pub async fn create_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePullRequestRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_create(payload.into_inner())?;
    let pull_request = state.pull_requests.create(request).await?;
    Ok(HttpResponse::Created().json(PullRequestEnvelope {
        pr: PullRequestResponse::from(pull_request),
    }))
}

/// Merge a pull request; merging twice returns the merged state unchanged.
#[post("/pullRequest/merge")]
pub async fn merge_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<MergePullRequestRequest>,
) -> ApiResult<web::Json<PullRequestEnvelope>> {
    let id = parse_identifier(
        payload.into_inner().pull_request_id,
        PULL_REQUEST_ID,
        PullRequestId::new,
    )?;
    let pull_request = state.pull_requests.merge(&id).await?;
    Ok(web::Json(PullRequestEnvelope {
        pr: PullRequestResponse::from(pull_request),
    }))
}

/// Replace one reviewer with the least-loaded eligible member of their team.
#[post("/pullRequest/reassign")]
pub async fn reassign_reviewer(
    state: web::Data<HttpState>,
    payload: web::Json<ReassignRequest>,
) -> ApiResult<web::Json<ReassignResponse>> {
    let ReassignRequest {
        pull_request_id,
        old_user_id,
    } = payload.into_inner();
    let id = parse_identifier(pull_request_id, PULL_REQUEST_ID, PullRequestId::new)?;
    let old_reviewer = parse_identifier(old_user_id, OLD_USER_ID, UserId::new)?;
    let reassignment = state.pull_requests.reassign(&id, &old_reviewer).await?;
    Ok(web::Json(ReassignResponse {
        pr: PullRequestResponse::from(reassignment.pull_request),
        replaced_by: reassignment.replaced_by.to_string(),
    }))
}

#[cfg(test)]
#[path = "pull_requests_tests.rs"]
mod tests;
