//! User HTTP handlers.
//!
//! ```text
//! POST /users/setIsActive {"user_id":"u1","is_active":false}
//! GET /users/getReview?user_id=u1
//! GET /users/stats?user_id=u1
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{PullRequestShortResponse, UserResponse, UserStatsResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_identifier, required_flag};

const USER_ID: FieldName = FieldName::new("user_id");
const IS_ACTIVE: FieldName = FieldName::new("is_active");

/// Request body for `POST /users/setIsActive`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SetIsActiveRequest {
    pub user_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Query string for user lookups.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// Envelope for `POST /users/setIsActive`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// Pull requests a user currently reviews.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortResponse>,
}

fn parse_user_query(query: UserQuery) -> Result<UserId, Error> {
    parse_identifier(query.user_id, USER_ID, UserId::new)
}

/// Move a user in or out of review rotation.
#[post("/users/setIsActive")]
pub async fn set_is_active(
    state: web::Data<HttpState>,
    payload: web::Json<SetIsActiveRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let SetIsActiveRequest { user_id, is_active } = payload.into_inner();
    let id = parse_identifier(user_id, USER_ID, UserId::new)?;
    let is_active = required_flag(is_active, IS_ACTIVE)?;
    let user = state.users.set_is_active(&id, is_active).await?;
    Ok(web::Json(UserEnvelope {
        user: UserResponse::from(user),
    }))
}

/// List pull requests the user is assigned to, newest first.
#[get("/users/getReview")]
pub async fn get_reviews(
    state: web::Data<HttpState>,
    query: web::Query<UserQuery>,
) -> ApiResult<web::Json<UserReviewsResponse>> {
    let id = parse_user_query(query.into_inner())?;
    let pull_requests = state.users.reviews(&id).await?;
    Ok(web::Json(UserReviewsResponse {
        user_id: id.to_string(),
        pull_requests: pull_requests
            .into_iter()
            .map(PullRequestShortResponse::from)
            .collect(),
    }))
}

/// Review statistics for one user.
#[get("/users/stats")]
pub async fn user_stats(
    state: web::Data<HttpState>,
    query: web::Query<UserQuery>,
) -> ApiResult<web::Json<UserStatsResponse>> {
    let id = parse_user_query(query.into_inner())?;
    let stats = state.users.user_stats(&id).await?;
    Ok(web::Json(UserStatsResponse::from(stats)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{
        PullRequest, PullRequestId, PullRequestName, TeamName, UserStats, Username,
    };
    use crate::inbound::http::test_utils::{MockPorts, fixed_time, test_app, user};

    fn open_pull_request(id: &str, author: &str) -> PullRequest {
        PullRequest::open(
            PullRequestId::new(id).expect("pr id"),
            PullRequestName::new(format!("Change {id}")).expect("pr name"),
            UserId::new(author).expect("author"),
            fixed_time(),
        )
    }

    #[actix_web::test]
    async fn set_is_active_returns_updated_user() {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_set_is_active()
            .withf(|id, active| id.as_str() == "u2" && !*active)
            .times(1)
            .return_once(|_, _| Ok(user("u2", "bob", "backend", false)));

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .set_json(json!({"user_id": "u2", "is_active": false}))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({"user": {
                "user_id": "u2",
                "username": "bob",
                "team_name": "backend",
                "is_active": false
            }})
        );
    }

    #[rstest]
    #[case::missing_user(json!({"is_active": true}), "user_id")]
    #[case::missing_flag(json!({"user_id": "u1"}), "is_active")]
    #[actix_web::test]
    async fn set_is_active_requires_both_fields(#[case] payload: Value, #[case] field: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let request = actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[actix_web::test]
    async fn malformed_json_is_an_invalid_request() {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let request = actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn reviews_list_short_pull_requests() {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_reviews()
            .return_once(|_| Ok(vec![open_pull_request("pr-2", "u1"), open_pull_request("pr-1", "u3")]));

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get()
            .uri("/users/getReview?user_id=u2")
            .to_request();
        let body: UserReviewsResponse = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.user_id, "u2");
        let ids: Vec<&str> = body
            .pull_requests
            .iter()
            .map(|pr| pr.pull_request_id.as_str())
            .collect();
        assert_eq!(ids, ["pr-2", "pr-1"]);
        assert_eq!(body.pull_requests[0].status, "OPEN");
    }

    #[actix_web::test]
    async fn reviews_for_unknown_user_are_not_found() {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_reviews()
            .return_once(|_| Err(Error::not_found("user ghost not found")));

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get()
            .uri("/users/getReview?user_id=ghost")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn user_stats_render_timestamps() {
        let mut ports = MockPorts::default();
        ports.users.expect_user_stats().return_once(|id| {
            Ok(UserStats {
                user_id: id.clone(),
                username: Username::new("alice").expect("username"),
                team_name: TeamName::new("backend").expect("team"),
                open_reviews: 1,
                total_reviews: 3,
                assignment_count: 4,
                last_assigned_at: Some(fixed_time()),
            })
        });

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get()
            .uri("/users/stats?user_id=u1")
            .to_request();
        let body: UserStatsResponse = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.assignment_count, 4);
        assert_eq!(
            body.last_assigned_at.as_deref(),
            Some("2026-03-02T14:00:00+00:00")
        );
    }
}
