//! Tests for team handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{Team, TeamStats};
use crate::inbound::http::test_utils::{MockPorts, fixed_time, test_app, user};

fn backend_team() -> Team {
    Team {
        name: TeamName::new("backend").expect("team name"),
        members: vec![
            user("u1", "alice", "backend", true),
            user("u2", "bob", "backend", false),
        ],
        created_at: fixed_time(),
    }
}

async fn post_team(ports: MockPorts, body: Value) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let request = actix_test::TestRequest::post()
        .uri("/team/add")
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

#[actix_web::test]
async fn create_team_returns_created_roster() {
    let mut ports = MockPorts::default();
    ports
        .teams
        .expect_create_team()
        .withf(|team| {
            team.name().as_str() == "backend"
                && team.members().len() == 2
                && team.members().iter().any(|member| !member.is_active)
        })
        .times(1)
        .return_once(|_| Ok(backend_team()));

    let (status, body) = post_team(
        ports,
        json!({
            "team_name": "backend",
            "members": [
                {"user_id": "u1", "username": "alice", "is_active": true},
                {"user_id": "u2", "username": "bob", "is_active": false}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
    assert_eq!(body["team"]["members"][0]["user_id"], "u1");
    assert_eq!(body["team"]["members"][1]["is_active"], false);
}

#[actix_web::test]
async fn omitted_activity_defaults_to_active() {
    let mut ports = MockPorts::default();
    ports
        .teams
        .expect_create_team()
        .withf(|team| team.members().iter().all(|member| member.is_active))
        .return_once(|_| Ok(backend_team()));

    let (status, _) = post_team(
        ports,
        json!({"team_name": "backend", "members": [{"user_id": "u1", "username": "alice"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[rstest]
#[case::missing_name(json!({"members": []}), "team_name", "missing_field")]
#[case::blank_name(json!({"team_name": "  ", "members": []}), "team_name", "missing_field")]
#[case::missing_members(json!({"team_name": "backend"}), "members", "missing_field")]
#[case::member_without_id(
    json!({"team_name": "backend", "members": [{"username": "alice"}]}),
    "members.user_id",
    "missing_field"
)]
#[case::duplicate_member(
    json!({"team_name": "backend", "members": [
        {"user_id": "u1", "username": "alice"},
        {"user_id": "u1", "username": "alice2"}
    ]}),
    "members.user_id",
    "duplicate_member"
)]
#[actix_web::test]
async fn invalid_team_payloads_are_rejected(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let (status, body) = post_team(MockPorts::default(), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn existing_team_is_a_bad_request() {
    let mut ports = MockPorts::default();
    ports
        .teams
        .expect_create_team()
        .return_once(|_| Err(Error::team_exists("team backend already exists")));

    let (status, body) = post_team(
        ports,
        json!({"team_name": "backend", "members": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "team_exists");
}

#[actix_web::test]
async fn get_team_reads_query_string() {
    let mut ports = MockPorts::default();
    ports
        .teams
        .expect_team()
        .with(eq(TeamName::new("backend").expect("team name")))
        .return_once(|_| Ok(backend_team()));

    let app = actix_test::init_service(test_app(ports)).await;
    let request = actix_test::TestRequest::get()
        .uri("/team/get?team_name=backend")
        .to_request();
    let body: TeamResponse = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body, TeamResponse::from(backend_team()));
}

#[actix_web::test]
async fn unknown_team_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .teams
        .expect_team()
        .return_once(|_| Err(Error::not_found("team missing not found")));

    let app = actix_test::init_service(test_app(ports)).await;
    let request = actix_test::TestRequest::get()
        .uri("/team/get?team_name=missing")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn team_stats_are_serialised() {
    let mut ports = MockPorts::default();
    ports.teams.expect_team_stats().return_once(|name| {
        Ok(TeamStats {
            team_name: name.clone(),
            total_members: 3,
            active_members: 2,
            total_prs: 4,
            open_prs: 1,
            open_reviews: 2,
        })
    });

    let app = actix_test::init_service(test_app(ports)).await;
    let request = actix_test::TestRequest::get()
        .uri("/team/stats?team_name=backend")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(
        body,
        json!({
            "team_name": "backend",
            "total_members": 3,
            "active_members": 2,
            "total_prs": 4,
            "open_prs": 1,
            "open_reviews": 2
        })
    );
}
