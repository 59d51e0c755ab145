//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{MockPullRequestCommand, MockTeamDirectory, MockUserDirectory};
use crate::domain::{TeamName, User, UserId, Username};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;

/// Mocks for each driving port; unset mocks panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub pull_requests: MockPullRequestCommand,
    pub teams: MockTeamDirectory,
    pub users: MockUserDirectory,
}

/// Build an app with the review routes over the given mocks.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(ports.pull_requests),
        Arc::new(ports.teams),
        Arc::new(ports.users),
    );
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn user(id: &str, name: &str, team: &str, is_active: bool) -> User {
    User::new(
        UserId::new(id).expect("user id"),
        Username::new(name).expect("username"),
        TeamName::new(team).expect("team name"),
        is_active,
    )
}
