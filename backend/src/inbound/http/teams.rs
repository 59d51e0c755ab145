//! Team HTTP handlers.
//!
//! ```text
//! POST /team/add {"team_name":"backend","members":[{"user_id":"u1","username":"alice","is_active":true}]}
//! GET /team/get?team_name=backend
//! GET /team/stats?team_name=backend
//! ```

use std::collections::HashSet;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, NewTeam, TeamMember, TeamName, UserId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{TeamResponse, TeamStatsResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, duplicate_member_error, missing_field_error, parse_identifier,
};

const TEAM_NAME: FieldName = FieldName::new("team_name");
const MEMBERS: FieldName = FieldName::new("members");
const MEMBER_USER_ID: FieldName = FieldName::new("members.user_id");
const MEMBER_USERNAME: FieldName = FieldName::new("members.username");

/// Member entry of [`CreateTeamRequest`].
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TeamMemberRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
    /// Defaults to active when omitted.
    pub is_active: Option<bool>,
}

/// Request body for `POST /team/add`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateTeamRequest {
    pub team_name: Option<String>,
    pub members: Option<Vec<TeamMemberRequest>>,
}

/// Query string for team lookups.
#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: Option<String>,
}

/// Envelope for `POST /team/add`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamEnvelope {
    pub team: TeamResponse,
}

fn parse_member(member: TeamMemberRequest) -> Result<TeamMember, Error> {
    Ok(TeamMember {
        id: parse_identifier(member.user_id, MEMBER_USER_ID, UserId::new)?,
        username: parse_identifier(member.username, MEMBER_USERNAME, Username::new)?,
        is_active: member.is_active.unwrap_or(true),
    })
}

fn parse_create_team(payload: CreateTeamRequest) -> Result<NewTeam, Error> {
    let name = parse_identifier(payload.team_name, TEAM_NAME, TeamName::new)?;
    let members = payload
        .members
        .ok_or_else(|| missing_field_error(MEMBERS))?
        .into_iter()
        .map(parse_member)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        if !seen.insert(&member.id) {
            return Err(duplicate_member_error(
                MEMBER_USER_ID,
                index,
                member.id.as_str(),
            ));
        }
    }

    NewTeam::try_new(name, members).map_err(|err| Error::invalid_request(err.to_string()))
}

fn parse_team_query(query: TeamQuery) -> Result<TeamName, Error> {
    parse_identifier(query.team_name, TEAM_NAME, TeamName::new)
}

/// Create a team, creating or moving its members.
#[post("/team/add")]
pub async fn create_team(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTeamRequest>,
) -> ApiResult<HttpResponse> {
    let team = parse_create_team(payload.into_inner())?;
    let created = state.teams.create_team(team).await?;
    Ok(HttpResponse::Created().json(TeamEnvelope {
        team: TeamResponse::from(created),
    }))
}

/// Fetch a team with its members.
#[get("/team/get")]
pub async fn get_team(
    state: web::Data<HttpState>,
    query: web::Query<TeamQuery>,
) -> ApiResult<web::Json<TeamResponse>> {
    let name = parse_team_query(query.into_inner())?;
    let team = state.teams.team(&name).await?;
    Ok(web::Json(TeamResponse::from(team)))
}

/// Aggregate review statistics for a team.
#[get("/team/stats")]
pub async fn team_stats(
    state: web::Data<HttpState>,
    query: web::Query<TeamQuery>,
) -> ApiResult<web::Json<TeamStatsResponse>> {
    let name = parse_team_query(query.into_inner())?;
    let stats = state.teams.team_stats(&name).await?;
    Ok(web::Json(TeamStatsResponse::from(stats)))
}

#[cfg(test)]
#[path = "teams_tests.rs"]
mod tests;
