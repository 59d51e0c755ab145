//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed review entities and the services that
//! mutate them through transactional ports. Nothing here performs I/O
//! directly; adapters in `outbound` implement the driven ports and adapters
//! in `inbound` call the driving ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure with a stable code.
//! - User, Team, PullRequest: aggregates and their invariants.
//! - UserStats, TeamStats: statistics read models.
//! - TraceId: per-request correlation identifier.
//! - AssignmentWorkflow (in `review_assignment`), TeamService, UserService:
//!   driving port implementations.

pub mod error;
pub mod identifiers;
pub mod ports;
pub mod pull_request;
pub mod review_assignment;
pub mod stats;
pub mod team;
pub mod team_service;
pub mod trace_id;
pub mod transaction;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::identifiers::{
    IDENTIFIER_MAX, IdentifierValidationError, PullRequestId, PullRequestName, TeamName, UserId,
    Username,
};
pub use self::pull_request::{
    INITIAL_VERSION, PullRequest, PullRequestParts, PullRequestStatus, PullRequestValidationError,
};
pub use self::stats::{TeamStats, UserStats};
pub use self::team::{NewTeam, Team, TeamMember, TeamValidationError};
pub use self::team_service::TeamService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::User;
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use reviewer_service::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
