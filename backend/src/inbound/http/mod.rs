//! HTTP inbound adapter exposing the review REST endpoints.

pub mod dto;
pub mod error;
pub mod health;
pub mod pull_requests;
pub mod state;
pub mod teams;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the review routes and extractor configuration.
///
/// Health probes are registered separately by the server so they stay
/// reachable regardless of the review state.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use reviewer_service::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .service(teams::create_team)
        .service(teams::get_team)
        .service(teams::team_stats)
        .service(users::set_is_active)
        .service(users::get_reviews)
        .service(users::user_stats)
        .service(pull_requests::create_pull_request)
        .service(pull_requests::merge_pull_request)
        .service(pull_requests::reassign_reviewer);
}
