//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`ReviewStore`] and its sub-stores) describe what the domain
//! needs from persistence. Driving ports ([`PullRequestCommand`],
//! [`TeamDirectory`], [`UserDirectory`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod pull_request_command;
mod review_store;
mod team_directory;
mod user_directory;

#[cfg(test)]
pub use pull_request_command::MockPullRequestCommand;
pub use pull_request_command::{CreatePullRequest, PullRequestCommand, Reassignment};
pub use review_store::{
    PullRequestStore, ReviewCounts, ReviewStore, ReviewTransaction, StatsStore, StoreError,
    TeamStore, UserStore,
};
#[cfg(test)]
pub use team_directory::MockTeamDirectory;
pub use team_directory::TeamDirectory;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
