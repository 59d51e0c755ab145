//! Reviewer assignment engine.
//!
//! - [`ReviewerSelector`]: ranks candidates by open-review workload.
//! - [`WorkloadOracle`]: reads workload through the caller's transaction.
//! - [`RandomSource`]: injected tie-break randomness.
//! - [`AssignmentWorkflow`]: create, merge and reassign as atomic
//!   transactions.

mod random;
mod selector;
mod workflow;
mod workload;

pub use random::{EntropyRandom, RandomSource, SeededRandom};
pub use selector::{MAX_REVIEWERS, ReviewerSelector};
pub use workflow::AssignmentWorkflow;
pub use workload::{Workload, WorkloadOracle};
