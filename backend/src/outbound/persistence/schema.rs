//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Teams; the roster is derived from `users.team_name`.
    teams (team_name) {
        /// Primary key.
        team_name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Team members.
    users (user_id) {
        /// Primary key supplied by the caller.
        user_id -> Varchar,
        /// Human-readable handle.
        username -> Varchar,
        /// Current team.
        team_name -> Varchar,
        /// Whether the user takes part in review rotation.
        is_active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pull requests without their reviewers.
    pull_requests (pull_request_id) {
        /// Primary key supplied by the caller.
        pull_request_id -> Varchar,
        /// Title.
        pull_request_name -> Varchar,
        /// Author (`users.user_id`).
        author_id -> Varchar,
        /// `OPEN` or `MERGED`.
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Set once on merge.
        merged_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency token, starting at 1.
        version -> Int4,
    }
}

diesel::table! {
    /// Assignment edges; `id` order is assignment order.
    pr_reviewers (id) {
        /// Surrogate key.
        id -> Int8,
        /// Reviewed pull request.
        pull_request_id -> Varchar,
        /// Reviewer.
        user_id -> Varchar,
        /// Time the reviewer was assigned.
        assigned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user assignment counters.
    assignment_stats (user_id) {
        /// Reviewer.
        user_id -> Varchar,
        /// Times picked as a reviewer.
        assignment_count -> Int8,
        /// Most recent pick.
        last_assigned_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(users -> teams (team_name));
diesel::joinable!(pull_requests -> users (author_id));
diesel::joinable!(pr_reviewers -> pull_requests (pull_request_id));
diesel::joinable!(pr_reviewers -> users (user_id));
diesel::joinable!(assignment_stats -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    teams,
    users,
    pull_requests,
    pr_reviewers,
    assignment_stats,
);
