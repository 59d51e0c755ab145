//! Skip policy for suites that need the embedded PostgreSQL cluster.
//!
//! Hosts that cannot run PostgreSQL opt out with `SKIP_TEST_CLUSTER=1`
//! (also `true` or `yes`). Without the opt-out a setup failure fails the
//! test so CI breakage stays visible.

const SKIP_VAR: &str = "SKIP_TEST_CLUSTER";

fn skip_requested(value: Option<&str>) -> bool {
    value.is_some_and(|raw| {
        let normalised = raw.trim().to_ascii_lowercase();
        matches!(normalised.as_str(), "1" | "true" | "yes")
    })
}

/// Returns `None` when the cluster is optional on this host, otherwise panics
/// with `reason`.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    let value = std::env::var(SKIP_VAR).ok();
    if skip_requested(value.as_deref()) {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        return None;
    }
    panic!("embedded PostgreSQL unavailable: {reason}. Set {SKIP_VAR}=1 to skip.");
}
