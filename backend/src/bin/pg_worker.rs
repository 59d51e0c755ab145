//! Privileged helper for the embedded PostgreSQL used by integration tests.
//!
//! When tests run as root, `pg_embedded_setup_unpriv` drops privileges by
//! re-executing this binary as `pg_worker <setup|start|stop> <payload.json>`.
//! The payload is a serialised [`WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let invocation = Invocation::from_args(env::args_os())?;
    invocation.run()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Setup,
    Start,
    Stop,
}

impl Lifecycle {
    fn from_arg(raw: &OsString) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown lifecycle step '{other}' (expected setup, start or stop)"
            )),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

#[derive(Debug)]
struct Invocation {
    step: Lifecycle,
    payload_path: PathBuf,
}

impl Invocation {
    fn from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter().skip(1);
        let step = args
            .next()
            .ok_or_else(|| eyre!("missing lifecycle step"))
            .and_then(|raw| Lifecycle::from_arg(&raw))?;
        let payload_path = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("missing payload path"))?;
        if let Some(extra) = args.next() {
            return Err(eyre!(
                "unexpected argument '{}' after payload path",
                extra.to_string_lossy()
            ));
        }
        Ok(Self { step, payload_path })
    }

    fn run(self) -> Result<()> {
        let payload = read_payload(&self.payload_path)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| Report::new(err).wrap_err("rebuild postgres settings"))?;
        export_environment(payload.environment);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("build worker runtime")?;
        let mut postgres = PostgreSQL::new(settings);
        let step = self.step;
        runtime
            .block_on(async move {
                match step {
                    Lifecycle::Setup => postgres.setup().await,
                    Lifecycle::Start => postgres.start().await,
                    Lifecycle::Stop => postgres.stop().await,
                }
            })
            .with_context(|| format!("postgres {step} failed"))
    }
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = std::fs::read(path).with_context(|| format!("read payload {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse payload {}", path.display()))
}

fn export_environment(vars: Vec<(String, Option<PlainSecret>)>) {
    for (key, value) in vars {
        // SAFETY: the worker is single-threaded until the runtime is built.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::setup("setup", Lifecycle::Setup)]
    #[case::start("start", Lifecycle::Start)]
    #[case::stop("stop", Lifecycle::Stop)]
    fn parses_each_lifecycle_step(#[case] raw: &str, #[case] expected: Lifecycle) {
        let invocation =
            Invocation::from_args(args(&["pg_worker", raw, "/tmp/payload.json"])).expect("parse");
        assert_eq!(invocation.step, expected);
        assert_eq!(invocation.payload_path, PathBuf::from("/tmp/payload.json"));
    }

    #[rstest]
    #[case::unknown_step(&["pg_worker", "restart", "/tmp/payload.json"], "unknown lifecycle step")]
    #[case::missing_payload(&["pg_worker", "start"], "missing payload path")]
    #[case::extra_argument(&["pg_worker", "stop", "/tmp/p.json", "now"], "unexpected argument")]
    fn rejects_malformed_invocations(#[case] raw: &[&str], #[case] message: &str) {
        let err = Invocation::from_args(args(raw)).expect_err("invocation should fail");
        assert!(err.to_string().contains(message), "{err}");
    }
}
