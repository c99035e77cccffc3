//! Drop-in `java` that sizes the JVM for its container.
//!
//! Installed in place of the `java` binary, with the real one renamed to
//! `origjava` in the same directory. With `JAVA_USE_CGROUP=yes` the cgroup
//! memory and CPU limits are turned into `-Xms`/`-Xmx` and
//! `-XX:ParallelGCThreads=` flags (unless already given) before exec'ing the
//! real java. Otherwise the arguments pass through untouched.

use std::process::ExitCode;

use jvm_ergo::{Execv, LaunchConfig};
use tracing_subscriber::fmt::MakeWriter;

/// Plain progress lines: stdout is shared with the java process we become.
fn subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_level(false)
        .with_target(false)
        .without_time()
        .finish()
}

fn main() -> ExitCode {
    let _ = tracing::subscriber::set_global_default(subscriber(std::io::stdout));

    let config = LaunchConfig::from_env();
    let argv = std::env::args_os().collect();

    match jvm_ergo::launch::run(&config, argv, &mut Execv) {
        Ok(never) => match never {},
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
