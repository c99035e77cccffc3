//! Launch sequence: resolve the real java, tune the arguments, hand off.

use std::convert::Infallible;
use std::ffi::OsString;

use tracing::{info, warn};

use crate::config::{HeapPercentage, LaunchConfig};
use crate::error::Result;
use crate::handoff::Handoff;
use crate::heuristics::TuningParameters;
use crate::inspect::SpecifiedFlags;
use crate::limits::ResourceLimits;
use crate::paths;
use crate::slots::ArgSlots;

/// `-Xms`, `-Xmx` and `-XX:ParallelGCThreads=`.
pub const EXTRA_SLOTS: usize = 3;

/// Run one launch. Returns only if the handoff fails or the real java cannot
/// be located.
pub fn run(
    config: &LaunchConfig,
    argv: Vec<OsString>,
    handoff: &mut impl Handoff,
) -> Result<Infallible> {
    let java = paths::real_java_path(&config.self_exe)?;

    if !config.use_cgroup {
        return handoff.replace(&java, &argv);
    }

    info!("Deferring to java executable at {}", java.display());
    let args = tuned_args(config, argv);
    info!("{}", display_args(&args));
    handoff.replace(&java, &args)
}

/// `argv` with cgroup-derived flags inserted after the program name.
///
/// An empty `argv` has no program name to keep in front and is returned as is.
///
/// # Panics
///
/// If more flags are derived than [`EXTRA_SLOTS`] can hold.
pub fn tuned_args(config: &LaunchConfig, argv: Vec<OsString>) -> Vec<OsString> {
    if argv.is_empty() {
        warn!("empty argument list, skipping cgroup tuning");
        return argv;
    }

    let specified = SpecifiedFlags::scan(&argv);
    let limits = ResourceLimits::detect_missing(&config.cgroup, specified);

    if !specified.heap && limits.memory_kb.is_some() && config.heap_percentage.is_none() {
        info!(
            "Using default RAM percentage of {}%",
            HeapPercentage::DEFAULT.get()
        );
    }
    let tuning = TuningParameters::derive(&limits, config.heap_percentage(), specified);

    let mut slots = ArgSlots::reserve(argv, EXTRA_SLOTS);
    for flag in tuning.flags() {
        let index = slots.insert(OsString::from(&flag));
        assert!(index.is_some(), "failed to inject {flag}: no free argument slot");
    }
    slots.compact()
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
