//! Container-aware ergonomics for a `java` launcher shim.
//!
//! The JVM sizes its heap and GC thread pool from the host's resources, which
//! inside a cgroup-limited container are the wrong numbers. This crate reads
//! the enclosing cgroup's memory and CPU limits, derives `-Xms`/`-Xmx` and
//! `-XX:ParallelGCThreads=` values, injects them into the argument list (unless
//! the caller already passed them) and replaces the current process with the
//! real java executable.
//!
//! Flow:
//! 1. [`LaunchConfig`] is built once from the environment
//! 2. [`launch::run`] resolves the real executable next to the shim
//! 3. [`limits`] reads the cgroup files, [`heuristics`] turns them into flags
//! 4. [`slots::ArgSlots`] places the flags right after the program name
//! 5. a [`Handoff`] replaces the process image

pub mod config;
pub mod error;
pub mod handoff;
pub mod heuristics;
pub mod inspect;
pub mod launch;
pub mod limits;
pub mod paths;
pub mod slots;

pub use config::{HeapPercentage, LaunchConfig};
pub use error::{LaunchError, Result};
pub use handoff::{Execv, Handoff};
pub use limits::ResourceLimits;
pub use paths::CgroupPaths;
