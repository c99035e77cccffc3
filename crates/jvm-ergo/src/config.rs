//! Launch configuration, read from the environment once at startup.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::limits::parse_leading_int;
use crate::paths::{CgroupPaths, SELF_EXE};

/// Enables cgroup-derived tuning when set to exactly `yes`.
pub const USE_CGROUP_VAR: &str = "JAVA_USE_CGROUP";

/// Percentage of the usable container memory given to the heap.
pub const HEAP_PERCENTAGE_VAR: &str = "JAVA_HEAP_PERCENTAGE";

/// Heap fraction as a whole percentage in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapPercentage(u8);

impl HeapPercentage {
    pub const DEFAULT: Self = Self(90);
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(100);

    /// Clamp any integer into `1..=100`.
    pub fn clamped(raw: i64) -> Self {
        let pct = raw.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(u8::try_from(pct).unwrap_or(Self::MAX.0))
    }

    /// Parse the leading integer of `raw`; garbage reads as 0 and lands on the floor.
    pub fn parse(raw: &OsStr) -> Self {
        Self::clamped(parse_leading_int(raw.as_encoded_bytes()))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HeapPercentage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the orchestrator needs for one invocation. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// `JAVA_USE_CGROUP=yes`
    pub use_cgroup: bool,
    /// `JAVA_HEAP_PERCENTAGE`, `None` when unset.
    pub heap_percentage: Option<HeapPercentage>,
    pub cgroup: CgroupPaths,
    pub self_exe: PathBuf,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            use_cgroup: false,
            heap_percentage: None,
            cgroup: CgroupPaths::default(),
            self_exe: PathBuf::from(SELF_EXE),
        }
    }
}

impl LaunchConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build from an arbitrary variable lookup, with default file locations.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let use_cgroup = lookup(USE_CGROUP_VAR).is_some_and(|v| v == "yes");
        let heap_percentage = lookup(HEAP_PERCENTAGE_VAR).map(|v| HeapPercentage::parse(&v));

        Self {
            use_cgroup,
            heap_percentage,
            ..Self::default()
        }
    }

    /// Effective heap percentage, falling back to [`HeapPercentage::DEFAULT`].
    pub fn heap_percentage(&self) -> HeapPercentage {
        self.heap_percentage.unwrap_or_default()
    }
}
