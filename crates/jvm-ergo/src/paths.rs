//! Filesystem locations the launcher reads: cgroup v1 limit files and the
//! shim's own executable link.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LaunchError, Result};

/// Mount point of the cgroup v1 hierarchy.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Link to the running executable.
pub const SELF_EXE: &str = "/proc/self/exe";

/// File name of the real java binary, installed next to the shim.
pub const REAL_JAVA_NAME: &str = "origjava";

/// Size of the path buffer the resolved link must fit in.
pub const MAX_PATH: usize = 4096;

/// Longest self path accepted; the rest of the buffer is kept for the sibling name.
pub const MAX_SELF_PATH: usize = MAX_PATH - 9;

/// Limit files under a cgroup v1 root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupPaths {
    root: PathBuf,
}

impl Default for CgroupPaths {
    fn default() -> Self {
        Self::new(PathBuf::from(CGROUP_ROOT))
    }
}

impl CgroupPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `memory/memory.limit_in_bytes`
    pub fn memory_limit(&self) -> PathBuf {
        self.root.join("memory").join("memory.limit_in_bytes")
    }

    /// `cpu/cpu.cfs_quota_us`
    pub fn cfs_quota(&self) -> PathBuf {
        self.root.join("cpu").join("cpu.cfs_quota_us")
    }

    /// `cpu/cpu.cfs_period_us`
    pub fn cfs_period(&self) -> PathBuf {
        self.root.join("cpu").join("cpu.cfs_period_us")
    }

    /// `cpu/cpu.shares`
    pub fn cpu_shares(&self) -> PathBuf {
        self.root.join("cpu").join("cpu.shares")
    }
}

/// Resolve the real java binary: follow `self_exe` and swap the final path
/// segment for [`REAL_JAVA_NAME`].
pub fn real_java_path(self_exe: &Path) -> Result<PathBuf> {
    let resolved = std::fs::read_link(self_exe).map_err(|source| LaunchError::SelfExe {
        path: self_exe.to_path_buf(),
        source,
    })?;

    let len = resolved.as_os_str().len();
    if len > MAX_SELF_PATH {
        return Err(LaunchError::PathTooLong {
            len,
            max: MAX_SELF_PATH,
        });
    }

    let real = resolved.with_file_name(REAL_JAVA_NAME);
    debug!(shim = %resolved.display(), real = %real.display(), "resolved java executable");
    Ok(real)
}
