//! Reads memory and CPU limits from cgroup v1 pseudo-files.
//!
//! Each file is read once into a small fixed-size buffer. Content that does
//! not end in a newline within the buffer did not fit, so the value is larger
//! than anything we care about and a cap is substituted instead of parsing a
//! truncated number. A file that cannot be opened means "no limit here" and
//! yields `None`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::inspect::SpecifiedFlags;
use crate::paths::CgroupPaths;

/// 12 digits plus newline.
pub const MEMORY_BUF_LEN: usize = 13;
/// CFS quota and period buffer.
pub const CFS_BUF_LEN: usize = 16;
/// `cpu.shares` is read through a shorter window.
pub const SHARES_BUF_LEN: usize = 8;

pub const MIN_MEMORY_KB: u64 = 1024;
/// Just under 1 PB / 1024, in KB.
pub const MAX_MEMORY_KB: u64 = 976_562_500;

pub const MIN_CPUS: u32 = 1;
pub const MAX_CPUS: u32 = 999;

/// Stand-in for a quota or period too long for [`CFS_BUF_LEN`].
pub const UNTERMINATED_CFS: i64 = 100_000_000_000_000;
/// Stand-in core count for a share value too long for [`SHARES_BUF_LEN`].
pub const UNTERMINATED_SHARES_CPUS: i64 = 10_000;

/// Conventional shares per whole core.
const SHARES_PER_CPU: i64 = 1024;

/// Container limits, `None` where the cgroup does not say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    pub memory_kb: Option<u64>,
    pub cpus: Option<u32>,
}

impl ResourceLimits {
    /// Read both limits from the cgroup hierarchy at `paths`.
    pub fn detect(paths: &CgroupPaths) -> Self {
        Self {
            memory_kb: read_memory_limit_kb(paths),
            cpus: read_cpu_count(paths),
        }
    }

    /// Read only the limits behind flags the caller did not set; the others
    /// stay `None` and their files are never opened.
    pub fn detect_missing(paths: &CgroupPaths, specified: SpecifiedFlags) -> Self {
        Self {
            memory_kb: if specified.heap {
                None
            } else {
                read_memory_limit_kb(paths)
            },
            cpus: if specified.gc_threads {
                None
            } else {
                read_cpu_count(paths)
            },
        }
    }
}

/// Outcome of reading one limit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    Value(i64),
    Unterminated,
}

/// Memory limit in KB, clamped to `[MIN_MEMORY_KB, MAX_MEMORY_KB]`.
pub fn read_memory_limit_kb(paths: &CgroupPaths) -> Option<u64> {
    let kb = match read_limit(&paths.memory_limit(), MEMORY_BUF_LEN)? {
        Reading::Value(bytes) => u64::try_from(bytes / 1024).unwrap_or(0),
        Reading::Unterminated => {
            warn!("Detected at least 1 TB of RAM, cap is kicking in");
            MAX_MEMORY_KB
        }
    };

    Some(kb.clamp(MIN_MEMORY_KB, MAX_MEMORY_KB))
}

/// Whole cores available, clamped to `[MIN_CPUS, MAX_CPUS]`.
///
/// CFS quota/period wins when a positive quota is set; otherwise the share
/// count is used at 1024 shares per core.
pub fn read_cpu_count(paths: &CgroupPaths) -> Option<u32> {
    let cores = match cfs_cores(paths) {
        Some(cores) => cores,
        None => shares_cores(paths)?,
    };

    let cores = cores.clamp(i64::from(MIN_CPUS), i64::from(MAX_CPUS));
    Some(u32::try_from(cores).unwrap_or(MAX_CPUS))
}

fn cfs_cores(paths: &CgroupPaths) -> Option<i64> {
    let quota = match read_limit(&paths.cfs_quota(), CFS_BUF_LEN)? {
        Reading::Value(quota) => quota,
        Reading::Unterminated => {
            warn!("Detected very large quota, cap is kicking in");
            UNTERMINATED_CFS
        }
    };

    if quota <= 0 {
        debug!(quota, "no CFS quota set");
        return None;
    }

    let period = match read_limit(&paths.cfs_period(), CFS_BUF_LEN) {
        Some(Reading::Value(period)) if period > 0 => period,
        Some(Reading::Value(period)) => {
            warn!(period, "unusable CFS period, falling back to CPU shares");
            return None;
        }
        Some(Reading::Unterminated) => {
            warn!("Detected very large period, cap is kicking in");
            UNTERMINATED_CFS
        }
        None => {
            warn!("CFS quota set without a readable period, falling back to CPU shares");
            return None;
        }
    };

    Some(quota / period)
}

fn shares_cores(paths: &CgroupPaths) -> Option<i64> {
    match read_limit(&paths.cpu_shares(), SHARES_BUF_LEN)? {
        Reading::Value(shares) => Some(shares / SHARES_PER_CPU),
        Reading::Unterminated => {
            warn!("Detected very large CPU share, cap is kicking in");
            Some(UNTERMINATED_SHARES_CPUS)
        }
    }
}

/// Single bounded read of at most `buf_len` bytes.
fn read_limit(path: &Path, buf_len: usize) -> Option<Reading> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "limit file unavailable");
            return None;
        }
    };

    let mut buf = Vec::with_capacity(buf_len);
    let limit = u64::try_from(buf_len).unwrap_or(u64::MAX);
    if let Err(e) = file.take(limit).read_to_end(&mut buf) {
        warn!(path = %path.display(), error = %e, "failed to read limit file");
        return None;
    }

    match buf.split_last() {
        Some((b'\n', digits)) => Some(Reading::Value(parse_leading_int(digits))),
        Some(_) => Some(Reading::Unterminated),
        None => {
            warn!(path = %path.display(), "empty limit file");
            None
        }
    }
}

/// Parse like C `atol`: skip leading whitespace, optional sign, then digits up
/// to the first non-digit. No digits reads as 0; overflow saturates.
pub fn parse_leading_int(raw: &[u8]) -> i64 {
    let mut rest = raw;
    while let Some((c, tail)) = rest.split_first()
        && c.is_ascii_whitespace()
    {
        rest = tail;
    }

    let negative = match rest.split_first() {
        Some((b'-', tail)) => {
            rest = tail;
            true
        }
        Some((b'+', tail)) => {
            rest = tail;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for c in rest.iter().take_while(|c| c.is_ascii_digit()) {
        let digit = i64::from(c - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
