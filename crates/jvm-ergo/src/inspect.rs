//! Detects heap and GC thread flags the caller already passed.
//!
//! Only the leading option block is inspected: scanning starts after the
//! program name and stops at the first argument that does not start with `-`
//! (the main class, `-jar` target, or anything else that is not a JVM option).

use std::ffi::OsStr;

/// `-Xms<size>`
pub const MIN_HEAP_FLAG: &str = "-Xms";
/// `-Xmx<size>`
pub const MAX_HEAP_FLAG: &str = "-Xmx";
/// `-XX:ParallelGCThreads=<n>`
pub const GC_THREADS_FLAG: &str = "-XX:ParallelGCThreads=";

/// Which tunables the caller set explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecifiedFlags {
    pub heap: bool,
    pub gc_threads: bool,
}

impl SpecifiedFlags {
    pub fn scan<S: AsRef<OsStr>>(args: &[S]) -> Self {
        Self {
            heap: has_heap_flag(args),
            gc_threads: has_gc_threads_flag(args),
        }
    }
}

/// `-Xms...` or `-Xmx...` among the leading options.
pub fn has_heap_flag<S: AsRef<OsStr>>(args: &[S]) -> bool {
    scan_options(args, |arg| {
        arg.starts_with(MIN_HEAP_FLAG.as_bytes()) || arg.starts_with(MAX_HEAP_FLAG.as_bytes())
    })
}

/// `-XX:ParallelGCThreads=...` among the leading options.
pub fn has_gc_threads_flag<S: AsRef<OsStr>>(args: &[S]) -> bool {
    scan_options(args, |arg| arg.starts_with(GC_THREADS_FLAG.as_bytes()))
}

fn scan_options<S: AsRef<OsStr>>(args: &[S], matches: impl Fn(&[u8]) -> bool) -> bool {
    for arg in args.iter().skip(1) {
        let arg = arg.as_ref().as_encoded_bytes();
        if matches(arg) {
            return true;
        }
        if arg.first() != Some(&b'-') {
            break;
        }
    }
    false
}
