//! Heap size and GC thread count derived from container limits.

use tracing::info;

use crate::config::HeapPercentage;
use crate::inspect::{GC_THREADS_FLAG, MAX_HEAP_FLAG, MIN_HEAP_FLAG, SpecifiedFlags};
use crate::limits::ResourceLimits;

pub const ONE_GIG_KB: u64 = 1_048_576;
pub const TWO_GIG_KB: u64 = 2_097_152;
pub const MIN_HEAP_KB: u64 = 1024;

/// Heap for a container with `memory_kb` of memory.
///
/// JVM overhead outside the heap is modeled as half the container below 2 GiB
/// and a flat 1 GiB above it. The two branches meet at 2 GiB so the result
/// never drops as `memory_kb` grows.
pub fn heap_kb(memory_kb: u64, percentage: HeapPercentage) -> u64 {
    let pct = u64::from(percentage.get());
    let heap = if memory_kb < TWO_GIG_KB {
        memory_kb.saturating_mul(pct) / 200
    } else {
        (memory_kb - ONE_GIG_KB).saturating_mul(pct) / 100
    };
    heap.max(MIN_HEAP_KB)
}

/// OpenJDK's ParallelGCThreads ergonomics: one thread per core up to 4,
/// 5 threads for 5 to 7 cores, then 5/8 of the cores.
///
/// # Panics
///
/// When `cpus` is 0; the limit reader never reports fewer than one core.
pub fn gc_threads(cpus: u32) -> u32 {
    assert!(cpus >= 1, "should not have fewer than 1 core detected");
    match cpus {
        1..=4 => cpus,
        5..=7 => 5,
        _ => cpus.saturating_mul(5) / 8,
    }
}

/// Values to inject, `None` for anything left to the JVM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TuningParameters {
    pub heap_kb: Option<u64>,
    pub gc_threads: Option<u32>,
}

impl TuningParameters {
    /// Derive each parameter the caller did not set and the cgroup limits.
    pub fn derive(
        limits: &ResourceLimits,
        percentage: HeapPercentage,
        specified: SpecifiedFlags,
    ) -> Self {
        let heap_kb = if specified.heap {
            info!("Using found heap arguments");
            None
        } else if let Some(memory_kb) = limits.memory_kb {
            info!("Detected {memory_kb} KB of memory from cgroup");
            let heap = heap_kb(memory_kb, percentage);
            info!("Setting heap to {heap} KB");
            Some(heap)
        } else {
            info!("No cgroup memory limit detected.  Using JVM ergonomics");
            None
        };

        let gc_threads = if specified.gc_threads {
            info!("Using found GC thread arguments");
            None
        } else if let Some(cpus) = limits.cpus {
            info!("Detected {cpus} cores from cgroup");
            let threads = gc_threads(cpus);
            info!("Using {threads} GC threads");
            Some(threads)
        } else {
            info!("No cgroup CPU limit detected.  Using JVM ergonomics");
            None
        };

        Self {
            heap_kb,
            gc_threads,
        }
    }

    /// Command line flags in injection order: min heap, max heap, GC threads.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::with_capacity(3);
        if let Some(kb) = self.heap_kb {
            flags.push(format!("{MIN_HEAP_FLAG}{kb}k"));
            flags.push(format!("{MAX_HEAP_FLAG}{kb}k"));
        }
        if let Some(threads) = self.gc_threads {
            flags.push(format!("{GC_THREADS_FLAG}{threads}"));
        }
        flags
    }
}
