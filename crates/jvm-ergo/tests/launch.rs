//! End-to-end launches against fake cgroup trees, with the exec intercepted.

use std::convert::Infallible;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jvm_ergo::launch;
use jvm_ergo::{CgroupPaths, Handoff, HeapPercentage, LaunchConfig, LaunchError};
use tempfile::TempDir;

/// Records the handoff instead of replacing the test process.
#[derive(Default)]
struct Recorder {
    calls: Vec<(PathBuf, Vec<OsString>)>,
}

impl Handoff for Recorder {
    fn replace(&mut self, program: &Path, argv: &[OsString]) -> jvm_ergo::Result<Infallible> {
        self.calls.push((program.to_path_buf(), argv.to_vec()));
        Err(LaunchError::Exec {
            program: program.to_path_buf(),
            source: nix::Error::ENOSYS,
        })
    }
}

/// A temp dir holding a `/proc/self/exe` stand-in and a cgroup v1 tree.
struct FakeHost {
    dir: TempDir,
}

impl FakeHost {
    fn new() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("cgroup/memory"))?;
        fs::create_dir_all(dir.path().join("cgroup/cpu"))?;
        std::os::unix::fs::symlink(dir.path().join("jdk/bin/java"), dir.path().join("exe"))?;
        Ok(Self { dir })
    }

    fn cgroup(&self, rel: &str, content: &str) -> io::Result<&Self> {
        fs::write(self.dir.path().join("cgroup").join(rel), content)?;
        Ok(self)
    }

    fn config(&self, use_cgroup: bool) -> LaunchConfig {
        LaunchConfig {
            use_cgroup,
            heap_percentage: None,
            cgroup: CgroupPaths::new(self.dir.path().join("cgroup")),
            self_exe: self.dir.path().join("exe"),
        }
    }

    fn real_java(&self) -> PathBuf {
        self.dir.path().join("jdk/bin/origjava")
    }
}

fn args(list: &[&str]) -> Vec<OsString> {
    list.iter().map(OsString::from).collect()
}

/// Run a launch and return the error it stopped with plus every recorded handoff.
fn launch_recorded(
    config: &LaunchConfig,
    argv: Vec<OsString>,
) -> (LaunchError, Vec<(PathBuf, Vec<OsString>)>) {
    let mut recorder = Recorder::default();
    let err = match launch::run(config, argv, &mut recorder) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    (err, recorder.calls)
}

#[test]
fn disabled_toggle_passes_arguments_through() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();
    host.cgroup("cpu/cpu.shares", "4096\n").unwrap();
    let argv = args(&["java", "-cp", "app.jar", "Main"]);

    let (err, calls) = launch_recorded(&host.config(false), argv.clone());

    assert!(matches!(err, LaunchError::Exec { .. }));
    assert_eq!(calls, vec![(host.real_java(), argv)]);
}

#[test]
fn one_gig_container_gets_small_heap() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();

    let (_, calls) = launch_recorded(&host.config(true), args(&["java", "Main"]));

    assert_eq!(
        calls,
        vec![(
            host.real_java(),
            args(&["java", "-Xms471859k", "-Xmx471859k", "Main"])
        )]
    );
}

#[test]
fn heap_and_gc_threads_are_both_injected() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "4294967296\n").unwrap();
    host.cgroup("cpu/cpu.cfs_quota_us", "800000\n").unwrap();
    host.cgroup("cpu/cpu.cfs_period_us", "100000\n").unwrap();

    let (_, calls) = launch_recorded(&host.config(true), args(&["java", "-jar", "app.jar"]));

    assert_eq!(
        calls,
        vec![(
            host.real_java(),
            args(&[
                "java",
                "-Xms2831155k",
                "-Xmx2831155k",
                "-XX:ParallelGCThreads=5",
                "-jar",
                "app.jar",
            ])
        )]
    );
}

#[test]
fn explicit_heap_is_left_alone() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();
    host.cgroup("cpu/cpu.shares", "8192\n").unwrap();

    let (_, calls) = launch_recorded(&host.config(true), args(&["java", "-Xmx2g", "Main"]));

    assert_eq!(
        calls,
        vec![(
            host.real_java(),
            args(&["java", "-XX:ParallelGCThreads=5", "-Xmx2g", "Main"])
        )]
    );
}

#[test]
fn explicit_flags_leave_arguments_unchanged() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();
    host.cgroup("cpu/cpu.shares", "8192\n").unwrap();
    let argv = args(&["java", "-Xms1g", "-XX:ParallelGCThreads=2", "Main"]);

    let (_, calls) = launch_recorded(&host.config(true), argv.clone());

    assert_eq!(calls, vec![(host.real_java(), argv)]);
}

#[test]
fn heap_flag_after_main_class_does_not_count() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();

    let (_, calls) = launch_recorded(&host.config(true), args(&["java", "Main", "-Xmx2g"]));

    assert_eq!(
        calls,
        vec![(
            host.real_java(),
            args(&["java", "-Xms471859k", "-Xmx471859k", "Main", "-Xmx2g"])
        )]
    );
}

#[test]
fn no_cgroup_defers_to_jvm_ergonomics() {
    let host = FakeHost::new().unwrap();
    let argv = args(&["java", "-version"]);

    let (_, calls) = launch_recorded(&host.config(true), argv.clone());

    assert_eq!(calls, vec![(host.real_java(), argv)]);
}

#[test]
fn heap_percentage_override_is_applied() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "4294967296\n").unwrap();
    let config = LaunchConfig {
        heap_percentage: Some(HeapPercentage::clamped(50)),
        ..host.config(true)
    };

    let (_, calls) = launch_recorded(&config, args(&["java", "Main"]));

    assert_eq!(
        calls,
        vec![(
            host.real_java(),
            args(&["java", "-Xms1572864k", "-Xmx1572864k", "Main"])
        )]
    );
}

#[test]
fn empty_argv_is_handed_off_untouched() {
    let host = FakeHost::new().unwrap();
    host.cgroup("memory/memory.limit_in_bytes", "1073741824\n").unwrap();

    let (_, calls) = launch_recorded(&host.config(true), Vec::new());

    assert_eq!(calls, vec![(host.real_java(), Vec::new())]);
}

#[test]
fn unresolvable_self_exe_never_hands_off() {
    let host = FakeHost::new().unwrap();
    let config = LaunchConfig {
        self_exe: host.dir.path().join("missing"),
        ..host.config(false)
    };

    let (err, calls) = launch_recorded(&config, args(&["java"]));

    assert!(matches!(err, LaunchError::SelfExe { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(calls.is_empty());
}
