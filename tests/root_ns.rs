//! Property 4 (spec.md §8): fork-bomb containment, plus the private
//! network namespace. Needs real namespace/cgroup privileges.

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

fn executor_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

#[test]
#[ignore]
fn fork_bomb_is_killed_as_a_timeout_and_does_not_wedge_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "2", "--", "sh", "-c", ":(){ :|:& };:"])
        .status()
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(
        status.code(),
        Some(124),
        "a fork bomb never exits on its own, so it should be killed as a timeout"
    );
    assert!(
        elapsed < Duration::from_secs(10),
        "killing pid 1 of the sandbox's pid namespace must reap the whole forked tree promptly"
    );
}

#[test]
#[ignore]
fn fork_bomb_does_not_block_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let _ = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "1", "--", "sh", "-c", ":(){ :|:& };:"])
        .status()
        .unwrap();

    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "2", "--", "true"])
        .status()
        .unwrap();
    assert!(
        status.success(),
        "a trivial run right after a contained fork bomb must still succeed"
    );
}

#[test]
#[ignore]
fn private_network_namespace_has_no_route_beyond_loopback() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "5", "--", "sh", "-c", "ping -c1 -W1 1.1.1.1"])
        .status()
        .unwrap();
    assert!(
        !status.success(),
        "a fresh network namespace should have no route to the internet"
    );
}
