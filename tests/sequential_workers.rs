//! S6 (spec.md §8), exercised the way spec.md §5's chosen concurrency
//! model actually guarantees it: the singleton `lib-judge` cgroup makes
//! "one worker per host process" safe one at a time, not with two
//! workers racing `CgroupController::setup`/`teardown` on the same
//! controller directories. Needs real namespace/mount/cgroup
//! privileges.

use judge_sandbox::{RunRequest, Status, Supervisor};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn executor_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

#[test]
#[ignore]
fn two_independent_workers_each_produce_their_own_expected_result() {
    let dir_a = tempfile::tempdir().unwrap();
    let files_a = dir_a.path();
    let mut sup_a = Supervisor::spawn(&executor_exe(), files_a).unwrap();
    sup_a.clean().unwrap();
    let start = Instant::now();
    let result_a = sup_a.comm(&RunRequest::new("sleep 5", 1.0), files_a).unwrap();
    let elapsed = start.elapsed();
    sup_a.last().unwrap();

    assert_eq!(result_a.status, Status::Tle);
    assert!(elapsed < Duration::from_secs(3));

    let dir_b = tempfile::tempdir().unwrap();
    let files_b = dir_b.path();
    let mut sup_b = Supervisor::spawn(&executor_exe(), files_b).unwrap();
    sup_b.clean().unwrap();
    let result_b = sup_b
        .comm(
            &RunRequest::new("echo hello", 2.0).stdout("o.txt"),
            files_b,
        )
        .unwrap();
    sup_b.last().unwrap();

    assert!(!result_b.is_failed());
    assert_eq!(std::fs::read(files_b.join("o.txt")).unwrap(), b"hello\n");
}
