//! The `clean`/`comm`/`last` protocol round trip (spec.md §4.6) against
//! a real worker process. Needs real namespace/mount/cgroup privileges.

use judge_sandbox::{RunRequest, Supervisor};
use std::path::PathBuf;

fn executor_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

#[test]
#[ignore]
fn one_worker_serves_two_comms_in_sequence() {
    let run_dir = tempfile::tempdir().unwrap();
    let files_dir = run_dir.path();
    let mut sup = Supervisor::spawn(&executor_exe(), files_dir).unwrap();

    sup.clean().unwrap();
    let r1 = sup
        .comm(
            &RunRequest::new("echo hello", 2.0)
                .stdout("o1.txt")
                .get_files(["o1.txt".to_string()]),
            files_dir,
        )
        .unwrap();
    assert!(!r1.is_failed());
    assert_eq!(std::fs::read(files_dir.join("o1.txt")).unwrap(), b"hello\n");

    sup.clean().unwrap();
    let r2 = sup
        .comm(
            &RunRequest::new("echo world", 2.0)
                .stdout("o2.txt")
                .get_files(["o2.txt".to_string()]),
            files_dir,
        )
        .unwrap();
    assert!(!r2.is_failed());
    assert_eq!(std::fs::read(files_dir.join("o2.txt")).unwrap(), b"world\n");

    sup.last().unwrap();
}

#[test]
#[ignore]
fn clean_removes_judge_owned_leftovers_between_comms() {
    let run_dir = tempfile::tempdir().unwrap();
    let files_dir = run_dir.path();
    let mut sup = Supervisor::spawn(&executor_exe(), files_dir).unwrap();

    sup.clean().unwrap();
    let leftover = sup
        .comm(
            &RunRequest::new("touch leftover.txt", 2.0).overlay(false),
            files_dir,
        )
        .unwrap();
    assert!(!leftover.is_failed());
    assert!(files_dir.join("sand").join("leftover.txt").exists());

    sup.clean().unwrap();
    assert!(
        !files_dir.join("sand").join("leftover.txt").exists(),
        "clean should wipe judge-user-owned files left behind by the previous comm"
    );

    sup.last().unwrap();
}
