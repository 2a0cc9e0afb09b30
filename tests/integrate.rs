//! S4 (spec.md §8): compile a submission, then run the compiled
//! artifact, across two `comm`s on one long-lived worker. Also covers
//! property 7 (missing declared artifact forces RE). Needs real
//! namespace/mount/cgroup privileges.

use judge_sandbox::{RunRequest, Status, Supervisor};
use std::path::PathBuf;

fn executor_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

#[test]
#[ignore]
fn s4_compile_then_run_hello_world() {
    let run_dir = tempfile::tempdir().unwrap();
    let files_dir = run_dir.path();
    std::fs::write(
        files_dir.join("Hello.cpp"),
        b"#include <cstdio>\nint main() { printf(\"Hello, World!\\n\"); return 0; }\n",
    )
    .unwrap();

    let mut sup = Supervisor::spawn(&executor_exe(), files_dir).unwrap();
    sup.clean().unwrap();

    let compile = RunRequest::new("g++ Hello.cpp", 20.0)
        .overlay(false)
        .send_files(["Hello.cpp".to_string()])
        .get_files(["a.out".to_string()]);
    let compiled = sup.comm(&compile, files_dir).unwrap();
    assert!(!compiled.is_failed(), "g++ should compile Hello.cpp successfully");
    assert!(files_dir.join("a.out").exists());

    sup.clean().unwrap();
    let run = RunRequest::new("./a.out", 2.0)
        .overlay(true)
        .stdout("out.txt")
        .send_files(["a.out".to_string()])
        .get_files(["out.txt".to_string()]);
    let ran = sup.comm(&run, files_dir).unwrap();
    assert!(!ran.is_failed());
    assert_eq!(
        std::fs::read(files_dir.join("out.txt")).unwrap(),
        b"Hello, World!\n"
    );

    sup.last().unwrap();
}

#[test]
#[ignore]
fn property7_missing_declared_artifact_forces_re() {
    let run_dir = tempfile::tempdir().unwrap();
    let files_dir = run_dir.path();
    let mut sup = Supervisor::spawn(&executor_exe(), files_dir).unwrap();
    sup.clean().unwrap();

    let req = RunRequest::new("true", 2.0).get_files(["a.out".to_string()]);
    let r = sup.comm(&req, files_dir).unwrap();
    assert_eq!(
        r.status,
        Status::Re,
        "a get_files entry the command never produced forces status=RE regardless of exit code"
    );
    sup.last().unwrap();
}
