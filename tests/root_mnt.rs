//! Properties 1 and 2 (spec.md §8): overlay isolation and `/tmp`
//! isolation. Needs real namespace/mount privileges.

use std::path::PathBuf;
use std::process::Command;

fn executor_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

#[test]
#[ignore]
fn bind_mode_write_is_visible_on_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "5", "--", "sh", "-c", "echo hi > marker.txt"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(
        dir.path().join("marker.txt").exists(),
        "overlay=false must bind /sand straight onto the host workdir, so writes persist"
    );
}

#[test]
#[ignore]
fn overlay_mode_write_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--overlay", "--tl", "5", "--", "sh", "-c", "echo hi > marker.txt"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(
        !dir.path().join("marker.txt").exists(),
        "overlay=true confines the write to an upper layer discarded with the mount namespace"
    );
}

#[test]
#[ignore]
fn overlay_mode_still_sees_preexisting_host_content() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("seed.txt"), b"seed\n").unwrap();
    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--overlay", "--tl", "5", "--", "cat", "seed.txt"])
        .status()
        .unwrap();
    assert!(
        status.success(),
        "overlay's lower layer should expose files that already existed on the host side"
    );
}

#[test]
#[ignore]
fn tmp_writes_never_reach_the_host_tmp() {
    let dir = tempfile::tempdir().unwrap();
    let marker = format!("/tmp/judge-sandbox-test-{}", std::process::id());
    let _ = std::fs::remove_file(&marker);

    let status = Command::new(executor_exe())
        .current_dir(dir.path())
        .args(["--tl", "5", "--", "sh", "-c", &format!("echo hi > {marker}")])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(
        !std::path::Path::new(&marker).exists(),
        "/tmp inside the sandbox must be private, never the host's /tmp"
    );
}
