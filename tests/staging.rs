//! Unprivileged tests for the File-Staging Layer (C7). No namespace,
//! mount, or cgroup access needed, so these run without `#[ignore]`.

use judge_sandbox::internal::staging;
use judge_sandbox::{Error, RunResult, Status};

#[test]
fn stage_in_copies_declared_files() {
    let sand = tempfile::tempdir().unwrap();
    let from = tempfile::tempdir().unwrap();
    std::fs::write(from.path().join("a.txt"), b"hello").unwrap();

    staging::stage_in(sand.path(), from.path(), &["a.txt".to_string()]).unwrap();
    assert_eq!(std::fs::read(sand.path().join("a.txt")).unwrap(), b"hello");
}

#[test]
fn stage_in_rejects_path_escape() {
    let sand = tempfile::tempdir().unwrap();
    let from = tempfile::tempdir().unwrap();
    std::fs::write(from.path().join("secret.txt"), b"nope").unwrap();

    let err = staging::stage_in(sand.path(), from.path(), &["../secret.txt".to_string()])
        .expect_err("a send_files entry that climbs out of the staging dir must be rejected");
    assert!(matches!(err, Error::PathEscape(_)));
}

#[test]
fn stage_out_copies_declared_files() {
    let sand = tempfile::tempdir().unwrap();
    let to = tempfile::tempdir().unwrap();
    std::fs::write(sand.path().join("a.out"), b"binary").unwrap();
    let mut result = RunResult::ok(0, 0.01, 1024);

    staging::stage_out(sand.path(), to.path(), &["a.out".to_string()], &mut result).unwrap();
    assert_eq!(std::fs::read(to.path().join("a.out")).unwrap(), b"binary");
    assert_eq!(result.status, Status::Ok);
}

#[test]
fn stage_out_forces_re_on_missing_artifact() {
    let sand = tempfile::tempdir().unwrap();
    let to = tempfile::tempdir().unwrap();
    let mut result = RunResult::ok(0, 0.01, 1024);

    staging::stage_out(sand.path(), to.path(), &["a.out".to_string()], &mut result).unwrap();
    assert_eq!(
        result.status,
        Status::Re,
        "a declared artifact the command never produced must force status=RE"
    );
}

#[test]
fn stage_out_rejects_symlink_artifacts() {
    let sand = tempfile::tempdir().unwrap();
    let to = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink("/etc/passwd", sand.path().join("a.out")).unwrap();
    let mut result = RunResult::ok(0, 0.01, 1024);

    staging::stage_out(sand.path(), to.path(), &["a.out".to_string()], &mut result).unwrap();
    assert_eq!(
        result.status,
        Status::Re,
        "symlinked artifacts must not be followed across the staging boundary"
    );
    assert!(!to.path().join("a.out").exists());
}

#[test]
fn clean_removes_only_entries_owned_by_the_given_uid() {
    let sand = tempfile::tempdir().unwrap();
    std::fs::write(sand.path().join("mine.txt"), b"x").unwrap();
    std::fs::create_dir(sand.path().join("mine_dir")).unwrap();

    let my_uid = nix::unistd::getuid().as_raw();
    staging::clean(sand.path(), my_uid).unwrap();

    assert!(!sand.path().join("mine.txt").exists());
    assert!(!sand.path().join("mine_dir").exists());
}

#[test]
fn clean_leaves_foreign_owned_entries_intact() {
    let sand = tempfile::tempdir().unwrap();
    std::fs::write(sand.path().join("host.txt"), b"x").unwrap();

    // No uid on a CI host legitimately owns this, so everything above
    // should be left alone.
    staging::clean(sand.path(), 999_999).unwrap();

    assert!(sand.path().join("host.txt").exists());
}

#[test]
fn clean_on_missing_dir_is_a_no_op() {
    let parent = tempfile::tempdir().unwrap();
    let missing = parent.path().join("does-not-exist");
    staging::clean(&missing, nix::unistd::getuid().as_raw()).unwrap();
}
