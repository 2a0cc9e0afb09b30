//! The Inner Runner (C3): runs as pid 1 of a fresh mount/pid namespace,
//! prepares the sandbox and cgroup, then hands off to `executor-core`
//! to exec and time the measured command.
//!
//! Read spec.md §4.3. This module is the logic invoked by
//! `src/bin/executor.rs` once it has unshared into the new
//! namespaces; it does not unshare itself (that's the Outer Runner's
//! job, §4.4).

use crate::cgroup::{CgroupController, DEFAULT_CGROUP_NAME};
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::ioredirect::{InputSpec, OutputSpec};
use crate::request::{RunRequest, RunResult};
use crate::sandbox::Sandbox;
use crate::staging;
use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

/// Path (relative to the Inner Runner's own cwd, i.e. outside any
/// chroot) that `executor-core` writes the measured CPU time to.
const TIME_FILE: &str = "time.txt";

/// Run one [`RunRequest`] to completion. Must be called as pid 1 of an
/// already-unshared mount+pid namespace set, running with the
/// privileges needed to mount and chroot.
pub fn run(executor_core: &Path, work_dir: &Path, req: &RunRequest) -> Result<RunResult> {
    // Step 1: competitive programs rely on deep recursion.
    setrlimit(Resource::RLIMIT_STACK, u64::MAX, u64::MAX).map_err(Error::DropPrivileges)?;

    // Step 2+3: sandbox + cgroup.
    let sandbox = Sandbox::build(work_dir, req.overlay)?;
    let cgroup = CgroupController::new(DEFAULT_CGROUP_NAME);
    cgroup.setup()?;

    let identity = Identity::default();
    let (uid, gid) = identity.resolve()?;

    // spec.md §3: "paths outside the staging directory are rejected"
    // applies to stdin/stdout/stderr exactly like send_files/get_files,
    // so these are resolved against the host-side staging directory
    // (`work_dir`, the same directory `staging::stage_in`/`stage_out`
    // operate on) rather than the Inner Runner's own cwd. Crucially
    // this must be `work_dir` itself, not `sandbox.sand_path()`: in
    // overlay mode `sand_path()` is the merged mount, and anything
    // written there lands in the overlay's upper layer, which is
    // discarded when this namespace exits. Opening directly against
    // `work_dir` writes straight to the directory `stage_out` reads
    // back from afterward, in both bind and overlay mode.
    let stdin = match &req.stdin {
        Some(name) => InputSpec::file(staging::resolve(work_dir, name)?),
        None => InputSpec::null(),
    };
    let stdout = match &req.stdout {
        Some(name) => OutputSpec::truncate(staging::resolve(work_dir, name)?),
        None => OutputSpec::null(),
    };
    let stderr = match &req.stderr {
        Some(name) => OutputSpec::truncate(staging::resolve(work_dir, name)?),
        None => OutputSpec::null(),
    };

    let shell_command = format!("cd sand && {}", req.exec_command);

    let _ = std::fs::remove_file(TIME_FILE);
    let mut cmd = Command::new(executor_core);
    cmd.arg(TIME_FILE)
        .arg(sandbox.root_path())
        .arg(uid.to_string())
        .arg(gid.to_string())
        .arg(cgroup.name())
        .arg("--")
        .arg("/bin/sh")
        .arg("-c")
        .arg(&shell_command)
        .env("HOME", format!("/home/{}", identity.name()))
        .stdin(stdin.open()?)
        .stdout(stdout.open()?)
        .stderr(stderr.open()?);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|source| Error::Io {
        path: executor_core.to_owned(),
        source,
    })?;

    let time_limit = Duration::from_secs_f64(req.time_limit.max(0.0));
    let result = wait_with_timeout(&mut child, time_limit)?;

    let result = match result {
        None => {
            reap_stragglers(&identity)?;
            RunResult::timeout(req.time_limit)
        }
        Some(status) => {
            let _ = start; // wall time is a sanity backstop only; cpu_time comes from executor-core.
            let cpu_time = std::fs::read_to_string(TIME_FILE)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(-1.0);
            let memory = cgroup.peak_memory().unwrap_or(-1);
            reap_stragglers(&identity)?;
            if status == 0 {
                RunResult::ok(status, cpu_time, memory)
            } else {
                RunResult::runtime_error(status, cpu_time, memory)
            }
        }
    };

    let _ = cgroup.teardown();
    Ok(result)
}

/// Wait up to `timeout` for `child` to exit. `Ok(None)` means it timed
/// out and is still (or was, before `reap_stragglers`) running.
fn wait_with_timeout(child: &mut std::process::Child, timeout: Duration) -> Result<Option<i32>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(|source| Error::Io {
            path: "<child>".into(),
            source,
        })? {
            return Ok(Some(status.code().unwrap_or(-1)));
        }
        if Instant::now() >= deadline {
            let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Step 7: unconditionally kill everything the judge user owns, then
/// reap all remaining children of this process.
fn reap_stragglers(identity: &Identity) -> Result<()> {
    let _ = Command::new("pkill")
        .arg("-KILL")
        .arg("-u")
        .arg(identity.name())
        .status();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(WaitStatus::Exited(_, _)) | Ok(WaitStatus::Signaled(_, _, _)) => continue,
            _ => continue,
        }
    }
    Ok(())
}

/// Serialize `result` as JSON to the file descriptor referenced by
/// `path` (the caller-supplied result file of spec.md §4.3 step 8).
pub fn write_result(path: &Path, result: &RunResult) -> Result<()> {
    let json = serde_json::to_string(result)?;
    std::fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })
}
