//! The Outer Runner (C4): creates the mount/pid/net namespace set the
//! Inner Runner needs, enforces the belt-and-braces outer timeout, and
//! relays the Inner Runner's result back.
//!
//! Read spec.md §4.4. Native `unshare(2)`/`fork(2)` replace the
//! teacher's/original's external `unshare(1)` invocation — this is the
//! same two-fork dance `unshare --fork --pid --net --mount
//! --mount-proc` performs (unshare(CLONE_NEWPID) only takes effect for
//! children created *after* the call, so a process that wants to
//! become pid 1 of the new namespace must fork once more after
//! unsharing).

use crate::error::{Error, Result};
use crate::inner;
use crate::request::{RunRequest, RunResult};
use nix::sched::{unshare, CloneFlags};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, fork, pipe, read, write, ForkResult, Pid};
use std::path::Path;
use std::time::{Duration, Instant};

/// Belt-and-braces margin added on top of the request's own time
/// limit, per spec.md §4.3/§4.4.
const OUTER_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Spawn the Inner Runner in a fresh namespace set and wait for it,
/// with the two-layer timeout spec.md §5 describes.
pub fn run(executor_core: &Path, work_dir: &Path, req: &RunRequest) -> Result<RunResult> {
    let result_path = std::env::temp_dir().join(format!("judge-inner-{}.json", std::process::id()));
    let (read_fd, write_fd) = pipe().map_err(Error::Fork)?;

    match unsafe { fork() }.map_err(Error::Fork)? {
        ForkResult::Parent { child } => {
            let _ = close(write_fd);
            let inner_pid = read_pid(read_fd);
            let _ = close(read_fd);

            let timeout = Duration::from_secs_f64(req.time_limit.max(0.0)) + OUTER_TIMEOUT_MARGIN;
            let status = wait_child(child, timeout);
            let result = match status {
                Some(_) => std::fs::read_to_string(&result_path)
                    .ok()
                    .and_then(|s| serde_json::from_str(&s).ok())
                    .unwrap_or_else(RunResult::internal_error),
                None => {
                    log::warn!("outer timeout waiting for inner runner, tearing down tree");
                    if let Some(pid) = inner_pid {
                        // Killing pid 1 of a pid namespace kills every
                        // process in it; this is the "outer kills the
                        // entire unshared tree" behavior of spec.md §5.
                        let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
                    }
                    let _ = kill(child, Signal::SIGKILL);
                    let _ = waitpid(child, None);
                    RunResult::outer_timeout(req.time_limit)
                }
            };
            let _ = std::fs::remove_file(&result_path);
            Ok(result)
        }
        ForkResult::Child => {
            let _ = close(read_fd);
            // unshare(CLONE_NEWPID) only affects processes forked from
            // here on, so this process (the "mid" process) never
            // itself becomes pid 1; it forks once more below.
            if unshare(CloneFlags::CLONE_NEWNS | CloneFlags::CLONE_NEWPID | CloneFlags::CLONE_NEWNET)
                .is_err()
            {
                std::process::exit(125);
            }
            match unsafe { fork() } {
                Ok(ForkResult::Parent { child }) => {
                    let pid_bytes = (child.as_raw() as u64).to_ne_bytes();
                    let _ = write(write_fd, &pid_bytes);
                    let _ = close(write_fd);
                    let code = match waitpid(child, None) {
                        Ok(WaitStatus::Exited(_, code)) => code,
                        _ => 125,
                    };
                    std::process::exit(code);
                }
                Ok(ForkResult::Child) => {
                    let _ = close(write_fd);
                    // Now pid 1 of the new pid namespace: proc mounts
                    // correctly and all descendants die when we do.
                    let result = inner::run(executor_core, work_dir, req)
                        .unwrap_or_else(|e| {
                            log::error!("inner runner failed: {}", e);
                            RunResult::internal_error()
                        });
                    let _ = inner::write_result(&result_path, &result);
                    std::process::exit(0);
                }
                Err(_) => std::process::exit(125),
            }
        }
    }
}

fn read_pid(fd: std::os::unix::io::RawFd) -> Option<i32> {
    let mut buf = [0u8; 8];
    let mut read_total = 0;
    while read_total < buf.len() {
        match read(fd, &mut buf[read_total..]) {
            Ok(0) => return None,
            Ok(n) => read_total += n,
            Err(_) => return None,
        }
    }
    Some(u64::from_ne_bytes(buf) as i32)
}

fn wait_child(child: Pid, timeout: Duration) -> Option<WaitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match waitpid(child, Some(nix::sys::wait::WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {}
            Ok(status) => return Some(status),
            Err(_) => return None,
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
