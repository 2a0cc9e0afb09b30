//! The Executor Core (C5): a small helper that drops into the
//! sandbox's chroot, joins its cgroup, drops privileges, `execve`s the
//! measured command, and writes the elapsed CPU time to a file.
//!
//! Read spec.md §4.5. Not part of the public interface — the Inner
//! Runner (`judge_sandbox::inner`) is its only caller. Collapses what
//! the original's `cgexec → chroot → sh -c` process chain did with
//! three external binaries into one native fork, matching spec.md
//! §4.5's rationale ("measuring at the closest-in process yields
//! stable sub-millisecond results").
//!
//! Usage: `executor-core <time-file> <chroot-dir> <uid> <gid>
//! <cgroup-name> -- <cmd> <args...>`

use judge_sandbox::CgroupController;
use nix::sys::resource::{getrusage, UsageWho};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{chdir, chroot, execvp, fork, setgid, setuid, ForkResult, Gid, Uid};
use std::ffi::CString;
use std::path::Path;
use std::process::exit;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let sep = match args.iter().position(|a| a == "--") {
        Some(i) => i,
        None => {
            eprintln!("usage: executor-core <time-file> <chroot-dir> <uid> <gid> <cgroup-name> -- <cmd> <args...>");
            exit(125);
        }
    };
    let fixed = &args[1..sep];
    let cmd = &args[sep + 1..];
    if fixed.len() != 5 || cmd.is_empty() {
        eprintln!("wrong number of arguments");
        exit(125);
    }
    let time_file = &fixed[0];
    let chroot_dir = Path::new(&fixed[1]);
    let uid: u32 = fixed[2].parse().expect("uid must be numeric");
    let gid: u32 = fixed[3].parse().expect("gid must be numeric");
    let cgroup_name = &fixed[4];

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Parent { child } => {
            let status = match waitpid(child, None) {
                Ok(WaitStatus::Exited(_, code)) => code,
                Ok(WaitStatus::Signaled(_, _, _)) => 1,
                _ => 1,
            };
            let usage = getrusage(UsageWho::RUSAGE_CHILDREN).expect("getrusage failed");
            let cpu_seconds = timeval_secs(usage.user_time()) + timeval_secs(usage.system_time());
            let _ = std::fs::write(time_file, format!("{:.6}", cpu_seconds));
            exit(status);
        }
        ForkResult::Child => {
            let cgroup = CgroupController::new(cgroup_name.clone());
            if cgroup.join_self().is_err() {
                exit(125);
            }
            if chroot(chroot_dir).is_err() {
                exit(125);
            }
            // Match chroot(1): leave cwd at the new root, not "/sand".
            // inner.rs's shell command does its own "cd sand" from here.
            if chdir("/").is_err() {
                exit(125);
            }
            if setgid(Gid::from_raw(gid)).is_err() {
                exit(125);
            }
            if setuid(Uid::from_raw(uid)).is_err() {
                exit(125);
            }
            let cmd_c: Vec<CString> = cmd.iter().map(|s| CString::new(s.as_str()).unwrap()).collect();
            let _ = execvp(&cmd_c[0], &cmd_c);
            exit(126);
        }
    }
}

fn timeval_secs(tv: nix::sys::time::TimeVal) -> f64 {
    tv.tv_sec() as f64 + tv.tv_usec() as f64 / 1_000_000.0
}
