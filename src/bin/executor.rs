//! The standalone executor CLI (spec.md §6): run one command line under
//! the same namespace/mount/cgroup isolation [`judge_sandbox::Supervisor`]
//! gives an orchestrator, without needing a long-lived worker in front
//! of it.
//!
//! This binary doubles as the Supervisor's worker process: spawned
//! with `--worker <run_dir>`, it reads the `clean`/`comm`/`last`
//! protocol from its stdin instead of running one command and exiting.
//! That flag is intentionally undocumented in `--help` — it's an
//! implementation detail of [`judge_sandbox::Supervisor::spawn`], not
//! part of the CLI surface.

use clap::Parser;
use judge_sandbox::{internal::outer, executor_core_path, worker_main, RunRequest, RunResult, Status};
use std::path::PathBuf;
use std::process::exit;

/// Run one command line in a fresh sandbox.
#[derive(Parser)]
#[clap(name = "executor")]
struct Cli {
    /// Internal: run as a Supervisor worker rooted at this directory.
    #[clap(long, hide = true)]
    worker: Option<PathBuf>,

    /// Overlay `W` onto `/sand` instead of bind-mounting it.
    #[clap(long)]
    overlay: bool,

    /// Redirect the measured command's stdin from this file.
    #[clap(long)]
    stdin: Option<PathBuf>,

    /// Redirect the measured command's stdout to this file (truncated).
    #[clap(long)]
    stdout: Option<PathBuf>,

    /// Redirect the measured command's stderr to this file (truncated).
    #[clap(long)]
    stderr: Option<PathBuf>,

    /// Write the `RunResult` JSON here instead of stdout.
    #[clap(long)]
    result: Option<PathBuf>,

    /// Wall time limit in seconds, 0-3600.
    #[clap(long, default_value_t = 60.0)]
    tl: f64,

    /// The command to run, after a mandatory `--`.
    #[clap(last = true)]
    cmd: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(run_dir) = cli.worker {
        if let Err(e) = worker_main(&run_dir) {
            eprintln!("executor: worker failed: {e}");
            exit(1);
        }
        return;
    }

    if cli.cmd.is_empty() {
        eprintln!("executor: missing command after `--`");
        exit(2);
    }
    if !(0.0..=3600.0).contains(&cli.tl) {
        eprintln!("executor: --tl must be within 0-3600 seconds");
        exit(2);
    }

    let mut req = RunRequest::new(shell_join(&cli.cmd), cli.tl).overlay(cli.overlay);
    if let Some(p) = &cli.stdin {
        req = req.stdin(p.display().to_string());
    }
    if let Some(p) = &cli.stdout {
        req = req.stdout(p.display().to_string());
    }
    if let Some(p) = &cli.stderr {
        req = req.stderr(p.display().to_string());
    }

    let executor_core = executor_core_path().unwrap_or_else(|e| {
        eprintln!("executor: {e}");
        exit(1);
    });
    let work_dir = std::env::current_dir().expect("current directory must be readable");

    let result = outer::run(&executor_core, &work_dir, &req).unwrap_or_else(|e| {
        eprintln!("executor: {e}");
        exit(1);
    });

    let json = serde_json::to_string(&result).expect("RunResult always serializes");
    match &cli.result {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("executor: failed to write result file: {e}");
                exit(1);
            }
        }
        None => println!("{json}"),
    }

    exit(exit_code(&result));
}

/// spec.md §6's exit code convention: 0 on a measured exit of 0, 124 on
/// any timeout (outer or inner), and the measured command's own status
/// otherwise.
fn exit_code(result: &RunResult) -> i32 {
    match result.status {
        Status::Ok => result.return_code,
        Status::Tle => 124,
        Status::Re if result.return_code != 0 => result.return_code,
        Status::Re | Status::Ie => 1,
    }
}

/// `cmd` is an argv vector; `RunRequest::exec_command` is a single
/// string handed to `sh -c`. Quote each argument so embedded
/// whitespace or shell metacharacters round-trip unchanged.
fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_./-".contains(c))
    {
        s.to_owned()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}
