//! The Supervisor (C6): a long-lived worker process an Orchestrator
//! drives through the `clean`/`comm`/`last` stdin protocol, instead of
//! spawning a fresh Outer Runner per run.
//!
//! Read spec.md §4.6. [`Supervisor`] is the Orchestrator-facing handle;
//! [`worker_main`] is the loop `src/bin/executor.rs` runs when invoked
//! in worker mode. They talk to each other over three channels: the
//! worker's stdin/stdout (verbs and `OK` replies) and two JSON files,
//! `work/comm.json` and `work/resp.json`, that sidestep the argument
//! length limits a request/response pair could otherwise hit.

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::outer;
use crate::request::{RunRequest, RunResult};
use crate::staging;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

const COMM_FILE: &str = "comm.json";
const RESP_FILE: &str = "resp.json";

/// Locate `executor-core`, expected to sit next to the calling
/// binary — spec.md §6 describes it as a sibling build artifact, not
/// something resolved through `$PATH`.
pub fn executor_core_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|source| Error::Io {
        path: PathBuf::from("<current_exe>"),
        source,
    })?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join("executor-core"))
}

/// The Orchestrator-facing handle to a running worker process.
pub struct Supervisor {
    child: Child,
    reader: BufReader<std::process::ChildStdout>,
    work_dir: PathBuf,
    sand_dir: PathBuf,
}

impl Supervisor {
    /// Spawn `worker_exe --worker <run_dir>` and wire up its
    /// stdin/stdout. `run_dir` is created if missing; `run_dir/sand` is
    /// the persistent staging directory this worker's runs bind or
    /// overlay onto `/sand` (per-request, see [`RunRequest::overlay`]),
    /// and `run_dir/work` holds the `comm.json`/`resp.json` handoff
    /// files.
    pub fn spawn(worker_exe: &Path, run_dir: &Path) -> Result<Self> {
        let sand_dir = run_dir.join("sand");
        let work_dir = run_dir.join("work");
        for dir in [&sand_dir, &work_dir] {
            std::fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?;
        }

        let mut command = Command::new(worker_exe);
        command
            .arg("--worker")
            .arg(run_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        let mut child = command.spawn().map_err(|source| Error::Io {
            path: worker_exe.to_owned(),
            source,
        })?;
        let reader = BufReader::new(child.stdout.take().expect("piped stdout"));

        Ok(Self {
            child,
            reader,
            work_dir,
            sand_dir,
        })
    }

    fn send_verb(&mut self, verb: &str) -> Result<()> {
        let stdin = self.child.stdin.as_mut().ok_or(Error::WorkerClosed)?;
        writeln!(stdin, "{verb}").map_err(|source| Error::Io {
            path: PathBuf::from("<worker stdin>"),
            source,
        })?;
        stdin.flush().map_err(|source| Error::Io {
            path: PathBuf::from("<worker stdin>"),
            source,
        })
    }

    fn expect_ok(&mut self) -> Result<()> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(|source| Error::Io {
            path: PathBuf::from("<worker stdout>"),
            source,
        })?;
        if n == 0 {
            return Err(Error::WorkerClosed);
        }
        if line.trim_end() != "OK" {
            return Err(Error::ProtocolDesync(line.trim_end().to_owned()));
        }
        Ok(())
    }

    /// `clean` verb: wipe judge-owned leftovers from the staging
    /// directory between runs.
    pub fn clean(&mut self) -> Result<()> {
        self.send_verb("clean")?;
        self.expect_ok()
    }

    /// `comm` verb: stage `req.send_files` in, run it, stage
    /// `req.get_files` back out. `files_dir` is the directory
    /// `send_files`/`get_files` are resolved against on the
    /// Orchestrator's side (spec.md §4.7).
    pub fn comm(&mut self, req: &RunRequest, files_dir: &Path) -> Result<RunResult> {
        staging::stage_in(&self.sand_dir, files_dir, &req.send_files)?;

        let comm_path = self.work_dir.join(COMM_FILE);
        let json = serde_json::to_string(req)?;
        std::fs::write(&comm_path, json).map_err(|source| Error::Io {
            path: comm_path.clone(),
            source,
        })?;

        self.send_verb("comm")?;
        self.expect_ok()?;

        let resp_path = self.work_dir.join(RESP_FILE);
        let body = std::fs::read_to_string(&resp_path).map_err(|source| Error::Io {
            path: resp_path.clone(),
            source,
        })?;
        let mut result: RunResult = serde_json::from_str(&body)?;

        staging::stage_out(&self.sand_dir, files_dir, &req.get_files, &mut result)?;
        Ok(result)
    }

    /// `last` verb: tell the worker to exit, then reap it.
    pub fn last(mut self) -> Result<()> {
        self.send_verb("last")?;
        self.expect_ok()?;
        self.child.wait().map_err(|source| Error::Io {
            path: PathBuf::from("<worker process>"),
            source,
        })?;
        Ok(())
    }
}

/// The worker side of the protocol: read verbs from stdin until
/// `last`, or until the pipe closes. Runs as `src/bin/executor.rs
/// --worker <run_dir>`. Per spec.md §4.6, any unexpected input or I/O
/// failure here should surface as the Orchestrator seeing either no
/// `OK` or a closed pipe — both already fatal to [`Supervisor`] — so
/// this loop exits rather than trying to recover.
pub fn worker_main(run_dir: &Path) -> Result<()> {
    let sand_dir = run_dir.join("sand");
    let work_dir = run_dir.join("work");
    std::fs::create_dir_all(&sand_dir).map_err(|source| Error::Io {
        path: sand_dir.clone(),
        source,
    })?;
    std::fs::create_dir_all(&work_dir).map_err(|source| Error::Io {
        path: work_dir.clone(),
        source,
    })?;

    let executor_core = executor_core_path()?;
    let identity = Identity::default();
    let (judge_uid, _) = identity.resolve()?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.map_err(|source| Error::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        match line.trim() {
            "clean" => {
                staging::clean(&sand_dir, judge_uid.as_raw())?;
                writeln!(out, "OK").ok();
                out.flush().ok();
            }
            "comm" => {
                let comm_path = work_dir.join(COMM_FILE);
                let body = std::fs::read_to_string(&comm_path).map_err(|source| Error::Io {
                    path: comm_path.clone(),
                    source,
                })?;
                let req: RunRequest = serde_json::from_str(&body)?;

                let result = outer::run(&executor_core, &sand_dir, &req)?;

                let resp_path = work_dir.join(RESP_FILE);
                std::fs::write(&resp_path, serde_json::to_string(&result)?).map_err(|source| {
                    Error::Io {
                        path: resp_path.clone(),
                        source,
                    }
                })?;
                writeln!(out, "OK").ok();
                out.flush().ok();
            }
            "last" => {
                writeln!(out, "OK").ok();
                out.flush().ok();
                break;
            }
            other => {
                log::error!("worker received unknown verb {:?}", other);
                break;
            }
        }
    }
    Ok(())
}
