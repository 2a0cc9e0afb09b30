use serde::{Deserialize, Serialize};

/// The outcome of one measured run, as reported by the Inner Runner
/// and relayed unchanged by the Outer Runner and the Supervisor.
///
/// Read spec.md §3: `status=OK ⇒ return_code=0`; `status=RE ⇒
/// return_code≠0 ∨ signal>0`; `status=TLE ⇒ cpu_time_seconds ≥
/// time_limit − ε`. These invariants are enforced by the callers that
/// construct a `RunResult` ([`crate::inner`], [`crate::outer`]), not by
/// this type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Tle,
    Re,
    Ie,
}

/// One request to the Supervisor's `comm` verb: run `exec_command`
/// under the given limits and I/O redirection.
///
/// Corresponds 1:1 to the `comm.json` schema in spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    #[serde(rename = "exec")]
    pub exec_command: String,
    #[serde(rename = "timelimit")]
    pub time_limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Not part of `comm.json` itself — C7 (File-Staging) consumes
    /// these before/after handing the rest of the request to C6.
    #[serde(skip)]
    pub send_files: Vec<String>,
    #[serde(skip)]
    pub get_files: Vec<String>,
    /// Mount Builder mode for this one run (spec.md §4.2/§5): `false`
    /// binds the staging directory so writes persist (compile stages),
    /// `true` overlays it so they don't (execution/checker stages).
    /// A fresh [`crate::sandbox::Sandbox`] is built per run regardless
    /// of worker persistence, so this travels with the request rather
    /// than being fixed for a worker's lifetime.
    #[serde(default)]
    pub overlay: bool,
}

impl RunRequest {
    /// A request with no stdin/stdout/stderr redirection and no
    /// staged files, matching S1-style scenarios in spec.md §8.
    pub fn new<T: Into<String>>(exec_command: T, time_limit: f64) -> Self {
        Self {
            exec_command: exec_command.into(),
            time_limit,
            stdin: None,
            stdout: None,
            stderr: None,
            send_files: Vec::new(),
            get_files: Vec::new(),
            overlay: false,
        }
    }

    pub fn stdin<T: Into<String>>(mut self, path: T) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn stdout<T: Into<String>>(mut self, path: T) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn stderr<T: Into<String>>(mut self, path: T) -> Self {
        self.stderr = Some(path.into());
        self
    }

    pub fn send_files<I: IntoIterator<Item = T>, T: Into<String>>(mut self, files: I) -> Self {
        self.send_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn get_files<I: IntoIterator<Item = T>, T: Into<String>>(mut self, files: I) -> Self {
        self.get_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}

/// The result of one measured run.
///
/// Corresponds 1:1 to the `resp.json` schema in spec.md §6.
/// `-1` marks an unknown/not-applicable value for `return_code`,
/// `cpu_time_seconds`, and `peak_memory_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: Status,
    #[serde(rename = "returncode")]
    pub return_code: i32,
    #[serde(rename = "time")]
    pub cpu_time_seconds: f64,
    #[serde(rename = "memory")]
    pub peak_memory_bytes: i64,
}

impl RunResult {
    pub fn ok(return_code: i32, cpu_time_seconds: f64, peak_memory_bytes: i64) -> Self {
        Self {
            status: Status::Ok,
            return_code,
            cpu_time_seconds,
            peak_memory_bytes,
        }
    }

    pub fn timeout(time_limit: f64) -> Self {
        Self {
            status: Status::Tle,
            return_code: -1,
            cpu_time_seconds: time_limit,
            peak_memory_bytes: -1,
        }
    }

    /// Outer-timeout variant: `return_code=124`, matching the
    /// coreutils `timeout` convention spec.md §4.4/§6 call for.
    pub fn outer_timeout(time_limit: f64) -> Self {
        Self {
            status: Status::Tle,
            return_code: 124,
            cpu_time_seconds: time_limit,
            peak_memory_bytes: -1,
        }
    }

    pub fn runtime_error(return_code: i32, cpu_time_seconds: f64, peak_memory_bytes: i64) -> Self {
        Self {
            status: Status::Re,
            return_code,
            cpu_time_seconds,
            peak_memory_bytes,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status: Status::Ie,
            return_code: -1,
            cpu_time_seconds: -1.0,
            peak_memory_bytes: -1,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status != Status::Ok
    }
}
