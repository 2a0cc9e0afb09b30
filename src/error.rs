use std::path::PathBuf;

/// The error type of `judge_sandbox`.
///
/// Every failure mode the engine can hit is one of these variants; at
/// the Supervisor boundary (see [`crate::supervisor`]) any of them is
/// translated into `RunResult { status: Status::Ie, .. }` rather than
/// propagated as free-form text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mount(2)/umount(2) syscall failed.
    #[error("mount operation failed: {0}")]
    Mount(#[source] nix::Error),
    /// Creating, configuring, or reading a cgroup file failed.
    #[error("cgroup operation on {path}: {source}")]
    Cgroup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// unshare(2)/clone(2) failed.
    #[error("failed to unshare namespaces: {0}")]
    Unshare(#[source] nix::Error),
    /// fork(2) failed.
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),
    /// chroot(2)/chdir(2)/setuid(2)/setgid(2) failed while dropping
    /// privileges inside the sandbox.
    #[error("failed to drop privileges: {0}")]
    DropPrivileges(#[source] nix::Error),
    /// execve(2) failed.
    #[error("exec failed: {0}")]
    Exec(#[source] nix::Error),
    /// wait(2)/waitpid(2) failed.
    #[error("wait failed: {0}")]
    Wait(#[source] nix::Error),
    /// An ordinary I/O error (reading/writing a file, copying a
    /// staged artifact, etc).
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The worker replied with something other than `OK`.
    #[error("worker protocol desync: expected OK, got {0:?}")]
    ProtocolDesync(String),
    /// The worker's pipe closed before replying.
    #[error("worker pipe closed unexpectedly")]
    WorkerClosed,
    /// A `get_files` entry the measured command was supposed to
    /// produce is missing or not a regular file.
    #[error("declared artifact {0} was not produced")]
    MissingObject(PathBuf),
    /// A `send_files`/`get_files`/`stdin` path escapes the staging
    /// directory.
    #[error("path {0} escapes the staging directory")]
    PathEscape(PathBuf),
    /// (De)serializing `comm.json`/`resp.json` failed.
    #[error("error (de)serializing JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The `judge-user` identity could not be resolved to a uid/gid.
    #[error("identity {0:?} could not be resolved on this host")]
    UnknownUser(String),
    /// A `RunRequest` violated one of the invariants in spec.md §3
    /// (e.g. `stdin` set but the file doesn't exist).
    #[error("invalid run request: {0}")]
    InvalidRequest(String),
}

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
