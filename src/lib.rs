#![doc = include_str!("../README.md")]

mod cgroup;
mod error;
mod identity;
mod inner;
mod ioredirect;
mod mount;
mod outer;
mod request;
mod sandbox;
mod staging;
mod supervisor;

pub use cgroup::{CgroupController, DEFAULT_CGROUP_NAME};
pub use error::{Error, Result};
pub use identity::{Identity, JUDGE_USER};
pub use ioredirect::{InputSpec, OutputSpec};
pub use mount::Mount;
pub use request::{RunRequest, RunResult, Status};
pub use sandbox::Sandbox;
pub use supervisor::{executor_core_path, worker_main, Supervisor};

/// Internals used only by `src/bin/executor.rs` and `src/bin/executor_core.rs`.
///
/// Kept out of the crate's public surface: callers outside this crate
/// should go through [`Supervisor`] or the `executor`/`executor-core`
/// binaries, never by forking the Inner/Outer Runner directly.
#[doc(hidden)]
pub mod internal {
    pub use crate::inner;
    pub use crate::outer;
    pub use crate::staging;
}
