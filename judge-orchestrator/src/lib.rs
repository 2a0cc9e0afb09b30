pub mod data;
pub mod data_mock;
pub mod error;
pub mod language;
pub mod orchestrator;
pub mod util;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::util;
    pub use byte_unit::Byte;
    pub use log::{debug, error, info, trace, warn};
    pub use serde::{Deserialize, Serialize};
    pub use std::fs::{create_dir, create_dir_all, File};
    pub use std::num::NonZeroU64;
    pub use std::path::{Path, PathBuf};
    pub use std::time::Duration;
}

use prelude::*;

fn fifteen_sec() -> Duration {
    Duration::from_secs(15)
}

fn one_gib() -> Byte {
    Byte::from_str("1 GiB").unwrap()
}

fn thirty_two_mib() -> Byte {
    Byte::from_str("32 MiB").unwrap()
}

/// Resource limits for one measured run, not necessarily the
/// submission's own limits — the compiler gets its own (generous,
/// fixed) budget; the checker's run budget is fixed by spec.md §4.9
/// rather than configurable.
#[serde_with::serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct RunLimit {
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    #[serde(default = "fifteen_sec")]
    pub time: Duration,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "one_gib")]
    pub memory: Byte,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "thirty_two_mib")]
    pub output: Byte,
}

impl Default for RunLimit {
    /// Default value is rational for compilers, but obviously too
    /// large for submission code.
    fn default() -> Self {
        Self {
            time: Duration::from_secs(15),
            memory: Byte::from_str("1 GiB").unwrap(),
            output: Byte::from_str("32 MiB").unwrap(),
        }
    }
}
