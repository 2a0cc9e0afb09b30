use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The cgroup v1 controllers this engine limits: process count, CPU
/// pinning, and memory (+swap).
const CONTROLLERS: [&str; 3] = ["pids", "cpuset", "memory"];

const PIDS_MAX: &str = "1000";
const CPUSET_CPUS: &str = "0";
const CPUSET_MEMS: &str = "0";
/// 1 GiB, written in bytes as cgroup v1 expects.
const MEMORY_LIMIT_BYTES: &str = "1073741824";

/// Handle to the process-wide singleton cgroup `lib-judge`, addressed
/// by name across `pids`/`cpuset`/`memory` (spec.md §3 "Ownership").
pub struct CgroupController {
    name: String,
    cgroup_root: PathBuf,
}

impl CgroupController {
    /// A controller for the cgroup named `name` under the standard
    /// `/sys/fs/cgroup` v1 hierarchy.
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            cgroup_root: PathBuf::from("/sys/fs/cgroup"),
        }
    }

    fn controller_dir(&self, controller: &str) -> PathBuf {
        self.cgroup_root.join(controller).join(&self.name)
    }

    fn write(&self, controller: &str, file: &str, value: &str) -> Result<()> {
        let path = self.controller_dir(controller).join(file);
        fs::write(&path, value).map_err(|source| Error::Cgroup { path, source })
    }

    /// Delete a stale cgroup with the same name if present, then
    /// create it fresh and apply the limits from spec.md §4.1.
    /// Idempotent: deleting a cgroup that doesn't exist is not an
    /// error (spec.md §8 property 8, "idempotent cgroup setup").
    pub fn setup(&self) -> Result<()> {
        for controller in CONTROLLERS {
            let dir = self.controller_dir(controller);
            // A leaked cgroup from a previous run may still have
            // processes attached; rmdir fails with EBUSY until they
            // are gone, which is fine — the caller is about to
            // populate it with this run's process anyway.
            let _ = fs::remove_dir(&dir);
            fs::create_dir_all(&dir).map_err(|source| Error::Cgroup {
                path: dir.clone(),
                source,
            })?;
        }
        self.write("pids", "pids.max", PIDS_MAX)?;
        self.write("cpuset", "cpuset.cpus", CPUSET_CPUS)?;
        self.write("cpuset", "cpuset.mems", CPUSET_MEMS)?;
        self.write("memory", "memory.limit_in_bytes", MEMORY_LIMIT_BYTES)?;
        self.write(
            "memory",
            "memory.memsw.limit_in_bytes",
            MEMORY_LIMIT_BYTES,
        )?;
        Ok(())
    }

    /// Join the calling process (and therefore every descendant it
    /// forks after this call) to the cgroup on all three controllers.
    pub fn join_self(&self) -> Result<()> {
        let pid = std::process::id().to_string();
        for controller in CONTROLLERS {
            self.write(controller, "cgroup.procs", &pid)?;
        }
        Ok(())
    }

    /// Read `memory.max_usage_in_bytes`, the peak RSS+cache usage
    /// since the cgroup was created (spec.md §4.1).
    pub fn peak_memory(&self) -> Result<i64> {
        let path = self.controller_dir("memory").join("memory.max_usage_in_bytes");
        let content = fs::read_to_string(&path).map_err(|source| Error::Cgroup {
            path: path.clone(),
            source,
        })?;
        content
            .trim()
            .parse()
            .map_err(|_| Error::Cgroup {
                path,
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "non-numeric usage"),
            })
    }

    /// Best-effort teardown; leaked cgroups are tolerated (the next
    /// `setup` call cleans them up per spec.md §8 property 8).
    pub fn teardown(&self) -> Result<()> {
        for controller in CONTROLLERS {
            let _ = fs::remove_dir(self.controller_dir(controller));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The default, singleton cgroup name used by the reference Outer
/// Runner (spec.md §5: "a single worker per cgroup ... the reference
/// choice is one worker per host process").
pub const DEFAULT_CGROUP_NAME: &str = "lib-judge";

pub fn cgroup_path(controller: &str, name: &str) -> PathBuf {
    Path::new("/sys/fs/cgroup").join(controller).join(name)
}
