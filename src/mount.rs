use crate::error::{Error, Result};
use nix::mount::{mount, MsFlags};
use std::path::{Path, PathBuf};

enum Priv {
    Bind { src: PathBuf, rw: bool },
    Overlay { lower: PathBuf },
}

/// The description of a mount the Mount Builder (C2) performs while
/// assembling a sandbox tree.
///
/// Read spec.md §4.2: `/sand` is either a straight bind mount of the
/// working directory, or — when per-test isolation is needed — an
/// overlay whose upper/work layers are thrown away with the mount
/// namespace.
pub struct Mount(Priv);

impl Mount {
    /// Bind-mount `src`. Read-only unless [`Mount::writable`] is
    /// called.
    pub fn bind<P: AsRef<Path>>(src: P) -> Self {
        Self(Priv::Bind {
            src: src.as_ref().to_owned(),
            rw: false,
        })
    }

    /// Overlay-mount `lower` as the lower layer; the upper and work
    /// directories are allocated fresh by [`perform`] and discarded
    /// when the mount namespace collapses.
    pub fn overlay<P: AsRef<Path>>(lower: P) -> Self {
        Self(Priv::Overlay {
            lower: lower.as_ref().to_owned(),
        })
    }

    /// Make the bind mount writable. No effect on an overlay mount,
    /// whose upper layer is always writable.
    pub fn writable(self) -> Self {
        match self.0 {
            Priv::Bind { src, .. } => Self(Priv::Bind { src, rw: true }),
            other => Self(other),
        }
    }

    /// Perform the mount at `target`, which must already exist as a
    /// directory. `upper`/`work` are only consulted for an overlay
    /// mount.
    pub fn perform(&self, target: &Path, upper: Option<&Path>, work: Option<&Path>) -> Result<()> {
        match &self.0 {
            Priv::Bind { src, rw } => {
                let mut flags = MsFlags::MS_BIND;
                mount::<Path, Path, str, str>(Some(src.as_path()), target, None, flags, None)
                    .map_err(Error::Mount)?;
                if !*rw {
                    flags = MsFlags::MS_BIND | MsFlags::MS_REMOUNT | MsFlags::MS_RDONLY;
                    mount::<Path, Path, str, str>(Some(src.as_path()), target, None, flags, None)
                        .map_err(Error::Mount)?;
                }
                Ok(())
            }
            Priv::Overlay { lower } => {
                let upper = upper.expect("overlay mount requires an upperdir");
                let work = work.expect("overlay mount requires a workdir");
                let opts = format!(
                    "lowerdir={},upperdir={},workdir={}",
                    lower.display(),
                    upper.display(),
                    work.display()
                );
                mount::<str, Path, str, str>(
                    Some("overlay"),
                    target,
                    Some("overlay"),
                    MsFlags::empty(),
                    Some(opts.as_str()),
                )
                .map_err(Error::Mount)
            }
        }
    }
}

/// Bind-mount `src` (an absolute host path, e.g. `/dev`) read-only at
/// `target`. Used for the fixed system directories listed in spec.md
/// §4.2 step 4.
pub fn bind_ro(src: &Path, target: &Path) -> Result<()> {
    mount::<Path, Path, str, str>(Some(src), target, None, MsFlags::MS_BIND, None)
        .map_err(Error::Mount)?;
    mount::<Path, Path, str, str>(
        Some(src),
        target,
        None,
        MsFlags::MS_BIND | MsFlags::MS_REMOUNT | MsFlags::MS_RDONLY,
        None,
    )
    .map_err(Error::Mount)
}

/// Mount a fresh `proc` filesystem at `target`. Only meaningful inside
/// a new PID namespace (spec.md §4.2 step 2).
pub fn mount_proc(target: &Path) -> Result<()> {
    mount::<str, Path, str, str>(Some("proc"), target, Some("proc"), MsFlags::empty(), None)
        .map_err(Error::Mount)
}
