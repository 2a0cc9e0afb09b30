use crate::error::Result;
use crate::mount::{bind_ro, mount_proc, Mount};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// System directories bind-mounted read-only into every sandbox
/// (spec.md §4.2 step 4 / §6 "Filesystem layout in sandbox").
const RO_SYSTEM_DIRS: [&str; 10] = [
    "dev", "sys", "bin", "lib", "lib64", "usr", "etc", "opt", "var", "home",
];

/// The ephemeral directory tree plus mount set that isolates one
/// measured command. Lifetime matches spec.md §3: created per-run by
/// the Outer/Inner Runner, torn down implicitly when the mount
/// namespace that owns it collapses — this struct never unmounts
/// anything itself.
pub struct Sandbox {
    root: TempDir,
    // Kept alive only so the upper/work tmpdirs for an overlay mount
    // aren't deleted out from under the mount before the namespace
    // that owns it exits.
    _overlay_upper: Option<TempDir>,
    _overlay_work: Option<TempDir>,
}

impl Sandbox {
    /// Build the full sandbox tree described in spec.md §4.2, rooted
    /// at a freshly created tmpdir. `work_dir` is bound (or
    /// overlaid, if `overlay`) onto `T/sand`.
    pub fn build(work_dir: &Path, overlay: bool) -> Result<Self> {
        let root = mk_tmpdir()?;
        let root_path = root.path();

        let sand = root_path.join("sand");
        fs::create_dir(&sand).map_err(io_err(&sand))?;

        let (mount, overlay_upper, overlay_work) = if overlay {
            let upper = mk_tmpdir()?;
            let work = mk_tmpdir()?;
            let m = Mount::overlay(work_dir);
            (m, Some(upper), Some(work))
        } else {
            (Mount::bind(work_dir).writable(), None, None)
        };
        mount.perform(
            &sand,
            overlay_upper.as_ref().map(TempDir::path),
            overlay_work.as_ref().map(TempDir::path),
        )?;

        let proc_dir = root_path.join("proc");
        fs::create_dir(&proc_dir).map_err(io_err(&proc_dir))?;
        mount_proc(&proc_dir)?;

        let tmp_dir = root_path.join("tmp");
        fs::create_dir(&tmp_dir).map_err(io_err(&tmp_dir))?;
        fs::set_permissions(&tmp_dir, fs::Permissions::from_mode(0o777)).map_err(io_err(&tmp_dir))?;

        for name in RO_SYSTEM_DIRS {
            let target = root_path.join(name);
            fs::create_dir(&target).map_err(io_err(&target))?;
            bind_ro(Path::new("/").join(name).as_path(), &target)?;
        }

        Ok(Self {
            root,
            _overlay_upper: overlay_upper,
            _overlay_work: overlay_work,
        })
    }

    /// The chroot target: the tmpdir the whole tree above is rooted
    /// at.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// `T/sand`, the working directory the measured command sees as
    /// `/sand` once chrooted.
    pub fn sand_path(&self) -> PathBuf {
        self.root.path().join("sand")
    }
}

fn mk_tmpdir() -> Result<TempDir> {
    let dir = tempfile::tempdir().map_err(io_err(Path::new("<tempdir>")))?;
    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o777))
        .map_err(io_err(dir.path()))?;
    Ok(dir)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> crate::error::Error + '_ {
    move |source| crate::error::Error::Io {
        path: path.to_owned(),
        source,
    }
}
