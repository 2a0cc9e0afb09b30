//! The File-Staging Layer (C7): copies `send_files` into the sandbox
//! before a `comm`, and `get_files` back out afterward.
//!
//! Read spec.md §4.7. Operates on the persistent "sand" directory a
//! [`crate::supervisor::Supervisor`] keeps across many runs — the same
//! directory the Mount Builder binds or overlays onto `/sand` for each
//! individual run.

use crate::error::{Error, Result};
use crate::request::RunResult;
use std::path::{Path, PathBuf};

/// Resolve `name` relative to `base`, rejecting any path that escapes
/// `base` (spec.md §3: "paths outside the staging directory are
/// rejected").
pub(crate) fn resolve(base: &Path, name: &str) -> Result<PathBuf> {
    let candidate = base.join(name);
    let normalized = normalize(&candidate);
    if !normalized.starts_with(base) {
        return Err(Error::PathEscape(candidate));
    }
    Ok(candidate)
}

/// Lexically normalize `.`/`..` components without touching the
/// filesystem (the target may not exist yet, e.g. a `get_files`
/// destination).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        use std::path::Component::*;
        match component {
            ParentDir => {
                out.pop();
            }
            CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_owned(),
        source,
    }
}

/// Copy each `send_files` entry from `from_dir` (the Orchestrator's
/// working directory) into `sand_dir` before a run.
pub fn stage_in(sand_dir: &Path, from_dir: &Path, files: &[String]) -> Result<()> {
    for name in files {
        let src = resolve(from_dir, name)?;
        let dst = resolve(sand_dir, name)?;
        std::fs::copy(&src, &dst).map_err(io_err(&src))?;
    }
    Ok(())
}

/// Copy each `get_files` entry out of `sand_dir` into `to_dir` after a
/// run. A missing or non-regular declared artifact forces
/// `result.status` to `Re` (spec.md §4.7) — symlinks are deliberately
/// not followed across the boundary, so a dangling or foreign symlink
/// also counts as missing.
pub fn stage_out(
    sand_dir: &Path,
    to_dir: &Path,
    files: &[String],
    result: &mut RunResult,
) -> Result<()> {
    for name in files {
        let src = resolve(sand_dir, name)?;
        let dst = resolve(to_dir, name)?;
        let is_regular_file = src
            .symlink_metadata()
            .map(|m| m.file_type().is_file())
            .unwrap_or(false);
        if !is_regular_file {
            result.status = crate::request::Status::Re;
            continue;
        }
        std::fs::copy(&src, &dst).map_err(io_err(&src))?;
    }
    Ok(())
}

/// `clean` verb: remove every file/directory under `sand_dir` owned by
/// `judge_uid`, leaving host-owned entries (e.g. a compile's `.o`
/// intermediaries left by a previous stage that the next stage still
/// needs) intact.
pub fn clean(sand_dir: &Path, judge_uid: u32) -> Result<()> {
    use std::os::unix::fs::MetadataExt;
    let entries = match std::fs::read_dir(sand_dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        if meta.uid() != judge_uid {
            continue;
        }
        if meta.is_dir() {
            let _ = std::fs::remove_dir_all(&path);
        } else {
            let _ = std::fs::remove_file(&path);
        }
    }
    Ok(())
}
