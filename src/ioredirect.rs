use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

enum Priv {
    Null,
    File(PathBuf),
}

/// Where the measured command's stdin comes from.
///
/// Read spec.md §3: `RunRequest.stdin`, if set, must exist at call
/// time — enforced by [`InputSpec::open`], not at construction.
pub struct InputSpec(Priv);

impl InputSpec {
    /// Connect `/dev/null` to stdin.
    pub fn null() -> Self {
        Self(Priv::Null)
    }

    /// Read stdin from `path`.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self(Priv::File(path.as_ref().to_owned()))
    }

    pub(crate) fn open(&self) -> Result<File> {
        match &self.0 {
            Priv::Null => File::open("/dev/null").map_err(|e| Error::Io {
                path: "/dev/null".into(),
                source: e,
            }),
            Priv::File(p) => File::open(p).map_err(|e| Error::Io {
                path: p.clone(),
                source: e,
            }),
        }
    }
}

enum OutPriv {
    Null,
    Truncate(PathBuf),
    Append(PathBuf),
}

/// Where the measured command's stdout/stderr go.
pub struct OutputSpec(OutPriv);

impl OutputSpec {
    /// Discard output.
    pub fn null() -> Self {
        Self(OutPriv::Null)
    }

    /// Overwrite `path` from offset 0, creating it if necessary.
    pub fn truncate<P: AsRef<Path>>(path: P) -> Self {
        Self(OutPriv::Truncate(path.as_ref().to_owned()))
    }

    /// Append to `path`, creating it if necessary.
    pub fn append<P: AsRef<Path>>(path: P) -> Self {
        Self(OutPriv::Append(path.as_ref().to_owned()))
    }

    pub(crate) fn open(&self) -> Result<File> {
        match &self.0 {
            OutPriv::Null => OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .map_err(|e| Error::Io {
                    path: "/dev/null".into(),
                    source: e,
                }),
            OutPriv::Truncate(p) => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(p)
                .map_err(|e| Error::Io {
                    path: p.clone(),
                    source: e,
                }),
            OutPriv::Append(p) => OpenOptions::new()
                .append(true)
                .create(true)
                .open(p)
                .map_err(|e| Error::Io {
                    path: p.clone(),
                    source: e,
                }),
        }
    }
}
