use crate::error::{Error, Result};
use nix::unistd::{Gid, Uid, User};

/// The unprivileged identity the measured command runs as once it has
/// been chrooted into the sandbox.
///
/// Read `judge-user` in spec.md §6 for details: a single host-resolvable
/// UID/GID pair, never `root` once privileges have dropped.
pub struct Identity(String);

impl Identity {
    /// Identify by UNIX user name, resolved to a uid/gid pair lazily
    /// (at [`Identity::resolve`] time, not at construction).
    pub fn user<T: AsRef<str>>(u: T) -> Self {
        Self(u.as_ref().to_owned())
    }

    /// Shorthand for `Self::user("root")`, used by the Outer Runner
    /// itself (which must stay privileged) rather than the measured
    /// command.
    pub fn root() -> Self {
        Self::user("root")
    }

    /// Resolve this identity to a `(uid, gid)` pair via `getpwnam(3)`.
    pub fn resolve(&self) -> Result<(Uid, Gid)> {
        let passwd = User::from_name(&self.0)
            .map_err(|_| Error::UnknownUser(self.0.clone()))?
            .ok_or_else(|| Error::UnknownUser(self.0.clone()))?;
        Ok((passwd.uid, passwd.gid))
    }

    /// The user name this identity resolves to.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The user name the Inner Runner drops privileges to before executing
/// user/checker code, per spec.md §6.
pub const JUDGE_USER: &str = "judge-user";

impl Default for Identity {
    fn default() -> Self {
        Self::user(JUDGE_USER)
    }
}
