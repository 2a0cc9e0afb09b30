use crate::prelude::*;

/// A submission's judged outcome. Variant order is precedence order
/// (spec.md §3): when more than one failure applies, the worse
/// (greater) one wins.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Ac,
    Wa,
    Tle,
    Mle,
    Re,
    Itle,
    Ie,
    Ce,
    Ice,
}

#[derive(Debug)]
pub struct Data {
    /// Source code content, not path
    pub source: Vec<u8>,
    /// Language
    pub language: String,
    /// Time limit
    pub time_limit: Duration,
    /// Memory limit
    pub memory_limit: Byte,
    /// Checker source content and the language id to compile it with.
    pub checker_source: Vec<u8>,
    pub checker_language: String,
    /// `testlib.h`, staged alongside the checker source if present.
    pub testlib: Option<Vec<u8>>,
    /// [("/path/to/in", "/path/to/ans")], sorted lexicographically by
    /// case name.
    pub testcases: Vec<(PathBuf, PathBuf)>,
    /// Old result if exists
    pub old_result: Option<Verdict>,
}

/// Fetches submission data and reports a verdict back to whatever
/// system tracks submissions.
///
/// Synchronous: the Judgement Orchestrator already runs on its own
/// thread per submission (spec.md §9: "no need for async schedulers;
/// threads suffice"), so this trait gains nothing from `async fn`.
pub trait DataSource {
    fn fetch(&mut self, id: &str) -> Result<Data>;
    fn feedback(&mut self, id: &str, v: Verdict, d: Duration) -> Result<()>;
    fn feedback_ce(&mut self, id: &str, msg: Vec<u8>) -> Result<()>;
    fn feedback_log(&mut self, id: &str, msg: Vec<u8>) -> Result<()>;
}
