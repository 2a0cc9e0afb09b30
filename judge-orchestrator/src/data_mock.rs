use crate::data::{Data, DataSource, Verdict};
use crate::prelude::*;

#[serde_with::serde_as]
#[derive(Deserialize)]
struct DataFile {
    pub language: String,
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    pub time_limit: Duration,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub memory_limit: Byte,
    pub checker_language: String,
    pub checker_src: PathBuf,
    pub testlib: Option<PathBuf>,
    pub testcase_dir: PathBuf,
    pub src: PathBuf,
    pub expect: Verdict,
}

impl DataFile {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = util::load_file(path)?;
        toml::from_str(&content).map_err(Error::TOMLParseError)
    }

    fn into_data(self) -> Result<Data> {
        let source = std::fs::read(self.src).map_err(Error::IOError)?;
        let checker_source = std::fs::read(self.checker_src).map_err(Error::IOError)?;
        let testlib = self
            .testlib
            .map(std::fs::read)
            .transpose()
            .map_err(Error::IOError)?;
        let testcases = util::enumerate_testcase(&self.testcase_dir)?;
        Ok(Data {
            source,
            language: self.language,
            time_limit: self.time_limit,
            memory_limit: self.memory_limit,
            checker_source,
            checker_language: self.checker_language,
            testlib,
            old_result: Some(self.expect),
            testcases,
        })
    }
}

/// A file/TOML-backed [`DataSource`] for judging outside of a larger
/// OJ deployment: `<id>.toml` describes one submission, feedback is
/// written under `output/`.
pub struct MockDataSource {}

impl MockDataSource {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for MockDataSource {
    fn fetch(&mut self, id: &str) -> Result<Data> {
        let f = id.to_owned() + ".toml";
        DataFile::load(f)?.into_data()
    }
    fn feedback(&mut self, _id: &str, _v: Verdict, _d: Duration) -> Result<()> {
        Ok(())
    }
    fn feedback_ce(&mut self, id: &str, msg: Vec<u8>) -> Result<()> {
        let name = "output/".to_owned() + id + ".compile.txt";
        std::fs::write(name, &msg).map_err(Error::IOError)
    }
    fn feedback_log(&mut self, id: &str, msg: Vec<u8>) -> Result<()> {
        let name = "output/".to_owned() + id + ".judgelog.txt";
        std::fs::write(name, &msg).map_err(Error::IOError)
    }
}
