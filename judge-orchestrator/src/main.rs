use clap::{ArgEnum, Args, Parser};
use judge_orchestrator::language::LanguageRegistry;
use judge_orchestrator::prelude::*;
use judge_orchestrator::{data_mock, orchestrator, RunLimit};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use std::process::exit;

#[derive(Debug, Clone, Copy, ArgEnum, Deserialize)]
pub enum DataSourceKind {
    Mock,
}

#[derive(serde_with::DeserializeFromStr, Debug, Clone, Copy)]
struct LogLevel(log::LevelFilter);

impl std::str::FromStr for LogLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "error" | "Error" => Self(log::LevelFilter::Error),
            "warn" | "Warn" => Self(log::LevelFilter::Warn),
            "info" | "Info" => Self(log::LevelFilter::Info),
            "debug" | "Debug" => Self(log::LevelFilter::Debug),
            "trace" | "Trace" => Self(log::LevelFilter::Trace),
            _ => return Err(Error::BadLogLevel(s.to_string())),
        })
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        l.0
    }
}

#[derive(Debug, Default, Args, Deserialize)]
struct Flags {
    #[clap(long, arg_enum)]
    data_source: Option<DataSourceKind>,
    /// Don't store judge result.
    #[clap(long)]
    #[serde(default)]
    dry: Option<bool>,
    /// Dump the log onto stderr.
    #[clap(long)]
    #[serde(default)]
    stderr: Option<bool>,
    /// Log level.
    #[clap(long)]
    log_level: Option<LogLevel>,
    /// Runtime dir.
    #[clap(long)]
    run_dir: Option<PathBuf>,
    /// Directory containing the `executor`/`executor-core` binaries.
    #[clap(long)]
    executor_dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct Cli {
    /// The solution to be judged.
    solution_id: String,
    /// The name of the runner.
    runner_id: String,
    /// OJ runtime directory.
    #[clap(parse(from_os_str))]
    oj_base: PathBuf,
    /// If specified, same as --stderr.
    debug: Option<String>,
    /// Override config file
    #[clap(long, parse(from_os_str))]
    etc: Option<PathBuf>,

    #[clap(flatten)]
    cfg: Flags,
}

fn default_executor_dir() -> PathBuf {
    PathBuf::from("/usr/libexec/judge-sandbox")
}

#[serde_with::serde_as]
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: Flags,
    #[serde(default)]
    language: LanguageRegistry,
    #[serde(default)]
    compiler_limit: RunLimit,
    #[serde(default = "default_executor_dir")]
    executor_dir: PathBuf,
}

impl ConfigFile {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = util::load_file(path)?;
        toml::from_str(&content).map_err(Error::TOMLParseError)
    }
}

fn main() {
    let cli = Cli::parse();
    let oj_base = &cli.oj_base;
    let runner_id = &cli.runner_id;

    let etc_path = cli
        .etc
        .clone()
        .unwrap_or_else(|| oj_base.join("etc/judge3.toml"));
    let etc = ConfigFile::load(&etc_path);

    // Without a configuration file, this program is useless because we
    // don't know how to compile or run anything.
    if let Err(e) = etc {
        panic!("config file {} is broken: {}", etc_path.display(), e);
    }

    let etc = etc.unwrap();

    // Change to working directory.
    let wd = cli.cfg.run_dir.as_ref().or(etc.config.run_dir.as_ref());
    if let Some(d) = wd {
        create_dir_all(d).unwrap();
        if std::env::set_current_dir(d).is_err() {
            panic!("cannot change to {}", d.display());
        }
    }

    // Recreate our working directory under the working directory.
    let run_dir = PathBuf::from(format!("run{}", runner_id));
    create_dir_all(&run_dir).unwrap();

    // Initialize logging.
    let log_level = cli
        .cfg
        .log_level
        .or(etc.config.log_level)
        .map_or_else(|| log::LevelFilter::Info, LogLevel::into);

    let use_stderr = cli
        .cfg
        .stderr
        .or_else(|| cli.debug.as_ref().map(|_| true))
        .or(etc.config.stderr)
        .unwrap_or(false);

    let stderr_level = if use_stderr {
        log_level
    } else {
        // Dump errors to stderr even if it's not enabled for normal log.
        log::LevelFilter::Error
    };

    let console_fmt = "{h({d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n})}";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(console_fmt)))
        .build();

    let text_fmt = "{d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n}";
    let log_path = run_dir.join("judge.log");
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(text_fmt)))
        .append(false)
        .build(log_path)
        .unwrap();

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        )
        .appender(Appender::builder().build("file", Box::new(log_file)))
        .build(
            Root::builder()
                .appenders(["stderr", "file"])
                .build(log_level),
        )
        .unwrap();
    log4rs::init_config(config).unwrap();

    let executor_dir = cli
        .cfg
        .executor_dir
        .clone()
        .or_else(|| Some(etc.executor_dir.clone()))
        .unwrap();
    let dry = cli.cfg.dry.or(etc.config.dry).unwrap_or(false);

    let ds = cli.cfg.data_source.or(etc.config.data_source);

    let r = match ds {
        None => {
            error!("data source is not specified");
            exit(1)
        }
        Some(DataSourceKind::Mock) => {
            let mut oj_data = data_mock::MockDataSource::new();
            orchestrator::judge_feedback(
                &etc.language,
                &etc.compiler_limit,
                &executor_dir,
                dry,
                &cli.solution_id,
                &mut oj_data,
                &run_dir,
            )
        }
    };

    if let Err(e) = r {
        error!("error: {}", e);
        exit(1);
    }
}
