use crate::{Error, Result};
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const CONSOLE_PATTERN: &str = "\x1B[37m{d(%Y-%m-%d %H:%M:%S%.3f)}\x1B[0m {h({l:>5.5})} \x1B[35m{I:>6.6}\x1B[0m \x1B[37m---\x1B[0m \x1B[37m[{T:>15.15}]\x1B[0m \x1B[36m{t:<40.40}\x1B[0m \x1B[37m:\x1B[0m {m}{n}";
const FILE_PATTERN: &str =
    "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:>5.5})} {I:>6.6} --- [{T:>15.15}] {t:<40.40} : {m}{n}";
const STDOUT: &str = "stdout";
const LOG_FILE: &str = "file";
const ROLL_SIZE: u64 = 20 * 1024 * 1024;
const ROLL_WINDOW: u32 = 3;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The destination of the glide log output.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum LogOutput {
    /// Write to the console only.
    #[default]
    Console,
    /// Write to the console and to a size-rolled log file.
    /// The rolled archives are kept next to the log file.
    File(PathBuf),
    /// Replace the glide configuration with a `log4rs` YAML config file.
    ConfigFile(PathBuf),
}

/// The process-wide logger of glide.
/// A second initialization within the same process results in [Error::AlreadyInitialized].
#[derive(Debug)]
pub struct GlideLogger {
    handle: Handle,
    output: LogOutput,
}

impl GlideLogger {
    pub fn builder() -> GlideLoggerBuilder {
        GlideLoggerBuilder::default()
    }

    /// Install the logger for the given output.
    /// The target levels are only applied when glide creates the configuration itself.
    pub fn init(
        root_level: LevelFilter,
        output: LogOutput,
        targets: &[(String, LevelFilter)],
    ) -> Result<Self> {
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }

        let handle = build_config(root_level, &output, targets).and_then(|config| {
            log4rs::init_config(config).map_err(|e| Error::InvalidConfig(e.to_string()))
        });
        match handle {
            Ok(handle) => {
                info!("Glide logger has been initialized with {:?}", output);
                Ok(Self { handle, output })
            }
            Err(e) => {
                INITIALIZED.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Returns the most verbose level which is enabled by the logger.
    pub fn root_log_level(&self) -> LevelFilter {
        self.handle.max_log_level()
    }

    pub fn output(&self) -> &LogOutput {
        &self.output
    }
}

/// Builds a [GlideLogger], logging at info level to the console by default.
#[derive(Debug, Default)]
pub struct GlideLoggerBuilder {
    root_level: Option<LevelFilter>,
    output: LogOutput,
    targets: Vec<(String, LevelFilter)>,
}

impl GlideLoggerBuilder {
    pub fn root_level(&mut self, level: LevelFilter) -> &mut Self {
        self.root_level = Some(level);
        self
    }

    /// Set where the log output should be written to.
    pub fn output(&mut self, output: LogOutput) -> &mut Self {
        self.output = output;
        self
    }

    /// Override the level of the given log target.
    pub fn logger<S: Into<String>>(&mut self, target: S, level: LevelFilter) -> &mut Self {
        let target = target.into();
        self.targets.retain(|(name, _)| name != &target);
        self.targets.push((target, level));
        self
    }

    pub fn build(&mut self) -> Result<GlideLogger> {
        GlideLogger::init(
            self.root_level.take().unwrap_or(LevelFilter::Info),
            mem::take(&mut self.output),
            mem::take(&mut self.targets).as_slice(),
        )
    }
}

fn build_config(
    root_level: LevelFilter,
    output: &LogOutput,
    targets: &[(String, LevelFilter)],
) -> Result<Config> {
    let file_appender = match output {
        LogOutput::ConfigFile(path) => return read_config_file(path),
        LogOutput::Console => None,
        LogOutput::File(path) => Some(rolling_file_appender(path)?),
    };

    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let mut builder =
        Config::builder().appender(Appender::builder().build(STDOUT, Box::new(console)));
    let mut root = Root::builder().appender(STDOUT);
    if let Some(appender) = file_appender {
        builder = builder.appender(Appender::builder().build(LOG_FILE, Box::new(appender)));
        root = root.appender(LOG_FILE);
    }
    builder = builder.loggers(
        targets
            .iter()
            .map(|(target, level)| Logger::builder().build(target.as_str(), *level)),
    );

    builder
        .build(root.build(root_level))
        .map_err(|e| Error::InvalidConfig(e.to_string()))
}

fn read_config_file(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }

    log4rs::config::load_config_file(path, Default::default())
        .map_err(|e| Error::InvalidConfig(e.to_string()))
}

fn rolling_file_appender(path: &Path) -> Result<RollingFileAppender> {
    if let Some(parent) = path.parent().filter(|e| !e.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::LogFile(path.to_path_buf(), e))?;
    }

    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(rolled_file_pattern(path).as_str(), ROLL_WINDOW)
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));

    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .append(false)
        .build(path, Box::new(policy))
        .map_err(|e| Error::LogFile(path.to_path_buf(), e))
}

/// The archive pattern of a rolled log file, e.g. `/var/log/glide.{}.log` for `/var/log/glide.log`.
fn rolled_file_pattern(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "glide".to_string());
    let archive = format!("{}.{{}}.log", stem);

    match path.parent() {
        Some(parent) => parent.join(archive).to_string_lossy().to_string(),
        None => archive,
    }
}
