use std::{env, sync::OnceLock};

use beanstd::{
  alloc::Error, platform::linux::FileDescriptorStream, report::{Report, Severity, SeverityLogger}
};
use log::LevelFilter;
use thiserror::Error;

/// Environment variable holding the maximum log level.
pub const LOG_ENV: &str = "BEAN_LOG";

pub type StderrLogger = SeverityLogger<FileDescriptorStream>;

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
  #[error("unknown log level {0:?}, expected one of off, error, warn, info, debug or trace")]
  UnknownLevel(String),
  #[error("a logger has already been installed")]
  LoggerInstalled,
}

pub fn parse_level(value: &str) -> Result<LevelFilter, RunError> {
  value.trim().parse().map_err(|_| RunError::UnknownLevel(value.into()))
}

/// Installs a stderr [SeverityLogger] filtered by [LOG_ENV], defaulting to `info`.
pub fn init_logging() -> Result<&'static StderrLogger, RunError> {
  let filter = match env::var(LOG_ENV) {
    Ok(value) => parse_level(&value)?,
    Err(_) => LevelFilter::Info,
  };

  let logger = LOGGER.get_or_init(|| SeverityLogger::new(FileDescriptorStream::stderr()).with_filter(filter));
  log::set_logger(logger).map_err(|_| RunError::LoggerInstalled)?;
  log::set_max_level(filter);

  Ok(logger)
}

/// A named check. `Ok(false)` is a failed assertion, `Err` means the check could not finish.
#[derive(Clone, Copy)]
pub struct Check {
  pub name: &'static str,
  pub run: fn() -> Result<bool, Error>,
}

impl Check {
  pub const fn new(name: &'static str, run: fn() -> Result<bool, Error>) -> Self {
    Self { name, run }
  }
}

/// Runs every check in order and returns how many failed.
pub fn run_checks(checks: &[Check], reporter: &dyn Report) -> usize {
  let mut failures = 0;

  for check in checks {
    reporter.report(Severity::Log, format_args!("Running test \"{}\"", check.name));
    match (check.run)() {
      Ok(true) => {}
      Ok(false) => {
        reporter.report(Severity::Error, format_args!("test \"{}\" failed", check.name));
        failures += 1;
      }
      Err(error) => {
        reporter.report(Severity::Error, format_args!("test \"{}\" stopped: {error}", check.name));
        failures += 1;
      }
    }
  }

  failures
}
