//! Four-level diagnostics.
//!
//! Code that needs to report something takes a `&dyn Report` rather than reaching for a global.
//! [SeverityLogger] renders `[INFO] `, `[WARN] `, `[ERROR] ` and `[FATAL] ` lines to any [StreamWriter], and doubles
//! as a [log::Log] so records from the containers land in the same place.

use core::fmt::{self, Write};

use log::{
  Level, LevelFilter, Log, Metadata, Record, kv::{self, VisitSource}
};

use crate::io::StreamWriter;

/// Records logged to this target are rendered as [Severity::Fatal].
pub const FATAL_TARGET: &str = "fatal";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
  Log,
  Warn,
  Error,
  Fatal,
}

impl Severity {
  pub const fn prefix(self) -> &'static str {
    match self {
      Self::Log => "[INFO] ",
      Self::Warn => "[WARN] ",
      Self::Error => "[ERROR] ",
      Self::Fatal => "[FATAL] ",
    }
  }

  pub const fn level(self) -> Level {
    match self {
      Self::Log => Level::Info,
      Self::Warn => Level::Warn,
      Self::Error | Self::Fatal => Level::Error,
    }
  }

  pub fn of(metadata: &Metadata<'_>) -> Self {
    if metadata.target() == FATAL_TARGET {
      return Self::Fatal;
    }

    match metadata.level() {
      Level::Error => Self::Error,
      Level::Warn => Self::Warn,
      Level::Info | Level::Debug | Level::Trace => Self::Log,
    }
  }
}

pub trait Report {
  fn report(&self, severity: Severity, message: fmt::Arguments<'_>);
}

impl<R: Report + ?Sized> Report for &R {
  fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
    (**self).report(severity, message)
  }
}

/// Forwards reports to whatever logger is installed with [log::set_logger].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl Report for LogFacade {
  fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
    match severity {
      Severity::Fatal => log::error!(target: FATAL_TARGET, "{message}"),
      severity => log::log!(severity.level(), "{message}"),
    }
  }
}

/// Writes one line per report to `writer`. Fatal reports are never filtered out.
#[derive(Clone, Copy, Debug)]
pub struct SeverityLogger<W> {
  writer: W,
  filter: LevelFilter,
}

impl<W: StreamWriter + Copy> SeverityLogger<W> {
  pub const fn new(writer: W) -> Self {
    Self {
      writer,
      filter: LevelFilter::Trace,
    }
  }

  pub const fn with_filter(mut self, filter: LevelFilter) -> Self {
    self.filter = filter;
    self
  }

  pub const fn filter(&self) -> LevelFilter {
    self.filter
  }

  fn shows(&self, severity: Severity, level: Level) -> bool {
    severity == Severity::Fatal || level <= self.filter
  }

  fn emit(&self, severity: Severity, message: fmt::Arguments<'_>, fields: Option<&dyn kv::Source>) {
    let mut writer = self.writer;
    // nowhere left to report a failing diagnostics stream
    let _ = render(&mut writer, severity, message, fields);
  }
}

impl<W: StreamWriter + Copy> Report for SeverityLogger<W> {
  fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
    if self.shows(severity, severity.level()) {
      self.emit(severity, message, None);
    }
  }
}

impl<W: StreamWriter + Copy + Send + Sync> Log for SeverityLogger<W> {
  fn enabled(&self, metadata: &Metadata<'_>) -> bool {
    self.shows(Severity::of(metadata), metadata.level())
  }

  fn log(&self, record: &Record<'_>) {
    if self.enabled(record.metadata()) {
      self.emit(Severity::of(record.metadata()), *record.args(), Some(record.key_values()));
    }
  }

  fn flush(&self) {}
}

/// Renders one diagnostic line: the severity prefix, the message, any ` key=value` fields and a newline.
pub fn render<W: StreamWriter + ?Sized>(
  writer: &mut W,
  severity: Severity,
  message: fmt::Arguments<'_>,
  fields: Option<&dyn kv::Source>,
) -> fmt::Result {
  let mut out = FmtWriter { writer };
  write!(out, "{}{}", severity.prefix(), message)?;
  if let Some(fields) = fields {
    fields.visit(&mut FieldWriter(&mut out)).map_err(|_| fmt::Error)?;
  }
  out.write_char('\n')
}

struct FmtWriter<'w, W: ?Sized> {
  writer: &'w mut W,
}

impl<W: StreamWriter + ?Sized> Write for FmtWriter<'_, W> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    self.writer.write_all(s.as_bytes()).map_err(|_| fmt::Error)
  }
}

struct FieldWriter<'a, 'w, W: ?Sized>(&'a mut FmtWriter<'w, W>);

impl<'kvs, W: StreamWriter + ?Sized> VisitSource<'kvs> for FieldWriter<'_, '_, W> {
  fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
    write!(self.0, " {key}={value}").map_err(|_| kv::Error::msg("failed to render field"))
  }
}
