//! Echoes standard input line by line.

use std::process::ExitCode;

use beanstd::{
  alloc::{Malloc, String}, io::{LineReader, puts}, platform::linux::FileDescriptorStream, rt
};
use beanstd_runner::init_logging;

fn main() -> ExitCode {
  let logger = match init_logging() {
    Ok(logger) => logger,
    Err(error) => {
      eprintln!("{error}");
      return ExitCode::FAILURE;
    }
  };

  let mut reader = LineReader::new(FileDescriptorStream::stdin());
  let mut count = 0usize;

  loop {
    let mut line = match String::<Malloc>::new() {
      Ok(line) => line,
      Err(error) => rt::fatal(logger, format_args!("failed to initialize a line buffer: {error}")),
    };

    match reader.read_line_or_exit(&mut line, logger) {
      Ok(false) => break,
      Ok(true) => {
        if let Err(error) = puts(&line) {
          log::error!("failed to write to stdout: {error}");
          return ExitCode::FAILURE;
        }
        count += 1;
      }
      Err(error) => {
        log::error!("failed to read from stdin: {error}");
        return ExitCode::FAILURE;
      }
    }
  }

  log::debug!(lines = count; "stdin exhausted");
  ExitCode::SUCCESS
}
