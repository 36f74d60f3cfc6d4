use core::fmt;

use crate::report::{Report, Severity};

/// Terminates the process with `code`, running the C exit handlers.
pub fn exit(code: i32) -> ! {
  unsafe { libc::exit(code) }
}

/// Reports `message` as [Severity::Fatal], then exits with `EXIT_FAILURE`.
///
/// Reserved for failures the caller cannot carry on from, such as losing the buffer an input line was being read
/// into.
pub fn fatal(reporter: &dyn Report, message: fmt::Arguments<'_>) -> ! {
  reporter.report(Severity::Fatal, message);
  exit(libc::EXIT_FAILURE)
}
