use thiserror::Error;

use crate::{
  alloc::{CStyleAllocator, Error, String}, io::StreamReader
};

const LINE_BUFFER_SIZE: usize = 256;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadLineError<E> {
  #[error("reading from the stream failed: {0}")]
  Read(E),
  #[error("the line could not be stored: {0}")]
  Container(#[from] Error),
}

/// Splits a byte stream on `\n`, pushing each line into a caller-owned [String].
pub struct LineReader<R> {
  reader: R,
  buffer: [u8; LINE_BUFFER_SIZE],
  start: usize,
  end: usize,
  exhausted: bool,
}

impl<R: StreamReader> LineReader<R> {
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      buffer: [0; LINE_BUFFER_SIZE],
      start: 0,
      end: 0,
      exhausted: false,
    }
  }

  pub fn into_inner(self) -> R {
    self.reader
  }

  /// Appends the next line to `line`, without its `\n`.
  ///
  /// Returns `false` once the stream is exhausted and nothing was read. A final line without a trailing newline is
  /// still returned.
  pub fn read_line<A: CStyleAllocator>(&mut self, line: &mut String<A>) -> Result<bool, ReadLineError<R::ReadError>> {
    let mut read_any = false;

    loop {
      if self.start == self.end {
        if self.exhausted {
          return Ok(read_any);
        }

        let count = self.reader.read(&mut self.buffer).map_err(ReadLineError::Read)?;
        if count == 0 {
          self.exhausted = true;
          return Ok(read_any);
        }

        self.start = 0;
        self.end = count.min(LINE_BUFFER_SIZE);
      }

      let pending = &self.buffer[self.start..self.end];
      match pending.iter().position(|&byte| byte == b'\n') {
        Some(newline) => {
          line.push_bytes(&pending[..newline])?;
          self.start += newline + 1;
          return Ok(true);
        }
        None => {
          line.push_bytes(pending)?;
          self.start = self.end;
          read_any = true;
        }
      }
    }
  }

  /// Like [LineReader::read_line], but a line that cannot be stored terminates the process through
  /// [fatal](crate::rt::fatal).
  #[cfg(feature = "libc")]
  pub fn read_line_or_exit<A: CStyleAllocator>(
    &mut self,
    line: &mut String<A>,
    reporter: &dyn crate::report::Report,
  ) -> Result<bool, R::ReadError> {
    match self.read_line(line) {
      Ok(read) => Ok(read),
      Err(ReadLineError::Read(error)) => Err(error),
      Err(ReadLineError::Container(error)) => {
        crate::rt::fatal(reporter, format_args!("failed to store an input line: {error}"))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::vec::Vec;

  use super::{LineReader, ReadLineError};
  use crate::{
    alloc::{ArenaAllocator, Error, String, StdAlloc}, io::StreamReader
  };

  /// Hands out at most `step` bytes per read.
  struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
  }

  impl StreamReader for Trickle<'_> {
    type ReadError = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
      let count = self.step.min(buf.len()).min(self.data.len());
      buf[..count].copy_from_slice(&self.data[..count]);
      self.data = &self.data[count..];
      Ok(count)
    }
  }

  struct Broken;

  impl StreamReader for Broken {
    type ReadError = &'static str;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, &'static str> {
      Err("unplugged")
    }
  }

  fn collect_lines<R: StreamReader>(reader: R) -> Vec<std::string::String>
  where
    R::ReadError: core::fmt::Debug,
  {
    let mut reader = LineReader::new(reader);
    let mut lines = Vec::new();
    loop {
      let mut line = String::<StdAlloc>::new().unwrap();
      if !reader.read_line(&mut line).unwrap() {
        return lines;
      }
      lines.push(line.to_str().unwrap().into());
    }
  }

  #[test]
  fn splits_on_newlines() {
    let input: &[u8] = b"first\nsecond\n\nlast";
    assert_eq!(collect_lines(input), ["first", "second", "", "last"]);
  }

  #[test]
  fn trailing_newline_ends_cleanly() {
    let input: &[u8] = b"only\n";
    assert_eq!(collect_lines(input), ["only"]);
    assert!(collect_lines(&b""[..]).is_empty());
  }

  #[test]
  fn lines_span_reads() {
    let data = [b'x'; 600];
    let mut input = Vec::from(&data[..]);
    input.extend_from_slice(b"\nshort\n");

    let lines = collect_lines(Trickle { data: &input, step: 7 });
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 600);
    assert_eq!(lines[1], "short");
  }

  #[test]
  fn read_errors_are_surfaced() {
    let mut reader = LineReader::new(Broken);
    let mut line = String::<StdAlloc>::new().unwrap();
    assert_eq!(reader.read_line(&mut line), Err(ReadLineError::Read("unplugged")));
  }

  #[test]
  fn container_errors_are_surfaced() {
    let mut buffer = [core::mem::MaybeUninit::uninit(); 16];
    let arena = ArenaAllocator::new(&mut buffer);
    let mut line = String::new_in(&arena).unwrap();
    let mut reader = LineReader::new(&b"this line does not fit\n"[..]);

    assert!(matches!(
      reader.read_line(&mut line),
      Err(ReadLineError::Container(Error::AllocationFailure(_)))
    ));
    assert!(line.is_destroyed());
  }
}
