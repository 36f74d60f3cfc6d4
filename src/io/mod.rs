//! Byte streams in and out of the containers.

use core::convert::Infallible;

use crate::alloc::{CStyleAllocator, Error, String};

mod line;

pub use line::{LineReader, ReadLineError};

pub trait StreamWriter {
  type WriteError;

  /// Writes a prefix of `buf` and advances `buf` past it.
  fn write(&mut self, buf: &mut &[u8]) -> Result<(), Self::WriteError>;

  fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Self::WriteError> {
    while !buf.is_empty() {
      self.write(&mut buf)?;
    }
    Ok(())
  }
}

pub trait StreamReader {
  type ReadError;

  /// Fills the front of `buf`, returning how many bytes were read. Zero means the stream has ended.
  fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::ReadError>;
}

impl<W: StreamWriter + ?Sized> StreamWriter for &mut W {
  type WriteError = W::WriteError;

  fn write(&mut self, buf: &mut &[u8]) -> Result<(), Self::WriteError> {
    (**self).write(buf)
  }
}

impl<R: StreamReader + ?Sized> StreamReader for &mut R {
  type ReadError = R::ReadError;

  fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::ReadError> {
    (**self).read(buf)
  }
}

impl StreamReader for &[u8] {
  type ReadError = Infallible;

  fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
    let count = buf.len().min(self.len());
    let (head, tail) = self.split_at(count);
    buf[..count].copy_from_slice(head);
    *self = tail;
    Ok(count)
  }
}

/// Appends everything written, growing like [String::push_bytes].
impl<A: CStyleAllocator> StreamWriter for String<A> {
  type WriteError = Error;

  fn write(&mut self, buf: &mut &[u8]) -> Result<(), Error> {
    self.push_bytes(*buf)?;
    *buf = &[];
    Ok(())
  }
}

/// Writes `line` followed by a newline.
pub fn write_line<W: StreamWriter + ?Sized>(writer: &mut W, line: impl AsRef<[u8]>) -> Result<(), W::WriteError> {
  writer.write_all(line.as_ref())?;
  writer.write_all(b"\n")
}

/// Writes `line` and a newline to standard output.
#[cfg(target_os = "linux")]
pub fn puts(line: impl AsRef<[u8]>) -> Result<(), crate::platform::linux::LinuxError> {
  write_line(&mut crate::platform::linux::FileDescriptorStream::stdout(), line)
}
