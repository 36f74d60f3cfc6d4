use syscalls::{Errno, Sysno, syscall};
use thiserror::Error;

use crate::io::{StreamReader, StreamWriter};

pub type FileDescriptor = u32;

// todo: enum once more than raw errnos need distinguishing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
#[error("Unhandled error: {0}")]
pub struct LinuxError(pub Errno);

/// An already-open file descriptor, read and written with raw syscalls. Closing it is up to the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileDescriptorStream {
  file_descriptor: FileDescriptor,
}

impl FileDescriptorStream {
  pub const fn from_raw(file_descriptor: FileDescriptor) -> Self {
    Self { file_descriptor }
  }

  pub const fn stdin() -> Self {
    Self::from_raw(libc::STDIN_FILENO as FileDescriptor)
  }

  pub const fn stdout() -> Self {
    Self::from_raw(libc::STDOUT_FILENO as FileDescriptor)
  }

  pub const fn stderr() -> Self {
    Self::from_raw(libc::STDERR_FILENO as FileDescriptor)
  }

  pub const fn file_descriptor(&self) -> FileDescriptor {
    self.file_descriptor
  }
}

impl StreamReader for FileDescriptorStream {
  type ReadError = LinuxError;

  fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinuxError> {
    loop {
      match unsafe { syscall!(Sysno::read, self.file_descriptor, buf.as_mut_ptr(), buf.len()) } {
        Ok(count) => return Ok(count),
        Err(errno) if errno == Errno::EINTR => continue,
        Err(errno) => return Err(LinuxError(errno)),
      }
    }
  }
}

impl StreamWriter for FileDescriptorStream {
  type WriteError = LinuxError;

  fn write(&mut self, buf: &mut &[u8]) -> Result<(), LinuxError> {
    let pending: &[u8] = *buf;
    loop {
      match unsafe { syscall!(Sysno::write, self.file_descriptor, pending.as_ptr(), pending.len()) } {
        // a descriptor that takes nothing would make write_all spin forever
        Ok(0) if !pending.is_empty() => return Err(LinuxError(Errno::EIO)),
        Ok(count) => {
          *buf = &pending[count.min(pending.len())..];
          return Ok(());
        }
        Err(errno) if errno == Errno::EINTR => continue,
        Err(errno) => return Err(LinuxError(errno)),
      }
    }
  }
}
