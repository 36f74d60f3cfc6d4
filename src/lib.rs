//! Growable containers over pluggable C-style allocators.
//!
//! [`Array`](alloc::Array) owns a run of elements, [`String`](alloc::String) owns a run of bytes, and both
//! resize their storage through a shared [`CapacityPolicy`](alloc::CapacityPolicy). Storage comes from any
//! [`CStyleAllocator`](alloc::CStyleAllocator): [`Malloc`](alloc::Malloc), the Rust global allocator
//! ([`StdAlloc`](alloc::StdAlloc)), or an [`ArenaAllocator`](alloc::ArenaAllocator) over a borrowed buffer.
#![no_std]

#[cfg(test)]
#[macro_use]
#[allow(unused)]
extern crate std;

pub mod alloc;
pub mod io;
pub mod num;
pub mod platform;
pub mod report;
#[cfg(feature = "libc")]
pub mod rt;

pub use zerocopy;

pub mod prelude {
  pub use crate::alloc::{Array, ArrayView, CStyleAllocator, CapacityPolicy, Error, String, Terminator};
  pub use crate::io::{LineReader, StreamReader, StreamWriter};
  pub use crate::report::{Report, Severity};
}
