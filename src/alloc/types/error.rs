use thiserror::Error;

use crate::alloc::{AllocateError, OutOfMemory, OverflowedLayoutCalculation};

/// Why an operation was not meaningful for the container's current state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOperation {
  #[error("the container has been destroyed")]
  Destroyed,
  #[error("a container cannot have a capacity of zero")]
  ZeroCapacity,
  #[error("shrinking would leave the container without capacity")]
  ShrinkToZero,
  #[error("the container is empty")]
  Empty,
  #[error("a capacity of {capacity} cannot hold {length} elements")]
  BelowLength { capacity: usize, length: usize },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// The backing storage could not be obtained or grown.
  ///
  /// For [AllocateError::OverflowedLayoutCalculation] nothing was attempted and the container is unchanged. For
  /// [AllocateError::OutOfMemory] the container has dropped its elements and released its storage: it is left empty
  /// with a capacity of zero, the same state [destroy](super::array::Array::destroy) leaves behind.
  #[error("allocation failed: {0}")]
  AllocationFailure(#[from] AllocateError),
  #[error("invalid operation: {0}")]
  InvalidOperation(#[from] InvalidOperation),
  #[error("index {index} is out of bounds for length {length}")]
  OutOfBounds { index: usize, length: usize },
}

impl From<OutOfMemory> for Error {
  fn from(value: OutOfMemory) -> Self {
    Self::AllocationFailure(value.into())
  }
}

impl From<OverflowedLayoutCalculation> for Error {
  fn from(value: OverflowedLayoutCalculation) -> Self {
    Self::AllocationFailure(value.into())
  }
}
