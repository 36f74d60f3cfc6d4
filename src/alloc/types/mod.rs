pub mod array;
mod error;
pub mod string;
pub mod view;

pub use error::{Error, InvalidOperation};

use crate::alloc::OverflowedLayoutCalculation;

/// Multiplier applied to a container's capacity when it grows, and divisor applied when it shrinks.
pub const DEFAULT_GROWTH_FACTOR: usize = 5;
pub const DEFAULT_ARRAY_CAPACITY: usize = 5;
pub const DEFAULT_STRING_CAPACITY: usize = 12;

/// A change to a container's length that is about to happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
  /// This many elements are about to be written past the current length.
  Insert(usize),
  /// This many elements are about to be removed.
  Remove(usize),
}

/// Decides when a container reallocates, and to what capacity.
///
/// Growth multiplies the capacity by the growth factor until the pending insert fits. Shrinking happens before a
/// removal completes: if the length after the removal would fall below `capacity / growth_factor`, the capacity is
/// divided by the growth factor first. A capacity of zero marks a destroyed container, so the policy never grows from
/// it and never shrinks into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CapacityPolicy {
  growth_factor: usize,
}

impl CapacityPolicy {
  /// Returns `None` for growth factors below 2, which could never grow a container.
  pub const fn new(growth_factor: usize) -> Option<Self> {
    if growth_factor < 2 {
      return None;
    }

    Some(Self { growth_factor })
  }

  pub const fn growth_factor(&self) -> usize {
    self.growth_factor
  }

  /// The capacity a container of `length` live elements and `capacity` slots should move to before `pending`
  /// happens, or `None` if the current capacity should stay.
  pub fn next_capacity(&self, length: usize, capacity: usize, pending: Pending) -> Result<Option<usize>, Error> {
    match pending {
      Pending::Insert(count) => {
        let required = length.checked_add(count).ok_or(OverflowedLayoutCalculation)?;
        if required <= capacity {
          return Ok(None);
        }

        let mut target = self.expanded(capacity)?;
        while target < required {
          target = self.expanded(target)?;
        }

        Ok(Some(target))
      }
      Pending::Remove(count) => {
        if capacity == 0 {
          return Err(InvalidOperation::Destroyed.into());
        }

        let projected = length.checked_sub(count).ok_or(InvalidOperation::Empty)?;
        let target = capacity / self.growth_factor;

        // the old elements stay in place until the removal finishes, so the target has to hold all of them
        Ok((projected < target && target >= length).then_some(target))
      }
    }
  }

  /// One growth step up from `capacity`.
  pub fn expanded(&self, capacity: usize) -> Result<usize, Error> {
    if capacity == 0 {
      return Err(InvalidOperation::Destroyed.into());
    }

    Ok(capacity.checked_mul(self.growth_factor).ok_or(OverflowedLayoutCalculation)?)
  }

  /// One shrink step down from `capacity`.
  pub fn shrunk(&self, capacity: usize) -> Result<usize, Error> {
    if capacity == 0 {
      return Err(InvalidOperation::Destroyed.into());
    }

    match capacity / self.growth_factor {
      0 => Err(InvalidOperation::ShrinkToZero.into()),
      target => Ok(target),
    }
  }
}

impl Default for CapacityPolicy {
  fn default() -> Self {
    Self {
      growth_factor: DEFAULT_GROWTH_FACTOR,
    }
  }
}
