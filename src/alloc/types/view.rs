use core::{
  fmt::{self, Debug}, ops::Deref, slice
};

use zerocopy::{Immutable, IntoBytes};

use crate::alloc::{Array, CStyleAllocator, DEFAULT_ARRAY_CAPACITY, Error};

/// A borrowed window into an [Array] or [String](super::string::String).
///
/// The borrow keeps the source alive and unmodified for as long as the view exists.
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T> {
  elements: &'a [T],
  offset: usize,
}

/// Clamps `[start, end)` to `length`: a start past the end of the data becomes 0, an end past it becomes `length`,
/// and a start beyond the end yields an empty range.
pub(crate) fn clamp_range(length: usize, start: usize, end: usize) -> (usize, usize) {
  let start = if start > length { 0 } else { start };
  let end = end.min(length);
  (start, end.max(start))
}

impl<'a, T> ArrayView<'a, T> {
  pub fn new(source: &'a [T], start: usize, end: usize) -> Self {
    let (start, end) = clamp_range(source.len(), start, end);
    Self {
      elements: &source[start..end],
      offset: start,
    }
  }

  /// Where the view starts within its source.
  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&'a T> {
    self.elements.get(index)
  }

  pub fn iter(&self) -> slice::Iter<'a, T> {
    self.elements.iter()
  }

  pub fn as_slice(&self) -> &'a [T] {
    self.elements
  }

  pub fn bytes_eq(&self, other: &ArrayView<'_, T>) -> bool
  where
    T: IntoBytes + Immutable,
  {
    self.elements.as_bytes() == other.elements.as_bytes()
  }

  /// Copies the viewed elements into a new array from `allocator`.
  pub fn to_array_in<A: CStyleAllocator>(&self, allocator: A) -> Result<Array<T, A>, Error>
  where
    T: Clone,
  {
    let mut array = Array::with_capacity_in(self.len().max(DEFAULT_ARRAY_CAPACITY), allocator)?;
    array.extend_from_slice(self.elements)?;
    Ok(array)
  }
}

impl<T> Deref for ArrayView<'_, T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.elements
  }
}

impl<T: PartialEq<U>, U> PartialEq<ArrayView<'_, U>> for ArrayView<'_, T> {
  fn eq(&self, other: &ArrayView<'_, U>) -> bool {
    self.elements == other.elements
  }
}

impl<T: Eq> Eq for ArrayView<'_, T> {}

impl<T: PartialEq<U>, U> PartialEq<[U]> for ArrayView<'_, T> {
  fn eq(&self, other: &[U]) -> bool {
    self.elements == other
  }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for ArrayView<'_, T> {
  fn eq(&self, other: &[U; N]) -> bool {
    self.elements == other
  }
}

impl<T: Debug> Debug for ArrayView<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArrayView").field("offset", &self.offset).field("elements", &self.elements).finish()
  }
}

impl<'a, T> IntoIterator for ArrayView<'a, T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.elements.iter()
  }
}

impl<'a, T> IntoIterator for &ArrayView<'a, T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.elements.iter()
  }
}
