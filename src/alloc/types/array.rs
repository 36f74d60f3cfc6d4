use core::{
  cmp, fmt::{self, Debug}, ops::{Deref, DerefMut}, ptr, slice
};

use zerocopy::{FromZeros, Immutable, IntoBytes};

use crate::alloc::{
  CStyleAllocator, CapacityPolicy, DEFAULT_ARRAY_CAPACITY, Error, InvalidOperation, Pending, raw::RawStorage, types::view::ArrayView
};

/// An ordered run of owned elements in storage from `A`, resized by a [CapacityPolicy].
///
/// Every element belongs to the array until it is popped or removed (which hands it back), and is dropped exactly
/// once otherwise: by [Array::destroy], by [Drop], or when a failed reallocation releases the array.
///
/// Any mutation may move the storage, so views and slices borrowed from an array cannot outlive the next mutation.
pub struct Array<T, A: CStyleAllocator> {
  storage: RawStorage<T, A>,
  length: usize,
}

impl<T, A: CStyleAllocator + Default> Array<T, A> {
  pub fn new() -> Result<Self, Error> {
    Self::new_in(A::default())
  }

  pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
    Self::with_capacity_in(capacity, A::default())
  }

  pub fn zeroed(length: usize) -> Result<Self, Error>
  where
    T: FromZeros,
  {
    Self::zeroed_in(length, A::default())
  }
}

impl<T, A: CStyleAllocator> Array<T, A> {
  pub fn new_in(allocator: A) -> Result<Self, Error> {
    Self::with_capacity_in(DEFAULT_ARRAY_CAPACITY, allocator)
  }

  pub fn with_capacity_in(capacity: usize, allocator: A) -> Result<Self, Error> {
    Self::with_capacity_and_policy_in(capacity, CapacityPolicy::default(), allocator)
  }

  pub fn with_capacity_and_policy_in(capacity: usize, policy: CapacityPolicy, allocator: A) -> Result<Self, Error> {
    Ok(Self {
      storage: RawStorage::with_capacity_in(capacity, policy, allocator)?,
      length: 0,
    })
  }

  pub fn len(&self) -> usize {
    self.length
  }

  pub fn capacity(&self) -> usize {
    self.storage.capacity()
  }

  pub fn is_empty(&self) -> bool {
    self.length == 0
  }

  /// True once the array has been destroyed or released by a failed allocation.
  pub fn is_destroyed(&self) -> bool {
    self.storage.capacity() == 0
  }

  pub fn policy(&self) -> CapacityPolicy {
    self.storage.policy()
  }

  pub fn allocator(&self) -> &A {
    self.storage.allocator()
  }

  pub fn as_slice(&self) -> &[T] {
    // Safety: the first `length` slots are initialized, and the pointer is aligned and non-null even when destroyed
    unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.length) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    // Safety: see as_slice
    unsafe { slice::from_raw_parts_mut(self.storage.as_ptr(), self.length) }
  }

  /// Reallocates to exactly `capacity` slots.
  ///
  /// A capacity of zero, or one below the current length, is an [InvalidOperation].
  pub fn reserve(&mut self, capacity: usize) -> Result<(), Error> {
    // Safety: the first `length` slots are initialized
    unsafe { self.storage.reallocate(capacity, &mut self.length) }
  }

  /// Grows the capacity by one step of the policy.
  pub fn expand(&mut self) -> Result<(), Error> {
    let capacity = self.policy().expanded(self.capacity())?;
    self.reserve(capacity)
  }

  /// Shrinks the capacity by one step of the policy. Shrinking to nothing, or below the length, is rejected.
  pub fn shrink(&mut self) -> Result<(), Error> {
    let capacity = self.policy().shrunk(self.capacity())?;
    self.reserve(capacity)
  }

  fn prepare(&mut self, pending: Pending) -> Result<(), Error> {
    // Safety: the first `length` slots are initialized
    unsafe { self.storage.prepare(&mut self.length, pending) }
  }

  pub fn push(&mut self, value: T) -> Result<(), Error> {
    self.prepare(Pending::Insert(1))?;

    // Safety: prepare made room for at least one more element
    unsafe { self.storage.as_ptr().add(self.length).write(value) };
    self.length += 1;

    Ok(())
  }

  /// Removes the last element and hands it back; dropping it releases it.
  pub fn pop(&mut self) -> Result<T, Error> {
    if self.length == 0 {
      return Err(InvalidOperation::Empty.into());
    }

    self.prepare(Pending::Remove(1))?;

    self.length -= 1;
    // Safety: the slot was initialized and is now past the length, so it is read exactly once
    Ok(unsafe { self.storage.as_ptr().add(self.length).read() })
  }

  /// Inserts `value` at `index`, shifting everything after it one slot toward the tail.
  pub fn insert(&mut self, index: usize, value: T) -> Result<(), Error> {
    if index > self.length {
      return Err(Error::OutOfBounds { index, length: self.length });
    }

    self.prepare(Pending::Insert(1))?;

    unsafe {
      let slot = self.storage.as_ptr().add(index);
      // Safety: there is room for one more element, and copy handles the overlap
      ptr::copy(slot, slot.add(1), self.length - index);
      slot.write(value);
    }
    self.length += 1;

    Ok(())
  }

  /// Removes the element at `index` and hands it back, closing the gap.
  pub fn remove(&mut self, index: usize) -> Result<T, Error> {
    if index >= self.length {
      return Err(Error::OutOfBounds { index, length: self.length });
    }

    self.prepare(Pending::Remove(1))?;

    let value = unsafe {
      let slot = self.storage.as_ptr().add(index);
      let value = slot.read();
      // Safety: the source range ends at the length, and the slot at index has been moved out
      ptr::copy(slot.add(1), slot, self.length - index - 1);
      value
    };
    self.length -= 1;

    Ok(value)
  }

  /// Moves every element of `other` onto the end of this array, leaving `other` empty.
  ///
  /// If this array cannot grow, `other` keeps its elements.
  pub fn append<B: CStyleAllocator>(&mut self, other: &mut Array<T, B>) -> Result<(), Error> {
    self.prepare(Pending::Insert(other.length))?;

    unsafe {
      // Safety: prepare made room for other.length elements, and the two arrays never share storage
      ptr::copy_nonoverlapping(other.storage.as_ptr(), self.storage.as_ptr().add(self.length), other.length);
    }
    self.length += other.length;
    // the elements now belong to self
    other.length = 0;

    Ok(())
  }

  /// Drops every element, keeping the capacity.
  pub fn clear(&mut self) {
    let live = self.length;
    self.length = 0;
    // Safety: these slots were initialized and are no longer reachable through the length
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.storage.as_ptr(), live)) };
  }

  /// Borrows `[start, end)`. A `start` past the length becomes 0 and an `end` past the length becomes the length.
  pub fn view(&self, start: usize, end: usize) -> ArrayView<'_, T> {
    ArrayView::new(self.as_slice(), start, end)
  }

  pub fn as_view(&self) -> ArrayView<'_, T> {
    self.view(0, self.length)
  }

  /// Compares the raw bytes of both arrays' elements.
  pub fn bytes_eq<B: CStyleAllocator>(&self, other: &Array<T, B>) -> bool
  where
    T: IntoBytes + Immutable,
  {
    self.as_view().bytes_eq(&other.as_view())
  }

  /// Drops every element and frees the storage. Destroying an array twice is an [InvalidOperation].
  pub fn destroy(&mut self) -> Result<(), Error> {
    if self.is_destroyed() {
      return Err(InvalidOperation::Destroyed.into());
    }

    // Safety: the first `length` slots are initialized
    unsafe { self.storage.release(&mut self.length) };
    Ok(())
  }

  /// Writes `length` zeroed elements into a new array.
  pub fn zeroed_in(length: usize, allocator: A) -> Result<Self, Error>
  where
    T: FromZeros,
  {
    let mut array = Self::with_capacity_in(cmp::max(length, DEFAULT_ARRAY_CAPACITY), allocator)?;

    // Safety: the capacity covers `length` elements, and all zeroes is a valid T
    unsafe { array.storage.as_ptr().write_bytes(0, length) };
    array.length = length;

    Ok(array)
  }
}

impl<T: Clone, A: CStyleAllocator> Array<T, A> {
  /// Clones `values` onto the end of the array, growing once up front.
  pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), Error> {
    self.prepare(Pending::Insert(values.len()))?;

    for value in values {
      // Safety: prepare made room for every value; the length grows one at a time so a panicking clone leaks nothing
      unsafe { self.storage.as_ptr().add(self.length).write(value.clone()) };
      self.length += 1;
    }

    Ok(())
  }
}

impl<T: Copy, A: CStyleAllocator> Array<T, A> {
  pub(crate) fn extend_from_copies(&mut self, values: &[T]) -> Result<(), Error> {
    self.prepare(Pending::Insert(values.len()))?;

    // Safety: prepare made room, and values cannot alias storage that a `&mut self` borrow guards
    unsafe { ptr::copy_nonoverlapping(values.as_ptr(), self.storage.as_ptr().add(self.length), values.len()) };
    self.length += values.len();

    Ok(())
  }
}

impl<T: Clone, A: CStyleAllocator + Clone> Array<T, A> {
  /// Clones `[start, end)` into a new array, clamping the range like [Array::view].
  pub fn slice(&self, start: usize, end: usize) -> Result<Self, Error> {
    let mut array =
      Self::with_capacity_and_policy_in(DEFAULT_ARRAY_CAPACITY, self.policy(), self.allocator().clone())?;
    array.extend_from_slice(&self.view(start, end))?;
    Ok(array)
  }

  /// Deep copy with the same capacity and policy.
  pub fn try_clone(&self) -> Result<Self, Error> {
    if self.is_destroyed() {
      return Err(InvalidOperation::Destroyed.into());
    }

    let mut array = Self::with_capacity_and_policy_in(self.capacity(), self.policy(), self.allocator().clone())?;
    array.extend_from_slice(self)?;
    Ok(array)
  }
}

impl<T, A: CStyleAllocator> Drop for Array<T, A> {
  fn drop(&mut self) {
    // Safety: the first `length` slots are initialized
    unsafe { self.storage.release(&mut self.length) };
  }
}

impl<T, A: CStyleAllocator> Deref for Array<T, A> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T, A: CStyleAllocator> DerefMut for Array<T, A> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T, A: CStyleAllocator> AsRef<[T]> for Array<T, A> {
  fn as_ref(&self) -> &[T] {
    self
  }
}

impl<T, A: CStyleAllocator> AsMut<[T]> for Array<T, A> {
  fn as_mut(&mut self) -> &mut [T] {
    self
  }
}

impl<'a, T, A: CStyleAllocator> IntoIterator for &'a Array<T, A> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.as_slice().iter()
  }
}

impl<'a, T, A: CStyleAllocator> IntoIterator for &'a mut Array<T, A> {
  type Item = &'a mut T;
  type IntoIter = slice::IterMut<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.as_mut_slice().iter_mut()
  }
}

impl<T: PartialEq<U>, U, A: CStyleAllocator, B: CStyleAllocator> PartialEq<Array<U, B>> for Array<T, A> {
  fn eq(&self, other: &Array<U, B>) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq, A: CStyleAllocator> Eq for Array<T, A> {}

impl<T: PartialEq<U>, U, A: CStyleAllocator, const N: usize> PartialEq<[U; N]> for Array<T, A> {
  fn eq(&self, other: &[U; N]) -> bool {
    self.as_slice() == other
  }
}

impl<T: Debug, A: CStyleAllocator> Debug for Array<T, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.as_slice().fmt(f)
  }
}
