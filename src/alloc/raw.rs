//! The allocation underneath every container: a pointer, a slot count and the allocator that owns the block.
//!
//! [RawStorage] knows nothing about which slots are initialized. Every method that moves or drops elements takes the
//! owning container's length, and zeroes it before dropping anything so a panicking destructor can never lead to a
//! second drop.

use core::{marker::PhantomData, mem, ptr};

use log::{trace, warn};

use crate::alloc::{
  CStyleAllocator, CapacityPolicy, Error, InvalidOperation, Pending, calculate_layout_for_array
};

pub(crate) struct RawStorage<T, A: CStyleAllocator> {
  ptr: ptr::NonNull<T>,
  capacity: usize,
  policy: CapacityPolicy,
  allocator: A,
  marker: PhantomData<T>,
}

// Safety: the storage uniquely owns its block, like a Box<[T]>
unsafe impl<T: Send, A: CStyleAllocator + Send> Send for RawStorage<T, A> {}
unsafe impl<T: Sync, A: CStyleAllocator + Sync> Sync for RawStorage<T, A> {}

impl<T, A: CStyleAllocator> RawStorage<T, A> {
  pub fn with_capacity_in(capacity: usize, policy: CapacityPolicy, allocator: A) -> Result<Self, Error> {
    if capacity == 0 {
      return Err(InvalidOperation::ZeroCapacity.into());
    }

    let layout = calculate_layout_for_array::<T>(capacity)?;
    let ptr = if layout.size() == 0 {
      ptr::NonNull::dangling()
    } else {
      allocator.alloc(layout)?.cast()
    };

    Ok(Self {
      ptr,
      capacity,
      policy,
      allocator,
      marker: PhantomData,
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn policy(&self) -> CapacityPolicy {
    self.policy
  }

  pub fn allocator(&self) -> &A {
    &self.allocator
  }

  pub fn as_ptr(&self) -> *mut T {
    self.ptr.as_ptr()
  }

  /// Moves the storage to exactly `capacity` slots, keeping the first `*length` elements.
  ///
  /// If the allocator refuses, the live elements are dropped, the old block is freed and `*length` becomes zero.
  ///
  /// Safety: the first `*length` slots must be initialized.
  pub unsafe fn reallocate(&mut self, capacity: usize, length: &mut usize) -> Result<(), Error> {
    if self.capacity == 0 {
      return Err(InvalidOperation::Destroyed.into());
    }
    if capacity == 0 {
      return Err(InvalidOperation::ZeroCapacity.into());
    }
    if capacity < *length {
      return Err(InvalidOperation::BelowLength { capacity, length: *length }.into());
    }
    if capacity == self.capacity {
      return Ok(());
    }

    let old_layout = calculate_layout_for_array::<T>(self.capacity)?;
    let new_layout = calculate_layout_for_array::<T>(capacity)?;

    if new_layout.size() == 0 {
      self.capacity = capacity;
      return Ok(());
    }

    // Safety: the block is live and was allocated by this allocator with old_layout
    match unsafe { self.allocator.realloc(self.ptr.cast(), old_layout, new_layout.size()) } {
      Ok(ptr) => {
        trace!(length = *length, from = self.capacity, to = capacity; "reallocated container storage");
        self.ptr = ptr.cast();
        self.capacity = capacity;
        Ok(())
      }
      Err(error) => {
        warn!(length = *length, from = self.capacity, to = capacity; "reallocation failed, releasing container");
        unsafe { self.release(length) };
        Err(error.into())
      }
    }
  }

  /// Applies the capacity policy ahead of `pending`.
  ///
  /// Safety: the first `*length` slots must be initialized.
  pub unsafe fn prepare(&mut self, length: &mut usize, pending: Pending) -> Result<(), Error> {
    match self.policy.next_capacity(*length, self.capacity, pending)? {
      Some(capacity) => unsafe { self.reallocate(capacity, length) },
      None => Ok(()),
    }
  }

  /// Drops the live elements and frees the block, leaving a capacity of zero.
  ///
  /// Safety: the first `*length` slots must be initialized.
  pub unsafe fn release(&mut self, length: &mut usize) {
    let live = mem::replace(length, 0);
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), live)) };
    self.free_block();
  }

  fn free_block(&mut self) {
    if self.capacity == 0 {
      return;
    }

    if let Ok(layout) = calculate_layout_for_array::<T>(self.capacity) {
      if layout.size() != 0 {
        // Safety: the block is live and was allocated with this layout
        unsafe { self.allocator.free(self.ptr.cast(), layout) };
      }
    }

    self.ptr = ptr::NonNull::dangling();
    self.capacity = 0;
  }
}

impl<T, A: CStyleAllocator> Drop for RawStorage<T, A> {
  fn drop(&mut self) {
    self.free_block();
  }
}
