pub mod arena;
pub mod foreign;

use core::{alloc::Layout, cmp, ptr};

#[doc(inline)]
pub use arena::*;
#[doc(inline)]
pub use foreign::*;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("overflowed while attempting to calculate layout")]
pub struct OverflowedLayoutCalculation;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("allocator is out of memory")]
pub struct OutOfMemory;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocateError {
  #[error("{0}")]
  OverflowedLayoutCalculation(#[from] OverflowedLayoutCalculation),
  #[error("{0}")]
  OutOfMemory(#[from] OutOfMemory),
}

/// A memory allocator adapter for C-style allocators (malloc, realloc and free).
///
/// Safety:
/// Allocated memory blocks must be valid, and remain until they are freed.
///
pub unsafe trait CStyleAllocator {
  fn alloc(&self, layout: Layout) -> Result<ptr::NonNull<u8>, OutOfMemory>;

  /// Safety:
  /// - `ptr` must point to a valid memory block allocated by this allocator
  /// - `layout` must be the layout of the memory block
  unsafe fn free(&self, ptr: ptr::NonNull<u8>, layout: Layout);

  /// Moves the block at `ptr` into a block of `new_size` bytes with the alignment of `layout`.
  ///
  /// On failure the original block is untouched and still belongs to the caller.
  ///
  /// Safety:
  /// - `ptr` and `layout` must describe a live block allocated by this allocator
  /// - `new_size` must be non-zero, and must not overflow `isize` when rounded up to `layout.align()`
  unsafe fn realloc(&self, ptr: ptr::NonNull<u8>, layout: Layout, new_size: usize) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    // Safety: forwarded from the caller
    unsafe { realloc_by_copy(self, ptr, layout, new_size) }
  }
}

/// Reallocation for allocators that can only allocate and free: copy into a fresh block, then free the old one.
///
/// Safety: see [CStyleAllocator::realloc].
pub unsafe fn realloc_by_copy<C: CStyleAllocator + ?Sized>(
  allocator: &C,
  ptr: ptr::NonNull<u8>,
  layout: Layout,
  new_size: usize,
) -> Result<ptr::NonNull<u8>, OutOfMemory> {
  let new_layout = Layout::from_size_align(new_size, layout.align()).map_err(|_| OutOfMemory)?;
  let new_ptr = allocator.alloc(new_layout)?;

  unsafe {
    // Safety: both blocks are live and distinct, and at least this many bytes long
    ptr.copy_to_nonoverlapping(new_ptr, cmp::min(layout.size(), new_size));
    // Safety: the caller handed over the old block
    allocator.free(ptr, layout);
  }

  Ok(new_ptr)
}

unsafe impl<C: CStyleAllocator + ?Sized> CStyleAllocator for &C {
  fn alloc(&self, layout: Layout) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    (**self).alloc(layout)
  }

  unsafe fn free(&self, ptr: ptr::NonNull<u8>, layout: Layout) {
    unsafe { (**self).free(ptr, layout) }
  }

  unsafe fn realloc(&self, ptr: ptr::NonNull<u8>, layout: Layout, new_size: usize) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    unsafe { (**self).realloc(ptr, layout, new_size) }
  }
}

pub fn calculate_layout_for_array<T>(element_count: usize) -> Result<Layout, OverflowedLayoutCalculation> {
  Layout::array::<T>(element_count).map_err(|_| OverflowedLayoutCalculation)
}
