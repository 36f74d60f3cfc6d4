use crate::alloc::{CStyleAllocator, OutOfMemory, realloc_by_copy};
use core::{alloc::Layout, mem, ptr};

/// Every block from malloc is at least this aligned, which is all `realloc` promises to keep.
const MALLOC_ALIGNMENT: usize = 2 * mem::size_of::<usize>();

#[derive(Clone, Copy, Debug, Default)]
pub struct Malloc;

unsafe impl CStyleAllocator for Malloc {
  fn alloc(&self, layout: Layout) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    let ptr = unsafe { libc::aligned_alloc(layout.align(), layout.size()) };
    ptr::NonNull::new(ptr.cast::<u8>()).ok_or(OutOfMemory)
  }

  unsafe fn free(&self, ptr: ptr::NonNull<u8>, _layout: Layout) {
    unsafe { libc::free(ptr.cast().as_ptr()) };
  }

  unsafe fn realloc(&self, ptr: ptr::NonNull<u8>, layout: Layout, new_size: usize) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    if layout.align() > MALLOC_ALIGNMENT {
      return unsafe { realloc_by_copy(self, ptr, layout, new_size) };
    }

    // Safety: ptr came from aligned_alloc, and realloc leaves it valid when it fails
    let ptr = unsafe { libc::realloc(ptr.cast().as_ptr(), new_size) };
    ptr::NonNull::new(ptr.cast::<u8>()).ok_or(OutOfMemory)
  }
}

#[cfg(test)]
mod tests {
  use core::alloc::Layout;

  use crate::alloc::{CStyleAllocator, Malloc};

  #[test]
  fn over_aligned_realloc_keeps_alignment() {
    #[repr(align(64))]
    struct Wide([u8; 64]);

    let layout = Layout::new::<Wide>();
    let ptr = Malloc.alloc(layout).unwrap();
    unsafe {
      ptr.write(7);
      let grown = Malloc.realloc(ptr, layout, 256).unwrap();
      assert_eq!(grown.as_ptr() as usize % 64, 0);
      assert_eq!(grown.read(), 7);
      Malloc.free(grown, Layout::from_size_align(256, 64).unwrap());
    }
  }
}
