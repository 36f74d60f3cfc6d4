use core::{
  alloc::Layout, cell::Cell, fmt, marker::PhantomData, mem::MaybeUninit, ptr
};

use crate::{
  alloc::{CStyleAllocator, OutOfMemory, realloc_by_copy}, num::align_up_checked
};

/// A bump allocator over a borrowed byte buffer.
///
/// The buffer stays where it is for as long as the arena borrows it, so the arena itself can be moved around freely,
/// including inside the containers it backs.
///
/// Frees are no-ops; the space comes back all at once through [ArenaAllocator::reset]. The most recent block can be
/// resized in place, which keeps a single growing container from burning through the arena.
///
/// Once the buffer runs out every allocation fails with [OutOfMemory], which makes this allocator handy for driving
/// containers into their allocation failure paths.
pub struct ArenaAllocator<'a> {
  head: Cell<usize>,
  base: ptr::NonNull<u8>,
  len: usize,
  marker: PhantomData<&'a mut [MaybeUninit<u8>]>,
}

impl<'a> ArenaAllocator<'a> {
  pub fn new(buffer: &'a mut [MaybeUninit<u8>]) -> Self {
    Self {
      head: Cell::new(0),
      // Safety: slice pointers are never null
      base: unsafe { ptr::NonNull::new_unchecked(buffer.as_mut_ptr().cast::<u8>()) },
      len: buffer.len(),
      marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn used(&self) -> usize {
    self.head.get()
  }

  pub fn remaining(&self) -> usize {
    self.len - self.head.get()
  }

  /// Whether `ptr` points into the borrowed buffer.
  pub fn contains(&self, ptr: *const u8) -> bool {
    (ptr as usize).wrapping_sub(self.base.as_ptr() as usize) < self.len
  }

  /// Forgets every block handed out so far. Taking `&mut self` proves none of them are still borrowed.
  pub fn reset(&mut self) {
    self.head.set(0);
  }

  fn fetch_head_ptr(&self, layout: Layout) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    let base = self.base.as_ptr() as usize;
    let start = base.checked_add(self.head.get()).ok_or(OutOfMemory)?;
    let offset = align_up_checked(start, layout.align()).ok_or(OutOfMemory)? - base;

    let new_head = offset.checked_add(layout.size()).ok_or(OutOfMemory)?;
    if new_head > self.len {
      return Err(OutOfMemory);
    }

    self.head.set(new_head);

    // Safety: offset <= len, so the pointer stays inside the buffer
    Ok(unsafe { self.base.add(offset) })
  }

  fn is_last_block(&self, ptr: ptr::NonNull<u8>, layout: Layout) -> bool {
    let offset = (ptr.as_ptr() as usize).wrapping_sub(self.base.as_ptr() as usize);
    offset.checked_add(layout.size()) == Some(self.head.get())
  }
}

impl fmt::Debug for ArenaAllocator<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArenaAllocator").field("used", &self.used()).field("len", &self.len).finish()
  }
}

unsafe impl CStyleAllocator for ArenaAllocator<'_> {
  fn alloc(&self, layout: Layout) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    self.fetch_head_ptr(layout)
  }

  unsafe fn free(&self, _ptr: ptr::NonNull<u8>, _layout: Layout) {}

  unsafe fn realloc(&self, ptr: ptr::NonNull<u8>, layout: Layout, new_size: usize) -> Result<ptr::NonNull<u8>, OutOfMemory> {
    if !self.is_last_block(ptr, layout) {
      return unsafe { realloc_by_copy(self, ptr, layout, new_size) };
    }

    let offset = ptr.as_ptr() as usize - self.base.as_ptr() as usize;
    let new_head = offset.checked_add(new_size).ok_or(OutOfMemory)?;
    if new_head > self.len {
      return Err(OutOfMemory);
    }

    self.head.set(new_head);
    Ok(ptr)
  }
}

#[cfg(test)]
mod tests {
  use core::{alloc::Layout, mem::MaybeUninit};
  use std::boxed::Box;

  use crate::alloc::{ArenaAllocator, Array, CStyleAllocator, OutOfMemory};

  #[test]
  fn allocations_are_aligned() {
    let mut buffer = [MaybeUninit::uninit(); 256];
    let arena = ArenaAllocator::new(&mut buffer);
    arena.alloc(Layout::new::<u8>()).unwrap();
    let ptr = arena.alloc(Layout::new::<u64>()).unwrap();
    assert_eq!(ptr.as_ptr() as usize % core::mem::align_of::<u64>(), 0);
  }

  #[test]
  fn exhausted_arena_is_out_of_memory() {
    let mut buffer = [MaybeUninit::uninit(); 64];
    let arena = ArenaAllocator::new(&mut buffer);
    arena.alloc(Layout::array::<u8>(64).unwrap()).unwrap();
    assert_eq!(arena.alloc(Layout::new::<u8>()), Err(OutOfMemory));
    assert_eq!(arena.remaining(), 0);
  }

  #[test]
  fn last_block_grows_in_place() {
    let mut buffer = [MaybeUninit::uninit(); 128];
    let arena = ArenaAllocator::new(&mut buffer);
    let layout = Layout::array::<u8>(8).unwrap();
    let ptr = arena.alloc(layout).unwrap();
    let grown = unsafe { arena.realloc(ptr, layout, 100) }.unwrap();
    assert_eq!(ptr, grown);
    assert_eq!(arena.used(), 100);
  }

  #[test]
  fn earlier_block_is_copied() {
    let mut buffer = [MaybeUninit::uninit(); 128];
    let arena = ArenaAllocator::new(&mut buffer);
    let layout = Layout::array::<u8>(4).unwrap();
    let first = arena.alloc(layout).unwrap();
    unsafe { first.write(9) };
    arena.alloc(layout).unwrap();

    let moved = unsafe { arena.realloc(first, layout, 16) }.unwrap();
    assert_ne!(first, moved);
    assert_eq!(unsafe { moved.read() }, 9);
    assert_eq!(arena.used(), 24);
  }

  #[test]
  fn reset_reclaims_everything() {
    let mut buffer = [MaybeUninit::uninit(); 32];
    let mut arena = ArenaAllocator::new(&mut buffer);
    arena.alloc(Layout::array::<u8>(32).unwrap()).unwrap();
    arena.reset();
    assert_eq!(arena.remaining(), 32);
    assert!(arena.alloc(Layout::array::<u8>(32).unwrap()).is_ok());
  }

  fn boxed_array(buffer: &mut [MaybeUninit<u8>]) -> Box<Array<u64, ArenaAllocator<'_>>> {
    let mut array = Array::new_in(ArenaAllocator::new(buffer)).unwrap();
    for value in 1..=4 {
      array.push(value).unwrap();
    }
    Box::new(array)
  }

  #[inline(never)]
  fn scribble_stack() -> u64 {
    let noise = core::hint::black_box([0xAAu8; 1024]);
    noise.iter().map(|&byte| byte as u64).sum()
  }

  #[test]
  fn owned_arena_survives_container_moves() {
    let mut buffer = [MaybeUninit::<u8>::uninit(); 256];
    let range = buffer.as_ptr_range();

    let array = boxed_array(&mut buffer);
    core::hint::black_box(scribble_stack());

    let storage = array.as_ptr().cast::<MaybeUninit<u8>>();
    assert!(range.contains(&storage));
    assert!(array.allocator().contains(storage.cast()));
    assert_eq!(*array, [1, 2, 3, 4]);

    let mut moved = std::vec::Vec::new();
    moved.push(*array);
    moved[0].push(5).unwrap();
    assert_eq!(moved[0], [1, 2, 3, 4, 5]);
  }
}
