use std::ptr;

use crate::block::{Block, HEADER_SIZE};

/// Bookkeeping for the single heap region: its low address and the number
/// of bytes covered by blocks (the high-water mark). Blocks densely tile
/// the span in between.
pub struct Heap {
  lo: *mut u8,
  size: usize,
}

impl Heap {
  pub fn new() -> Self {
    Self {
      lo: ptr::null_mut(),
      size: 0,
    }
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn end(&self) -> *mut u8 {
    self.lo.wrapping_add(self.size)
  }

  /// First block of the heap, or null while the heap is empty.
  pub fn first_block(&self) -> *mut Block {
    if self.size == 0 {
      return ptr::null_mut();
    }

    self.lo as *mut Block
  }

  /// Memory-adjacent successor of a block, or null at or past the
  /// high-water mark. The stepping distance is the header plus the payload
  /// capacity, so the walk works for allocated and free blocks alike.
  pub unsafe fn next_block(
    &self,
    block: *mut Block,
  ) -> *mut Block {
    unsafe {
      let distance = HEADER_SIZE + (*block).capacity();
      let next = (block as *mut u8).add(distance);

      if next >= self.end() {
        return ptr::null_mut();
      }

      next as *mut Block
    }
  }

  /// Records a freshly granted region of `extra` bytes and returns it as a
  /// block pointer. The region must sit exactly at the old high-water mark.
  pub fn extend(
    &mut self,
    address: *mut u8,
    extra: usize,
  ) -> *mut Block {
    if self.lo.is_null() {
      self.lo = address;
    }
    debug_assert_eq!(address, self.end());

    self.size += extra;

    address as *mut Block
  }

  pub fn reset(&mut self) {
    self.lo = ptr::null_mut();
    self.size = 0;
  }
}
