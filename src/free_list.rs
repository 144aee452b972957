use std::ptr;

use crate::block::{self, Block};

/// Intrusive doubly linked list of the currently-free blocks.
///
/// The links live in the payload bytes of the member blocks, so membership
/// is only meaningful while a block is marked free. Insertion is LIFO at
/// the head and the list carries no size or address order; lookup is a
/// linear scan.
pub struct FreeList {
  head: *mut Block,
}

impl FreeList {
  pub fn new() -> Self {
    Self {
      head: ptr::null_mut(),
    }
  }

  pub fn head(&self) -> *mut Block {
    self.head
  }

  pub fn clear(&mut self) {
    self.head = ptr::null_mut();
  }

  /// Pushes a block onto the head of the list. No-op on a null block.
  pub unsafe fn insert(
    &mut self,
    block: *mut Block,
  ) {
    if block.is_null() {
      return;
    }

    unsafe {
      let links = block::free_links(block);
      (*links).next_free = self.head;
      (*links).prev_free = ptr::null_mut();

      if !self.head.is_null() {
        (*block::free_links(self.head)).prev_free = block;
      }

      self.head = block;
    }
  }

  /// Detaches a block from wherever it sits in the list. No-op if the list
  /// is empty or the block is null.
  pub unsafe fn remove(
    &mut self,
    block: *mut Block,
  ) {
    if self.head.is_null() || block.is_null() {
      return;
    }

    unsafe {
      let links = block::free_links(block);
      let next = (*links).next_free;
      let prev = (*links).prev_free;

      if self.head == block {
        self.head = next;
        if !next.is_null() {
          (*block::free_links(next)).prev_free = ptr::null_mut();
        }
        return;
      }

      if !next.is_null() {
        (*block::free_links(next)).prev_free = prev;
        (*block::free_links(prev)).next_free = next;
      } else {
        // The predecessor becomes the new tail.
        (*block::free_links(prev)).next_free = ptr::null_mut();
      }
    }
  }

  /// First-fit search: returns the first block in list order whose
  /// capacity covers `req_size`, or null if none is large enough.
  pub unsafe fn find_fit(
    &self,
    req_size: usize,
  ) -> *mut Block {
    let check_size = -(req_size as isize);

    unsafe {
      let mut current = self.head;

      while !current.is_null() {
        if (*current).size <= check_size {
          return current;
        }
        current = (*block::free_links(current)).next_free;
      }

      ptr::null_mut()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::{ALIGNMENT, HEADER_SIZE};

  // Lays out `count` free blocks of one granularity each in a raw buffer.
  // The buffer must stay alive for as long as the block pointers are used.
  fn make_blocks(count: usize) -> (Vec<u64>, Vec<*mut Block>) {
    let stride = HEADER_SIZE + ALIGNMENT;
    let mut storage = vec![0u64; count * stride / 8];
    let base = storage.as_mut_ptr() as *mut u8;

    let mut blocks = Vec::new();
    for i in 0..count {
      let block = unsafe { base.add(i * stride) } as *mut Block;
      unsafe {
        (*block).size = -(ALIGNMENT as isize);
        (*block).prev = ptr::null_mut();
      }
      blocks.push(block);
    }

    (storage, blocks)
  }

  unsafe fn members(list: &FreeList) -> Vec<*mut Block> {
    let mut collected = Vec::new();

    unsafe {
      let mut current = list.head();
      while !current.is_null() {
        collected.push(current);
        current = (*block::free_links(current)).next_free;
      }
    }

    collected
  }

  #[test]
  fn insertion_is_lifo() {
    let (_storage, blocks) = make_blocks(3);
    let mut list = FreeList::new();

    unsafe {
      for &block in &blocks {
        list.insert(block);
      }

      assert_eq!(members(&list), vec![blocks[2], blocks[1], blocks[0]]);
    }
  }

  #[test]
  fn removing_the_head_repoints_it() {
    let (_storage, blocks) = make_blocks(3);
    let mut list = FreeList::new();

    unsafe {
      for &block in &blocks {
        list.insert(block);
      }

      list.remove(blocks[2]);

      assert_eq!(members(&list), vec![blocks[1], blocks[0]]);
    }
  }

  #[test]
  fn removing_a_middle_block_relinks_its_neighbors() {
    let (_storage, blocks) = make_blocks(3);
    let mut list = FreeList::new();

    unsafe {
      for &block in &blocks {
        list.insert(block);
      }

      list.remove(blocks[1]);

      assert_eq!(members(&list), vec![blocks[2], blocks[0]]);
    }
  }

  #[test]
  fn removing_the_tail_truncates_the_list() {
    let (_storage, blocks) = make_blocks(3);
    let mut list = FreeList::new();

    unsafe {
      for &block in &blocks {
        list.insert(block);
      }

      list.remove(blocks[0]);

      assert_eq!(members(&list), vec![blocks[2], blocks[1]]);
    }
  }

  #[test]
  fn insert_then_remove_restores_the_list() {
    let (_storage, blocks) = make_blocks(4);
    let mut list = FreeList::new();

    unsafe {
      for &block in &blocks[..3] {
        list.insert(block);
      }
      let before = members(&list);

      list.insert(blocks[3]);
      list.remove(blocks[3]);

      assert_eq!(members(&list), before);
    }
  }

  #[test]
  fn remove_on_an_empty_list_is_a_noop() {
    let (_storage, blocks) = make_blocks(1);
    let mut list = FreeList::new();

    unsafe {
      list.remove(blocks[0]);
      list.insert(ptr::null_mut());
    }

    assert!(list.head().is_null());
  }

  #[test]
  fn find_fit_takes_the_first_match_in_list_order() {
    let (_storage, mut blocks) = make_blocks(3);
    let mut list = FreeList::new();

    unsafe {
      (*blocks[0]).size = -(13 * ALIGNMENT as isize);
      (*blocks[1]).size = -(3 * ALIGNMENT as isize);
      (*blocks[2]).size = -(7 * ALIGNMENT as isize);

      for &block in &blocks {
        list.insert(block);
      }
      // List order is now [7g, 3g, 13g].

      assert_eq!(list.find_fit(2 * ALIGNMENT), blocks[2]);
      assert_eq!(list.find_fit(5 * ALIGNMENT), blocks[2]);
      assert_eq!(list.find_fit(9 * ALIGNMENT), blocks[0]);
      assert!(list.find_fit(14 * ALIGNMENT).is_null());
    }
  }
}
