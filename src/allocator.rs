use std::{mem, process, ptr};

use log::{debug, error};

use crate::align;
use crate::block::{self, Block, HEADER_SIZE};
use crate::free_list::FreeList;
use crate::grow::HeapGrower;
use crate::heap::Heap;

/// How `allocate` looks for a reusable free block.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchMode {
  /// First fit over the LIFO free index. The default.
  FreeIndex,
  /// First fit over the address-ordered memory chain, considering only
  /// free blocks. Linear in all blocks; kept as a comparison mode.
  HeapWalk,
}

/// A first-fit allocator over one linearly growing heap region.
///
/// Allocated and free blocks tile the region densely; free blocks are
/// additionally indexed by an intrusive doubly linked list. Releasing a
/// block coalesces it with its free memory neighbors on both sides, so no
/// two adjacent blocks stay free.
pub struct FreeListAllocator<G: HeapGrower> {
  grower: G,
  heap: Heap,
  free_list: FreeList,
  chain_tail: *mut Block,
  search_mode: SearchMode,
}

impl<G: HeapGrower> FreeListAllocator<G> {
  pub fn new(grower: G) -> Self {
    Self::with_search_mode(grower, SearchMode::FreeIndex)
  }

  pub fn with_search_mode(
    grower: G,
    search_mode: SearchMode,
  ) -> Self {
    Self {
      grower,
      heap: Heap::new(),
      free_list: FreeList::new(),
      chain_tail: ptr::null_mut(),
      search_mode,
    }
  }

  /// Returns the allocator to its initial empty state. Idempotent. Memory
  /// already obtained from the grower is abandoned, not returned; the heap
  /// only ever grows.
  pub fn reset(&mut self) {
    self.free_list.clear();
    self.chain_tail = ptr::null_mut();
    self.heap.reset();
  }

  /// Bytes of the heap region covered by blocks.
  pub fn heap_size(&self) -> usize {
    self.heap.size()
  }

  /// First block of the memory chain, or null while the heap is empty.
  pub fn first_block(&self) -> *mut Block {
    self.heap.first_block()
  }

  /// Memory-adjacent successor of a block, or null at the high-water mark.
  ///
  /// # Safety
  ///
  /// `block` must be a live block of this allocator's heap.
  pub unsafe fn next_block(
    &self,
    block: *mut Block,
  ) -> *mut Block {
    unsafe { self.heap.next_block(block) }
  }

  /// Allocates `size` bytes and returns the payload address, or null for a
  /// zero-size request. The payload capacity is `size` rounded up to the
  /// alignment granularity.
  ///
  /// Aborts the process if the heap grower cannot supply more memory; an
  /// unsatisfiable request is not recoverable here.
  ///
  /// # Safety
  ///
  /// The allocator hands out raw, uninitialized memory; the caller is
  /// responsible for not outliving it past `reset` and for releasing it at
  /// most once.
  pub unsafe fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    if size == 0 {
      return ptr::null_mut();
    }

    let req_size = align!(size);

    unsafe {
      let mut block = match self.search_mode {
        SearchMode::FreeIndex => self.free_list.find_fit(req_size),
        SearchMode::HeapWalk => self.search_chain(req_size),
      };

      if block.is_null() {
        // No fit anywhere: append a fresh block at the end of the chain.
        block = self.request_more_space(req_size + HEADER_SIZE);
        (*block).size = req_size as isize;
        (*block).prev = self.chain_tail;
        self.chain_tail = block;
      } else {
        (*block).mark_allocated();
        self.free_list.remove(block);
      }

      self.maybe_split(block, req_size);

      block::payload(block)
    }
  }

  /// Releases a payload address previously returned by [`allocate`]. A
  /// null address is a no-op.
  ///
  /// [`allocate`]: FreeListAllocator::allocate
  ///
  /// # Safety
  ///
  /// `address` must be live: returned by this allocator and not yet
  /// released. Anything else is undefined behavior; no validation is
  /// performed.
  pub unsafe fn deallocate(
    &mut self,
    address: *mut u8,
  ) {
    if address.is_null() {
      return;
    }

    unsafe {
      let block = block::from_payload(address);
      (*block).mark_free();
      self.free_list.insert(block);
      self.coalesce(block);
    }
  }

  // First fit over the whole chain instead of the free index.
  unsafe fn search_chain(
    &self,
    req_size: usize,
  ) -> *mut Block {
    let check_size = -(req_size as isize);

    unsafe {
      let mut current = self.heap.first_block();

      while !current.is_null() {
        if (*current).size <= check_size {
          return current;
        }
        current = self.heap.next_block(current);
      }

      ptr::null_mut()
    }
  }

  unsafe fn request_more_space(
    &mut self,
    extra: usize,
  ) -> *mut Block {
    unsafe {
      let address = self.grower.grow(extra);

      if address.is_null() {
        error!("heap grower refused {extra} bytes, cannot satisfy the request");
        process::abort();
      }

      debug!("heap grown by {extra} bytes at {address:?}");

      self.heap.extend(address, extra)
    }
  }

  /// Carves the tail of an oversized allocated block into a new free
  /// block. Keeps the whole block when the excess could not host a header
  /// plus a minimum payload.
  unsafe fn maybe_split(
    &mut self,
    block: *mut Block,
    req_size: usize,
  ) {
    unsafe {
      if (*block).size <= (req_size + HEADER_SIZE) as isize {
        return;
      }

      // Chain successor as seen with the pre-split capacity.
      let chain_next = self.heap.next_block(block);

      let split = (block as *mut u8).add(HEADER_SIZE + req_size) as *mut Block;
      (*split).size = -((*block).size - (req_size + HEADER_SIZE) as isize);
      (*split).prev = block;
      (*block).size = req_size as isize;

      if self.chain_tail == block {
        self.chain_tail = split;
      } else {
        (*chain_next).prev = split;
      }

      self.free_list.insert(split);
    }
  }

  /// Merges a just-freed block with its free memory neighbors. Both sides
  /// are checked independently, so a release between two free blocks
  /// collapses all three into one.
  unsafe fn coalesce(
    &mut self,
    block: *mut Block,
  ) {
    unsafe {
      let next = self.heap.next_block(block);
      let prev = (*block).prev;

      if !next.is_null() && (*next).is_free() {
        self.absorb(block, next);
      }

      if !prev.is_null() && (*prev).is_free() {
        self.absorb(prev, block);
      }
    }
  }

  // Absorbs `absorbed`, the memory-adjacent successor of `survivor`, into
  // `survivor`. Both must be free. The absorbed header becomes interior
  // payload of the survivor.
  unsafe fn absorb(
    &mut self,
    survivor: *mut Block,
    absorbed: *mut Block,
  ) {
    unsafe {
      self.free_list.remove(absorbed);

      // Both sizes are negative; the header in between is reclaimed too.
      (*survivor).size += (*absorbed).size - HEADER_SIZE as isize;

      if self.chain_tail == absorbed {
        self.chain_tail = survivor;
      } else {
        let after = self.heap.next_block(survivor);
        if !after.is_null() {
          (*after).prev = survivor;
        }
      }
    }
  }

  /// Logs a full listing of the memory chain and the free list at debug
  /// level. Purely a debugging aid.
  pub unsafe fn examine_heap(&self) {
    debug!("heap size: {:#x}", self.heap.size());
    debug!("chain tail: {:?}", self.chain_tail);

    unsafe {
      let mut current = self.heap.first_block();
      while !current.is_null() {
        if (*current).is_free() {
          let links = block::free_links(current);
          debug!(
            "{current:?}: {} FREE next_free: {:?}, prev_free: {:?}, prev: {:?}",
            (*current).size,
            (*links).next_free,
            (*links).prev_free,
            (*current).prev,
          );
        } else {
          debug!(
            "{current:?}: {} ALLOCATED prev: {:?}",
            (*current).size,
            (*current).prev,
          );
        }
        current = self.heap.next_block(current);
      }

      let mut node = self.free_list.head();
      debug!("free list head: {node:?}");
      while !node.is_null() {
        debug!("-> {node:?}");
        node = (*block::free_links(node)).next_free;
      }
    }
  }

  /// Checks the heap data structures for consistency: chain
  /// back-references against true adjacency, free-index membership count
  /// against the free blocks found by the walk, and free-list acyclicity.
  /// Logs every inconsistency and returns whether the heap is consistent.
  /// Never alters allocator state.
  pub unsafe fn check_heap(&self) -> bool {
    let mut consistent = true;

    unsafe {
      let mut free_count = 0usize;
      let mut last: *mut Block = ptr::null_mut();
      let mut current = self.heap.first_block();

      while !current.is_null() {
        if (*current).prev != last {
          error!("check_heap: back-reference of {current:?} does not match its predecessor");
          consistent = false;
        }
        if (*current).is_free() {
          free_count += 1;
        }
        last = current;
        current = self.heap.next_block(current);
      }

      if !last.is_null() && self.chain_tail != last {
        error!("check_heap: chain tail {:?} is not the last block {last:?}", self.chain_tail);
        consistent = false;
      }

      let mut listed = 0usize;
      let mut node = self.free_list.head();

      while !node.is_null() {
        listed += 1;
        if listed > free_count {
          error!("check_heap: free list is cyclic or holds non-free blocks");
          return false;
        }
        node = (*block::free_links(node)).next_free;
      }

      if listed != free_count {
        error!("check_heap: free list holds {listed} blocks but the walk found {free_count}");
        consistent = false;
      }
    }

    consistent
  }
}
