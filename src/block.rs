use std::mem;

/// Bytes occupied by a block header on the heap.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

/// Rounding granularity for payload capacities.
///
/// Every payload must be able to host the two free-list links once the
/// block is released, so the granularity is exactly their footprint.
pub const ALIGNMENT: usize = mem::size_of::<FreeLinks>();

const _: () = assert!(ALIGNMENT == 2 * mem::size_of::<usize>());

/// On-heap block header. One lives at the start of every block; the bytes
/// that follow it are the payload.
///
/// `size` encodes both capacity and state: the magnitude is the payload
/// capacity in bytes, a positive value means allocated and a non-positive
/// value means free (zero counts as free). `prev` points at the
/// memory-adjacent preceding block and is null for the first block in the
/// heap.
#[repr(C)]
pub struct Block {
  pub size: isize,
  pub prev: *mut Block,
}

/// Free-list links. Stored in the payload bytes of a free block, so they
/// only carry meaning while the block's `size` is non-positive.
#[repr(C)]
pub struct FreeLinks {
  pub next_free: *mut Block,
  pub prev_free: *mut Block,
}

impl Block {
  pub fn is_free(&self) -> bool {
    self.size <= 0
  }

  /// Usable payload capacity in bytes, regardless of state.
  pub fn capacity(&self) -> usize {
    self.size.unsigned_abs()
  }

  pub fn mark_free(&mut self) {
    self.size = -self.size;
  }

  pub fn mark_allocated(&mut self) {
    self.size = -self.size;
  }
}

/// Payload address of a block: the byte right after its header.
pub unsafe fn payload(block: *mut Block) -> *mut u8 {
  unsafe { (block as *mut u8).add(HEADER_SIZE) }
}

/// Recovers the block header from a payload address previously handed out
/// by the allocator.
pub unsafe fn from_payload(address: *mut u8) -> *mut Block {
  unsafe { address.sub(HEADER_SIZE) as *mut Block }
}

/// Free-list links of a free block, laid over its payload bytes.
pub unsafe fn free_links(block: *mut Block) -> *mut FreeLinks {
  unsafe { payload(block) as *mut FreeLinks }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ptr;

  #[test]
  fn sign_encodes_state() {
    let mut block = Block {
      size: 48,
      prev: ptr::null_mut(),
    };

    assert!(!block.is_free());
    assert_eq!(block.capacity(), 48);

    block.mark_free();

    assert!(block.is_free());
    assert_eq!(block.size, -48);
    assert_eq!(block.capacity(), 48);

    block.mark_allocated();

    assert!(!block.is_free());
    assert_eq!(block.capacity(), 48);
  }

  #[test]
  fn payload_and_header_are_inverses() {
    let mut storage = [0u64; 8];
    let block = storage.as_mut_ptr() as *mut Block;

    unsafe {
      let address = payload(block);
      assert_eq!(address as usize, block as usize + HEADER_SIZE);
      assert_eq!(from_payload(address), block);
    }
  }
}
