use std::ptr;

use libc::{c_void, intptr_t, sbrk};

/// Source of additional heap memory.
///
/// Every region handed back must be immediately contiguous with and above
/// all previously granted regions, so the heap stays one linear span. A
/// null return signals exhaustion, which the allocator treats as fatal.
pub trait HeapGrower {
  unsafe fn grow(
    &mut self,
    extra: usize,
  ) -> *mut u8;
}

/// Grows the heap by moving the program break with `sbrk(2)`.
pub struct SbrkGrower;

impl HeapGrower for SbrkGrower {
  unsafe fn grow(
    &mut self,
    extra: usize,
  ) -> *mut u8 {
    let address = unsafe { sbrk(extra as intptr_t) };

    if address == usize::MAX as *mut c_void {
      return ptr::null_mut();
    }

    address as *mut u8
  }
}

/// Grows into a fixed buffer owned by the grower. Exhaustion is
/// deterministic, which makes this the provider of choice for tests and
/// for embedding the allocator over a preallocated region.
pub struct FixedGrower {
  storage: Vec<u64>,
  used: usize,
}

impl FixedGrower {
  // u64 storage keeps the base aligned for block headers.
  pub fn with_capacity(bytes: usize) -> Self {
    Self {
      storage: vec![0; bytes.div_ceil(8)],
      used: 0,
    }
  }
}

impl HeapGrower for FixedGrower {
  unsafe fn grow(
    &mut self,
    extra: usize,
  ) -> *mut u8 {
    if self.used + extra > self.storage.len() * 8 {
      return ptr::null_mut();
    }

    let address = unsafe { (self.storage.as_mut_ptr() as *mut u8).add(self.used) };
    self.used += extra;

    address
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_grower_regions_are_contiguous() {
    let mut grower = FixedGrower::with_capacity(256);

    unsafe {
      let first = grower.grow(64);
      let second = grower.grow(32);
      let third = grower.grow(160);

      assert!(!first.is_null());
      assert_eq!(second, first.add(64));
      assert_eq!(third, first.add(96));
    }
  }

  #[test]
  fn fixed_grower_refuses_when_exhausted() {
    let mut grower = FixedGrower::with_capacity(64);

    unsafe {
      assert!(!grower.grow(64).is_null());
      assert!(grower.grow(8).is_null());
    }
  }
}
