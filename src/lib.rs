//! # challoc - A First-Fit, Coalescing Memory Allocator Library
//!
//! This crate provides a **free-list allocator** implementation in Rust that
//! manages one linearly growing heap region, by default obtained through the
//! `sbrk` system call.
//!
//! ## Overview
//!
//! The heap is a dense chain of blocks, each a header followed by its
//! payload. Free blocks are additionally threaded onto an intrusive doubly
//! linked free list whose links live inside the unused payload bytes:
//!
//! ```text
//!   Heap Layout:
//!
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                           HEAP MEMORY                              │
//!   │                                                                    │
//!   │   ┌────┬──────┬────┬────────┬────┬──────┬────┬────────────┐        │
//!   │   │ H  │ used │ H  │ free   │ H  │ used │ H  │ free       │        │
//!   │   └────┴──────┴────┴───┬────┴────┴──────┴────┴───┬────────┘        │
//!   │                        │    ▲                    │   ▲             │
//!   │    free list head ─────┼────┘                    │   │             │
//!   │                        └── next_free ────────────┼───┘             │
//!   │                                                  ▼                 │
//!   │                                          High-Water Mark           │
//!   └────────────────────────────────────────────────────────────────────┘
//!
//!   Allocation scans the free list first-fit; a miss grows the heap.
//!   Oversized matches are split; releases coalesce with both neighbors.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   challoc
//!   ├── align      - Request rounding macro (align!)
//!   ├── block      - Block header layout and state encoding (internal)
//!   ├── free_list  - Intrusive doubly linked free index (internal)
//!   ├── grow       - HeapGrower trait, SbrkGrower, FixedGrower
//!   ├── heap       - Heap region bookkeeping and chain walk (internal)
//!   └── allocator  - FreeListAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use challoc::{FreeListAllocator, SbrkGrower};
//!
//! fn main() {
//!     let mut allocator = FreeListAllocator::new(SbrkGrower);
//!
//!     unsafe {
//!         // Allocate memory for a u64
//!         let ptr = allocator.allocate(size_of::<u64>()) as *mut u64;
//!
//!         // Use the memory
//!         *ptr = 42;
//!         println!("Value: {}", *ptr);
//!
//!         // Release it back to the free list
//!         allocator.deallocate(ptr as *mut u8);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! Each block starts with a header carrying a signed size:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │           Payload              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: ±N        │  │  allocated: N bytes user data  │
//!   │  │ prev: chain ptr │  │  free:      next_free,         │
//!   │  └─────────────────┘  │             prev_free, ...     │
//!   │      16 bytes         │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! The sign of `size` is the allocated/free state: positive means
//! allocated, non-positive means free. `prev` points at the memory-adjacent
//! preceding block, which is what makes two-sided coalescing possible
//! without boundary tags.
//!
//! Requests are rounded up to two machine words so that every payload can
//! host the free-list links once released. When no free block fits, the
//! heap grows by exactly the rounded request plus one header; the grower
//! must return regions contiguous with everything granted before.
//!
//! ## Features
//!
//! - **First-fit reuse**: freed blocks are recycled from a LIFO free list
//! - **Splitting**: oversized matches shed their tail as a new free block
//! - **Two-sided coalescing**: no two adjacent blocks stay free
//! - **Pluggable growth**: `sbrk` in production, a fixed buffer in tests
//! - **Diagnostics**: heap dump and consistency checker behind the `log`
//!   facade
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives
//! - **The heap never shrinks**: memory is recycled, not returned to the OS
//! - **Fixed granularity**: no alignment guarantees beyond two words
//! - **Fatal exhaustion**: a refused growth request aborts the process
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! All allocation and deallocation operations require `unsafe` blocks, and
//! `deallocate` performs no validation of the addresses it is given.

pub mod align;
mod allocator;
mod block;
mod free_list;
mod grow;
mod heap;

pub use allocator::{FreeListAllocator, SearchMode};
pub use block::{ALIGNMENT, Block, HEADER_SIZE};
pub use grow::{FixedGrower, HeapGrower, SbrkGrower};
