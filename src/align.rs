/// Rounds the given size up to the allocator's granularity of two machine
/// words: the footprint of the free-list links that live in the payload of
/// a released block. Every allocation is therefore large enough to rejoin
/// the free index later.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use challoc::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(5), 8),   // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + 2 * mem::size_of::<usize>() - 1) & !(2 * mem::size_of::<usize>() - 1)
  };
}
