// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Fixed size bump allocation pools.
//!
//! A pool hands out zeroed, non-overlapping regions of its backing storage by advancing a cursor.
//! Nothing is ever freed: every object allocated from a pool lives as long as the pool, which for
//! the runtime pools is the life of the firmware. There is no per-allocation header.

use crate::error::XpmError;
use core::{
    cell::UnsafeCell,
    mem::{align_of, needs_drop, size_of},
    ptr::NonNull,
    slice,
};
use log::{error, info};
use spin::mutex::SpinMutex;
use zerocopy::FromZeros;

/// Minimum alignment of every allocation, and the granularity sizes are rounded up to.
pub const POOL_ALIGN: usize = 4;

#[repr(C, align(8))]
struct Storage<const SIZE: usize>([u8; SIZE]);

/// A bump allocator over `SIZE` bytes of inline storage.
#[repr(C)]
pub struct AllocablePool<const SIZE: usize> {
    name: &'static str,
    /// Offset of the first free byte in `storage`.
    free_mem: SpinMutex<usize>,
    storage: UnsafeCell<Storage<SIZE>>,
}

// SAFETY: `storage` is only ever accessed through regions handed out by `alloc_pool`, which are
// carved out under the `free_mem` lock and never overlap, so sharing the pool between threads
// can't create aliasing mutable references.
unsafe impl<const SIZE: usize> Sync for AllocablePool<SIZE> {}

impl<const SIZE: usize> AllocablePool<SIZE> {
    /// Creates a new, empty pool.
    pub const fn new(name: &'static str) -> Self {
        const {
            assert!(SIZE % POOL_ALIGN == 0, "pool size must be a multiple of 4");
        }
        Self {
            name,
            free_mem: SpinMutex::new(0),
            storage: UnsafeCell::new(Storage([0; SIZE])),
        }
    }
}

/// Something memory can be bump allocated from.
pub trait Arena: Sync {
    /// Returns the name of the pool, for diagnostics.
    fn name(&self) -> &'static str;

    /// Returns the total capacity in bytes.
    fn size(&self) -> usize;

    /// Returns the number of bytes handed out so far, including padding.
    fn used(&self) -> usize;

    /// Returns the number of bytes still available.
    fn free(&self) -> usize {
        self.size() - self.used()
    }

    /// Returns the address of the backing storage.
    fn base_address(&self) -> usize;

    /// Reserves `size` bytes, rounded up to a multiple of 4, starting at an address aligned to
    /// `align` (and at least 4).
    ///
    /// The region is zero-filled. Returns `None`, leaving the pool unchanged, if there isn't
    /// enough room left.
    fn alloc_pool(&self, size: usize, align: usize) -> Option<NonNull<u8>>;

    /// Logs the usage of the pool.
    fn dump_usage(&self) {
        info!(
            "{}: used {} of {} bytes, {} free",
            self.name(),
            self.used(),
            self.size(),
            self.free()
        );
    }
}

impl<const SIZE: usize> Arena for AllocablePool<SIZE> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn size(&self) -> usize {
        SIZE
    }

    fn used(&self) -> usize {
        *self.free_mem.lock()
    }

    fn base_address(&self) -> usize {
        self.storage.get() as usize
    }

    fn alloc_pool(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let mut free_mem = self.free_mem.lock();
        let base = self.storage.get().cast::<u8>();
        let align = align.max(POOL_ALIGN);
        let start = (base as usize)
            .checked_add(*free_mem)?
            .checked_next_multiple_of(align)?
            - base as usize;
        let size = size.checked_next_multiple_of(POOL_ALIGN)?;
        let end = start.checked_add(size)?;
        if end > SIZE {
            return None;
        }

        // SAFETY: `start..end` lies within `storage` and past the cursor, so no part of it has
        // been handed out before. The cursor is moved past it below, while still holding the lock,
        // so it never will be again.
        let region = unsafe {
            let region = base.add(start);
            region.write_bytes(0, size);
            region
        };
        *free_mem = end;
        NonNull::new(region)
    }
}

impl<'p> dyn Arena + 'p {
    fn reserve(&self, size: usize, align: usize) -> Result<NonNull<u8>, XpmError> {
        self.alloc_pool(size, align).ok_or_else(|| {
            error!("{}: failed to allocate {size} bytes", self.name());
            self.dump_usage();
            XpmError::BufferTooSmall
        })
    }

    /// Allocates `size` zeroed bytes.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, size: usize) -> Result<&mut [u8], XpmError> {
        let region = self.reserve(size, 1)?;
        // SAFETY: `reserve` returned a fresh, zeroed region of at least `size` bytes which nothing
        // else refers to, and which lives as long as the pool.
        Ok(unsafe { slice::from_raw_parts_mut(region.as_ptr(), size) })
    }

    /// Allocates space for a `T`, then moves the value returned by `init` into it.
    ///
    /// `init` is only called once the space has been reserved, so on failure nothing it captures
    /// has been moved.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_with<T>(&self, init: impl FnOnce() -> T) -> Result<&mut T, XpmError> {
        const {
            assert!(!needs_drop::<T>(), "pool allocated values are never dropped");
        }
        let region = self.reserve(size_of::<T>(), align_of::<T>())?.cast::<T>();
        // SAFETY: `reserve` returned a fresh region suitably sized and aligned for a `T`, which
        // nothing else refers to and which lives as long as the pool.
        unsafe {
            region.as_ptr().write(init());
            Ok(&mut *region.as_ptr())
        }
    }

    /// Moves `value` into the pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> Result<&mut T, XpmError> {
        self.alloc_with(|| value)
    }

    /// Allocates a zeroed `T`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_zeroed<T: FromZeros>(&self) -> Result<&mut T, XpmError> {
        let region = self.reserve(size_of::<T>(), align_of::<T>())?.cast::<T>();
        // SAFETY: The region is zeroed and suitably sized and aligned for a `T`, and `T` is
        // `FromZeros` so all zeroes is a valid `T`. Nothing else refers to the region.
        Ok(unsafe { &mut *region.as_ptr() })
    }

    /// Allocates a slice of `len` copies of `fill`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice<T: Copy>(&self, len: usize, fill: T) -> Result<&mut [T], XpmError> {
        let size = size_of::<T>()
            .checked_mul(len)
            .ok_or(XpmError::BufferTooSmall)?;
        let region = self.reserve(size, align_of::<T>())?.cast::<T>();
        for i in 0..len {
            // SAFETY: `i < len` so the element is within the reserved region.
            unsafe { region.as_ptr().add(i).write(fill) };
        }
        // SAFETY: Every element of the region was initialised above. Nothing else refers to it.
        Ok(unsafe { slice::from_raw_parts_mut(region.as_ptr(), len) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_is_monotonic() {
        let pool = AllocablePool::<64>::new("test");
        let mut last = pool.used();
        for size in [4, 1, 12, 7, 0, 16] {
            assert!(pool.alloc_pool(size, 4).is_some());
            assert!(pool.used() >= last);
            assert!(pool.used() <= pool.size());
            last = pool.used();
        }
        assert_eq!(pool.used(), 4 + 4 + 12 + 8 + 16);
    }

    #[test]
    fn failure_leaves_cursor_alone() {
        let pool = AllocablePool::<32>::new("test");
        assert!(pool.alloc_pool(20, 4).is_some());
        assert!(pool.alloc_pool(16, 4).is_none());
        assert_eq!(pool.used(), 20);
        assert!(pool.alloc_pool(16, 4).is_none());
        assert_eq!(pool.used(), 20);
        assert!(pool.alloc_pool(12, 4).is_some());
        assert_eq!(pool.free(), 0);
    }

    #[test]
    fn rounds_to_words() {
        let pool = AllocablePool::<64>::new("test");
        let first = pool.alloc_pool(5, 4).unwrap();
        let second = pool.alloc_pool(3, 4).unwrap();
        assert_eq!(second.as_ptr() as usize - first.as_ptr() as usize, 8);
        let third = pool.alloc_pool(1, 4).unwrap();
        assert_eq!(third.as_ptr() as usize - second.as_ptr() as usize, 4);
    }

    #[test]
    fn zero_filled() {
        let pool = AllocablePool::<64>::new("test");
        let arena: &dyn Arena = &pool;
        let bytes = arena.alloc_bytes(16).unwrap();
        assert!(bytes.iter().all(|&b| b == 0));
        bytes.fill(0xa5);
        let more = arena.alloc_bytes(16).unwrap();
        assert!(more.iter().all(|&b| b == 0));
    }

    #[test]
    fn typed_allocations() {
        let pool = AllocablePool::<64>::new("test");
        let arena: &dyn Arena = &pool;
        let word = arena.alloc(0x1234_5678_u32).unwrap();
        let wide = arena.alloc_zeroed::<u64>().unwrap();
        assert_eq!(*word, 0x1234_5678);
        assert_eq!(*wide, 0);
        assert_eq!(wide as *mut u64 as usize % align_of::<u64>(), 0);
        let slice = arena.alloc_slice(3, 7_u16).unwrap();
        assert_eq!(slice, &[7, 7, 7]);
    }

    #[test]
    fn exhaustion_is_buffer_too_small() {
        let pool = AllocablePool::<8>::new("test");
        let arena: &dyn Arena = &pool;
        assert_eq!(arena.alloc_bytes(12).err(), Some(XpmError::BufferTooSmall));
        let mut called = false;
        assert!(
            arena
                .alloc_with(|| {
                    called = true;
                    [0_u32; 4]
                })
                .is_err()
        );
        assert!(!called);
        assert_eq!(pool.used(), 0);
    }
}
