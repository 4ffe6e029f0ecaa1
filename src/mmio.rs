// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Register access.
//!
//! The node graph never dereferences register addresses itself; it goes through [`RegisterIo`] so
//! that the same engine code runs against real hardware or the fakes used in tests.

use crate::error::XpmError;
use core::ptr::{read_volatile, write_volatile};
use log::debug;

/// 32-bit memory-mapped register access.
pub trait RegisterIo {
    /// Reads the 32-bit register at `addr`.
    fn read32(&self, addr: u32) -> u32;

    /// Writes `value` to the 32-bit register at `addr`.
    fn write32(&self, addr: u32, value: u32);

    /// Replaces the bits selected by `mask` in the register at `addr` with those of `value`.
    fn rmw32(&self, addr: u32, mask: u32, value: u32) {
        let current = self.read32(addr);
        self.write32(addr, (current & !mask) | (value & mask));
    }
}

/// Direct volatile access to the physical address space.
pub struct VolatileRegisterIo {
    _private: (),
}

impl VolatileRegisterIo {
    /// Creates a new `VolatileRegisterIo`.
    ///
    /// # Safety
    ///
    /// Every address later passed to `read32` or `write32` must be a valid, 4-byte aligned device
    /// register which is safe to access with volatile 32-bit loads and stores, and nothing else
    /// may be accessing the same memory in a way that conflicts with that.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterIo for VolatileRegisterIo {
    fn read32(&self, addr: u32) -> u32 {
        // SAFETY: The contract of `VolatileRegisterIo::new` guarantees that the address is a
        // valid, aligned device register.
        unsafe { read_volatile(addr as usize as *const u32) }
    }

    fn write32(&self, addr: u32, value: u32) {
        // SAFETY: The contract of `VolatileRegisterIo::new` guarantees that the address is a
        // valid, aligned device register.
        unsafe { write_volatile(addr as usize as *mut u32, value) }
    }
}

/// Polls the register at `addr` until all bits of `mask` are set, up to `timeout` reads.
pub fn poll_for_mask(
    io: &dyn RegisterIo,
    addr: u32,
    mask: u32,
    timeout: u32,
) -> Result<(), XpmError> {
    for _ in 0..timeout {
        if io.read32(addr) & mask == mask {
            return Ok(());
        }
    }
    debug!("Timed out polling {addr:#010x} for mask {mask:#x}");
    Err(XpmError::Timeout)
}

/// Returns a mask of `width` low bits.
pub const fn bit_mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Extracts the `width` bit field at `shift` from `value`. A field starting past bit 31 reads as 0.
pub const fn field_get(value: u32, shift: u8, width: u8) -> u32 {
    match value.checked_shr(shift as u32) {
        Some(field) => field & bit_mask(width),
        None => 0,
    }
}
