// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Build-time configuration.
//!
//! Pool sizes may be overridden by setting `XPM_<POOL>_POOL_SIZE` in the environment when
//! building, e.g. `XPM_TOPOLOGY_POOL_SIZE=32768`. Values are decimal or `0x` prefixed hexadecimal
//! and are rounded up to a multiple of 4. Anything unparsable falls back to the default.

/// Size in bytes of the pool holding clock, PLL and power domain nodes.
pub const TOPOLOGY_POOL_SIZE: usize =
    pool_size(option_env!("XPM_TOPOLOGY_POOL_SIZE"), 16 * 1024);
/// Size in bytes of the pool holding subsystem structures.
pub const SUBSYSTEM_POOL_SIZE: usize = pool_size(option_env!("XPM_SUBSYSTEM_POOL_SIZE"), 2048);
/// Size in bytes of the pool holding requirements.
pub const REQUIREMENT_POOL_SIZE: usize =
    pool_size(option_env!("XPM_REQUIREMENT_POOL_SIZE"), 8 * 1024);
/// Size in bytes of the pool holding per-device runtime operations.
pub const DEVICE_OPS_POOL_SIZE: usize =
    pool_size(option_env!("XPM_DEVICE_OPS_POOL_SIZE"), 4 * 1024);
/// Size in bytes of the pool holding list heads, list nodes and anything else.
pub const OTHER_POOL_SIZE: usize = pool_size(option_env!("XPM_OTHER_POOL_SIZE"), 8 * 1024);
/// Size in bytes of the pool holding board level nodes such as regulators.
pub const BOARD_POOL_SIZE: usize = pool_size(option_env!("XPM_BOARD_POOL_SIZE"), 1024);

/// Number of slots in the clock node table; clock node indices must be below this.
pub const MAX_CLOCK_INDEX: usize = 256;
/// Maximum number of parents a mux can select between.
pub const MAX_MUX_PARENTS: usize = 16;
/// Length of a clock name, including the terminating NUL.
pub const MAX_NAME_BYTES: usize = 16;
/// Maximum number of sub-nodes in a custom clock topology.
pub const MAX_TOPOLOGY_NODES: usize = 6;
/// Number of status register polls before a PLL is considered not to lock.
pub const PLL_LOCK_TIMEOUT: u32 = 0x4000;
/// Maximum number of AI Engine power domains on one device.
pub const MAX_AIE_DOMAINS: usize = 2;

/// Parses an optional build-time pool size, falling back to `default`.
const fn pool_size(value: Option<&str>, default: usize) -> usize {
    let size = match value {
        Some(value) => match parse_usize(value.as_bytes()) {
            Some(size) => size,
            None => default,
        },
        None => default,
    };
    size.next_multiple_of(4)
}

const fn parse_usize(bytes: &[u8]) -> Option<usize> {
    let (radix, mut i) = if bytes.len() > 2 && bytes[0] == b'0' && (bytes[1] | 0x20) == b'x' {
        (16, 2)
    } else {
        (10, 0)
    };
    if i == bytes.len() {
        return None;
    }

    let mut value: usize = 0;
    while i < bytes.len() {
        let digit = match bytes[i] {
            b'0'..=b'9' => bytes[i] - b'0',
            b'a'..=b'f' if radix == 16 => bytes[i] - b'a' + 10,
            b'A'..=b'F' if radix == 16 => bytes[i] - b'A' + 10,
            b'_' => {
                i += 1;
                continue;
            }
            _ => return None,
        };
        value = match value.checked_mul(radix) {
            Some(value) => match value.checked_add(digit as usize) {
                Some(value) => value,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(value)
}
