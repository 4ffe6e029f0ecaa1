// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Data structure descriptors for in-place firmware update.
//!
//! Before an update the running firmware publishes where each runtime pool lives and how big it is,
//! together with a version. The new firmware checks the descriptors it finds against its own and
//! adopts the pools if they are compatible.

use crate::{
    config::{
        BOARD_POOL_SIZE, DEVICE_OPS_POOL_SIZE, OTHER_POOL_SIZE, REQUIREMENT_POOL_SIZE,
        SUBSYSTEM_POOL_SIZE, TOPOLOGY_POOL_SIZE,
    },
    error::XpmError,
    runtime_alloc::{PoolKind, RuntimePools},
};
use log::{debug, error};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Module ID of the platform management library in the data structure registry.
pub const XPM_MODULE_ID: u32 = 2;
/// Version of the layout of the pooled data structures.
pub const XPM_DS_VERSION: u16 = 1;
/// Oldest layout version this firmware can adopt.
pub const XPM_DS_LCVERSION: u16 = 1;

/// Bytes of topology data: clocks, PLLs and power domains.
pub const TOPOLOGY_DS_SIZE: usize = TOPOLOGY_POOL_SIZE;
/// Bytes of runtime data: subsystems, requirements, device operations and lists.
pub const RUNTIME_DS_SIZE: usize =
    SUBSYSTEM_POOL_SIZE + REQUIREMENT_POOL_SIZE + DEVICE_OPS_POOL_SIZE + OTHER_POOL_SIZE;
/// Bytes of board data.
pub const BOARD_DS_SIZE: usize = BOARD_POOL_SIZE;

/// Describes one pool to the data structure registry.
#[derive(Clone, Copy, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct DsEntry {
    /// Owning module.
    pub module_id: u32,
    /// Which pool this is.
    pub ds_id: u32,
    /// Layout version of the pool contents.
    pub version: u16,
    /// Oldest layout version the writer can adopt.
    pub lc_version: u16,
    /// Size of the pool storage in bytes.
    pub size: u32,
    /// Address of the pool storage.
    pub base: u64,
}

impl DsEntry {
    /// Returns whether a pool described by `stored`, left by a previous firmware, can be adopted
    /// in place of the one described by `self`.
    pub fn is_compatible(&self, stored: &DsEntry) -> bool {
        self.module_id == stored.module_id
            && self.ds_id == stored.ds_id
            && self.size == stored.size
            && stored.version >= self.lc_version
    }
}

fn ds_id(kind: PoolKind) -> u32 {
    match kind {
        PoolKind::Topology => 1,
        PoolKind::Subsystem => 2,
        PoolKind::Requirement => 3,
        PoolKind::DeviceOps => 4,
        PoolKind::Other => 5,
        PoolKind::Board => 6,
    }
}

/// Returns a descriptor for each runtime pool, in [`PoolKind::ALL`] order.
pub fn descriptors(pools: &RuntimePools) -> [DsEntry; 6] {
    PoolKind::ALL.map(|kind| {
        let pool = pools.pool(kind);
        DsEntry {
            module_id: XPM_MODULE_ID,
            ds_id: ds_id(kind),
            version: XPM_DS_VERSION,
            lc_version: XPM_DS_LCVERSION,
            size: pool.size() as u32,
            base: pool.base_address() as u64,
        }
    })
}

/// The platform's registry of data structures to preserve across an update.
pub trait DsRegistry {
    /// Records one data structure.
    fn register(&self, entry: &DsEntry) -> Result<(), XpmError>;
}

/// Registers every runtime pool with `registry`.
pub fn register_data_structures(
    pools: &RuntimePools,
    registry: &dyn DsRegistry,
) -> Result<(), XpmError> {
    for entry in descriptors(pools) {
        registry.register(&entry).inspect_err(|e| {
            error!("Failed to register data structure {}: {e}", entry.ds_id);
        })?;
        debug!(
            "Registered data structure {} at {:#x}, {} bytes",
            entry.ds_id, entry.base, entry.size
        );
    }
    Ok(())
}
