// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The runtime's typed allocation pools.
//!
//! Each kind of object lives in its own pool so that pools can be sized independently and handed
//! over separately across a firmware update.

use crate::{
    alloc::{AllocablePool, Arena},
    config::{
        BOARD_POOL_SIZE, DEVICE_OPS_POOL_SIZE, OTHER_POOL_SIZE, REQUIREMENT_POOL_SIZE,
        SUBSYSTEM_POOL_SIZE, TOPOLOGY_POOL_SIZE,
    },
    error::XpmError,
};
use core::slice;
use log::error;

static RUNTIME_POOLS: RuntimePools = RuntimePools::new();

/// Identifies one of the runtime pools.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PoolKind {
    /// Clock, PLL and power domain nodes.
    Topology,
    /// Subsystems.
    Subsystem,
    /// Subsystem requirements.
    Requirement,
    /// Per-device runtime operations.
    DeviceOps,
    /// List heads, list nodes and anything without a pool of its own.
    Other,
    /// Board level nodes.
    Board,
}

impl PoolKind {
    /// All pool kinds, in storage order.
    pub const ALL: [Self; 6] = [
        Self::Topology,
        Self::Subsystem,
        Self::Requirement,
        Self::DeviceOps,
        Self::Other,
        Self::Board,
    ];
}

/// The set of runtime pools.
#[repr(C)]
pub struct RuntimePools {
    topology: AllocablePool<TOPOLOGY_POOL_SIZE>,
    subsystem: AllocablePool<SUBSYSTEM_POOL_SIZE>,
    requirement: AllocablePool<REQUIREMENT_POOL_SIZE>,
    device_ops: AllocablePool<DEVICE_OPS_POOL_SIZE>,
    other: AllocablePool<OTHER_POOL_SIZE>,
    board: AllocablePool<BOARD_POOL_SIZE>,
}

/// Borrowed view of one pool of each kind, as used by the node graph engines.
#[derive(Copy, Clone)]
pub struct PoolSet<'a> {
    /// Clock, PLL and power domain nodes.
    pub topology: &'a dyn Arena,
    /// Subsystems.
    pub subsystem: &'a dyn Arena,
    /// Subsystem requirements.
    pub requirement: &'a dyn Arena,
    /// Per-device runtime operations.
    pub device_ops: &'a dyn Arena,
    /// List heads and nodes.
    pub other: &'a dyn Arena,
    /// Board level nodes.
    pub board: &'a dyn Arena,
}

impl PoolSet<'_> {
    /// Logs the usage of every pool in the set.
    pub fn dump_mem_usage(&self) {
        for pool in [
            self.topology,
            self.subsystem,
            self.requirement,
            self.device_ops,
            self.other,
            self.board,
        ] {
            pool.dump_usage();
        }
    }
}

impl RuntimePools {
    const fn new() -> Self {
        Self {
            topology: AllocablePool::new("topology"),
            subsystem: AllocablePool::new("subsystem"),
            requirement: AllocablePool::new("requirement"),
            device_ops: AllocablePool::new("device ops"),
            other: AllocablePool::new("other"),
            board: AllocablePool::new("board"),
        }
    }

    /// Returns the process-wide pools.
    pub fn get() -> &'static Self {
        &RUNTIME_POOLS
    }

    /// Returns the pool of the given kind.
    pub fn pool(&self, kind: PoolKind) -> &dyn Arena {
        match kind {
            PoolKind::Topology => &self.topology,
            PoolKind::Subsystem => &self.subsystem,
            PoolKind::Requirement => &self.requirement,
            PoolKind::DeviceOps => &self.device_ops,
            PoolKind::Other => &self.other,
            PoolKind::Board => &self.board,
        }
    }

    /// Returns a view of all the pools.
    pub fn pool_set(&self) -> PoolSet<'_> {
        PoolSet {
            topology: &self.topology,
            subsystem: &self.subsystem,
            requirement: &self.requirement,
            device_ops: &self.device_ops,
            other: &self.other,
            board: &self.board,
        }
    }

    /// Logs the usage of every pool.
    pub fn dump_mem_usage(&self) {
        self.pool_set().dump_mem_usage();
    }

    #[allow(clippy::mut_from_ref)]
    fn alloc_from(&self, kind: PoolKind, size: usize) -> Result<&mut [u8], XpmError> {
        let Some(region) = self.pool(kind).alloc_pool(size, 1) else {
            error!("Failed to allocate {size} bytes from the {kind:?} pool");
            self.dump_mem_usage();
            return Err(XpmError::BufferTooSmall);
        };
        // SAFETY: `alloc_pool` returned a fresh, zeroed region of at least `size` bytes which
        // nothing else refers to, and which lives as long as `self`.
        Ok(unsafe { slice::from_raw_parts_mut(region.as_ptr(), size) })
    }

    /// Allocates zeroed bytes from the topology pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::Topology, size)
    }

    /// Allocates zeroed bytes from the subsystem pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes_subsys(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::Subsystem, size)
    }

    /// Allocates zeroed bytes from the requirement pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes_reqm(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::Requirement, size)
    }

    /// Allocates zeroed bytes from the device ops pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes_devops(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::DeviceOps, size)
    }

    /// Allocates zeroed bytes from the other pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes_others(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::Other, size)
    }

    /// Allocates zeroed bytes from the board pool.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes_board(&self, size: usize) -> Result<&mut [u8], XpmError> {
        self.alloc_from(PoolKind::Board, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_config() {
        let pools = RuntimePools::get();
        assert_eq!(pools.pool(PoolKind::Topology).size(), TOPOLOGY_POOL_SIZE);
        assert_eq!(pools.pool(PoolKind::Subsystem).size(), SUBSYSTEM_POOL_SIZE);
        assert_eq!(pools.pool(PoolKind::Requirement).size(), REQUIREMENT_POOL_SIZE);
        assert_eq!(pools.pool(PoolKind::DeviceOps).size(), DEVICE_OPS_POOL_SIZE);
        assert_eq!(pools.pool(PoolKind::Other).size(), OTHER_POOL_SIZE);
        assert_eq!(pools.pool(PoolKind::Board).size(), BOARD_POOL_SIZE);
    }

    #[test]
    fn entry_points_use_their_pool() {
        let pools = RuntimePools::get();
        let board = pools.pool(PoolKind::Board);
        let before = board.used();
        let bytes = pools.alloc_bytes_board(6).unwrap();
        assert_eq!(bytes.len(), 6);
        let address = bytes.as_ptr() as usize;
        assert!(address >= board.base_address());
        assert!(address < board.base_address() + board.size());
        assert!(board.used() >= before + 8);
    }

    #[test]
    fn exhaustion_is_reported() {
        let pools = RuntimePools::get();
        let device_ops = pools.pool(PoolKind::DeviceOps);
        let before = device_ops.used();
        assert_eq!(
            pools.alloc_bytes_devops(DEVICE_OPS_POOL_SIZE + 4).err(),
            Some(XpmError::BufferTooSmall)
        );
        assert!(device_ops.used() >= before);
    }
}
