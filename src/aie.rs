// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! AI Engine array power domains.
//!
//! An AIE domain is a power domain which additionally knows the geometry of the tile array it
//! powers. Columns at either edge and rows at the top may be reserved, in which case the usable
//! part of the array is described by the adjusted start and extent.

use crate::{
    alloc::Arena,
    error::{InternalError, XpmError},
    mmio::field_get,
    node::{Node, NodeId, PM_POWER_ME, PM_POWER_ME2, state},
    platform::PlatformType,
    power::PowerDomains,
};
use log::{debug, warn};

/// First generation AI Engine.
pub const AIE_GEN_AIE: u8 = 1;
/// AIE-ML.
pub const AIE_GEN_AIEML: u8 = 2;
/// AIE2PS.
pub const AIE_GEN_AIE2PS: u8 = 3;

/// NoC address of the array's configuration space.
pub const AIE_NOC_ADDRESS: u64 = 0x0200_0000_0000;

/// Geometry of an AI Engine tile array.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AieArray {
    /// Total rows, including shim and memory rows.
    pub num_rows: u16,
    /// Total columns.
    pub num_cols: u16,
    /// First usable row, just above the shim rows.
    pub start_row: u16,
    /// First usable column.
    pub start_col: u16,
    /// Interface rows at the bottom of the array.
    pub num_shim_rows: u8,
    /// Compute tile rows.
    pub num_aie_rows: u8,
    /// Memory tile rows.
    pub num_mem_rows: u8,
    /// AI Engine generation, one of the `AIE_GEN_*` values.
    pub gen_version: u8,
    /// Columns reserved at the left edge.
    pub l_col_offset: u8,
    /// Columns reserved at the right edge.
    pub r_col_offset: u8,
    /// Rows reserved at the top.
    pub t_row_offset: u8,
    /// Usable columns.
    pub num_cols_adjusted: u16,
    /// Usable rows, above the shim rows.
    pub num_rows_adjusted: u16,
    /// NoC address of the array.
    pub noc_address: u64,
}

impl AieArray {
    /// The fixed array modelled by the AIE2PS pre-silicon platforms.
    fn aie2ps_pre_silicon() -> Self {
        Self {
            num_rows: 5,
            num_cols: 7,
            num_shim_rows: 1,
            num_mem_rows: 1,
            num_aie_rows: 3,
            gen_version: AIE_GEN_AIE2PS,
            noc_address: AIE_NOC_ADDRESS,
            ..Default::default()
        }
    }

    /// Decodes the array geometry from topology argument words.
    ///
    /// The fourth word, holding the reserved column and row offsets, is optional.
    fn from_args(args: &[u32]) -> Result<Self, XpmError> {
        let [generation, size, rows, offsets @ ..] = args else {
            warn!("AIE domain needs at least 3 geometry words, got {}", args.len());
            return Err(XpmError::InvalidParam);
        };
        let offsets = offsets.first().copied().unwrap_or_default();
        Ok(Self {
            gen_version: field_get(*generation, 0, 8) as u8,
            num_rows: field_get(*size, 16, 16) as u16,
            num_cols: field_get(*size, 0, 16) as u16,
            num_aie_rows: field_get(*rows, 0, 8) as u8,
            num_mem_rows: field_get(*rows, 8, 8) as u8,
            num_shim_rows: field_get(*rows, 16, 8) as u8,
            l_col_offset: field_get(offsets, 0, 8) as u8,
            r_col_offset: field_get(offsets, 8, 8) as u8,
            t_row_offset: field_get(offsets, 16, 8) as u8,
            noc_address: AIE_NOC_ADDRESS,
            ..Default::default()
        })
    }

    /// Works out the usable part of the array from its size and reserved offsets.
    fn adjust(&mut self) -> Result<(), XpmError> {
        self.start_col = self.l_col_offset.into();
        self.num_cols_adjusted = self
            .num_cols
            .checked_sub(self.l_col_offset.into())
            .and_then(|cols| cols.checked_sub(self.r_col_offset.into()))
            .ok_or(XpmError::InvalidParam)?;
        self.start_row = self.num_shim_rows.into();
        self.num_rows_adjusted = self
            .num_rows
            .checked_sub(self.start_row)
            .and_then(|rows| rows.checked_sub(self.t_row_offset.into()))
            .ok_or(XpmError::InvalidParam)?;
        Ok(())
    }
}

/// A power domain feeding an AI Engine array.
#[derive(Debug)]
pub struct AieDomain {
    /// Node header.
    pub node: Node,
    /// Bits of the domain in the power control registers.
    pub bit_mask: u32,
    /// Parent power domain, if any.
    pub parent: Option<NodeId>,
    /// Array geometry.
    pub array: AieArray,
    /// Whether the geometry is final, rather than to be read from the array itself later.
    pub info_resolved: bool,
}

impl AieDomain {
    /// Creates the AIE domain `id` and registers it with the power domain collaborator.
    ///
    /// On pre-silicon platforms the AIE2PS array has a fixed geometry and `args` are ignored.
    pub fn init<'a>(
        pool: &'a dyn Arena,
        power: &dyn PowerDomains,
        platform: PlatformType,
        id: NodeId,
        bit_mask: u32,
        parent: Option<NodeId>,
        args: &[u32],
    ) -> Result<&'a mut Self, XpmError> {
        let (mut array, info_resolved) = match id {
            PM_POWER_ME2 if platform.is_pre_silicon() => (AieArray::aie2ps_pre_silicon(), true),
            PM_POWER_ME | PM_POWER_ME2 => (AieArray::from_args(args)?, false),
            _ => {
                warn!("{id} is not an AIE power domain");
                return Err(XpmError::Internal(InternalError::InvalidPwrDomain));
            }
        };
        array.adjust().inspect_err(|_| {
            warn!(
                "AIE array {}x{} can't reserve {}+{} columns and {} rows",
                array.num_cols,
                array.num_rows,
                array.l_col_offset,
                array.r_col_offset,
                array.t_row_offset
            );
        })?;

        let domain = pool.alloc(Self {
            node: Node::new(id, state::OFF, 0),
            bit_mask,
            parent,
            array,
            info_resolved,
        })?;
        power.init_domain(id, bit_mask, parent)?;
        debug!(
            "AIE domain {id}: {} columns from {}, {} rows from {}",
            array.num_cols_adjusted, array.start_col, array.num_rows_adjusted, array.start_row
        );
        Ok(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alloc::AllocablePool,
        node::{NodeClass, power_subclass, power_type},
        platform::test::FakePower,
    };

    const PMC: NodeId = NodeId::new(
        NodeClass::Power,
        power_subclass::DOMAIN,
        power_type::DOMAIN_PMC,
        1,
    );

    #[test]
    fn decodes_geometry_with_offsets() {
        let pool = AllocablePool::<256>::new("topology");
        let power = FakePower::new();
        let args = [0x2, 0x0009_0026, 0x0001_0408, 0x0001_0201];
        let domain = AieDomain::init(
            &pool,
            &power,
            PlatformType::Silicon,
            PM_POWER_ME,
            0x4,
            Some(PMC),
            &args,
        )
        .unwrap();
        let array = domain.array;
        assert_eq!(array.gen_version, AIE_GEN_AIEML);
        assert_eq!((array.num_rows, array.num_cols), (9, 0x26));
        assert_eq!(
            (array.num_aie_rows, array.num_mem_rows, array.num_shim_rows),
            (8, 4, 1)
        );
        assert_eq!((array.start_col, array.num_cols_adjusted), (1, 0x26 - 3));
        assert_eq!((array.start_row, array.num_rows_adjusted), (1, 7));
        assert!(!domain.info_resolved);
        assert_eq!(power.inits(), [(PM_POWER_ME, 0x4, Some(PMC))]);
    }

    #[test]
    fn offsets_are_optional() {
        let pool = AllocablePool::<256>::new("topology");
        let power = FakePower::new();
        let args = [0x1, 0x0009_0032, 0x0001_0008];
        let domain = AieDomain::init(
            &pool,
            &power,
            PlatformType::Silicon,
            PM_POWER_ME,
            0x4,
            None,
            &args,
        )
        .unwrap();
        assert_eq!(domain.array.start_col, 0);
        assert_eq!(domain.array.num_cols_adjusted, 0x32);
        assert_eq!(domain.array.num_rows_adjusted, 8);
    }

    #[test]
    fn pre_silicon_aie2ps_defaults() {
        let pool = AllocablePool::<256>::new("topology");
        let power = FakePower::new();
        let domain = AieDomain::init(
            &pool,
            &power,
            PlatformType::Spp,
            PM_POWER_ME2,
            0x8,
            None,
            &[],
        )
        .unwrap();
        let array = domain.array;
        assert!(domain.info_resolved);
        assert_eq!((array.num_cols, array.num_rows), (7, 5));
        assert_eq!((array.start_row, array.num_rows_adjusted), (1, 4));
        assert_eq!(array.num_cols_adjusted, 7);
        assert_eq!(array.gen_version, AIE_GEN_AIE2PS);
        assert!(array.start_col + array.num_cols_adjusted <= array.num_cols);
        assert!(array.start_row + array.num_rows_adjusted <= array.num_rows);
    }

    #[test]
    fn rejected_arguments() {
        let pool = AllocablePool::<256>::new("topology");
        let power = FakePower::new();
        assert_eq!(
            AieDomain::init(
                &pool,
                &power,
                PlatformType::Silicon,
                PM_POWER_ME2,
                0x8,
                None,
                &[3, 0x0005_0007]
            )
            .err(),
            Some(XpmError::InvalidParam)
        );
        assert_eq!(
            AieDomain::init(
                &pool,
                &power,
                PlatformType::Silicon,
                PM_POWER_ME,
                0x4,
                None,
                &[1, 0x0005_0007, 0x0001_0103, 0x0000_0404]
            )
            .err(),
            Some(XpmError::InvalidParam)
        );
        assert_eq!(
            AieDomain::init(
                &pool,
                &power,
                PlatformType::Spp,
                PMC,
                0x4,
                None,
                &[1, 0x0005_0007, 0x0001_0103]
            )
            .err(),
            Some(XpmError::Internal(InternalError::InvalidPwrDomain))
        );
        assert!(power.inits().is_empty());
        assert_eq!(pool.used(), 0);
    }
}
