// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Platform identification.


/// What the PLM is running on.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PlatformType {
    /// Production silicon.
    #[default]
    Silicon,
    /// The SystemC based SPP pre-silicon platform.
    Spp,
    /// Hardware emulation.
    Emulation,
    /// QEMU.
    Qemu,
}

impl PlatformType {
    /// Returns whether this is a pre-silicon platform on which some hardware is modelled with
    /// fixed parameters.
    pub fn is_pre_silicon(self) -> bool {
        matches!(self, Self::Spp | Self::Emulation)
    }
}
