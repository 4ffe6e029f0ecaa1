// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! PLLs.
//!
//! A PLL is held in reset and bypass while it is reconfigured or its power domain goes down, and
//! only taken out of bypass once its status register reports lock. Across a domain power cycle the
//! control and configuration registers are saved and restored.

use super::{ClockDb, ClockEntry, ClockNode};
use crate::{
    config::PLL_LOCK_TIMEOUT,
    error::{InternalError, XpmError},
    mmio::{RegisterIo, bit_mask, field_get, poll_for_mask},
    node::{NodeId, NodeKind, state},
    power::PowerEvent,
};
use bitflags::bitflags;
use log::{debug, error, warn};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Software view of a PLL's state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PllState {
    /// Held in reset.
    Reset,
    /// Locked and out of bypass.
    Locked,
    /// Context saved and held in reset while the power domain is down.
    Suspended,
}

/// Operating mode of a PLL, as set and queried by clients.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum PllMode {
    /// Integer multiplier only.
    Integer = 0,
    /// Integer and fractional multiplier.
    Fractional = 1,
    /// Held in reset.
    Reset = 2,
}

/// PLL parameters clients may set and query.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum PllParam {
    /// Output divider.
    Div2 = 0,
    /// Feedback divider.
    Fbdiv = 1,
    /// Fractional part of the multiplier.
    Data = 2,
}

bitflags! {
    /// Which halves of a reset sequence to perform.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct PllResetFlags: u8 {
        /// Put the PLL in bypass, then hold it in reset.
        const ASSERT = 1 << 0;
        /// Release reset, wait for lock, then leave bypass.
        const RELEASE = 1 << 1;
        /// Both, in order.
        const PULSE = Self::ASSERT.bits() | Self::RELEASE.bits();
    }
}

bitflags! {
    /// State of a PLL's saved context.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct ContextFlags: u8 {
        /// The context holds register values which haven't been restored yet.
        const SAVED = 1 << 0;
    }
}

/// Register field layout of a kind of PLL.
#[derive(Debug, Eq, PartialEq)]
pub struct PllTopology {
    /// Reset bit in the control register.
    pub reset_mask: u32,
    /// Bypass bit in the control register.
    pub bypass_mask: u32,
    /// Feedback divider field in the control register.
    pub fbdiv_shift: u8,
    /// Width of the feedback divider field.
    pub fbdiv_width: u8,
    /// Output divider field in the control register.
    pub clkoutdiv_shift: u8,
    /// Width of the output divider field.
    pub clkoutdiv_width: u8,
    /// Fractional data field in the fractional configuration register.
    pub frac_data_shift: u8,
    /// Width of the fractional data field.
    pub frac_data_width: u8,
    /// Fractional mode enable bit in the fractional configuration register.
    pub frac_enable_mask: u32,
    /// Lock bit in the status register.
    pub lock_mask: u32,
    /// Stable bit in the status register.
    pub stable_mask: u32,
}

/// Layout of the PS and PMC PLLs.
pub static GENERIC_PLL: PllTopology = PllTopology {
    reset_mask: 1 << 0,
    bypass_mask: 1 << 3,
    fbdiv_shift: 8,
    fbdiv_width: 8,
    clkoutdiv_shift: 16,
    clkoutdiv_width: 2,
    frac_data_shift: 0,
    frac_data_width: 16,
    frac_enable_mask: 1 << 31,
    lock_mask: 1 << 0,
    stable_mask: 1 << 2,
};

/// Layout of the NoC PLL.
pub static NOC_PLL: PllTopology = PllTopology {
    lock_mask: 1 << 1,
    stable_mask: 1 << 3,
    ..GENERIC_PLL
};

impl PllTopology {
    /// Returns the layout for the given topology type, if it is a PLL one.
    pub fn for_type(topology_type: u8) -> Option<&'static Self> {
        match super::topology::TopologyType::try_from(topology_type).ok()? {
            super::topology::TopologyType::GenericPll => Some(&GENERIC_PLL),
            super::topology::TopologyType::NocPll => Some(&NOC_PLL),
            _ => None,
        }
    }
}

/// Register values saved while a PLL's power domain is down.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PllContext {
    /// Control register.
    pub ctrl: u32,
    /// Configuration register.
    pub cfg: u32,
    /// Fractional configuration register.
    pub frac: u32,
    /// Whether the values above are waiting to be restored.
    pub flags: ContextFlags,
}

/// A PLL.
pub struct PllClockNode {
    /// Common clock state. The base address is the control register.
    pub clk: ClockNode,
    /// Number of outstanding requests.
    pub use_count: u32,
    /// The reference clock feeding the PLL, once added.
    pub parent: Option<NodeId>,
    /// Register field layout.
    pub topology: &'static PllTopology,
    /// Status register, holding the lock bit.
    pub status_reg: u32,
    /// Configuration register.
    pub config_reg: u32,
    /// Fractional configuration register.
    pub frac_config_reg: u32,
    /// Registers saved across a power down.
    pub context: PllContext,
    /// Software state.
    pub state: PllState,
    /// Mode to return to when the PLL is next enabled.
    pub mode: PllMode,
    /// Flags from the topology description.
    pub flags: u8,
}

impl PllClockNode {
    fn ctrl_reg(&self) -> u32 {
        self.clk.node.base_address
    }

    /// Asserts and/or releases reset.
    ///
    /// If the PLL doesn't lock after release it is left in reset and bypass.
    pub fn reset(&mut self, io: &dyn RegisterIo, flags: PllResetFlags) -> Result<(), XpmError> {
        let ctrl = self.ctrl_reg();
        let topology = self.topology;
        if flags.contains(PllResetFlags::ASSERT) {
            io.rmw32(ctrl, topology.bypass_mask, topology.bypass_mask);
            io.rmw32(ctrl, topology.reset_mask, topology.reset_mask);
            self.state = PllState::Reset;
            self.clk.node.state = state::OFF;
        }
        if flags.contains(PllResetFlags::RELEASE) {
            io.rmw32(ctrl, topology.reset_mask, 0);
            poll_for_mask(io, self.status_reg, topology.lock_mask, PLL_LOCK_TIMEOUT).inspect_err(
                |_| {
                    error!(
                        "PLL {} failed to lock ({:#x})",
                        self.clk.node.id,
                        InternalError::PllLock as u32
                    );
                },
            )?;
            io.rmw32(ctrl, topology.bypass_mask, 0);
            self.state = PllState::Locked;
            self.clk.node.state = state::ON;
        }
        Ok(())
    }

    /// Saves the PLL's registers and holds it in reset.
    pub fn suspend(&mut self, io: &dyn RegisterIo) -> Result<(), XpmError> {
        self.context = PllContext {
            ctrl: io.read32(self.ctrl_reg()),
            cfg: io.read32(self.config_reg),
            frac: io.read32(self.frac_config_reg),
            flags: ContextFlags::SAVED,
        };
        if self.state != PllState::Reset {
            self.reset(io, PllResetFlags::ASSERT)?;
        }
        self.state = PllState::Suspended;
        Ok(())
    }

    /// Restores any saved registers, then brings the PLL out of reset unless the restored control
    /// register holds it there.
    pub fn resume(&mut self, io: &dyn RegisterIo) -> Result<(), XpmError> {
        if self.context.flags.contains(ContextFlags::SAVED) {
            io.write32(self.config_reg, self.context.cfg);
            io.write32(self.frac_config_reg, self.context.frac);
            io.write32(self.ctrl_reg(), self.context.ctrl);
            self.context.flags.remove(ContextFlags::SAVED);
        }
        if io.read32(self.ctrl_reg()) & self.topology.reset_mask != 0 {
            self.state = PllState::Reset;
            self.clk.node.state = state::OFF;
            Ok(())
        } else {
            self.reset(io, PllResetFlags::RELEASE)
        }
    }

    /// Switches the PLL between integer and fractional mode, or holds it in reset.
    pub fn set_mode(&mut self, io: &dyn RegisterIo, mode: PllMode) -> Result<(), XpmError> {
        self.reset(io, PllResetFlags::ASSERT)?;
        if mode == PllMode::Reset {
            return Ok(());
        }
        let enable = self.topology.frac_enable_mask;
        let value = if mode == PllMode::Fractional { enable } else { 0 };
        io.rmw32(self.frac_config_reg, enable, value);
        self.mode = mode;
        self.reset(io, PllResetFlags::RELEASE)
    }

    /// Reads the mode back from the hardware.
    pub fn get_mode(&self, io: &dyn RegisterIo) -> PllMode {
        if io.read32(self.ctrl_reg()) & self.topology.reset_mask != 0 {
            PllMode::Reset
        } else if io.read32(self.frac_config_reg) & self.topology.frac_enable_mask != 0 {
            PllMode::Fractional
        } else {
            PllMode::Integer
        }
    }

    /// Returns the register, shift and width of a parameter.
    fn param_field(&self, param: u32) -> Result<(u32, u8, u8), XpmError> {
        let topology = self.topology;
        match PllParam::try_from(param).map_err(|_| XpmError::NoFeature)? {
            PllParam::Div2 => Ok((
                self.ctrl_reg(),
                topology.clkoutdiv_shift,
                topology.clkoutdiv_width,
            )),
            PllParam::Fbdiv => Ok((self.ctrl_reg(), topology.fbdiv_shift, topology.fbdiv_width)),
            PllParam::Data => Ok((
                self.frac_config_reg,
                topology.frac_data_shift,
                topology.frac_data_width,
            )),
        }
    }

    /// Sets a parameter.
    pub fn set_param(&self, io: &dyn RegisterIo, param: u32, value: u32) -> Result<(), XpmError> {
        let (reg, shift, width) = self.param_field(param)?;
        let mask = bit_mask(width);
        if value > mask {
            return Err(XpmError::InvalidParam);
        }
        io.rmw32(reg, mask << shift, value << shift);
        Ok(())
    }

    /// Reads a parameter.
    pub fn get_param(&self, io: &dyn RegisterIo, param: u32) -> Result<u32, XpmError> {
        let (reg, shift, width) = self.param_field(param)?;
        Ok(field_get(io.read32(reg), shift, width))
    }
}

impl ClockDb<'_> {
    /// Returns the PLL with the given ID.
    pub fn pll(&self, id: NodeId) -> Result<&PllClockNode, XpmError> {
        match self.entry(id)? {
            ClockEntry::Pll(pll) => Ok(&**pll),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn pll_mut(&mut self, id: NodeId) -> Result<&mut PllClockNode, XpmError> {
        match self.entry_mut(id)? {
            ClockEntry::Pll(pll) => Ok(&mut **pll),
            _ => Err(XpmError::InvalidParam),
        }
    }

    /// Adds a PLL.
    ///
    /// `offsets` are the status, configuration and fractional configuration register offsets
    /// from the control register.
    pub fn pll_add_node(
        &mut self,
        id: NodeId,
        control_reg: u32,
        topology: u8,
        offsets: [u16; 3],
        power_domain: NodeId,
        flags: u8,
    ) -> Result<(), XpmError> {
        if id.kind() != NodeKind::PllClock {
            return Err(XpmError::InvalidParam);
        }
        let index = self.free_slot(id)?;
        let topology = PllTopology::for_type(topology).ok_or(XpmError::InvalidParam)?;
        let power_domain = self
            .power_domain_of_new(power_domain)?
            .ok_or(XpmError::DeviceNotFound)?;
        let [status, config, frac] = offsets.map(|offset| control_reg + u32::from(offset));
        let pll = self.pool.alloc(PllClockNode {
            clk: ClockNode::new(id, state::OFF, control_reg, Some(power_domain)),
            use_count: 0,
            parent: None,
            topology,
            status_reg: status,
            config_reg: config,
            frac_config_reg: frac,
            context: PllContext::default(),
            state: PllState::Suspended,
            mode: PllMode::Integer,
            flags,
        })?;
        debug!("Added PLL {id}");
        self.clocks[index] = Some(ClockEntry::Pll(pll));
        Ok(())
    }

    /// Sets the one parent of a PLL.
    pub fn pll_add_parent(&mut self, id: NodeId, parents: &[NodeId]) -> Result<(), XpmError> {
        let pll = self.pll_mut(id)?;
        match parents {
            [parent] if pll.parent.is_none() && parent.is_clock() && *parent != id => {
                pll.parent = Some(*parent);
                Ok(())
            }
            _ => {
                warn!("PLL {id} takes exactly one clock parent");
                Err(XpmError::InvalidParam)
            }
        }
    }

    /// Takes a reference to a PLL, powering up its domain and locking it on the first one.
    pub fn pll_request(&mut self, id: NodeId) -> Result<(), XpmError> {
        let (io, power) = (self.io, self.power);
        let pll = self.pll_mut(id)?;
        if pll.use_count == 0 {
            let domain = pll.clk.power_domain;
            if let Some(domain) = domain {
                power.handle_event(domain, PowerEvent::PowerUp)?;
            }
            let started = (|| -> Result<(), XpmError> {
                if pll.state == PllState::Suspended {
                    pll.resume(io)?;
                }
                if pll.state == PllState::Reset {
                    pll.reset(io, PllResetFlags::PULSE)?;
                }
                Ok(())
            })();
            if let Err(e) = started {
                if let Some(domain) = domain {
                    // The PLL error is the one to report.
                    let _ = power.handle_event(domain, PowerEvent::PowerDown);
                }
                return Err(e);
            }
        }
        pll.use_count += 1;
        Ok(())
    }

    /// Drops a reference to a PLL, letting its domain power down on the last one.
    pub fn pll_release(&mut self, id: NodeId) -> Result<(), XpmError> {
        let power = self.power;
        let pll = self.pll_mut(id)?;
        if pll.use_count == 0 {
            warn!("PLL {id} released more often than requested");
            return Err(XpmError::Failure);
        }
        pll.use_count -= 1;
        match pll.clk.power_domain {
            Some(domain) if pll.use_count == 0 => power.handle_event(domain, PowerEvent::PowerDown),
            _ => Ok(()),
        }
    }

    /// Saves a PLL's context and holds it in reset.
    pub fn pll_suspend(&mut self, id: NodeId) -> Result<(), XpmError> {
        let io = self.io;
        self.pll_mut(id)?.suspend(io)
    }

    /// Restores a PLL's context and relocks it if it was running.
    pub fn pll_resume(&mut self, id: NodeId) -> Result<(), XpmError> {
        let io = self.io;
        self.pll_mut(id)?.resume(io)
    }

    fn plls_in(&mut self, domain: NodeId) -> impl Iterator<Item = &mut PllClockNode> {
        self.clocks.iter_mut().filter_map(move |entry| match entry {
            Some(ClockEntry::Pll(pll)) if pll.clk.power_domain == Some(domain) => {
                Some(&mut **pll)
            }
            _ => None,
        })
    }

    /// Suspends every PLL in `domain` ahead of it powering down.
    pub fn suspend_domain_plls(&mut self, domain: NodeId) -> Result<(), XpmError> {
        let io = self.io;
        for pll in self.plls_in(domain) {
            if pll.state != PllState::Suspended {
                pll.suspend(io)?;
            }
        }
        Ok(())
    }

    /// Resumes every suspended PLL in `domain` which is still in use, after it has powered up.
    pub fn resume_domain_plls(&mut self, domain: NodeId) -> Result<(), XpmError> {
        let io = self.io;
        for pll in self.plls_in(domain) {
            if pll.state == PllState::Suspended && pll.use_count > 0 {
                pll.resume(io)?;
            }
        }
        Ok(())
    }

    /// Sets the mode of a PLL.
    pub fn pll_set_mode(&mut self, id: NodeId, mode: u32) -> Result<(), XpmError> {
        let mode = PllMode::try_from(mode).map_err(|_| XpmError::InvalidParam)?;
        let io = self.io;
        self.pll_mut(id)?.set_mode(io, mode)
    }

    /// Returns the mode of a PLL.
    pub fn pll_get_mode(&self, id: NodeId) -> Result<u32, XpmError> {
        Ok(self.pll(id)?.get_mode(self.io).into())
    }

    /// Sets a parameter of a PLL.
    pub fn pll_set_param(&mut self, id: NodeId, param: u32, value: u32) -> Result<(), XpmError> {
        self.pll(id)?.set_param(self.io, param, value)
    }

    /// Returns a parameter of a PLL.
    pub fn pll_get_param(&self, id: NodeId, param: u32) -> Result<u32, XpmError> {
        self.pll(id)?.get_param(self.io, param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alloc::AllocablePool,
        node::{NodeClass, clock_subclass, clock_type, power_subclass, power_type},
        platform::test::{FakePower, FakeRegisters, init_logger},
    };

    const PLL: NodeId = NodeId(0x0810_4001);
    const FPD: NodeId = NodeId::new(
        NodeClass::Power,
        power_subclass::DOMAIN,
        power_type::DOMAIN_PS_FULL,
        3,
    );
    const REF_CLK: NodeId =
        NodeId::new(NodeClass::Clock, clock_subclass::REF, clock_type::REF, 0x6a);
    const CTRL: u32 = 0xfd1a_0040;
    const CFG: u32 = CTRL + 0x4;
    const FRAC: u32 = CTRL + 0x8;
    const STATUS: u32 = CTRL + 0x4c;

    fn add_pll(db: &mut ClockDb) {
        db.pll_add_node(PLL, CTRL, 0, [0x4c, 0x4, 0x8], FPD, 0)
            .unwrap();
    }

    #[test]
    fn add_checks() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, false);
        let mut db = ClockDb::new(&pool, &io, &power);
        assert_eq!(
            db.pll_add_node(PLL, CTRL, 2, [0x4c, 0x4, 0x8], FPD, 0),
            Err(XpmError::InvalidParam)
        );
        assert_eq!(
            db.pll_add_node(PLL, CTRL, 0, [0x4c, 0x4, 0x8], NodeId(0), 0),
            Err(XpmError::DeviceNotFound)
        );
        add_pll(&mut db);
        let pll = db.pll(PLL).unwrap();
        assert_eq!(
            (pll.status_reg, pll.config_reg, pll.frac_config_reg),
            (STATUS, CFG, FRAC)
        );
        assert_eq!(pll.state, PllState::Suspended);

        db.add_parent(PLL, &[REF_CLK]).unwrap();
        assert_eq!(db.add_parent(PLL, &[REF_CLK]), Err(XpmError::InvalidParam));
        assert_eq!(
            db.query_mux_sources(PLL, 0).unwrap(),
            [0x6a, crate::clock::NA_PARENT, 0]
        );
    }

    #[test]
    fn request_locks_and_release_powers_down() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, false);
        let mut db = ClockDb::new(&pool, &io, &power);
        add_pll(&mut db);
        io.preset(STATUS, 1);
        io.preset(CTRL, 0x4809);

        db.request(PLL).unwrap();
        db.request(PLL).unwrap();
        assert_eq!(power.events(), [(FPD, PowerEvent::PowerUp)]);
        let pll = db.pll(PLL).unwrap();
        assert_eq!(pll.state, PllState::Locked);
        assert_eq!(pll.use_count, 2);
        assert_eq!(io.read32(CTRL), 0x4800);
        assert_eq!(db.get_state(PLL), Ok(1));

        db.release(PLL).unwrap();
        assert_eq!(power.events().len(), 1);
        db.release(PLL).unwrap();
        assert_eq!(
            power.events(),
            [(FPD, PowerEvent::PowerUp), (FPD, PowerEvent::PowerDown)]
        );
        assert_eq!(db.release(PLL), Err(XpmError::Failure));
    }

    #[test]
    fn lock_timeout() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, false);
        let mut db = ClockDb::new(&pool, &io, &power);
        add_pll(&mut db);
        assert_eq!(db.request(PLL), Err(XpmError::Timeout));
        let pll = db.pll(PLL).unwrap();
        assert_eq!(pll.use_count, 0);
        assert_ne!(pll.state, PllState::Locked);
        assert_eq!(
            power.events(),
            [(FPD, PowerEvent::PowerUp), (FPD, PowerEvent::PowerDown)]
        );
    }

    #[test]
    fn resume_relocks_running_pll() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, true);
        let mut db = ClockDb::new(&pool, &io, &power);
        add_pll(&mut db);
        io.preset(STATUS, 1);
        db.request(PLL).unwrap();
        io.write32(CFG, 0x0200_0c00);
        io.write32(FRAC, 0x8000_1234);

        db.suspend_domain_plls(FPD).unwrap();
        let pll = db.pll(PLL).unwrap();
        assert_eq!(pll.state, PllState::Suspended);
        assert_eq!(pll.context.flags, ContextFlags::SAVED);
        assert_eq!(io.read32(CTRL), 0x9);

        io.preset(CFG, 0);
        io.preset(FRAC, 0);
        io.preset(CTRL, 0);
        db.resume_domain_plls(FPD).unwrap();
        let pll = db.pll(PLL).unwrap();
        assert_eq!(pll.state, PllState::Locked);
        assert!(pll.context.flags.is_empty());
        assert_eq!(io.read32(CFG), 0x0200_0c00);
        assert_eq!(io.read32(FRAC), 0x8000_1234);
        assert_eq!(io.read32(CTRL), 0);
    }

    #[test]
    fn resume_keeps_pll_in_reset() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, true);
        let mut db = ClockDb::new(&pool, &io, &power);
        add_pll(&mut db);
        io.preset(CTRL, 0x4809);
        db.pll_suspend(PLL).unwrap();
        assert_eq!(db.pll(PLL).unwrap().context.ctrl, 0x4809);
        io.preset(CTRL, 0);

        db.pll_resume(PLL).unwrap();
        assert_eq!(db.pll(PLL).unwrap().state, PllState::Reset);
        assert_eq!(io.read32(CTRL), 0x4809);
        assert_eq!(db.pll_get_mode(PLL), Ok(PllMode::Reset.into()));
        assert_eq!(db.get_state(PLL), Ok(0));
    }

    #[test]
    fn modes_and_parameters() {
        init_logger();
        let pool = AllocablePool::<1024>::new("topology");
        let io = FakeRegisters::new();
        let power = FakePower::new().with_domain(FPD, true);
        let mut db = ClockDb::new(&pool, &io, &power);
        add_pll(&mut db);
        io.preset(STATUS, 1);

        db.pll_set_mode(PLL, PllMode::Fractional.into()).unwrap();
        assert_eq!(db.pll_get_mode(PLL), Ok(PllMode::Fractional.into()));
        assert_eq!(db.pll(PLL).unwrap().mode, PllMode::Fractional);
        db.pll_set_mode(PLL, PllMode::Reset.into()).unwrap();
        assert_eq!(db.pll_get_mode(PLL), Ok(PllMode::Reset.into()));
        assert_eq!(db.pll(PLL).unwrap().mode, PllMode::Fractional);
        db.set_enabled(PLL, false).unwrap();
        assert_eq!(db.pll_get_mode(PLL), Ok(PllMode::Reset.into()));
        db.set_enabled(PLL, true).unwrap();
        assert_eq!(db.pll_get_mode(PLL), Ok(PllMode::Fractional.into()));
        assert_eq!(db.pll_set_mode(PLL, 3), Err(XpmError::InvalidParam));

        db.set_divider(PLL, 0x48).unwrap();
        assert_eq!(io.read32(CTRL) & 0xff00, 0x4800);
        assert_eq!(db.get_divider(PLL), Ok(0x48));
        db.pll_set_param(PLL, PllParam::Data.into(), 0x1234).unwrap();
        assert_eq!(db.pll_get_param(PLL, PllParam::Data.into()), Ok(0x1234));
        assert_eq!(io.read32(FRAC), 0x8000_1234);
        assert_eq!(
            db.pll_set_param(PLL, PllParam::Div2.into(), 4),
            Err(XpmError::InvalidParam)
        );
        assert_eq!(db.pll_get_param(PLL, 7), Err(XpmError::NoFeature));
    }
}
