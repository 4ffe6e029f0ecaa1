// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Topology and runtime command handling.
//!
//! Commands arrive as an API ID and a payload of 32-bit argument words. Topology commands build the
//! node graph at boot; the rest are EEMI calls made by subsystems at runtime. Each handler decodes
//! its words and calls into the clock, AIE or subsystem engines.

use crate::{
    aie::AieDomain,
    clock::ClockDb,
    config::{MAX_AIE_DOMAINS, MAX_MUX_PARENTS, MAX_NAME_BYTES},
    device::{CmdType, Devices},
    error::XpmError,
    mmio::{RegisterIo, bit_mask},
    node::{NodeClass, NodeId, NodeKind, PM_SUBSYS_PMC, clock_type},
    platform::PlatformType,
    power::PowerDomains,
    runtime_alloc::PoolSet,
    subsystem::{RequirementFlags, SubsystemManager},
};
use arrayvec::ArrayVec;
use log::{debug, error, warn};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Command IDs handled by [`Xpm::handle`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum PmApiId {
    /// Force a subsystem, core or power domain off.
    ForcePowerdown = 8,
    /// Enable a clock.
    ClockEnable = 36,
    /// Disable a clock.
    ClockDisable = 37,
    /// Query whether a clock is running.
    ClockGetState = 38,
    /// Set a clock divider.
    ClockSetDivider = 39,
    /// Query a clock divider.
    ClockGetDivider = 40,
    /// Record a clock rate.
    ClockSetRate = 41,
    /// Query a recorded clock rate.
    ClockGetRate = 42,
    /// Select a clock parent.
    ClockSetParent = 43,
    /// Query the selected clock parent.
    ClockGetParent = 44,
    /// Set a PLL parameter.
    PllSetParameter = 48,
    /// Query a PLL parameter.
    PllGetParameter = 49,
    /// Set a PLL mode.
    PllSetMode = 50,
    /// Query a PLL mode.
    PllGetMode = 51,
    /// Add a subsystem.
    AddSubsystem = 54,
    /// Add a clock or power node.
    AddNode = 57,
    /// Add parents to a node.
    AddNodeParent = 58,
    /// Name a node.
    AddNodeName = 59,
    /// Add a device requirement to a subsystem.
    AddRequirement = 60,
}

/// Returns the first `N` words of `payload`.
fn args<const N: usize>(payload: &[u32]) -> Result<[u32; N], XpmError> {
    payload
        .get(..N)
        .and_then(|words| words.try_into().ok())
        .ok_or_else(|| {
            warn!("Expected {N} argument words, got {}", payload.len());
            XpmError::InvalidParam
        })
}

/// The platform management node graph and its collaborators.
pub struct Xpm<'a> {
    platform: PlatformType,
    power: &'a dyn PowerDomains,
    devices: &'a dyn Devices,
    pools: PoolSet<'a>,
    clocks: ClockDb<'a>,
    subsystems: SubsystemManager<'a>,
    aie_domains: ArrayVec<&'a mut AieDomain, MAX_AIE_DOMAINS>,
}

impl<'a> Xpm<'a> {
    /// Creates an empty node graph allocating from `pools`.
    pub fn new(
        platform: PlatformType,
        pools: PoolSet<'a>,
        io: &'a dyn RegisterIo,
        power: &'a dyn PowerDomains,
        devices: &'a dyn Devices,
    ) -> Result<Self, XpmError> {
        Ok(Self {
            platform,
            power,
            devices,
            pools,
            clocks: ClockDb::new(pools.topology, io, power),
            subsystems: SubsystemManager::new(pools, devices)?,
            aie_domains: ArrayVec::new(),
        })
    }

    /// Returns the clock tree.
    pub fn clocks(&self) -> &ClockDb<'a> {
        &self.clocks
    }

    /// Returns the clock tree, mutably, for power domain sequencing.
    pub fn clocks_mut(&mut self) -> &mut ClockDb<'a> {
        &mut self.clocks
    }

    /// Returns the subsystem manager.
    pub fn subsystems(&self) -> &SubsystemManager<'a> {
        &self.subsystems
    }

    /// Returns the subsystem manager, mutably.
    pub fn subsystems_mut(&mut self) -> &mut SubsystemManager<'a> {
        &mut self.subsystems
    }

    /// Returns the AIE domain with the given ID, if it has been added.
    pub fn aie_domain(&self, id: NodeId) -> Option<&AieDomain> {
        self.aie_domains
            .iter()
            .find(|domain| domain.node.id == id)
            .map(|domain| &**domain)
    }

    /// Handles one command from `subsystem`, writing any results to `response`.
    pub fn handle(
        &mut self,
        subsystem: NodeId,
        cmd_type: CmdType,
        api_id: u32,
        payload: &[u32],
        response: &mut [u32; 3],
    ) -> Result<(), XpmError> {
        let Ok(api) = PmApiId::try_from(api_id) else {
            warn!("Unsupported API {api_id} from {subsystem}");
            return Err(XpmError::NoFeature);
        };
        self.dispatch(subsystem, cmd_type, api, payload, response)
            .inspect_err(|e| error!("{api:?} from {subsystem} failed: {e}"))
    }

    fn dispatch(
        &mut self,
        subsystem: NodeId,
        cmd_type: CmdType,
        api: PmApiId,
        payload: &[u32],
        response: &mut [u32; 3],
    ) -> Result<(), XpmError> {
        match api {
            PmApiId::ForcePowerdown => {
                let [node] = args(payload)?;
                self.force_power_down(subsystem, cmd_type, NodeId(node))
            }
            PmApiId::ClockEnable => {
                let [clock] = args(payload)?;
                self.clocks.set_enabled(NodeId(clock), true)
            }
            PmApiId::ClockDisable => {
                let [clock] = args(payload)?;
                let clock = self.writable_clock(subsystem, clock)?;
                self.clocks.set_enabled(clock, false)
            }
            PmApiId::ClockGetState => {
                let [clock] = args(payload)?;
                response[0] = self.clocks.get_state(NodeId(clock))?;
                Ok(())
            }
            PmApiId::ClockSetDivider => {
                let [clock, divider] = args(payload)?;
                let clock = self.writable_clock(subsystem, clock)?;
                self.clocks.set_divider(clock, divider)
            }
            PmApiId::ClockGetDivider => {
                let [clock] = args(payload)?;
                response[0] = self.clocks.get_divider(NodeId(clock))?;
                Ok(())
            }
            PmApiId::ClockSetRate => {
                let [clock, rate] = args(payload)?;
                let clock = self.writable_clock(subsystem, clock)?;
                self.clocks.set_rate(clock, rate)
            }
            PmApiId::ClockGetRate => {
                let [clock] = args(payload)?;
                response[0] = self.clocks.get_rate(NodeId(clock))?;
                Ok(())
            }
            PmApiId::ClockSetParent => {
                let [clock, mux_index] = args(payload)?;
                let clock = self.writable_clock(subsystem, clock)?;
                self.clocks.set_parent(clock, mux_index)
            }
            PmApiId::ClockGetParent => {
                let [clock] = args(payload)?;
                response[0] = self.clocks.get_parent(NodeId(clock))?;
                Ok(())
            }
            PmApiId::PllSetParameter => {
                let [pll, param, value] = args(payload)?;
                let pll = self.writable_clock(subsystem, pll)?;
                self.clocks.pll_set_param(pll, param, value)
            }
            PmApiId::PllGetParameter => {
                let [pll, param] = args(payload)?;
                response[0] = self.clocks.pll_get_param(NodeId(pll), param)?;
                Ok(())
            }
            PmApiId::PllSetMode => {
                let [pll, mode] = args(payload)?;
                let pll = self.writable_clock(subsystem, pll)?;
                self.clocks.pll_set_mode(pll, mode)
            }
            PmApiId::PllGetMode => {
                let [pll] = args(payload)?;
                response[0] = self.clocks.pll_get_mode(NodeId(pll))?;
                Ok(())
            }
            PmApiId::AddSubsystem => {
                let [id] = args(payload)?;
                self.subsystems.add(NodeId(id))
            }
            PmApiId::AddNode => self.add_node(payload),
            PmApiId::AddNodeParent => self.add_node_parent(payload),
            PmApiId::AddNodeName => self.add_node_name(payload),
            PmApiId::AddRequirement => {
                let [id, device, flags, caps, qos] = args(payload)?;
                self.subsystems.add_requirement(
                    NodeId(id),
                    NodeId(device),
                    RequirementFlags::from_bits_retain(flags),
                    caps,
                    qos,
                )
            }
        }
    }

    /// Returns the clock ID if `subsystem` may reconfigure it.
    fn writable_clock(&self, subsystem: NodeId, clock: u32) -> Result<NodeId, XpmError> {
        let clock = NodeId(clock);
        if subsystem != PM_SUBSYS_PMC && self.clocks.is_read_only(clock)? {
            warn!("Clock {clock} is read only for {subsystem}");
            return Err(XpmError::NoAccess);
        }
        Ok(clock)
    }

    fn force_power_down(
        &mut self,
        subsystem: NodeId,
        cmd_type: CmdType,
        node: NodeId,
    ) -> Result<(), XpmError> {
        self.subsystems
            .is_force_power_down_allowed(subsystem, node, cmd_type)?;
        match node.kind() {
            NodeKind::Core => self.devices.force_power_down(node),
            NodeKind::PowerIsland | NodeKind::PowerDomain | NodeKind::AieDomain => {
                self.clocks.suspend_domain_plls(node)?;
                self.power.force_power_down(node)
            }
            NodeKind::Subsystem => self.subsystems.force_power_down(node),
            _ => Err(XpmError::InvalidNode),
        }
    }

    fn add_node(&mut self, payload: &[u32]) -> Result<(), XpmError> {
        let [id] = args(payload)?;
        match NodeId(id).class() {
            Some(NodeClass::Clock) => self.add_clock_node(payload),
            Some(NodeClass::Power) => self.add_power_node(payload),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn add_clock_node(&mut self, payload: &[u32]) -> Result<(), XpmError> {
        let id = NodeId(args::<1>(payload)?[0]);
        if id.node_type() == clock_type::SUBNODE {
            let [_, node_type, control_reg, params, flags] = args(payload)?;
            let node_type = u8::try_from(node_type).map_err(|_| XpmError::InvalidParam)?;
            return self.clocks.add_sub_node(
                id,
                node_type,
                control_reg,
                params as u8,
                (params >> 8) as u8,
                flags,
            );
        }

        let [_, control_reg, packed, power_domain] = args(payload)?;
        let [topology, num_custom_nodes, num_parents, flags] = packed.to_le_bytes();
        let power_domain = NodeId(power_domain);
        match id.kind() {
            NodeKind::PllClock => {
                let [.., offsets, frac_offset] = args::<6>(payload)?;
                let offsets = [offsets as u16, (offsets >> 16) as u16, frac_offset as u16];
                self.clocks
                    .pll_add_node(id, control_reg, topology, offsets, power_domain, flags)
            }
            NodeKind::OutClock | NodeKind::RefClock => self.clocks.add_node(
                id,
                control_reg,
                topology,
                num_custom_nodes,
                num_parents,
                power_domain,
                flags,
            ),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn add_power_node(&mut self, payload: &[u32]) -> Result<(), XpmError> {
        let [id, bits, parent] = args(payload)?;
        let id = NodeId(id);
        let shift = bits & 0xff;
        let width = (bits >> 8) as u8;
        let bit_mask = bit_mask(width).checked_shl(shift).unwrap_or(0);

        let parent = match NodeId(parent) {
            NodeId(0) => None,
            parent if !parent.is_power() => {
                warn!("Power node {id} can't have {parent} as a parent");
                return Err(XpmError::InvalidParam);
            }
            parent if !self.power.exists(parent) => return Err(XpmError::DeviceNotFound),
            parent => Some(parent),
        };

        match id.kind() {
            NodeKind::AieDomain => {
                if self.aie_domains.is_full() {
                    return Err(XpmError::BufferTooSmall);
                }
                let pool = self.pools.topology;
                let domain = AieDomain::init(
                    pool,
                    self.power,
                    self.platform,
                    id,
                    bit_mask,
                    parent,
                    &payload[3..],
                )?;
                self.aie_domains.push(domain);
                Ok(())
            }
            NodeKind::PowerIsland | NodeKind::PowerDomain => {
                self.power.init_domain(id, bit_mask, parent)?;
                debug!("Added power node {id}");
                Ok(())
            }
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn add_node_parent(&mut self, payload: &[u32]) -> Result<(), XpmError> {
        let [id, _] = args(payload)?;
        let id = NodeId(id);
        match id.class() {
            Some(NodeClass::Clock) => {
                let mut parents = ArrayVec::<NodeId, MAX_MUX_PARENTS>::new();
                for &parent in &payload[1..] {
                    parents
                        .try_push(NodeId(parent))
                        .map_err(|_| XpmError::InvalidParam)?;
                }
                self.clocks.add_parent(id, &parents)
            }
            // Resets and interconnects take their parents from elsewhere.
            Some(NodeClass::Reset | NodeClass::Memic | NodeClass::Stmic) => Ok(()),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn add_node_name(&mut self, payload: &[u32]) -> Result<(), XpmError> {
        let [id, _] = args(payload)?;
        let id = NodeId(id);
        let words = &payload[1..];
        if !id.is_clock() || words.len() * 4 > MAX_NAME_BYTES {
            return Err(XpmError::InvalidParam);
        }
        let mut name = [0; MAX_NAME_BYTES];
        for (bytes, word) in name.chunks_exact_mut(4).zip(words) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        self.clocks.add_clk_name(id, &name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aie::AIE_GEN_AIEML,
        clock::{
            pll::{PllMode, PllParam},
            topology::TopologyType,
        },
        node::{
            PM_POWER_ME, PM_SUBSYS_DEFAULT, clock_subclass, device_subclass, power_subclass,
            power_type,
        },
        platform::test::{FakeDevices, FakePower, FakeRegisters, TestPools, init_logger},
        subsystem::{SubsystemPermission, SubsystemState},
    };

    const PMC_DOMAIN: NodeId = NodeId::new(
        NodeClass::Power,
        power_subclass::DOMAIN,
        power_type::DOMAIN_PMC,
        1,
    );
    const LPD: NodeId = NodeId::new(
        NodeClass::Power,
        power_subclass::DOMAIN,
        power_type::DOMAIN_PS_LOW,
        4,
    );
    const REF_CLK: NodeId =
        NodeId::new(NodeClass::Clock, clock_subclass::REF, clock_type::REF, 0x6a);
    const PLL: NodeId = NodeId::new(NodeClass::Clock, clock_subclass::PLL, clock_type::PLL, 0x1);
    const UART_REF: NodeId =
        NodeId::new(NodeClass::Clock, clock_subclass::OUT, clock_type::OUT, 0x2f);
    const UART_REF_SUBNODE: NodeId =
        NodeId::new(NodeClass::Clock, clock_subclass::OUT, clock_type::SUBNODE, 0x2f);
    const APU: NodeId = NodeId::new(NodeClass::Subsystem, 0, 0, 2);
    const RPU: NodeId = NodeId::new(NodeClass::Subsystem, 0, 0, 3);
    const ACPU_0: NodeId = NodeId::new(NodeClass::Device, device_subclass::CORE, 1, 3);
    const UART_0: NodeId = NodeId::new(NodeClass::Device, device_subclass::PERIPH, 6, 0x21);
    const UART_CTRL: u32 = 0xff5e_0134;
    const PLL_CTRL: u32 = 0xff5e_0040;

    struct Fixture {
        pools: TestPools<4096>,
        io: FakeRegisters,
        power: FakePower,
        devices: FakeDevices,
    }

    impl Fixture {
        fn new() -> Self {
            init_logger();
            Self {
                pools: TestPools::new(),
                io: FakeRegisters::new(),
                power: FakePower::new(),
                devices: FakeDevices::new()
                    .with_device(UART_0)
                    .with_core(ACPU_0, APU),
            }
        }

        fn xpm(&self, platform: PlatformType) -> Xpm<'_> {
            Xpm::new(
                platform,
                self.pools.pool_set(),
                &self.io,
                &self.power,
                &self.devices,
            )
            .unwrap()
        }
    }

    fn call(xpm: &mut Xpm, api: PmApiId, payload: &[u32]) -> Result<u32, XpmError> {
        call_from(xpm, PM_SUBSYS_PMC, api, payload)
    }

    fn call_from(
        xpm: &mut Xpm,
        subsystem: NodeId,
        api: PmApiId,
        payload: &[u32],
    ) -> Result<u32, XpmError> {
        let mut response = [0; 3];
        xpm.handle(subsystem, CmdType::Secure, api.into(), payload, &mut response)?;
        Ok(response[0])
    }

    fn name_word(bytes: &[u8; 4]) -> u32 {
        u32::from_le_bytes(*bytes)
    }

    /// Adds the LPD, a reference clock and a read only mux/divider output clock fed by it.
    fn build_uart_ref(xpm: &mut Xpm, power: &FakePower, flags: u32) {
        call(xpm, PmApiId::AddNode, &[LPD.0, 0x0104, 0]).unwrap();
        power.set_on(LPD, true);
        call(xpm, PmApiId::AddNode, &[REF_CLK.0, 0, 0, 0]).unwrap();
        let packed = u32::from(u8::from(TopologyType::GenericMuxDiv)) | (2 << 16) | (flags << 24);
        call(xpm, PmApiId::AddNode, &[UART_REF.0, UART_CTRL, packed, LPD.0]).unwrap();
        call(xpm, PmApiId::AddNodeParent, &[UART_REF.0, REF_CLK.0, 0]).unwrap();
    }

    #[test]
    fn unknown_and_short_commands() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        let mut response = [0; 3];
        assert_eq!(
            xpm.handle(PM_SUBSYS_PMC, CmdType::Secure, 999, &[], &mut response),
            Err(XpmError::NoFeature)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::ClockSetDivider, &[UART_REF.0]),
            Err(XpmError::InvalidParam)
        );
        assert_eq!(call(&mut xpm, PmApiId::AddNode, &[]), Err(XpmError::InvalidParam));
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[UART_0.0, 0, 0, 0]),
            Err(XpmError::InvalidParam)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::ClockGetState, &[UART_REF.0]),
            Err(XpmError::DeviceNotFound)
        );
    }

    #[test]
    fn clock_topology_and_runtime() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        build_uart_ref(&mut xpm, &fixture.power, 0);
        assert_eq!(fixture.power.inits(), [(LPD, 0x10, None)]);

        let name = [name_word(b"uart"), name_word(b"_ref")];
        call(&mut xpm, PmApiId::AddNodeName, &[UART_REF.0, name[0], name[1]]).unwrap();
        assert_eq!(&xpm.clocks().query_name(UART_REF).unwrap()[..9], b"uart_ref\0");
        assert_eq!(
            call(&mut xpm, PmApiId::AddNodeName, &[UART_REF.0, 1, 2, 3, 4, 5]),
            Err(XpmError::InvalidParam)
        );

        call(&mut xpm, PmApiId::ClockSetDivider, &[UART_REF.0, 5]).unwrap();
        assert_eq!(fixture.io.read32(UART_CTRL), 5 << 8);
        assert_eq!(call(&mut xpm, PmApiId::ClockGetDivider, &[UART_REF.0]), Ok(5));
        call(&mut xpm, PmApiId::ClockSetParent, &[UART_REF.0, 1]).unwrap();
        assert_eq!(call(&mut xpm, PmApiId::ClockGetParent, &[UART_REF.0]), Ok(1));
        assert_eq!(fixture.io.read32(UART_CTRL), (5 << 8) | 1);
        assert_eq!(
            call(&mut xpm, PmApiId::ClockSetParent, &[UART_REF.0, 2]),
            Err(XpmError::InvalidParam)
        );

        call(&mut xpm, PmApiId::ClockSetRate, &[UART_REF.0, 100_000_000]).unwrap();
        assert_eq!(call(&mut xpm, PmApiId::ClockGetRate, &[UART_REF.0]), Ok(100_000_000));
        assert_eq!(call(&mut xpm, PmApiId::ClockGetState, &[REF_CLK.0]), Ok(1));

        fixture.power.set_on(LPD, false);
        assert_eq!(
            call(&mut xpm, PmApiId::ClockGetDivider, &[UART_REF.0]),
            Err(XpmError::NoAccess)
        );
    }

    #[test]
    fn custom_topology_sub_nodes() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104, 0]).unwrap();
        fixture.power.set_on(LPD, true);
        let packed = u32::from(u8::from(TopologyType::Custom)) | (1 << 8) | (1 << 16);
        call(&mut xpm, PmApiId::AddNode, &[UART_REF.0, UART_CTRL, packed, LPD.0]).unwrap();

        // A divider in bits 23:16.
        let sub_node = [UART_REF_SUBNODE.0, 4, UART_CTRL, 0x0610, 0];
        call(&mut xpm, PmApiId::AddNode, &sub_node).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &sub_node).map_err(|e| e.status()),
            Err(crate::error::XST_FAILURE)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[UART_REF_SUBNODE.0, 0x104, UART_CTRL, 0, 0]),
            Err(XpmError::InvalidParam)
        );

        call(&mut xpm, PmApiId::ClockSetDivider, &[UART_REF.0, 9]).unwrap();
        assert_eq!(fixture.io.read32(UART_CTRL), 9 << 16);
    }

    #[test]
    fn read_only_clocks() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        build_uart_ref(&mut xpm, &fixture.power, 1);
        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ClockSetDivider, &[UART_REF.0, 5]),
            Err(XpmError::NoAccess)
        );
        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ClockSetParent, &[UART_REF.0, 1]),
            Err(XpmError::NoAccess)
        );
        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ClockGetParent, &[UART_REF.0]),
            Ok(0)
        );
        call(&mut xpm, PmApiId::ClockSetDivider, &[UART_REF.0, 5]).unwrap();
        assert_eq!(fixture.io.read32(UART_CTRL), 5 << 8);
    }

    #[test]
    fn pll_commands() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104, 0]).unwrap();
        call(&mut xpm, PmApiId::AddNode, &[REF_CLK.0, 0, 0, 0]).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[PLL.0, PLL_CTRL, 0, LPD.0]),
            Err(XpmError::InvalidParam)
        );
        let pll = [PLL.0, PLL_CTRL, 0, LPD.0, 0x0008_0004, 0x000c];
        call(&mut xpm, PmApiId::AddNode, &pll).unwrap();
        call(&mut xpm, PmApiId::AddNodeParent, &[PLL.0, REF_CLK.0]).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::AddNodeParent, &[PLL.0, REF_CLK.0]),
            Err(XpmError::InvalidParam)
        );
        let registered = xpm.clocks().pll(PLL).unwrap();
        assert_eq!(
            (registered.status_reg, registered.config_reg, registered.frac_config_reg),
            (PLL_CTRL + 4, PLL_CTRL + 8, PLL_CTRL + 0xc)
        );
        assert_eq!(registered.parent, Some(REF_CLK));

        let fbdiv = u32::from(PllParam::Fbdiv);
        call(&mut xpm, PmApiId::PllSetParameter, &[PLL.0, fbdiv, 0x48]).unwrap();
        assert_eq!(call(&mut xpm, PmApiId::PllGetParameter, &[PLL.0, fbdiv]), Ok(0x48));
        assert_eq!(
            call(&mut xpm, PmApiId::PllGetParameter, &[PLL.0, 7]),
            Err(XpmError::NoFeature)
        );

        call(&mut xpm, PmApiId::PllSetMode, &[PLL.0, PllMode::Reset.into()]).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::PllGetMode, &[PLL.0]),
            Ok(u32::from(PllMode::Reset))
        );
        assert_eq!(
            call(&mut xpm, PmApiId::PllSetMode, &[PLL.0, 3]),
            Err(XpmError::InvalidParam)
        );
    }

    #[test]
    fn power_node_parents() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104, UART_0.0]),
            Err(XpmError::InvalidParam)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104, PMC_DOMAIN.0]),
            Err(XpmError::DeviceNotFound)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104]),
            Err(XpmError::InvalidParam)
        );
        call(&mut xpm, PmApiId::AddNode, &[PMC_DOMAIN.0, 0x0101, 0]).unwrap();
        call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0204, PMC_DOMAIN.0]).unwrap();
        assert_eq!(
            fixture.power.inits(),
            [(PMC_DOMAIN, 0x2, None), (LPD, 0x30, Some(PMC_DOMAIN))]
        );
    }

    #[test]
    fn aie_domain() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        call(&mut xpm, PmApiId::AddNode, &[PMC_DOMAIN.0, 0x0101, 0]).unwrap();
        let payload = [PM_POWER_ME.0, 0x0102, PMC_DOMAIN.0, 2, 0x0009_0026, 0x0001_0408];
        call(&mut xpm, PmApiId::AddNode, &payload).unwrap();

        let domain = xpm.aie_domain(PM_POWER_ME).unwrap();
        assert_eq!(domain.array.gen_version, AIE_GEN_AIEML);
        assert_eq!(domain.parent, Some(PMC_DOMAIN));
        assert_eq!(domain.bit_mask, 0x4);
        assert_eq!(fixture.power.inits()[1], (PM_POWER_ME, 0x4, Some(PMC_DOMAIN)));
        assert_eq!(
            call(&mut xpm, PmApiId::AddNode, &payload[..4]),
            Err(XpmError::InvalidParam)
        );
    }

    #[test]
    fn subsystems_and_requirements() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        call(&mut xpm, PmApiId::AddSubsystem, &[APU.0]).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::AddSubsystem, &[APU.0]),
            Err(XpmError::DeviceBusy)
        );
        let prealloc = RequirementFlags::PREALLOC.bits();
        call(&mut xpm, PmApiId::AddRequirement, &[APU.0, UART_0.0, prealloc, 3, 100]).unwrap();
        assert_eq!(
            call(&mut xpm, PmApiId::AddRequirement, &[APU.0, ACPU_0.0 + 1, 0, 0, 0]),
            Err(XpmError::DeviceNotFound)
        );
        assert_eq!(
            call(&mut xpm, PmApiId::AddRequirement, &[RPU.0, UART_0.0, 0, 0, 0]),
            Err(XpmError::InvalidParam)
        );

        xpm.subsystems_mut().activate(APU).unwrap();
        let requests = fixture.devices.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            (requests[0].device, requests[0].capabilities, requests[0].qos),
            (UART_0, 3, 100)
        );
        assert_eq!(
            xpm.subsystems().get_status(APU),
            Ok(SubsystemState::Online)
        );
    }

    #[test]
    fn force_power_down() {
        let fixture = Fixture::new();
        let mut xpm = fixture.xpm(PlatformType::Silicon);
        call(&mut xpm, PmApiId::AddNode, &[LPD.0, 0x0104, 0]).unwrap();
        for subsystem in [PM_SUBSYS_DEFAULT, APU, RPU] {
            call(&mut xpm, PmApiId::AddSubsystem, &[subsystem.0]).unwrap();
        }
        xpm.subsystems_mut()
            .add_permissions(APU, RPU, SubsystemPermission::POWER_DOWN, true)
            .unwrap();
        xpm.subsystems_mut().set_state(RPU, SubsystemState::Online.into()).unwrap();

        assert_eq!(
            call_from(&mut xpm, RPU, PmApiId::ForcePowerdown, &[APU.0]),
            Err(XpmError::NoAccess)
        );
        assert_eq!(
            call_from(&mut xpm, RPU, PmApiId::ForcePowerdown, &[ACPU_0.0]),
            Err(XpmError::NoAccess)
        );
        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ForcePowerdown, &[APU.0]),
            Err(XpmError::InvalidParam)
        );
        call_from(&mut xpm, APU, PmApiId::ForcePowerdown, &[RPU.0]).unwrap();
        assert_eq!(
            xpm.subsystems().get_status(RPU),
            Ok(SubsystemState::PoweredOff)
        );

        call_from(&mut xpm, APU, PmApiId::ForcePowerdown, &[ACPU_0.0]).unwrap();
        assert_eq!(fixture.devices.forced(), [ACPU_0]);

        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ForcePowerdown, &[LPD.0]),
            Err(XpmError::NoAccess)
        );
        call_from(&mut xpm, PM_SUBSYS_DEFAULT, PmApiId::ForcePowerdown, &[LPD.0]).unwrap();
        assert_eq!(fixture.power.forced(), [LPD]);

        let mut response = [0; 3];
        assert_eq!(
            xpm.handle(
                APU,
                CmdType::NonSecure,
                PmApiId::ForcePowerdown.into(),
                &[RPU.0],
                &mut response
            ),
            Err(XpmError::NoAccess)
        );
        assert_eq!(
            call_from(&mut xpm, APU, PmApiId::ForcePowerdown, &[UART_0.0]),
            Err(XpmError::InvalidNode)
        );
    }
}
