// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The clock tree.
//!
//! Reference clocks enter the device and are always on. Output clocks select one of their parents
//! through a mux, and divide and gate it, as described by their [`ClkTopology`]. PLLs are handled
//! by the [`pll`] module. All clocks share one table keyed by the index field of their ID.

pub mod pll;
pub mod topology;

use self::{
    pll::PllClockNode,
    topology::{
        ClkNodeType, ClkTopology, ClkTopologyNode, DividerFlags, MuxSources, TopologyNodes,
        TopologyType, generic_nodes,
    },
};
use crate::{
    alloc::Arena,
    config::{MAX_CLOCK_INDEX, MAX_MUX_PARENTS, MAX_NAME_BYTES, MAX_TOPOLOGY_NODES},
    error::{InternalError, XpmError},
    mmio::{RegisterIo, bit_mask, field_get},
    node::{Node, NodeId, NodeKind, clock_subclass, state},
    power::PowerDomains,
};
use bitflags::bitflags;
use log::{debug, warn};

/// Mux source query response for an EMIO/MIO placeholder parent.
pub const DUMMY_PARENT: u32 = 0xffff_fffe;
/// Mux source query response past the last parent.
pub const NA_PARENT: u32 = 0xffff_ffff;

const CLK_ATTR_VALID: u32 = 1 << 0;
const CLK_ATTR_TYPE_SHIFT: u32 = 2;
const CLK_TYPE_EXTERNAL: u32 = 1;

bitflags! {
    /// Per-clock flags from the topology description.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct ClockFlags: u8 {
        /// The clock is configured by the PLM only; clients may enable it but not change it.
        const READ_ONLY = 1 << 0;
    }
}

/// State common to every clock.
#[derive(Clone, Debug)]
pub struct ClockNode {
    /// Node header. The base address is the clock's control register.
    pub node: Node,
    /// NUL padded name, for clients which query it.
    pub name: [u8; MAX_NAME_BYTES],
    /// Power domain the clock's registers live in, if any.
    pub power_domain: Option<NodeId>,
    /// Last rate set, in Hz.
    pub rate: u32,
}

impl ClockNode {
    fn new(id: NodeId, state: u8, control_reg: u32, power_domain: Option<NodeId>) -> Self {
        Self {
            node: Node::new(id, state, control_reg),
            name: [0; MAX_NAME_BYTES],
            power_domain,
            rate: 0,
        }
    }
}

/// An output clock.
pub struct OutClockNode<'a> {
    /// Common clock state.
    pub clk: ClockNode,
    /// Number of outstanding requests.
    pub use_count: u32,
    /// Number of parents declared in the topology description.
    pub num_parents: u8,
    /// Index of the currently selected parent, if known.
    pub parent_idx: Option<u16>,
    /// Flags from the topology description.
    pub flags: ClockFlags,
    /// The mux, divider and gate stages of the clock.
    pub topology: ClkTopology<'a>,
}

/// An entry in the clock table.
pub enum ClockEntry<'a> {
    /// A reference clock.
    Ref(&'a mut ClockNode),
    /// An output clock.
    Out(&'a mut OutClockNode<'a>),
    /// A PLL.
    Pll(&'a mut PllClockNode),
}

impl ClockEntry<'_> {
    /// Returns the state common to all clocks.
    pub fn clock(&self) -> &ClockNode {
        match self {
            Self::Ref(clk) => clk,
            Self::Out(out) => &out.clk,
            Self::Pll(pll) => &pll.clk,
        }
    }

    fn clock_mut(&mut self) -> &mut ClockNode {
        match self {
            Self::Ref(clk) => clk,
            Self::Out(out) => &mut out.clk,
            Self::Pll(pll) => &mut pll.clk,
        }
    }

    /// Returns the ID of the clock.
    pub fn id(&self) -> NodeId {
        self.clock().node.id
    }
}

/// Returns the clock table index of a mux source, or `None` for the EMIO/MIO placeholder, which
/// is not a clock.
fn parent_index(parent: NodeId) -> Option<u16> {
    if MuxSources::is_dummy(parent) {
        None
    } else {
        Some(parent.index() as u16)
    }
}

/// The clock database: every clock node, and the engines which operate on them.
pub struct ClockDb<'a> {
    pool: &'a dyn Arena,
    io: &'a dyn RegisterIo,
    power: &'a dyn PowerDomains,
    clocks: [Option<ClockEntry<'a>>; MAX_CLOCK_INDEX],
}

impl<'a> ClockDb<'a> {
    /// Creates an empty clock database allocating nodes from `pool`.
    pub fn new(pool: &'a dyn Arena, io: &'a dyn RegisterIo, power: &'a dyn PowerDomains) -> Self {
        Self {
            pool,
            io,
            power,
            clocks: [const { None }; MAX_CLOCK_INDEX],
        }
    }

    /// Returns the clock with the given ID, if it has been added.
    pub fn get_by_id(&self, id: NodeId) -> Option<&ClockEntry<'a>> {
        self.clocks
            .get(id.index())
            .and_then(Option::as_ref)
            .filter(|entry| entry.id() == id)
    }

    fn entry(&self, id: NodeId) -> Result<&ClockEntry<'a>, XpmError> {
        self.get_by_id(id).ok_or(XpmError::DeviceNotFound)
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut ClockEntry<'a>, XpmError> {
        self.clocks
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .filter(|entry| entry.id() == id)
            .ok_or(XpmError::DeviceNotFound)
    }

    fn out(&self, id: NodeId) -> Result<&OutClockNode<'a>, XpmError> {
        match self.entry(id)? {
            ClockEntry::Out(out) => Ok(&**out),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn out_mut(&mut self, id: NodeId) -> Result<&mut OutClockNode<'a>, XpmError> {
        match self.entry_mut(id)? {
            ClockEntry::Out(out) => Ok(&mut **out),
            _ => Err(XpmError::InvalidParam),
        }
    }

    /// Finds an empty table slot for a new clock.
    fn free_slot(&self, id: NodeId) -> Result<usize, XpmError> {
        let index = id.index();
        match self.clocks.get(index) {
            None => {
                warn!("Clock {id} index out of range");
                Err(XpmError::InvalidParam)
            }
            Some(Some(_)) => {
                warn!("Clock {id} already exists");
                Err(XpmError::InvalidParam)
            }
            Some(None) => Ok(index),
        }
    }

    /// Looks up the power domain a new clock belongs to. An ID of 0 means none.
    fn power_domain_of_new(&self, power_domain: NodeId) -> Result<Option<NodeId>, XpmError> {
        if power_domain.0 == 0 {
            Ok(None)
        } else if power_domain.is_power() && self.power.exists(power_domain) {
            Ok(Some(power_domain))
        } else {
            warn!("Power domain {power_domain} not found");
            Err(XpmError::DeviceNotFound)
        }
    }

    /// Adds a reference or output clock.
    ///
    /// Everything is validated before anything is allocated, so a failed add leaves no trace in
    /// the table.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        id: NodeId,
        control_reg: u32,
        topology: u8,
        num_custom_nodes: u8,
        num_parents: u8,
        power_domain: NodeId,
        flags: u8,
    ) -> Result<(), XpmError> {
        let index = self.free_slot(id)?;
        let entry = match id.kind() {
            NodeKind::RefClock => {
                let clk = ClockNode::new(id, state::ON, control_reg, None);
                ClockEntry::Ref(self.pool.alloc(clk)?)
            }
            NodeKind::OutClock => {
                if usize::from(num_parents) > MAX_MUX_PARENTS {
                    return Err(XpmError::InvalidParam);
                }
                let topology_type =
                    TopologyType::try_from(topology).map_err(|_| XpmError::InvalidParam)?;
                let custom = topology_type == TopologyType::Custom;
                if custom
                    && !(1..=MAX_TOPOLOGY_NODES).contains(&usize::from(num_custom_nodes))
                {
                    return Err(XpmError::InvalidParam);
                }
                let generic = generic_nodes(topology_type);
                if !custom && generic.is_none() {
                    return Err(XpmError::InvalidParam);
                }
                let power_domain = self.power_domain_of_new(power_domain)?;

                let nodes = match generic {
                    Some(nodes) => TopologyNodes::Generic(nodes),
                    None => TopologyNodes::Custom(self.pool.alloc_slice(
                        usize::from(num_custom_nodes),
                        ClkTopologyNode::default(),
                    )?),
                };
                let out = OutClockNode {
                    clk: ClockNode::new(id, state::OFF, control_reg, power_domain),
                    use_count: 0,
                    num_parents,
                    parent_idx: None,
                    flags: ClockFlags::from_bits_retain(flags),
                    topology: ClkTopology::new(topology_type, nodes),
                };
                ClockEntry::Out(self.pool.alloc(out)?)
            }
            _ => return Err(XpmError::InvalidParam),
        };
        debug!("Added clock {id}");
        self.clocks[index] = Some(entry);
        Ok(())
    }

    /// Fills in the next free node slot of a custom output clock topology.
    ///
    /// `id` is the sub-node ID, whose index is that of the clock it belongs to. The low half of
    /// `flags` holds the common clock flags and the high half the type specific flags. Mux,
    /// divider and gate fields must lie within their 32-bit register.
    pub fn add_sub_node(
        &mut self,
        id: NodeId,
        node_type: u8,
        control_reg: u32,
        param1: u8,
        param2: u8,
        flags: u32,
    ) -> Result<(), XpmError> {
        let node_type = match ClkNodeType::try_from(node_type) {
            Ok(ClkNodeType::Invalid | ClkNodeType::Pll) | Err(_) => {
                return Err(XpmError::InvalidParam);
            }
            Ok(node_type) => node_type,
        };
        let out = match self.clocks.get_mut(id.index()).and_then(Option::as_mut) {
            Some(ClockEntry::Out(out)) => out,
            Some(_) => return Err(XpmError::InvalidParam),
            None => return Err(XpmError::DeviceNotFound),
        };
        let nodes = out
            .topology
            .custom_nodes_mut()
            .ok_or(XpmError::InvalidParam)?;
        let slot = nodes
            .iter_mut()
            .find(|node| node.node_type == ClkNodeType::Invalid)
            .ok_or(XpmError::Internal(InternalError::ClkTopologyMaxNumNodes))?;
        let node = ClkTopologyNode {
            node_type,
            clkflags: topology::ClkFlags::from_bits_retain(flags as u16),
            typeflags: DividerFlags::from_bits_retain((flags >> 16) as u16),
            reg: control_reg,
            param1: param1.into(),
            param2: param2.into(),
        };
        if !node.fits_register() {
            warn!("Clock {id} {node_type:?} field at bit {param1} width {param2} out of range");
            return Err(XpmError::InvalidParam);
        }
        *slot = node;
        Ok(())
    }

    /// Appends parents to an output clock's mux sources.
    ///
    /// A clock with more parents than fit in one command gets them over several calls. A single
    /// parent clock has it selected straight away; otherwise the selection is read from the mux
    /// when first needed.
    pub fn add_parent(&mut self, id: NodeId, parents: &[NodeId]) -> Result<(), XpmError> {
        if id.kind() == NodeKind::PllClock {
            return self.pll_add_parent(id, parents);
        }
        let out = self.out_mut(id)?;
        if out.topology.mux_sources.len() + parents.len() > usize::from(out.num_parents) {
            warn!("Clock {id} has at most {} parents", out.num_parents);
            return Err(XpmError::InvalidParam);
        }
        if let Some(parent) = parents
            .iter()
            .find(|&&parent| !(MuxSources::is_dummy(parent) || parent.is_clock()) || parent == id)
        {
            warn!("Clock {id} can't have {parent} as a parent");
            return Err(XpmError::InvalidParam);
        }
        out.topology.mux_sources.extend_from_slice(parents)?;
        if out.num_parents == 1
            && let Some(parent) = out.topology.mux_sources.get(0)
        {
            out.parent_idx = parent_index(parent);
        }
        Ok(())
    }

    /// Sets the name of a clock. Names longer than the name buffer are truncated.
    pub fn add_clk_name(&mut self, id: NodeId, name: &[u8]) -> Result<(), XpmError> {
        let clk = self.entry_mut(id)?.clock_mut();
        let len = name.len().min(MAX_NAME_BYTES);
        clk.name = [0; MAX_NAME_BYTES];
        clk.name[..len].copy_from_slice(&name[..len]);
        Ok(())
    }

    fn check_powered(&self, clk: &ClockNode) -> Result<(), XpmError> {
        match clk.power_domain {
            Some(domain) if !self.power.is_on(domain) => {
                debug!("Clock {} power domain {domain} is off", clk.node.id);
                Err(XpmError::NoAccess)
            }
            _ => Ok(()),
        }
    }

    /// Finds the stage of the given type, and the register holding its field.
    fn topology_node(
        &self,
        id: NodeId,
        node_type: ClkNodeType,
    ) -> Result<(ClkTopologyNode, u32), XpmError> {
        let out = self.out(id)?;
        out.topology
            .find(node_type, out.clk.node.base_address)
            .ok_or(XpmError::InvalidParam)
    }

    /// Reads the field of the given stage of an output clock.
    ///
    /// Fails with [`XpmError::NoAccess`] if the clock's power domain is off.
    pub fn get_clock_data(&self, id: NodeId, node_type: ClkNodeType) -> Result<u32, XpmError> {
        let (node, reg) = self.topology_node(id, node_type)?;
        self.check_powered(&self.out(id)?.clk)?;
        Ok(field_get(self.io.read32(reg), node.shift(), node.width()))
    }

    /// Writes the field of the given stage of an output clock.
    pub fn set_clock_data(
        &self,
        id: NodeId,
        node_type: ClkNodeType,
        value: u32,
    ) -> Result<(), XpmError> {
        let (node, reg) = self.topology_node(id, node_type)?;
        self.check_powered(&self.out(id)?.clk)?;
        let mask = bit_mask(node.width());
        if value > mask {
            return Err(XpmError::InvalidParam);
        }
        let shift = u32::from(node.shift());
        let (Some(field), Some(value)) = (mask.checked_shl(shift), value.checked_shl(shift)) else {
            return Err(XpmError::InvalidParam);
        };
        self.io.rmw32(reg, field, value);
        Ok(())
    }

    /// Rediscovers the selected parent of an output clock from its mux register.
    pub fn init_parent(&mut self, id: NodeId) -> Result<(), XpmError> {
        if !self.out(id)?.topology.has(ClkNodeType::Mux) {
            return Ok(());
        }
        let selected = self.get_clock_data(id, ClkNodeType::Mux)?;
        let out = self.out_mut(id)?;
        let parent = out
            .topology
            .mux_sources
            .get(selected as usize)
            .ok_or(XpmError::InvalidParam)?;
        out.parent_idx = parent_index(parent);
        Ok(())
    }

    /// Selects the parent at `mux_index` in the clock's mux sources.
    pub fn set_parent(&mut self, id: NodeId, mux_index: u32) -> Result<(), XpmError> {
        let parent = self
            .out(id)?
            .topology
            .mux_sources
            .get(mux_index as usize)
            .ok_or(XpmError::InvalidParam)?;
        self.set_clock_data(id, ClkNodeType::Mux, mux_index)?;
        self.out_mut(id)?.parent_idx = parent_index(parent);
        Ok(())
    }

    /// Returns the mux selection of an output clock.
    pub fn get_parent(&self, id: NodeId) -> Result<u32, XpmError> {
        self.get_clock_data(id, ClkNodeType::Mux)
    }

    /// Returns the ID of the currently selected parent of an output clock, if it is known and
    /// registered.
    fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>, XpmError> {
        let parent_idx = self.out(id)?.parent_idx;
        Ok(parent_idx.and_then(|index| {
            self.clocks
                .get(usize::from(index))
                .and_then(Option::as_ref)
                .map(ClockEntry::id)
        }))
    }

    /// Sets the divider of a clock. For output clocks the low half of `divider` goes to the first
    /// divider and a non-zero high half to the second; for PLLs it is the feedback divider.
    pub fn set_divider(&mut self, id: NodeId, divider: u32) -> Result<(), XpmError> {
        if divider == 0 {
            return Err(XpmError::InvalidParam);
        }
        match id.kind() {
            NodeKind::OutClock => {
                let div1 = divider & 0xffff;
                let div2 = divider >> 16;
                if div1 != 0 {
                    self.set_clock_data(id, ClkNodeType::Div1, div1)?;
                }
                if div2 != 0 {
                    self.set_clock_data(id, ClkNodeType::Div2, div2)?;
                }
                Ok(())
            }
            NodeKind::PllClock => self.pll_set_param(id, pll::PllParam::Fbdiv.into(), divider),
            _ => Err(XpmError::InvalidParam),
        }
    }

    /// Returns the divider of a clock, as [`set_divider`](Self::set_divider) takes it.
    pub fn get_divider(&self, id: NodeId) -> Result<u32, XpmError> {
        match id.kind() {
            NodeKind::OutClock => {
                let div1 = self.get_clock_data(id, ClkNodeType::Div1)?;
                let div2 = if self.out(id)?.topology.has(ClkNodeType::Div2) {
                    self.get_clock_data(id, ClkNodeType::Div2)?
                } else {
                    0
                };
                Ok(div1 | (div2 << 16))
            }
            NodeKind::PllClock => self.pll_get_param(id, pll::PllParam::Fbdiv.into()),
            _ => Err(XpmError::InvalidParam),
        }
    }

    /// Opens or closes the gate of an output clock.
    pub fn set_gate(&mut self, id: NodeId, enable: bool) -> Result<(), XpmError> {
        self.set_clock_data(id, ClkNodeType::Gate, enable.into())?;
        self.out_mut(id)?.clk.node.state = if enable { state::ON } else { state::OFF };
        Ok(())
    }

    /// Returns 1 if the clock is running, 0 otherwise.
    pub fn get_state(&self, id: NodeId) -> Result<u32, XpmError> {
        match self.entry(id)? {
            ClockEntry::Ref(_) => Ok(1),
            ClockEntry::Out(out) => {
                if out.topology.has(ClkNodeType::Gate) {
                    self.get_clock_data(id, ClkNodeType::Gate)
                } else {
                    Ok((out.use_count > 0).into())
                }
            }
            ClockEntry::Pll(pll) => Ok((pll.get_mode(self.io) != pll::PllMode::Reset).into()),
        }
    }

    /// Enables or disables a clock on behalf of a client.
    ///
    /// Output clocks have their gate set. Enabling a PLL puts it back in the last mode it was set
    /// to; PLLs are never disabled this way.
    pub fn set_enabled(&mut self, id: NodeId, enable: bool) -> Result<(), XpmError> {
        match id.kind() {
            NodeKind::PllClock if !enable => Ok(()),
            NodeKind::PllClock | NodeKind::OutClock => {
                if self.get_state(id).ok() == Some(enable.into()) {
                    return Ok(());
                }
                if id.kind() == NodeKind::PllClock {
                    let mode = self.pll(id)?.mode;
                    self.pll_set_mode(id, mode.into())
                } else {
                    self.set_gate(id, enable)
                }
            }
            _ => Err(XpmError::InvalidParam),
        }
    }

    /// Records the rate of a clock.
    pub fn set_rate(&mut self, id: NodeId, rate: u32) -> Result<(), XpmError> {
        self.entry_mut(id)?.clock_mut().rate = rate;
        Ok(())
    }

    /// Returns the last rate recorded for a clock.
    pub fn get_rate(&self, id: NodeId) -> Result<u32, XpmError> {
        Ok(self.entry(id)?.clock().rate)
    }

    /// Returns whether clients other than the PLM are barred from reconfiguring the clock.
    pub fn is_read_only(&self, id: NodeId) -> Result<bool, XpmError> {
        let flags = match self.entry(id)? {
            ClockEntry::Ref(_) => ClockFlags::empty(),
            ClockEntry::Out(out) => out.flags,
            ClockEntry::Pll(pll) => ClockFlags::from_bits_truncate(pll.flags),
        };
        Ok(flags.contains(ClockFlags::READ_ONLY))
    }

    /// Takes a reference to a clock, enabling it and its ancestors on the first one.
    pub fn request(&mut self, id: NodeId) -> Result<(), XpmError> {
        match id.kind() {
            NodeKind::RefClock => self.entry(id).map(|_| ()),
            NodeKind::PllClock => self.pll_request(id),
            NodeKind::OutClock => self.out_request(id),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn out_request(&mut self, id: NodeId) -> Result<(), XpmError> {
        let out = self.out(id)?;
        if out.use_count == 0 {
            if out.parent_idx.is_none() {
                self.init_parent(id)?;
            }
            let parent = self.parent_of(id)?;
            if let Some(parent) = parent {
                self.request(parent)?;
            }
            if self.out(id)?.topology.has(ClkNodeType::Gate)
                && let Err(e) = self.set_gate(id, true)
            {
                if let Some(parent) = parent {
                    // The gate error is the one to report.
                    let _ = self.release(parent);
                }
                return Err(e);
            }
            self.out_mut(id)?.clk.node.state = state::ON;
        }
        self.out_mut(id)?.use_count += 1;
        Ok(())
    }

    /// Drops a reference to a clock, disabling it and releasing its parent on the last one.
    pub fn release(&mut self, id: NodeId) -> Result<(), XpmError> {
        match id.kind() {
            NodeKind::RefClock => self.entry(id).map(|_| ()),
            NodeKind::PllClock => self.pll_release(id),
            NodeKind::OutClock => self.out_release(id),
            _ => Err(XpmError::InvalidParam),
        }
    }

    fn out_release(&mut self, id: NodeId) -> Result<(), XpmError> {
        let out = self.out_mut(id)?;
        if out.use_count == 0 {
            warn!("Clock {id} released more often than requested");
            return Err(XpmError::Failure);
        }
        out.use_count -= 1;
        if out.use_count > 0 {
            return Ok(());
        }
        if self.out(id)?.topology.has(ClkNodeType::Gate) {
            self.set_gate(id, false)?;
        }
        self.out_mut(id)?.clk.node.state = state::OFF;
        match self.parent_of(id)? {
            Some(parent) => self.release(parent),
            None => Ok(()),
        }
    }

    /// Returns three topology nodes of a clock starting at `start`, packed for clients. Nodes
    /// past the end read as 0.
    pub fn query_topology(&self, id: NodeId, start: u32) -> Result<[u32; 3], XpmError> {
        let mut response = [0; 3];
        match self.entry(id)? {
            ClockEntry::Out(out) => {
                let nodes = out.topology.nodes();
                for (word, node) in response.iter_mut().zip(nodes.iter().skip(start as usize)) {
                    *word = node.query_word();
                }
            }
            ClockEntry::Pll(pll) => {
                if start == 0 {
                    response[0] =
                        u32::from(u8::from(ClkNodeType::Pll)) | (u32::from(pll.flags) << 8);
                }
            }
            ClockEntry::Ref(_) => return Err(XpmError::InvalidParam),
        }
        Ok(response)
    }

    /// Returns three parents of a clock starting at `start`, as node indices for clients.
    ///
    /// The first entry past the last parent is [`NA_PARENT`], and any after that 0.
    pub fn query_mux_sources(&self, id: NodeId, start: u32) -> Result<[u32; 3], XpmError> {
        let single;
        let sources = match self.entry(id)? {
            ClockEntry::Out(out) => out.topology.mux_sources.as_slice(),
            ClockEntry::Pll(pll) => {
                single = pll.parent;
                single.as_slice()
            }
            ClockEntry::Ref(_) => return Err(XpmError::InvalidParam),
        };
        let start = start as usize;
        if start > sources.len() {
            return Err(XpmError::InvalidParam);
        }
        let mut response = [0; 3];
        for (i, word) in response.iter_mut().enumerate() {
            match sources.get(start + i) {
                Some(&source) if MuxSources::is_dummy(source) => *word = DUMMY_PARENT,
                Some(source) => *word = source.index() as u32,
                None => {
                    *word = NA_PARENT;
                    break;
                }
            }
        }
        Ok(response)
    }

    /// Returns the name of a clock.
    pub fn query_name(&self, id: NodeId) -> Result<[u8; MAX_NAME_BYTES], XpmError> {
        Ok(self.entry(id)?.clock().name)
    }

    /// Returns the attributes of the clock at the given table index. Unused slots have the valid
    /// bit clear.
    pub fn query_attributes(&self, index: u32) -> Result<u32, XpmError> {
        let slot = self
            .clocks
            .get(index as usize)
            .ok_or(XpmError::InvalidParam)?;
        let Some(entry) = slot else {
            return Ok(0);
        };
        let id = entry.id();
        let clk_type = if id.subclass() == clock_subclass::REF {
            CLK_TYPE_EXTERNAL
        } else {
            0
        };
        // The class, subclass and type fields sit where they do in the ID.
        Ok(CLK_ATTR_VALID | (clk_type << CLK_ATTR_TYPE_SHIFT) | (id.0 & !0x3fff))
    }

    /// Returns one more than the highest clock index in use.
    pub fn num_clocks(&self) -> u32 {
        self.clocks
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |index| index as u32 + 1)
    }
}
