// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Mux, divider and gate descriptions of output clocks.
//!
//! Most output clocks have one of five common shapes. Those shapes are described once, by
//! immutable node arrays with no register address: the address used for each access is the base
//! address of the clock being accessed. Clocks with any other shape carry a private array of
//! nodes, each with its own register.

use crate::{
    config::MAX_MUX_PARENTS,
    error::XpmError,
    node::{CLK_DUMMY_PARENT, NodeId},
};
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Shape of a clock's control path, as given in the topology description.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TopologyType {
    /// A generic PLL.
    GenericPll = 0,
    /// A NoC PLL.
    NocPll = 1,
    /// A mux followed by a divider.
    GenericMuxDiv = 2,
    /// A mux followed by a gate.
    GenericMuxGate = 3,
    /// A divider followed by a gate.
    GenericDivGate = 4,
    /// A mux, a divider and a gate at bit 25.
    GenericMuxDivGate1 = 5,
    /// A mux, two dividers and a gate at bit 24.
    GenericMuxDivGate2 = 6,
    /// A clock specific sequence of nodes.
    Custom = 7,
}

impl TopologyType {
    /// Returns the index into the generic topology table of this type, if it is one of the common
    /// output clock shapes.
    pub fn generic_index(self) -> Option<usize> {
        match self {
            Self::GenericMuxDiv => Some(0),
            Self::GenericMuxGate => Some(1),
            Self::GenericDivGate => Some(2),
            Self::GenericMuxDivGate1 => Some(3),
            Self::GenericMuxDivGate2 => Some(4),
            Self::GenericPll | Self::NocPll | Self::Custom => None,
        }
    }
}

/// Type of one node of a clock topology.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ClkNodeType {
    /// An unused slot.
    #[default]
    Invalid = 0,
    /// A parent selector.
    Mux = 1,
    /// A PLL. Never part of an output clock topology.
    Pll = 2,
    /// A fixed multiplier and divider.
    FixedFactor = 3,
    /// The first divider.
    Div1 = 4,
    /// The second divider.
    Div2 = 5,
    /// An enable bit.
    Gate = 6,
}

bitflags! {
    /// Common clock framework flags, passed through to clients in topology queries.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct ClkFlags: u16 {
        /// The rate may only be changed while gated.
        const SET_RATE_GATE = 1 << 0;
        /// The parent may only be changed while gated.
        const SET_PARENT_GATE = 1 << 1;
        /// Rate changes propagate to the parent.
        const SET_RATE_PARENT = 1 << 2;
        /// Don't gate the clock even if it is unused.
        const IGNORE_UNUSED = 1 << 3;
        /// Rate changes must not change the parent.
        const SET_RATE_NO_REPARENT = 1 << 7;
    }
}

bitflags! {
    /// Flags describing how a divider field is interpreted.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct DividerFlags: u16 {
        /// The field holds the divider itself rather than the divider minus one.
        const ONE_BASED = 1 << 0;
        /// The field holds the log2 of the divider.
        const POWER_OF_TWO = 1 << 1;
        /// A field value of 0 is allowed and means bypass.
        const ALLOW_ZERO = 1 << 2;
    }
}

/// One mux, divider, gate or fixed factor stage of a clock.
///
/// For muxes, dividers and gates `param1` is the field shift and `param2` the field width. For
/// fixed factor nodes they are the multiplier and divider.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ClkTopologyNode {
    /// What sort of stage this is.
    pub node_type: ClkNodeType,
    /// Common clock framework flags.
    pub clkflags: ClkFlags,
    /// Type specific flags.
    pub typeflags: DividerFlags,
    /// Control register, or 0 for generic nodes which use the clock's own register.
    pub reg: u32,
    /// Shift or multiplier.
    pub param1: u16,
    /// Width or divider.
    pub param2: u16,
}

impl ClkTopologyNode {
    const fn generic(node_type: ClkNodeType, shift: u16, width: u16, clkflags: ClkFlags) -> Self {
        Self {
            node_type,
            clkflags,
            typeflags: DividerFlags::empty(),
            reg: 0,
            param1: shift,
            param2: width,
        }
    }

    /// Returns the bit position of the node's field.
    pub const fn shift(&self) -> u8 {
        self.param1 as u8
    }

    /// Returns the width of the node's field.
    pub const fn width(&self) -> u8 {
        self.param2 as u8
    }

    /// Returns whether the node's field lies within a 32-bit register. Fixed factor nodes have no
    /// field.
    pub fn fits_register(&self) -> bool {
        match self.node_type {
            ClkNodeType::Mux | ClkNodeType::Div1 | ClkNodeType::Div2 | ClkNodeType::Gate => {
                self.param1 < 32 && u32::from(self.param1) + u32::from(self.param2) <= 32
            }
            ClkNodeType::Invalid | ClkNodeType::Pll | ClkNodeType::FixedFactor => true,
        }
    }

    /// Packs the node the way topology queries return it.
    pub fn query_word(&self) -> u32 {
        u32::from(u8::from(self.node_type))
            | (u32::from(self.clkflags.bits()) << 8)
            | (u32::from(self.typeflags.bits()) << 24)
    }
}

const MUX: ClkTopologyNode =
    ClkTopologyNode::generic(ClkNodeType::Mux, 0, 3, ClkFlags::SET_RATE_NO_REPARENT);
const DIV1: ClkTopologyNode = ClkTopologyNode {
    typeflags: DividerFlags::ONE_BASED.union(DividerFlags::ALLOW_ZERO),
    ..ClkTopologyNode::generic(ClkNodeType::Div1, 8, 10, ClkFlags::SET_RATE_NO_REPARENT)
};
const DIV2: ClkTopologyNode = ClkTopologyNode {
    typeflags: DividerFlags::ONE_BASED.union(DividerFlags::ALLOW_ZERO),
    ..ClkTopologyNode::generic(ClkNodeType::Div2, 16, 6, ClkFlags::SET_RATE_NO_REPARENT)
};
const GATE_25: ClkTopologyNode = ClkTopologyNode::generic(
    ClkNodeType::Gate,
    25,
    1,
    ClkFlags::SET_RATE_PARENT.union(ClkFlags::SET_RATE_GATE),
);
const GATE_24: ClkTopologyNode = ClkTopologyNode::generic(
    ClkNodeType::Gate,
    24,
    1,
    ClkFlags::SET_RATE_PARENT.union(ClkFlags::SET_RATE_GATE),
);

/// Node sequences of the generic shapes, in [`TopologyType::generic_index`] order.
static GENERIC_SHAPES: [&[ClkTopologyNode]; 5] = [
    &[MUX, DIV1],
    &[MUX, GATE_25],
    &[DIV1, GATE_25],
    &[MUX, DIV1, GATE_25],
    &[MUX, DIV1, DIV2, GATE_24],
];

/// Returns the node array shared by every clock of the given generic shape.
pub fn generic_nodes(topology_type: TopologyType) -> Option<&'static [ClkTopologyNode]> {
    topology_type
        .generic_index()
        .map(|index| GENERIC_SHAPES[index])
}

/// The nodes of a topology.
pub enum TopologyNodes<'a> {
    /// Shared generic nodes, addressed relative to the clock's own register.
    Generic(&'a [ClkTopologyNode]),
    /// Nodes private to one clock, each with its own register.
    Custom(&'a mut [ClkTopologyNode]),
}

/// The control path of one output clock.
pub struct ClkTopology<'a> {
    /// Which shape this is.
    pub id: TopologyType,
    /// Number of node slots.
    pub num_nodes: u8,
    nodes: TopologyNodes<'a>,
    /// Parents selectable by the clock's mux, in mux field order.
    pub mux_sources: MuxSources,
}

impl<'a> ClkTopology<'a> {
    /// Creates a topology with the given nodes and no mux sources.
    pub fn new(id: TopologyType, nodes: TopologyNodes<'a>) -> Self {
        let num_nodes = match &nodes {
            TopologyNodes::Generic(nodes) => nodes.len(),
            TopologyNodes::Custom(nodes) => nodes.len(),
        };
        Self {
            id,
            num_nodes: num_nodes as u8,
            nodes,
            mux_sources: MuxSources::default(),
        }
    }

    /// Returns the node slots.
    pub fn nodes(&self) -> &[ClkTopologyNode] {
        match &self.nodes {
            TopologyNodes::Generic(nodes) => nodes,
            TopologyNodes::Custom(nodes) => nodes,
        }
    }

    /// Returns the private node slots of a custom topology.
    pub fn custom_nodes_mut(&mut self) -> Option<&mut [ClkTopologyNode]> {
        match &mut self.nodes {
            TopologyNodes::Generic(_) => None,
            TopologyNodes::Custom(nodes) => Some(&mut **nodes),
        }
    }

    /// Finds the first node of the given type, returning it together with the register it
    /// controls for a clock whose own control register is at `base`.
    pub fn find(&self, node_type: ClkNodeType, base: u32) -> Option<(ClkTopologyNode, u32)> {
        let node = *self
            .nodes()
            .iter()
            .find(|node| node.node_type == node_type)?;
        let reg = match self.nodes {
            TopologyNodes::Generic(_) => base,
            TopologyNodes::Custom(_) => node.reg,
        };
        Some((node, reg))
    }

    /// Returns whether the topology has a node of the given type.
    pub fn has(&self, node_type: ClkNodeType) -> bool {
        self.nodes().iter().any(|node| node.node_type == node_type)
    }
}

/// The parents of a clock, filled in over one or more add-parent commands.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MuxSources {
    sources: [NodeId; MAX_MUX_PARENTS],
    len: u8,
}

impl MuxSources {
    /// Returns the sources added so far.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.sources[..usize::from(self.len)]
    }

    /// Returns the number of sources added so far.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns whether no sources have been added.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the source selected by mux field value `index`.
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.as_slice().get(index).copied()
    }

    /// Appends the given sources, or none of them if they don't all fit.
    pub fn extend_from_slice(&mut self, sources: &[NodeId]) -> Result<(), XpmError> {
        let start = self.len();
        let end = start + sources.len();
        if end > MAX_MUX_PARENTS {
            return Err(XpmError::InvalidParam);
        }
        self.sources[start..end].copy_from_slice(sources);
        self.len = end as u8;
        Ok(())
    }

    /// Returns whether the given source is the placeholder for an EMIO or MIO clock.
    pub fn is_dummy(source: NodeId) -> bool {
        source == CLK_DUMMY_PARENT
    }
}
