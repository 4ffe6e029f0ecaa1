// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Node identifiers and the header shared by every node in the graph.

use core::fmt::{self, Debug, Display, Formatter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

const CLASS_SHIFT: u32 = 26;
const SUBCLASS_SHIFT: u32 = 20;
const TYPE_SHIFT: u32 = 14;
const FIELD_MASK: u32 = 0x3f;
const INDEX_MASK: u32 = 0x3fff;

/// Top level class of a node, bits 31:26 of its ID.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum NodeClass {
    /// Power islands and domains.
    Power = 1,
    /// Reference, output and PLL clocks.
    Clock = 2,
    /// Reset lines.
    Reset = 3,
    /// Memory interconnect.
    Memic = 4,
    /// Stream interconnect.
    Stmic = 5,
    /// Devices, including processor cores.
    Device = 6,
    /// Subsystems.
    Subsystem = 7,
    /// Protection units.
    Protection = 8,
    /// Events.
    Event = 9,
    /// Monitors.
    Monitor = 10,
    /// Board level regulator nodes.
    Regnode = 11,
    /// Isolation controls.
    Isolation = 12,
}

/// Subclass values of the clock class.
pub mod clock_subclass {
    /// A PLL.
    pub const PLL: u8 = 1;
    /// An output clock with a mux/divider/gate topology.
    pub const OUT: u8 = 2;
    /// A reference clock entering the device.
    pub const REF: u8 = 3;
}

/// Type values of the clock class.
pub mod clock_type {
    /// A PLL.
    pub const PLL: u8 = 1;
    /// An output clock.
    pub const OUT: u8 = 2;
    /// A reference clock.
    pub const REF: u8 = 3;
    /// A sub-node of a custom output clock topology.
    pub const SUBNODE: u8 = 4;
}

/// Subclass values of the power class.
pub mod power_subclass {
    /// A power island.
    pub const ISLAND: u8 = 1;
    /// A power domain.
    pub const DOMAIN: u8 = 2;
}

/// Type values of the power class.
pub mod power_type {
    /// A power island.
    pub const ISLAND: u8 = 1;
    /// The PMC domain.
    pub const DOMAIN_PMC: u8 = 2;
    /// The PS full power domain.
    pub const DOMAIN_PS_FULL: u8 = 3;
    /// The PS low power domain.
    pub const DOMAIN_PS_LOW: u8 = 4;
    /// The NoC domain.
    pub const DOMAIN_NOC: u8 = 5;
    /// The CPM domain.
    pub const DOMAIN_CPM: u8 = 6;
    /// An AI Engine domain.
    pub const DOMAIN_ME: u8 = 7;
    /// The PL domain.
    pub const DOMAIN_PL: u8 = 8;
}

/// Subclass values of the device class.
pub mod device_subclass {
    /// A processor core.
    pub const CORE: u8 = 1;
    /// A peripheral.
    pub const PERIPH: u8 = 2;
}

/// What kind of node an ID refers to.
///
/// Every dispatch in the crate matches on this rather than on raw ID bitfields.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// A PLL clock.
    PllClock,
    /// An output clock.
    OutClock,
    /// A reference clock.
    RefClock,
    /// A sub-node of a custom clock topology.
    ClockSubnode,
    /// A power island.
    PowerIsland,
    /// A power domain other than an AI Engine one.
    PowerDomain,
    /// An AI Engine power domain.
    AieDomain,
    /// A processor core device.
    Core,
    /// Any other device.
    Device,
    /// A subsystem.
    Subsystem,
    /// Anything else, including IDs with an unknown class.
    Other,
}

/// A 32-bit node identifier.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Creates a new `NodeId` from its components.
    pub const fn new(class: NodeClass, subclass: u8, node_type: u8, index: u16) -> Self {
        Self(
            ((class as u32 & FIELD_MASK) << CLASS_SHIFT)
                | ((subclass as u32 & FIELD_MASK) << SUBCLASS_SHIFT)
                | ((node_type as u32 & FIELD_MASK) << TYPE_SHIFT)
                | (index as u32 & INDEX_MASK),
        )
    }

    /// Returns the raw class field, which may not be a known [`NodeClass`].
    pub const fn raw_class(self) -> u8 {
        ((self.0 >> CLASS_SHIFT) & FIELD_MASK) as u8
    }

    /// Returns the class of the node, if it is a known one.
    pub fn class(self) -> Option<NodeClass> {
        NodeClass::try_from(self.raw_class()).ok()
    }

    /// Returns the subclass field.
    pub const fn subclass(self) -> u8 {
        ((self.0 >> SUBCLASS_SHIFT) & FIELD_MASK) as u8
    }

    /// Returns the type field.
    pub const fn node_type(self) -> u8 {
        ((self.0 >> TYPE_SHIFT) & FIELD_MASK) as u8
    }

    /// Returns the index field, used to key per-class node tables.
    pub const fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    /// Classifies the node.
    pub fn kind(self) -> NodeKind {
        match self.class() {
            Some(NodeClass::Clock) => {
                if self.node_type() == clock_type::SUBNODE {
                    return NodeKind::ClockSubnode;
                }
                match self.subclass() {
                    clock_subclass::PLL => NodeKind::PllClock,
                    clock_subclass::OUT => NodeKind::OutClock,
                    clock_subclass::REF => NodeKind::RefClock,
                    _ => NodeKind::Other,
                }
            }
            Some(NodeClass::Power) => match self.subclass() {
                power_subclass::ISLAND => NodeKind::PowerIsland,
                power_subclass::DOMAIN if self.node_type() == power_type::DOMAIN_ME => {
                    NodeKind::AieDomain
                }
                power_subclass::DOMAIN => NodeKind::PowerDomain,
                _ => NodeKind::Other,
            },
            Some(NodeClass::Device) if self.subclass() == device_subclass::CORE => NodeKind::Core,
            Some(NodeClass::Device) => NodeKind::Device,
            Some(NodeClass::Subsystem) => NodeKind::Subsystem,
            _ => NodeKind::Other,
        }
    }

    /// Returns whether this is any kind of clock which can be a parent: reference, output or PLL.
    pub fn is_clock(self) -> bool {
        matches!(
            self.kind(),
            NodeKind::PllClock | NodeKind::OutClock | NodeKind::RefClock
        )
    }

    /// Returns whether this is a power island or domain of any sort.
    pub fn is_power(self) -> bool {
        matches!(
            self.kind(),
            NodeKind::PowerIsland | NodeKind::PowerDomain | NodeKind::AieDomain
        )
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x} ({:?})", self.0, self.kind())
    }
}

/// The default subsystem, which owns everything not assigned elsewhere.
pub const PM_SUBSYS_DEFAULT: NodeId = NodeId::new(NodeClass::Subsystem, 0, 0, 0);
/// The PMC subsystem.
pub const PM_SUBSYS_PMC: NodeId = NodeId::new(NodeClass::Subsystem, 0, 0, 1);
/// Placeholder parent of EMIO/MIO sourced clocks.
pub const CLK_DUMMY_PARENT: NodeId = NodeId(0);
/// The AI Engine power domain.
pub const PM_POWER_ME: NodeId = NodeId::new(
    NodeClass::Power,
    power_subclass::DOMAIN,
    power_type::DOMAIN_ME,
    0x8,
);
/// The AIE2PS power domain.
pub const PM_POWER_ME2: NodeId = NodeId::new(
    NodeClass::Power,
    power_subclass::DOMAIN,
    power_type::DOMAIN_ME,
    0xe,
);

/// Power state of a node, as kept in [`Node::state`].
pub mod state {
    /// Powered down.
    pub const OFF: u8 = 0;
    /// Powered up.
    pub const ON: u8 = 1;
}

/// Header common to every node in the graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// The node's ID.
    pub id: NodeId,
    /// Node specific state.
    pub state: u8,
    /// Base address of the node's control registers, or 0.
    pub base_address: u32,
}

impl Node {
    /// Creates a new node header.
    pub const fn new(id: NodeId, state: u8, base_address: u32) -> Self {
        Self {
            id,
            state,
            base_address,
        }
    }
}
