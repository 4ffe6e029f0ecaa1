// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Interface to the power domain model.
//!
//! Power islands and domains are owned by the platform's power sequencing code. The node graph
//! only needs to look them up, send them use events and register new domains with them.

use crate::{error::XpmError, node::NodeId};

/// An event sent to a power domain by one of its users.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerEvent {
    /// A user of the domain needs it powered.
    PowerUp,
    /// A user of the domain no longer needs it.
    PowerDown,
}

/// Lookup and control of power islands and domains.
pub trait PowerDomains {
    /// Returns whether a power node with the given ID has been registered.
    fn exists(&self, id: NodeId) -> bool;

    /// Returns whether the given power node is currently powered.
    ///
    /// Unknown nodes are reported as off.
    fn is_on(&self, id: NodeId) -> bool;

    /// Sends a use event to the given power node.
    fn handle_event(&self, id: NodeId, event: PowerEvent) -> Result<(), XpmError>;

    /// Performs the generic initialisation of a power domain, registering it under `id`.
    ///
    /// `bit_mask` selects the domain's bits in the power control registers.
    fn init_domain(
        &self,
        id: NodeId,
        bit_mask: u32,
        parent: Option<NodeId>,
    ) -> Result<(), XpmError>;

    /// Forces the given power node off, regardless of its users.
    fn force_power_down(&self, id: NodeId) -> Result<(), XpmError>;
}
