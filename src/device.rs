// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Interface to the device model.
//!
//! Devices, including processor cores, are owned by the platform's device management code. The
//! subsystem manager requests and releases them on behalf of subsystems.

use crate::{error::XpmError, node::NodeId};

/// Whether a command arrived over a secure or non-secure channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CmdType {
    /// The command came from a secure master, or from the PLM itself.
    Secure,
    /// The command came from a non-secure master.
    NonSecure,
}

/// Lookup and control of devices.
pub trait Devices {
    /// Returns whether a device with the given ID has been registered.
    fn exists(&self, id: NodeId) -> bool;

    /// Requests `device` for `subsystem` with the given capabilities and QoS.
    fn request(
        &self,
        subsystem: NodeId,
        device: NodeId,
        capabilities: u32,
        qos: u32,
        cmd_type: CmdType,
    ) -> Result<(), XpmError>;

    /// Releases `device` on behalf of `subsystem`.
    fn release(&self, subsystem: NodeId, device: NodeId, cmd_type: CmdType)
    -> Result<(), XpmError>;

    /// Returns the subsystem which owns the given processor core, if any.
    fn subsystem_of_core(&self, core: NodeId) -> Option<NodeId>;

    /// Forces the given processor core off.
    fn force_power_down(&self, core: NodeId) -> Result<(), XpmError>;
}
