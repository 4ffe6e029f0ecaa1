// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Subsystems, their requirements and the permissions between them.
//!
//! A subsystem is a set of processors and the devices they need. Subsystems are added at boot,
//! along with requirements listing the devices each one uses, and are never removed. Activating a
//! subsystem requests every device it pre-allocates.

use crate::{
    device::{CmdType, Devices},
    error::{InternalError, XpmError},
    list::{self, List},
    node::{NodeClass, NodeId, PM_SUBSYS_DEFAULT, PM_SUBSYS_PMC, device_subclass},
    runtime_alloc::PoolSet,
};
use bitflags::bitflags;
use log::{debug, error, info, warn};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Lifecycle state of a subsystem.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum SubsystemState {
    /// Not yet started.
    Offline = 0,
    /// Being restarted.
    Restarting = 1,
    /// Suspend requested, waiting for the cores.
    Suspending = 2,
    /// Suspended.
    Suspended = 3,
    /// Running.
    Online = 4,
    /// Powered off, may be activated again.
    PoweredOff = 5,
    /// Forced power down requested, waiting for the cores to idle.
    PendingPowerOff = 6,
    /// Restart requested.
    PendingRestart = 7,
}

impl SubsystemState {
    /// Number of states; raw states at or above this are invalid.
    pub const MAX: u32 = 8;
}

bitflags! {
    /// Subsystem flags.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct SubsystemFlags: u8 {
        /// The subsystem's software has finished initialising.
        const INIT_FINALIZED = 1 << 0;
        /// Pre-allocated devices have all been requested.
        const IS_CONFIGURED = 1 << 1;
        /// Cores can be idled before a forced power down.
        const IDLE_SUPPORTED = 1 << 2;
    }
}

bitflags! {
    /// Requirement flags, as passed in the add requirement command.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct RequirementFlags: u32 {
        /// Request the device when the subsystem is activated.
        const PREALLOC = 1 << 0;
    }
}

bitflags! {
    /// Operations one subsystem may be permitted to perform on another.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct SubsystemPermission: u32 {
        /// Wake the target up.
        const WAKE = 1 << 0;
        /// Force the target, or one of its cores, off.
        const POWER_DOWN = 1 << 1;
        /// Request that the target suspend.
        const SUSPEND = 1 << 2;
    }
}

/// A device a subsystem uses.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Requirement {
    /// The device.
    pub device: NodeId,
    /// How the device is used.
    pub flags: RequirementFlags,
    /// Capabilities to request the device with on activation.
    pub prealloc_caps: u32,
    /// QoS to request the device with on activation.
    pub prealloc_qos: u32,
    /// Whether the device is currently requested on behalf of the subsystem.
    pub allocated: bool,
}

/// Bitmasks of host subsystem indices, for secure and non-secure commands.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct HostMask {
    /// Hosts allowed to send the operation as a secure command.
    pub secure: u32,
    /// Hosts allowed to send the operation as a non-secure command.
    pub non_secure: u32,
}

impl HostMask {
    fn allows(&self, host_bit: u32, cmd_type: CmdType) -> bool {
        let mask = match cmd_type {
            CmdType::Secure => self.secure,
            CmdType::NonSecure => self.non_secure,
        };
        mask & host_bit != 0
    }
}

/// Which other subsystems may operate on a subsystem.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Permissions {
    /// Hosts which may wake the subsystem.
    pub wake: HostMask,
    /// Hosts which may force the subsystem or its cores off.
    pub power_down: HostMask,
    /// Hosts which may ask the subsystem to suspend.
    pub suspend: HostMask,
}

impl Permissions {
    fn masks_mut(&mut self, operation: SubsystemPermission) -> impl Iterator<Item = &mut HostMask> {
        [
            (SubsystemPermission::WAKE, &mut self.wake),
            (SubsystemPermission::POWER_DOWN, &mut self.power_down),
            (SubsystemPermission::SUSPEND, &mut self.suspend),
        ]
        .into_iter()
        .filter_map(move |(flag, mask)| operation.contains(flag).then_some(mask))
    }
}

/// A subsystem.
pub struct Subsystem<'a> {
    /// The subsystem's node ID.
    pub id: NodeId,
    /// Lifecycle state.
    pub state: SubsystemState,
    /// Configuration and capability flags.
    pub flags: SubsystemFlags,
    /// IPI channels the subsystem's processors send commands on.
    pub ipi_mask: u32,
    /// Operations on the subsystem.
    pub ops: &'static dyn SubsystemOps,
    /// Devices the subsystem uses, or `None` if the list couldn't be allocated.
    pub requirements: Option<&'a mut List<'a, Requirement>>,
    /// Which other subsystems may operate on this one.
    pub permissions: Permissions,
}

impl<'a> Subsystem<'a> {
    fn requirements_mut(&mut self) -> impl Iterator<Item = &mut Requirement> {
        if self.requirements.is_none() {
            warn!("Subsystem {} has no requirement list", self.id);
        }
        self.requirements
            .as_deref_mut()
            .into_iter()
            .flat_map(List::iter_mut)
    }

    /// Returns the subsystem's requirements, most recently added first.
    pub fn requirements(&self) -> list::Iter<'_, 'a, Requirement> {
        list::iter_or_warn(self.requirements.as_deref())
    }
}

/// The operations of a subsystem.
pub trait SubsystemOps: Sync {
    /// Brings the subsystem online and requests its pre-allocated devices.
    fn activate(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError>;

    /// Sets the raw state of the subsystem.
    fn set_state(&self, subsystem: &mut Subsystem, state: u32) -> Result<(), XpmError>;

    /// Returns the state of the subsystem.
    fn get_status(&self, subsystem: &Subsystem) -> SubsystemState;

    /// Marks the subsystem suspended.
    fn suspend(&self, subsystem: &mut Subsystem) -> Result<(), XpmError>;

    /// Brings a suspended or powered off subsystem back online.
    fn wakeup(&self, subsystem: &mut Subsystem) -> Result<(), XpmError>;

    /// Forces the cores of a subsystem which is pending power off down.
    fn idle(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError>;

    /// Releases every device the subsystem holds and powers it off.
    fn shutdown(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError>;

    /// Checks whether `host` may perform `operation` on the subsystem.
    fn is_operation_allowed(
        &self,
        subsystem: &Subsystem,
        host: NodeId,
        operation: SubsystemPermission,
        cmd_type: CmdType,
    ) -> Result<(), XpmError>;
}

/// The operations shared by every subsystem.
pub struct GenericSubsystemOps;

/// The one instance of [`GenericSubsystemOps`].
pub static GENERIC_SUBSYSTEM_OPS: GenericSubsystemOps = GenericSubsystemOps;

fn host_bit(host: NodeId) -> Option<u32> {
    1_u32.checked_shl(host.index().try_into().ok()?)
}

fn is_core(id: NodeId) -> bool {
    id.class() == Some(NodeClass::Device) && id.subclass() == device_subclass::CORE
}

impl SubsystemOps for GenericSubsystemOps {
    fn activate(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError> {
        if subsystem.flags.contains(SubsystemFlags::IS_CONFIGURED) {
            return Ok(());
        }
        if subsystem.state == SubsystemState::PoweredOff {
            subsystem.state = SubsystemState::Online;
        }
        let id = subsystem.id;
        for requirement in subsystem.requirements_mut() {
            if !requirement.flags.contains(RequirementFlags::PREALLOC) || requirement.allocated {
                continue;
            }
            devices
                .request(
                    id,
                    requirement.device,
                    requirement.prealloc_caps,
                    requirement.prealloc_qos,
                    CmdType::Secure,
                )
                .map_err(|e| {
                    error!("Subsystem {id} failed to request {}: {e}", requirement.device);
                    XpmError::Internal(InternalError::DeviceRequest)
                })?;
            requirement.allocated = true;
        }
        subsystem.flags.insert(SubsystemFlags::IS_CONFIGURED);
        info!("Subsystem {id} activated");
        Ok(())
    }

    fn set_state(&self, subsystem: &mut Subsystem, state: u32) -> Result<(), XpmError> {
        subsystem.state = SubsystemState::try_from(state).map_err(|_| XpmError::InvalidParam)?;
        Ok(())
    }

    fn get_status(&self, subsystem: &Subsystem) -> SubsystemState {
        subsystem.state
    }

    fn suspend(&self, subsystem: &mut Subsystem) -> Result<(), XpmError> {
        match subsystem.state {
            SubsystemState::Online | SubsystemState::Suspending => {
                subsystem.state = SubsystemState::Suspended;
                Ok(())
            }
            state => {
                warn!("Can't suspend subsystem {} in state {state:?}", subsystem.id);
                Err(XpmError::Internal(InternalError::SubsysSetState))
            }
        }
    }

    fn wakeup(&self, subsystem: &mut Subsystem) -> Result<(), XpmError> {
        match subsystem.state {
            SubsystemState::Online => Ok(()),
            SubsystemState::Suspended
            | SubsystemState::Suspending
            | SubsystemState::PoweredOff
            | SubsystemState::PendingRestart => {
                subsystem.state = SubsystemState::Online;
                Ok(())
            }
            state => {
                warn!("Can't wake subsystem {} in state {state:?}", subsystem.id);
                Err(XpmError::Internal(InternalError::SubsysSetState))
            }
        }
    }

    fn idle(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError> {
        if subsystem.state != SubsystemState::PendingPowerOff {
            return Err(XpmError::Internal(InternalError::SubsysSetState));
        }
        for requirement in subsystem.requirements() {
            if requirement.allocated && is_core(requirement.device) {
                devices.force_power_down(requirement.device)?;
            }
        }
        Ok(())
    }

    fn shutdown(&self, subsystem: &mut Subsystem, devices: &dyn Devices) -> Result<(), XpmError> {
        let id = subsystem.id;
        let mut result = Ok(());
        for requirement in subsystem.requirements_mut() {
            if !requirement.allocated {
                continue;
            }
            // Keep releasing the rest even if one device refuses.
            match devices.release(id, requirement.device, CmdType::Secure) {
                Ok(()) => requirement.allocated = false,
                Err(e) => {
                    error!("Subsystem {id} failed to release {}: {e}", requirement.device);
                    result = Err(e);
                }
            }
        }
        subsystem.flags.remove(SubsystemFlags::IS_CONFIGURED);
        subsystem.state = SubsystemState::PoweredOff;
        result
    }

    fn is_operation_allowed(
        &self,
        subsystem: &Subsystem,
        host: NodeId,
        operation: SubsystemPermission,
        cmd_type: CmdType,
    ) -> Result<(), XpmError> {
        let Some(bit) = host_bit(host) else {
            return Err(XpmError::NoAccess);
        };
        let permissions = &subsystem.permissions;
        let allowed = [
            (SubsystemPermission::WAKE, permissions.wake),
            (SubsystemPermission::POWER_DOWN, permissions.power_down),
            (SubsystemPermission::SUSPEND, permissions.suspend),
        ]
        .into_iter()
        .filter(|(flag, _)| operation.contains(*flag))
        .all(|(_, mask)| mask.allows(bit, cmd_type));
        if allowed && !operation.is_empty() {
            Ok(())
        } else {
            debug!("{host} may not {operation:?} subsystem {}", subsystem.id);
            Err(XpmError::NoAccess)
        }
    }
}

/// Every subsystem in the system.
pub struct SubsystemManager<'a> {
    pools: PoolSet<'a>,
    devices: &'a dyn Devices,
    subsystems: &'a mut List<'a, Subsystem<'a>>,
    num_subsystems: u32,
}

impl<'a> SubsystemManager<'a> {
    /// Creates an empty manager, allocating the subsystem list from the other pool.
    pub fn new(pools: PoolSet<'a>, devices: &'a dyn Devices) -> Result<Self, XpmError> {
        Ok(Self {
            pools,
            devices,
            subsystems: List::new_in(pools.other)?,
            num_subsystems: 0,
        })
    }

    /// Returns the number of subsystems added.
    pub fn num_subsystems(&self) -> u32 {
        self.num_subsystems
    }

    /// Returns the subsystem with the given ID.
    pub fn get(&self, id: NodeId) -> Option<&Subsystem<'a>> {
        self.subsystems.iter().find(|subsystem| subsystem.id == id)
    }

    /// Returns the subsystem with the given ID, mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Subsystem<'a>> {
        self.subsystems.iter_mut().find(|subsystem| subsystem.id == id)
    }

    fn existing_mut(&mut self, id: NodeId) -> Result<&mut Subsystem<'a>, XpmError> {
        self.get_mut(id).ok_or_else(|| {
            warn!("Subsystem {id} not found");
            XpmError::InvalidParam
        })
    }

    /// Adds a subsystem.
    ///
    /// If the subsystem is created but its requirement list can't be, the subsystem stays listed
    /// and the allocation error is returned. Adding a requirement later tries again.
    pub fn add(&mut self, id: NodeId) -> Result<(), XpmError> {
        if id.class() != Some(NodeClass::Subsystem) {
            return Err(XpmError::InvalidParam);
        }
        if self.get(id).is_some() {
            warn!("Subsystem {id} already exists");
            return Err(XpmError::DeviceBusy);
        }
        let state = if id == PM_SUBSYS_PMC {
            SubsystemState::Online
        } else {
            SubsystemState::PoweredOff
        };
        let pools = self.pools;
        let subsystem = pools.subsystem.alloc(Subsystem {
            id,
            state,
            flags: SubsystemFlags::empty(),
            ipi_mask: 0,
            ops: &GENERIC_SUBSYSTEM_OPS,
            requirements: None,
            permissions: Permissions::default(),
        })?;
        self.subsystems.prepend(subsystem)?;
        self.num_subsystems += 1;

        let requirements = List::new_in(pools.other).inspect_err(|_| {
            error!("Subsystem {id} added without a requirement list");
        })?;
        if let Some(subsystem) = self.subsystems.first_mut() {
            subsystem.requirements = Some(requirements);
        }
        debug!("Added subsystem {id}");
        Ok(())
    }

    /// Adds a device requirement to a subsystem.
    pub fn add_requirement(
        &mut self,
        subsystem: NodeId,
        device: NodeId,
        flags: RequirementFlags,
        prealloc_caps: u32,
        prealloc_qos: u32,
    ) -> Result<(), XpmError> {
        if !self.devices.exists(device) {
            warn!("Device {device} not found");
            return Err(XpmError::DeviceNotFound);
        }
        let pools = self.pools;
        let subsystem = self.existing_mut(subsystem)?;
        let requirements = match subsystem.requirements.take() {
            Some(requirements) => requirements,
            None => List::new_in(pools.other)?,
        };
        let requirements = subsystem.requirements.insert(requirements);
        let requirement = pools.requirement.alloc(Requirement {
            device,
            flags,
            prealloc_caps,
            prealloc_qos,
            allocated: false,
        })?;
        requirements.prepend(requirement)
    }

    /// Allows `host` to perform `operations` on `target`, with secure or non-secure commands.
    pub fn add_permissions(
        &mut self,
        host: NodeId,
        target: NodeId,
        operations: SubsystemPermission,
        secure: bool,
    ) -> Result<(), XpmError> {
        if self.get(host).is_none() {
            return Err(XpmError::InvalidParam);
        }
        let bit = host_bit(host).ok_or(XpmError::InvalidParam)?;
        let target = self.existing_mut(target)?;
        for mask in target.permissions.masks_mut(operations) {
            if secure {
                mask.secure |= bit;
            } else {
                mask.non_secure |= bit;
            }
        }
        Ok(())
    }

    /// Activates a subsystem. Does nothing if it is already configured.
    ///
    /// If a pre-allocated device can't be requested the devices already requested stay
    /// requested, and activating again only requests those which weren't.
    pub fn activate(&mut self, id: NodeId) -> Result<(), XpmError> {
        let devices = self.devices;
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.activate(subsystem, devices)
    }

    /// Sets the raw state of a subsystem.
    pub fn set_state(&mut self, id: NodeId, state: u32) -> Result<(), XpmError> {
        if state >= SubsystemState::MAX {
            return Err(XpmError::InvalidParam);
        }
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.set_state(subsystem, state)
    }

    /// Returns the state of a subsystem.
    pub fn get_status(&self, id: NodeId) -> Result<SubsystemState, XpmError> {
        let subsystem = self.get(id).ok_or(XpmError::InvalidParam)?;
        Ok(subsystem.ops.get_status(subsystem))
    }

    /// Marks a subsystem suspended.
    pub fn suspend(&mut self, id: NodeId) -> Result<(), XpmError> {
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.suspend(subsystem)
    }

    /// Brings a subsystem back online.
    pub fn wakeup(&mut self, id: NodeId) -> Result<(), XpmError> {
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.wakeup(subsystem)
    }

    /// Idles the cores of a subsystem pending power off.
    pub fn idle(&mut self, id: NodeId) -> Result<(), XpmError> {
        let devices = self.devices;
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.idle(subsystem, devices)
    }

    /// Releases everything a subsystem holds and powers it off.
    pub fn shutdown(&mut self, id: NodeId) -> Result<(), XpmError> {
        let devices = self.devices;
        let subsystem = self.existing_mut(id)?;
        subsystem.ops.shutdown(subsystem, devices)
    }

    /// Forces a subsystem off. Subsystems whose cores can be idled are moved to pending power off
    /// and idled, the rest are shut down straight away.
    pub fn force_power_down(&mut self, id: NodeId) -> Result<(), XpmError> {
        let idle_supported = self
            .existing_mut(id)?
            .flags
            .contains(SubsystemFlags::IDLE_SUPPORTED);
        if idle_supported {
            self.set_state(id, SubsystemState::PendingPowerOff.into())?;
            self.idle(id)
        } else {
            self.shutdown(id)
        }
    }

    /// Sets the IPI channels a subsystem sends commands on.
    pub fn set_ipi_mask(&mut self, id: NodeId, ipi_mask: u32) -> Result<(), XpmError> {
        self.existing_mut(id)?.ipi_mask = ipi_mask;
        Ok(())
    }

    /// Returns the subsystem which sends commands on any of the given IPI channels.
    pub fn get_by_ipi_mask(&self, ipi_mask: u32) -> Option<NodeId> {
        self.subsystems
            .iter()
            .find(|subsystem| subsystem.ipi_mask & ipi_mask != 0)
            .map(|subsystem| subsystem.id)
    }

    fn check_permission(
        &self,
        host: NodeId,
        target: NodeId,
        cmd_type: CmdType,
    ) -> Result<(), XpmError> {
        let target = self.get(target).ok_or(XpmError::InvalidParam)?;
        target
            .ops
            .is_operation_allowed(target, host, SubsystemPermission::POWER_DOWN, cmd_type)
    }

    /// Checks whether subsystem `host` may force `node` off.
    ///
    /// Other subsystems and cores owned by other subsystems need an explicit permission. A
    /// subsystem may always force down its own cores, but never itself or the PMC subsystem. Only
    /// the PMC and default subsystems may force down power domains.
    pub fn is_force_power_down_allowed(
        &self,
        host: NodeId,
        node: NodeId,
        cmd_type: CmdType,
    ) -> Result<(), XpmError> {
        match node.class() {
            Some(NodeClass::Subsystem) => {
                if node == host || node == PM_SUBSYS_PMC {
                    return Err(XpmError::InvalidParam);
                }
                self.check_permission(host, node, cmd_type)
            }
            Some(NodeClass::Device) if node.subclass() == device_subclass::CORE => {
                let owner = self
                    .devices
                    .subsystem_of_core(node)
                    .ok_or(XpmError::InvalidParam)?;
                if owner == host {
                    Ok(())
                } else {
                    self.check_permission(host, owner, cmd_type)
                }
            }
            Some(NodeClass::Power) => {
                if host == PM_SUBSYS_PMC || host == PM_SUBSYS_DEFAULT {
                    Ok(())
                } else {
                    Err(XpmError::NoAccess)
                }
            }
            _ => Err(XpmError::InvalidNode),
        }
    }
}
