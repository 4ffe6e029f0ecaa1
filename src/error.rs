// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Status codes returned by the platform management runtime.
//!
//! Every error ends up as a 32-bit status word in an IPI response, so each variant maps to one of
//! the `XST_*` codes understood by the clients.

use core::fmt::{self, Display, Formatter};

/// Generic failure.
pub const XST_FAILURE: u32 = 1;
/// The referenced device was not found.
pub const XST_DEVICE_NOT_FOUND: u32 = 2;
/// A buffer, typically an allocation pool, was too small.
pub const XST_BUFFER_TOO_SMALL: u32 = 12;
/// A parameter was invalid.
pub const XST_INVALID_PARAM: u32 = 15;
/// The requested feature is not supported.
pub const XST_NO_FEATURE: u32 = 19;
/// The device is busy, or already exists.
pub const XST_DEVICE_BUSY: u32 = 21;
/// A hardware operation timed out.
pub const XST_TIMEOUT: u32 = 31;
/// The caller is not allowed to perform the operation.
pub const XST_PM_NO_ACCESS: u32 = 2002;
/// The node is not valid for the operation.
pub const XST_PM_INVALID_NODE: u32 = 2003;

/// Internal reason codes attached to failures which are reported as `XST_FAILURE`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum InternalError {
    /// The power domain is not one the operation knows about.
    InvalidPwrDomain = 0x3000,
    /// The requested power state is out of range.
    InvalidPwrState = 0x3005,
    /// Every sub-node slot of a custom clock topology is already in use.
    ClkTopologyMaxNumNodes = 0x3903,
    /// A PLL did not lock.
    PllLock = 0x3904,
    /// A subsystem state change was rejected.
    SubsysSetState = 0x4605,
    /// Access to a subsystem was denied.
    SubsysAccess = 0x4606,
    /// Requesting a pre-allocated device failed.
    DeviceRequest = 0x4700,
}

/// An error from the platform management runtime.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum XpmError {
    /// Unspecified failure.
    Failure,
    /// A referenced node has not been registered (yet).
    DeviceNotFound,
    /// An allocation pool is exhausted.
    BufferTooSmall,
    /// A parameter is malformed, out of range or a duplicate.
    InvalidParam,
    /// The operation is not supported.
    NoFeature,
    /// The node already exists or is in use.
    DeviceBusy,
    /// Polling hardware timed out.
    Timeout,
    /// The caller has no permission, or the target is not powered.
    NoAccess,
    /// The node is not valid for the operation.
    InvalidNode,
    /// A failure with an internal reason code, reported as `XST_FAILURE`.
    Internal(InternalError),
}

impl XpmError {
    /// Returns the status word to put in the IPI response.
    pub const fn status(self) -> u32 {
        match self {
            Self::Failure | Self::Internal(_) => XST_FAILURE,
            Self::DeviceNotFound => XST_DEVICE_NOT_FOUND,
            Self::BufferTooSmall => XST_BUFFER_TOO_SMALL,
            Self::InvalidParam => XST_INVALID_PARAM,
            Self::NoFeature => XST_NO_FEATURE,
            Self::DeviceBusy => XST_DEVICE_BUSY,
            Self::Timeout => XST_TIMEOUT,
            Self::NoAccess => XST_PM_NO_ACCESS,
            Self::InvalidNode => XST_PM_INVALID_NODE,
        }
    }

    /// Returns the internal reason code, if there is one.
    pub const fn internal(self) -> Option<InternalError> {
        match self {
            Self::Internal(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<InternalError> for XpmError {
    fn from(reason: InternalError) -> Self {
        Self::Internal(reason)
    }
}

impl From<XpmError> for u32 {
    fn from(error: XpmError) -> Self {
        error.status()
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let description = match self {
            Self::InvalidPwrDomain => "invalid power domain",
            Self::InvalidPwrState => "invalid power state",
            Self::ClkTopologyMaxNumNodes => "clock topology has no free sub-node",
            Self::PllLock => "PLL failed to lock",
            Self::SubsysSetState => "subsystem state change rejected",
            Self::SubsysAccess => "subsystem access denied",
            Self::DeviceRequest => "device request failed",
        };
        write!(f, "{description} ({:#x})", *self as u32)
    }
}

impl Display for XpmError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Failure => write!(f, "failure"),
            Self::DeviceNotFound => write!(f, "device not found"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::InvalidParam => write!(f, "invalid parameter"),
            Self::NoFeature => write!(f, "not supported"),
            Self::DeviceBusy => write!(f, "device busy"),
            Self::Timeout => write!(f, "timeout"),
            Self::NoAccess => write!(f, "no access"),
            Self::InvalidNode => write!(f, "invalid node"),
            Self::Internal(reason) => write!(f, "{reason}"),
        }?;
        write!(f, " [status {}]", self.status())
    }
}
