// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! XilPM-NG: the platform management node graph of the PLM.
//!
//! The runtime models power domains, clocks, PLLs, AI Engine arrays and subsystems as a graph of
//! typed nodes. The graph is built once at boot from topology commands and then mutated by EEMI
//! requests. Nothing is ever heap allocated: every node comes out of one of a handful of fixed
//! size bump pools which are never freed, so the whole state can be handed over across an
//! in-place firmware update.

#![cfg_attr(not(test), no_std)]

pub mod aie;
pub mod alloc;
pub mod api;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod list;
pub mod logger;
pub mod mmio;
pub mod node;
pub mod platform;
pub mod power;
pub mod runtime_alloc;
pub mod subsystem;
pub mod update;

pub use api::Xpm;
pub use error::XpmError;
