// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Build script for the XilPM runtime.
//!
//! Pool sizes and the log level are baked in at build time through `option_env!`, so cargo needs
//! to know to rebuild when any of them change.

const BUILD_TIME_ENV: [&str; 7] = [
    "LOG_LEVEL",
    "XPM_TOPOLOGY_POOL_SIZE",
    "XPM_SUBSYSTEM_POOL_SIZE",
    "XPM_REQUIREMENT_POOL_SIZE",
    "XPM_DEVICE_OPS_POOL_SIZE",
    "XPM_OTHER_POOL_SIZE",
    "XPM_BOARD_POOL_SIZE",
];

fn main() {
    for name in BUILD_TIME_ENV {
        println!("cargo:rerun-if-env-changed={name}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
