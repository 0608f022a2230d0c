// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! The `mobot` library drives a differential drive robot through composite
//! motion goals without position feedback.
//!
//! A goal pairs rotations with straight line translations. Each pair is
//! executed open loop as a timed spin followed by a timed move, with velocity
//! commands published at a fixed sample period. A shared proximity alarm can
//! cut a primitive short. Every primitive ends with a burst of zero commands.
//!
//! The `protocol` module defines the framed wire format used by the goal
//! server, its clients, and the UDP drive link.
pub mod core;
pub mod driver;
pub mod math;
pub mod motion;
pub mod protocol;
pub mod runtime;
pub mod service;

mod config;

pub use self::config::*;

pub use self::runtime::Error;

/// Mobot runtime module containing various constants.
pub mod consts {
    /// Mobot runtime version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Default goal server port.
    pub const DEFAULT_NETWORK_PORT: u16 = 30_061;

    /// Default drive port.
    pub const DEFAULT_DRIVE_PORT: u16 = 30_062;

    /// Queue size for feedback reports.
    pub const QUEUE_SIZE_FEEDBACK: usize = 16;
}
