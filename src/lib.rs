//! Driver crate for the TMC429 triple-axis stepper motor controller
//!
//! The TMC429 computes velocity ramps for up to three stepper motors and
//! drives external motor drivers through step/direction signals. All of its
//! state lives in on-chip registers that are accessed through 32 bit SPI
//! telegrams.
//!
//! This crate provides two interfaces to the chip:
//!
//! - [`hl`]: a high-level interface covering the common motion-control
//!   operations. This is the recommended entry point.
//! - [`ll`]: a register-level interface, for everything the high-level
//!   interface doesn't cover.

#![no_std]
#![deny(missing_docs)]

pub mod configs;
pub mod hl;
pub mod ll;

pub use configs::{IfConfiguration, Motor, PulseRampDiv, RampMode, RefSwitchConfig, Status};
pub use hl::{Error, Tmc429, UninitializedTmc429};

/// The number of motor axes controlled by one TMC429
pub const MOTOR_COUNT: usize = 3;
