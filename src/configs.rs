//! Value types for the TMC429's configuration and status fields
//!
//! This module houses the datastructures that describe motors, operating
//! modes and the packed configuration fields of the TMC429. They are consumed
//! by the high-level interface and can equally be used together with the
//! register-level one.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One of the three motor axes controlled by the TMC429
///
/// The motor number is encoded into the upper bits of every per-motor
/// register address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Motor {
    /// First motor axis
    Motor0 = 0,
    /// Second motor axis
    Motor1 = 1,
    /// Third motor axis
    Motor2 = 2,
}

impl Motor {
    /// All motor axes, in register address order
    pub const ALL: [Motor; 3] = [Motor::Motor0, Motor::Motor1, Motor::Motor2];
}

/// The operating mode of a motor's ramp generator
///
/// See the ramp mode description in the TMC429 datasheet for the exact
/// behavior of each mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RampMode {
    /// Trapezoidal ramps between position targets
    Ramp = 0b00,
    /// Like [`RampMode::Ramp`], with exponentially smoothed deceleration
    SoftRamp = 0b01,
    /// Velocity mode; the motor follows the target velocity directly
    Velocity = 0b10,
    /// Hold mode; velocity is controlled by the host without ramping
    Hold = 0b11,
}

/// Reference switch configuration of one motor
///
/// A packed sub-byte field of the `REF_CONF_RM` register. The named accessors
/// keep unrelated bits untouched when a single setting is changed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RefSwitchConfig(u8);

impl RefSwitchConfig {
    /// Configuration that ignores both end switches
    ///
    /// This is the right choice for axes without reference switches wired up.
    pub const NO_REF: RefSwitchConfig = RefSwitchConfig(0x03);

    /// Create a configuration with all switch handling enabled
    pub const fn new() -> Self {
        RefSwitchConfig(0)
    }

    /// Create a configuration from the raw `REF_CONF` field value
    pub const fn from_bits(bits: u8) -> Self {
        RefSwitchConfig(bits & 0x0F)
    }

    /// The raw `REF_CONF` field value
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the left end switch is ignored
    pub const fn left_switch_disabled(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Ignore or obey the left end switch
    pub const fn disable_left_switch(self, disable: bool) -> Self {
        RefSwitchConfig(self.0 & !0x01 | disable as u8)
    }

    /// Whether the right end switch is ignored
    pub const fn right_switch_disabled(self) -> bool {
        self.0 & 0x02 != 0
    }

    /// Ignore or obey the right end switch
    pub const fn disable_right_switch(self, disable: bool) -> Self {
        RefSwitchConfig(self.0 & !0x02 | (disable as u8) << 1)
    }

    /// Whether an end switch triggers a soft stop instead of a hard stop
    pub const fn soft_stop(self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Select soft stop or hard stop on an end switch event
    pub const fn set_soft_stop(self, soft: bool) -> Self {
        RefSwitchConfig(self.0 & !0x04 | (soft as u8) << 2)
    }

    /// Whether the left reference input is mirrored to the right one
    pub const fn ref_mirrored(self) -> bool {
        self.0 & 0x08 != 0
    }

    /// Mirror the left reference input to the right one
    pub const fn set_ref_mirrored(self, mirrored: bool) -> Self {
        RefSwitchConfig(self.0 & !0x08 | (mirrored as u8) << 3)
    }
}

impl Default for RefSwitchConfig {
    fn default() -> Self {
        RefSwitchConfig::new()
    }
}

/// The packed pulse/ramp clock divider field of one motor
///
/// Both dividers are 4 bit exponents that scale the chip's clock down for the
/// pulse (step) generator and the ramp generator. They share one byte of the
/// `PULSE_DIV_RAMP_DIV` register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PulseRampDiv(u8);

impl PulseRampDiv {
    /// Combine pulse and ramp divider exponents into the packed field
    ///
    /// Values larger than 15 are truncated to the 4 bit field width.
    pub const fn new(pulse_div: u8, ramp_div: u8) -> Self {
        PulseRampDiv(pulse_div << 4 | ramp_div & 0x0F)
    }

    /// The pulse (step) generator clock divider exponent
    pub const fn pulse_div(self) -> u8 {
        self.0 >> 4
    }

    /// The ramp generator clock divider exponent
    pub const fn ramp_div(self) -> u8 {
        self.0 & 0x0F
    }

    /// The packed field value
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl From<u8> for PulseRampDiv {
    fn from(bits: u8) -> Self {
        PulseRampDiv(bits)
    }
}

/// Configuration of the TMC429's host and driver interfaces
///
/// Written to the `IF_CONFIGURATION_429` register. The bit positions are
/// listed in the interface configuration table of the TMC429 datasheet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IfConfiguration {
    /// Invert the polarity of the reference switch inputs
    pub invert_ref: bool,
    /// Drive SDO as an open-drain interrupt output while chip select is high
    pub sdo_int: bool,
    /// Generate step pulses with half the usual length
    pub step_half: bool,
    /// Invert the polarity of the step output
    pub invert_step: bool,
    /// Invert the polarity of the direction output
    pub invert_dir: bool,
    /// Enable step/direction output to the motor drivers
    pub en_sd: bool,
    /// Motor selection for the position compare output (0..=3)
    pub pos_comp_sel: u8,
    /// Enable the dedicated reference switch inputs of all three motors
    pub en_refr: bool,
}

impl IfConfiguration {
    /// The register value encoding this configuration
    pub fn value(&self) -> i32 {
        (self.invert_ref as i32)
            | (self.sdo_int as i32) << 1
            | (self.step_half as i32) << 2
            | (self.invert_step as i32) << 3
            | (self.invert_dir as i32) << 4
            | (self.en_sd as i32) << 5
            | i32::from(self.pos_comp_sel & 0x03) << 6
            | (self.en_refr as i32) << 8
    }
}

impl Default for IfConfiguration {
    fn default() -> Self {
        IfConfiguration {
            invert_ref: false,
            sdo_int: false,
            step_half: false,
            invert_step: false,
            invert_dir: false,
            en_sd: false,
            pos_comp_sel: 0,
            en_refr: false,
        }
    }
}

/// The status byte returned with every SPI exchange
///
/// The TMC429 shifts this byte out while it receives the address byte of a
/// telegram, so every register access yields a fresh copy as a side output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Status(u8);

impl Status {
    /// Whether an enabled interrupt condition is active
    pub fn interrupt(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Whether a cover datagram is waiting to be transferred to the driver chain
    pub fn cover_datagram_waiting(self) -> bool {
        self.0 & 0x40 != 0
    }

    /// Whether the given motor's reference switch is active
    pub fn reference_switch_active(self, motor: Motor) -> bool {
        self.0 & (0x02 << (motor as u8 * 2)) != 0
    }

    /// Whether the given motor has reached its target position
    pub fn target_reached(self, motor: Motor) -> bool {
        self.0 & (0x01 << (motor as u8 * 2)) != 0
    }

    /// The raw status byte
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl From<u8> for Status {
    fn from(bits: u8) -> Self {
        Status(bits)
    }
}
