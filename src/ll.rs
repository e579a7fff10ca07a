//! Low-level interface to the TMC429
//!
//! This module implements a register-level interface to the TMC429. Users of
//! this library should typically not need to use this. Please consider using
//! the [high-level interface] instead.
//!
//! Every register access exchanges one 32 bit telegram with the chip: an
//! address byte followed by three payload bytes, most significant byte first.
//! The chip answers each telegram with its status byte followed by the three
//! payload bytes of the addressed register.
//!
//! **NOTE**: Write accessors accept value types that have a larger number of
//! bits than the register field actually consists of. If you pass a value
//! that is too large to be written to the field, it will be silently
//! truncated.
//!
//! [high-level interface]: ../hl/index.html

use core::fmt;

use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::configs::{Motor, Status};

/// Address byte flag marking a telegram as a read access
pub const ACCESS_READ: u8 = 0x01;

/// Register block selector for the global registers
///
/// Per-motor registers use the motor number (0..=2) in the same address bits.
const COMMON_BLOCK: u8 = 0b11;

/// Entry point to the TMC429 driver's register-level API
///
/// Please consider using [hl::Tmc429] instead.
///
/// [hl::Tmc429]: ../hl/struct.Tmc429.html
pub struct Tmc429<SPI, CS> {
    spi: SPI,
    chip_select: CS,
}

impl<SPI, CS> Tmc429<SPI, CS> {
    /// Create a new instance of `Tmc429`
    ///
    /// Requires the SPI peripheral and the chip select pin that are connected
    /// to the TMC429.
    pub fn new(spi: SPI, chip_select: CS) -> Self {
        Tmc429 { spi, chip_select }
    }

    /// Release the SPI peripheral and the chip select pin
    pub fn free(self) -> (SPI, CS) {
        (self.spi, self.chip_select)
    }
}

impl<SPI, CS> Tmc429<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    /// Exchange one 32 bit telegram with the TMC429
    ///
    /// This is the low-level primitive that does all SPI communication with
    /// the chip. The four bytes of `request` are transferred one at a time;
    /// chip select stays asserted for the first three bytes and is released
    /// after the answer to the fourth byte has been received. Returns the
    /// four bytes shifted out by the chip, in transfer order.
    pub fn exchange(&mut self, request: [u8; 4]) -> Result<[u8; 4], Error<SPI, CS>> {
        self.chip_select
            .set_low()
            .map_err(|err| Error::ChipSelect(err))?;

        let mut response = [0; 4];
        for (send, receive) in request.iter().zip(response.iter_mut()) {
            let mut byte = [*send];
            self.spi
                .transfer(&mut byte)
                .map_err(|err| Error::Transfer(err))?;
            *receive = byte[0];
        }

        self.chip_select
            .set_high()
            .map_err(|err| Error::ChipSelect(err))?;

        Ok(response)
    }

    /// Read the TMC429 status byte
    ///
    /// Uses a single byte SPI access instead of a full telegram, which makes
    /// this a little bit faster than a register read.
    pub fn status(&mut self) -> Result<Status, Error<SPI, CS>> {
        self.chip_select
            .set_low()
            .map_err(|err| Error::ChipSelect(err))?;

        let mut byte = [ACCESS_READ];
        self.spi
            .transfer(&mut byte)
            .map_err(|err| Error::Transfer(err))?;

        self.chip_select
            .set_high()
            .map_err(|err| Error::ChipSelect(err))?;

        Ok(Status::from(byte[0]))
    }

    /// Write an array of three payload bytes to a register
    pub fn write_bytes(&mut self, address: u8, bytes: [u8; 3]) -> Result<(), Error<SPI, CS>> {
        self.exchange([address, bytes[0], bytes[1], bytes[2]])?;
        Ok(())
    }

    /// Write three individual payload bytes to a register
    ///
    /// `high` is the most significant byte of the register.
    pub fn write_datagram(
        &mut self,
        address: u8,
        high: u8,
        mid: u8,
        low: u8,
    ) -> Result<(), Error<SPI, CS>> {
        self.exchange([address, high, mid, low])?;
        Ok(())
    }

    /// Write zero to a register
    ///
    /// This can be useful e.g. to stop a motor quickly.
    pub fn write_zero(&mut self, address: u8) -> Result<(), Error<SPI, CS>> {
        self.exchange([address, 0, 0, 0])?;
        Ok(())
    }

    /// Write a 16 bit value to a register
    ///
    /// The unused high payload byte is zero-filled.
    pub fn write_short(&mut self, address: u8, value: i32) -> Result<(), Error<SPI, CS>> {
        self.exchange([address, 0, (value >> 8) as u8, value as u8])?;
        Ok(())
    }

    /// Write a 24 bit value to a register
    pub fn write_int(&mut self, address: u8, value: i32) -> Result<(), Error<SPI, CS>> {
        self.exchange([address, (value >> 16) as u8, (value >> 8) as u8, value as u8])?;
        Ok(())
    }

    /// Read a register
    ///
    /// Returns the status byte and the register's three payload bytes, most
    /// significant byte first.
    pub fn read_bytes(&mut self, address: u8) -> Result<(Status, [u8; 3]), Error<SPI, CS>> {
        let response = self.exchange([address | ACCESS_READ, 0, 0, 0])?;
        Ok((
            Status::from(response[0]),
            [response[1], response[2], response[3]],
        ))
    }

    /// Read a single payload byte (0..=2) of a register
    ///
    /// Byte 0 is the most significant payload byte. Indexes larger than 2 are
    /// clamped to the last payload byte.
    pub fn read_single_byte(&mut self, address: u8, index: usize) -> Result<u8, Error<SPI, CS>> {
        let (_, bytes) = self.read_bytes(address)?;
        Ok(bytes[index.min(2)])
    }

    /// Read a 12 bit register, sign-extending the value to 32 bit
    ///
    /// The value is taken from the low 12 bits of the two low payload bytes;
    /// bit 11 is the sign bit.
    pub fn read_int12(&mut self, address: u8) -> Result<i32, Error<SPI, CS>> {
        let (_, bytes) = self.read_bytes(address)?;

        let mut result = i32::from(bytes[1]) << 8 | i32::from(bytes[2]);
        if result & 0x0000_0800 != 0 {
            result |= !0x0000_0FFF;
        }

        Ok(result)
    }

    /// Read a 24 bit register, sign-extending the value to 32 bit
    ///
    /// Bit 23 is the sign bit.
    pub fn read_int24(&mut self, address: u8) -> Result<i32, Error<SPI, CS>> {
        let (_, bytes) = self.read_bytes(address)?;

        let mut result =
            i32::from(bytes[0]) << 16 | i32::from(bytes[1]) << 8 | i32::from(bytes[2]);
        if result & 0x0080_0000 != 0 {
            result |= !0x00FF_FFFF;
        }

        Ok(result)
    }
}

/// An SPI error that can occur when communicating with the TMC429
pub enum Error<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    /// SPI error occured during a transfer transaction
    Transfer(<SPI as spi::Transfer<u8>>::Error),

    /// Error occured while changing chip select signal
    ChipSelect(<CS as OutputPin>::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<SPI, CS> fmt::Debug for Error<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    <SPI as spi::Transfer<u8>>::Error: fmt::Debug,
    CS: OutputPin,
    <CS as OutputPin>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Transfer(error) => write!(f, "Transfer({:?})", error),
            Error::ChipSelect(error) => write!(f, "ChipSelect({:?})", error),
        }
    }
}

/// The per-motor registers of the TMC429
///
/// Each motor has its own copy of these registers; [`MotorRegister::address`]
/// combines the register index with the motor number. The indexes are listed
/// in the register overview table of the TMC429 datasheet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MotorRegister {
    /// Target position
    XTarget = 0,
    /// Actual position
    XActual = 1,
    /// Minimum velocity
    VMin = 2,
    /// Maximum velocity
    VMax = 3,
    /// Target velocity
    VTarget = 4,
    /// Actual velocity
    VActual = 5,
    /// Maximum acceleration
    AMax = 6,
    /// Actual acceleration
    AActual = 7,
    /// Acceleration threshold for driver current control
    AThreshold = 8,
    /// Ramp generator scaling multiplier and divider
    PMulPDiv = 9,
    /// Reference switch configuration and ramp mode
    RefConfRm = 10,
    /// Interrupt mask and flags
    InterruptMask = 11,
    /// Pulse and ramp clock dividers, microstep resolution
    PulseDivRampDiv = 12,
    /// Reference switch deglitch tolerance
    DxRefTolerance = 13,
    /// Position latched on a reference switch event
    XLatched = 14,
    /// Microstep counter
    UStepCount = 15,
}

impl MotorRegister {
    /// The registers of a motor's register block, X_TARGET through X_LATCHED
    ///
    /// This is the range that device initialization clears; the microstep
    /// counter is not part of it.
    pub const BLOCK: [MotorRegister; 15] = [
        MotorRegister::XTarget,
        MotorRegister::XActual,
        MotorRegister::VMin,
        MotorRegister::VMax,
        MotorRegister::VTarget,
        MotorRegister::VActual,
        MotorRegister::AMax,
        MotorRegister::AActual,
        MotorRegister::AThreshold,
        MotorRegister::PMulPDiv,
        MotorRegister::RefConfRm,
        MotorRegister::InterruptMask,
        MotorRegister::PulseDivRampDiv,
        MotorRegister::DxRefTolerance,
        MotorRegister::XLatched,
    ];

    /// The address byte accessing this register of the given motor
    pub fn address(self, motor: Motor) -> u8 {
        (motor as u8) << 5 | (self as u8) << 1
    }
}

/// The global registers of the TMC429
///
/// These exist once per chip and share the address space with the per-motor
/// registers, using the register block selector the motors don't.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GlobalRegister {
    /// Low word of the datagram shifted through the driver chain
    DatagramLowWord = 0,
    /// High word of the datagram shifted through the driver chain
    DatagramHighWord = 1,
    /// Position and length of the cover datagram
    CoverPosLen = 2,
    /// Cover datagram sent directly to a motor driver
    CoverDatagram = 3,
    /// Host and driver interface configuration
    IfConfiguration = 4,
    /// Position compare value
    PosComp = 5,
    /// Position compare interrupt configuration
    PosCompInt = 6,
    /// Power down mode
    PowerDown = 8,
    /// Chip type and version
    TypeVersion = 9,
    /// State of the reference switch inputs
    ReferenceSwitches = 14,
    /// Global parameters (clock configuration, driver chain setup)
    GlobalParameters = 15,
}

impl GlobalRegister {
    /// The address byte accessing this register
    pub fn address(self) -> u8 {
        COMMON_BLOCK << 5 | (self as u8) << 1
    }
}
