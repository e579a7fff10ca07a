use core::fmt;

use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::ll;

/// An error that can occur while talking to the TMC429
pub enum Error<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    /// Error occured while using SPI bus
    Spi(ll::Error<SPI, CS>),

    /// No scaling multiplier/divider pair exists for the requested acceleration
    ///
    /// The requested maximum acceleration cannot be reached with the motor's
    /// current pulse and ramp clock dividers. Nothing has been written to the
    /// device; adjust the dividers or the acceleration and try again.
    AccelerationOutOfRange,
}

impl<SPI, CS> From<ll::Error<SPI, CS>> for Error<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    fn from(error: ll::Error<SPI, CS>) -> Self {
        Error::Spi(error)
    }
}

// We can't derive this implementation, as `Debug` is only implemented
// conditionally for `ll::Error`.
impl<SPI, CS> fmt::Debug for Error<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    <SPI as spi::Transfer<u8>>::Error: fmt::Debug,
    CS: OutputPin,
    <CS as OutputPin>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spi(error) => write!(f, "Spi({:?})", error),
            Error::AccelerationOutOfRange => write!(f, "AccelerationOutOfRange"),
        }
    }
}
