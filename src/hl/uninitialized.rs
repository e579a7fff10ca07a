use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::{
    configs::{IfConfiguration, Motor, PulseRampDiv, RefSwitchConfig},
    ll::{self, GlobalRegister, MotorRegister},
    Error, Tmc429,
};

/// A TMC429 before initialization
///
/// Calling [`init`] will give us an actual [`Tmc429`] that can have methods
/// called on it.
///
/// [`init`]: UninitializedTmc429::init
pub struct UninitializedTmc429<SPI, CS> {
    ll: ll::Tmc429<SPI, CS>,
}

impl<SPI, CS> UninitializedTmc429<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    /// Create a new instance of `UninitializedTmc429`
    ///
    /// Requires the SPI peripheral and the chip select pin that are connected
    /// to the TMC429.
    pub fn new(spi: SPI, chip_select: CS) -> Self {
        UninitializedTmc429 {
            ll: ll::Tmc429::new(spi, chip_select),
        }
    }

    /// Get the low-level interface to the uninitialized TMC429
    pub fn ll(&mut self) -> &mut ll::Tmc429<SPI, CS> {
        &mut self.ll
    }

    /// Initialize the TMC429 for step/direction operation
    ///
    /// The register contents of the TMC429 are undefined after power-up, so
    /// this method first clears the whole register block of every motor. It
    /// then enables step/direction output with reference switch inputs and
    /// configures conservative motion parameters for all three motors:
    /// reference switches ignored, minimum velocity 1, maximum velocity 1000,
    /// maximum acceleration 1000.
    ///
    /// The sequence is fixed and performs no verification reads; errors
    /// surface only if the SPI transport itself fails.
    pub fn init(mut self) -> Result<Tmc429<SPI, CS>, Error<SPI, CS>> {
        for &motor in &Motor::ALL {
            for &register in &MotorRegister::BLOCK {
                self.ll.write_zero(register.address(motor))?;
            }
        }

        // Step/direction mode with reference switch inputs; SDO doubles as an
        // open-drain interrupt output while chip select is high.
        let if_config = IfConfiguration {
            en_sd: true,
            en_refr: true,
            sdo_int: true,
            ..IfConfiguration::default()
        };
        self.ll
            .write_int(GlobalRegister::IfConfiguration.address(), if_config.value())?;

        // Clock predivider for the step pulse timing.
        self.ll
            .write_datagram(GlobalRegister::GlobalParameters.address(), 0x00, 0x00, 0x02)?;

        let mut tmc429 = Tmc429 { ll: self.ll };

        let dividers = PulseRampDiv::new(3, 7);
        for &motor in &Motor::ALL {
            tmc429.ll.write_datagram(
                MotorRegister::PulseDivRampDiv.address(motor),
                0x00,
                dividers.bits(),
                0x06,
            )?;
            tmc429.ll.write_datagram(
                MotorRegister::RefConfRm.address(motor),
                0x00,
                RefSwitchConfig::NO_REF.bits(),
                0x00,
            )?;
            tmc429
                .ll
                .write_short(MotorRegister::VMin.address(motor), 1)?;
            tmc429
                .ll
                .write_int(MotorRegister::VMax.address(motor), 1000)?;
            tmc429.set_acceleration(motor, 1000)?;
        }

        Ok(tmc429)
    }
}
