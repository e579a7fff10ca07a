use embedded_hal::{blocking::spi, digital::v2::OutputPin};

use crate::{
    configs::{Motor, PulseRampDiv, RampMode, RefSwitchConfig, Status},
    ll::{self, GlobalRegister, MotorRegister},
    Error, Tmc429,
};

impl<SPI, CS> Tmc429<SPI, CS>
where
    SPI: spi::Transfer<u8>,
    CS: OutputPin,
{
    /// Get the low-level interface to the TMC429
    ///
    /// This provides access to registers the high-level interface doesn't
    /// cover.
    pub fn ll(&mut self) -> &mut ll::Tmc429<SPI, CS> {
        &mut self.ll
    }

    /// Read the TMC429 status byte
    pub fn status(&mut self) -> Result<Status, Error<SPI, CS>> {
        Ok(self.ll.status()?)
    }

    /// Read the chip type and version
    ///
    /// Can be used to verify that a TMC429 is actually connected; the chip
    /// reports `0x429101`.
    pub fn version(&mut self) -> Result<u32, Error<SPI, CS>> {
        let (_, bytes) = self.ll.read_bytes(GlobalRegister::TypeVersion.address())?;
        Ok(u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]))
    }

    /// Set the ramp mode of a motor
    ///
    /// The ramp mode shares its register with the reference switch
    /// configuration, so this performs a read-modify-write cycle that leaves
    /// the other fields unchanged. The cycle is not atomic: a register write
    /// from elsewhere between the read and the write-back is lost.
    pub fn set_ramp_mode(&mut self, motor: Motor, mode: RampMode) -> Result<(), Error<SPI, CS>> {
        let address = MotorRegister::RefConfRm.address(motor);
        let (_, bytes) = self.ll.read_bytes(address)?;

        self.ll
            .write_datagram(address, bytes[0], bytes[1], mode.into())?;

        Ok(())
    }

    /// Set the reference switch configuration of a motor
    ///
    /// Like [`set_ramp_mode`], this is a non-atomic read-modify-write cycle
    /// on the shared register; the ramp mode byte is preserved.
    ///
    /// [`set_ramp_mode`]: Tmc429::set_ramp_mode
    pub fn set_switch_mode(
        &mut self,
        motor: Motor,
        config: RefSwitchConfig,
    ) -> Result<(), Error<SPI, CS>> {
        let address = MotorRegister::RefConfRm.address(motor);
        let (_, bytes) = self.ll.read_bytes(address)?;

        self.ll
            .write_datagram(address, bytes[0], config.bits(), bytes[2])?;

        Ok(())
    }

    /// Set the maximum acceleration of a motor
    ///
    /// The acceleration is masked to the register's 11 bit range. Besides
    /// A_MAX itself, the ramp generator needs a matching scaling
    /// multiplier/divider pair (PMUL/PDIV, see the acceleration parameter
    /// section of the TMC429 datasheet); this method searches the pair that
    /// best approximates the scaling formula for the motor's current pulse
    /// and ramp clock dividers and writes both registers.
    ///
    /// Returns [`Error::AccelerationOutOfRange`] without writing anything if
    /// no valid pair exists for the requested acceleration.
    pub fn set_acceleration(&mut self, motor: Motor, a_max: u32) -> Result<(), Error<SPI, CS>> {
        #[allow(unused_imports)]
        // Not used on x86, but used on mcu targets due to f32 core lib sillyness.
        use micromath::F32Ext;

        let a_max = a_max & 0x0000_07FF;

        let (_, bytes) = self
            .ll
            .read_bytes(MotorRegister::PulseDivRampDiv.address(motor))?;
        let dividers = PulseRampDiv::from(bytes[1]);
        let pulse_div = i32::from(dividers.pulse_div());
        let ramp_div = i32::from(dividers.ramp_div());

        let p = if ramp_div >= pulse_div {
            a_max as f32 / (128.0 * (1 << (ramp_div - pulse_div)) as f32)
        } else {
            a_max as f32 / (128.0 / (1 << (pulse_div - ramp_div)) as f32)
        };
        // Derating factor from the datasheet's acceleration parameter calculation.
        let p_reduced = p * 0.988;

        let mut pair = None;
        for pdiv in 0..=13 {
            let pmul = (p_reduced * 8.0 * (1 << pdiv) as f32).floor() as i32 - 128;
            if (0..=127).contains(&pmul) {
                // Later hits overwrite earlier ones; the search keeps the
                // largest divisor exponent that still has a valid multiplier.
                pair = Some(((pmul + 128) as u8, pdiv as u8));
            }
        }
        let (pmul, pdiv) = pair.ok_or(Error::AccelerationOutOfRange)?;

        self.ll
            .write_bytes(MotorRegister::PMulPDiv.address(motor), [0, pmul, pdiv])?;
        self.ll
            .write_short(MotorRegister::AMax.address(motor), a_max as i32)?;

        Ok(())
    }

    /// Stop a motor immediately
    ///
    /// Switches the motor to velocity mode and zeroes both its target and
    /// actual velocity. These are three sequential register writes with no
    /// atomicity across them; another controller accessing the same motor
    /// concurrently could observe a half-applied stop.
    pub fn hard_stop(&mut self, motor: Motor) -> Result<(), Error<SPI, CS>> {
        self.set_ramp_mode(motor, RampMode::Velocity)?;
        self.ll.write_zero(MotorRegister::VTarget.address(motor))?;
        self.ll.write_zero(MotorRegister::VActual.address(motor))?;

        Ok(())
    }

    /// Set the target position of a motor
    ///
    /// In [`RampMode::Ramp`] and [`RampMode::SoftRamp`], the ramp generator
    /// moves the motor to this position.
    pub fn set_target_position(
        &mut self,
        motor: Motor,
        position: i32,
    ) -> Result<(), Error<SPI, CS>> {
        self.ll
            .write_int(MotorRegister::XTarget.address(motor), position)?;
        Ok(())
    }

    /// Read the target position of a motor
    pub fn target_position(&mut self, motor: Motor) -> Result<i32, Error<SPI, CS>> {
        Ok(self.ll.read_int24(MotorRegister::XTarget.address(motor))?)
    }

    /// Read the actual position of a motor
    pub fn actual_position(&mut self, motor: Motor) -> Result<i32, Error<SPI, CS>> {
        Ok(self.ll.read_int24(MotorRegister::XActual.address(motor))?)
    }

    /// Read the position latched on a motor's last reference switch event
    pub fn latched_position(&mut self, motor: Motor) -> Result<i32, Error<SPI, CS>> {
        Ok(self.ll.read_int24(MotorRegister::XLatched.address(motor))?)
    }

    /// Set the target velocity of a motor
    ///
    /// In [`RampMode::Velocity`], the ramp generator accelerates the motor
    /// towards this velocity.
    pub fn set_target_velocity(
        &mut self,
        motor: Motor,
        velocity: i16,
    ) -> Result<(), Error<SPI, CS>> {
        self.ll
            .write_short(MotorRegister::VTarget.address(motor), i32::from(velocity))?;
        Ok(())
    }

    /// Read the target velocity of a motor
    pub fn target_velocity(&mut self, motor: Motor) -> Result<i32, Error<SPI, CS>> {
        Ok(self.ll.read_int12(MotorRegister::VTarget.address(motor))?)
    }

    /// Read the actual velocity of a motor
    pub fn actual_velocity(&mut self, motor: Motor) -> Result<i32, Error<SPI, CS>> {
        Ok(self.ll.read_int12(MotorRegister::VActual.address(motor))?)
    }

    /// Set the velocity range of a motor
    ///
    /// `v_min` is the velocity below which the motor stops instantly; `v_max`
    /// is the ceiling the ramp generator accelerates to. Both are masked to
    /// the registers' 11 bit range.
    pub fn set_velocity_range(
        &mut self,
        motor: Motor,
        v_min: u16,
        v_max: u16,
    ) -> Result<(), Error<SPI, CS>> {
        self.ll.write_short(
            MotorRegister::VMin.address(motor),
            i32::from(v_min & 0x07FF),
        )?;
        self.ll.write_int(
            MotorRegister::VMax.address(motor),
            i32::from(v_max & 0x07FF),
        )?;

        Ok(())
    }
}
