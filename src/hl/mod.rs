//! High-level interface to the TMC429
//!
//! The entry point to this API is [`UninitializedTmc429`]; its `init` method
//! configures the chip for step/direction operation and returns the ready
//! [`Tmc429`]. Please refer to the documentation there for more details.
//!
//! This module implements a high-level interface to the TMC429. This is the
//! recommended way to access the TMC429 using this crate, unless you need the
//! greater flexibility provided by the [register-level interface].
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

use crate::ll;

pub use error::*;
pub use ready::*;
pub use uninitialized::*;

mod error;
mod ready;
mod uninitialized;

/// Entry point to the TMC429 driver API
pub struct Tmc429<SPI, CS> {
    ll: ll::Tmc429<SPI, CS>,
}

// Can't be derived without putting requirements on `SPI` and `CS`.
impl<SPI, CS> fmt::Debug for Tmc429<SPI, CS> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tmc429 {{ .. }}")
    }
}
