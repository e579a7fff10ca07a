//! Mock SPI transport for driver tests
//!
//! Emulates the TMC429's SPI behavior closely enough to exercise the driver:
//! a register file keyed by address byte, the status byte shifted out first,
//! and write telegrams committed when chip select is released. A loopback
//! variant echoes every byte for tests of the raw exchange primitive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

/// Records operations performed on the mock transport
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Chip select pulled low
    SelectLow,
    /// Chip select released
    SelectHigh,
    /// One byte exchanged over the bus
    Byte {
        /// Byte the driver sent
        sent: u8,
        /// Byte the mock answered with
        received: u8,
    },
}

/// Shared state of the mock transport (uses interior mutability)
struct BusState {
    /// Simulated register file: write-form address byte -> payload bytes
    registers: HashMap<u8, [u8; 3]>,

    /// Status byte shifted out with the address byte of every telegram
    status: u8,

    /// Echo every byte back instead of emulating the register file
    loopback: bool,

    /// Operations log for verification
    operations: Vec<Operation>,

    /// Bytes of the telegram received since chip select went low
    telegram: Vec<u8>,

    /// Response bytes prepared when the address byte arrives
    response: [u8; 4],

    /// Failure injection flags
    fail_next_transfer: bool,
    fail_next_chip_select: bool,
}

impl BusState {
    fn new(loopback: bool) -> Self {
        Self {
            registers: HashMap::new(),
            status: 0,
            loopback,
            operations: Vec::new(),
            telegram: Vec::new(),
            response: [0; 4],
            fail_next_transfer: false,
            fail_next_chip_select: false,
        }
    }

    fn exchange_byte(&mut self, sent: u8) -> u8 {
        let received = if self.loopback {
            sent
        } else {
            let position = self.telegram.len();
            if position == 0 {
                // Address byte: prepare the response telegram. The payload of
                // a write access answer is unspecified; the mock returns
                // zeroes.
                let payload = if sent & 0x01 != 0 {
                    self.registers.get(&(sent & !0x01)).copied().unwrap_or([0; 3])
                } else {
                    [0; 3]
                };
                self.response = [self.status, payload[0], payload[1], payload[2]];
            }
            self.response[position.min(3)]
        };

        self.telegram.push(sent);
        self.operations.push(Operation::Byte { sent, received });

        received
    }

    fn release(&mut self) {
        // A write telegram takes effect when the transaction closes.
        if !self.loopback && self.telegram.len() == 4 && self.telegram[0] & 0x01 == 0 {
            self.registers.insert(
                self.telegram[0],
                [self.telegram[1], self.telegram[2], self.telegram[3]],
            );
        }
        self.telegram.clear();
        self.operations.push(Operation::SelectHigh);
    }
}

/// Handle to the mock transport's state, shared with the SPI and pin mocks
#[derive(Clone)]
pub struct MockBus {
    state: Rc<RefCell<BusState>>,
}

/// Mock SPI peripheral
pub struct MockSpi {
    state: Rc<RefCell<BusState>>,
}

/// Mock chip select pin
pub struct MockChipSelect {
    state: Rc<RefCell<BusState>>,
}

/// Mock transport error
#[derive(Debug, Clone, PartialEq)]
pub enum MockError {
    /// Simulated SPI bus error
    Transfer,
    /// Simulated pin error
    ChipSelect,
}

impl MockBus {
    /// Create a register-emulating mock transport
    pub fn new() -> (MockBus, MockSpi, MockChipSelect) {
        Self::with_state(BusState::new(false))
    }

    /// Create a loopback mock transport that echoes every byte
    #[allow(dead_code)]
    pub fn loopback() -> (MockBus, MockSpi, MockChipSelect) {
        Self::with_state(BusState::new(true))
    }

    fn with_state(state: BusState) -> (MockBus, MockSpi, MockChipSelect) {
        let state = Rc::new(RefCell::new(state));
        (
            MockBus {
                state: state.clone(),
            },
            MockSpi {
                state: state.clone(),
            },
            MockChipSelect { state },
        )
    }

    /// Set a register's payload bytes
    #[allow(dead_code)]
    pub fn set_register(&self, address: u8, payload: [u8; 3]) {
        self.state
            .borrow_mut()
            .registers
            .insert(address & !0x01, payload);
    }

    /// Get a register's payload bytes
    #[allow(dead_code)]
    pub fn register(&self, address: u8) -> [u8; 3] {
        self.state
            .borrow()
            .registers
            .get(&(address & !0x01))
            .copied()
            .unwrap_or([0; 3])
    }

    /// Set the status byte answered with every telegram
    #[allow(dead_code)]
    pub fn set_status(&self, status: u8) {
        self.state.borrow_mut().status = status;
    }

    /// Inject an SPI bus failure on the next transfer
    #[allow(dead_code)]
    pub fn fail_next_transfer(&self) {
        self.state.borrow_mut().fail_next_transfer = true;
    }

    /// Inject a pin failure on the next chip select change
    #[allow(dead_code)]
    pub fn fail_next_chip_select(&self) {
        self.state.borrow_mut().fail_next_chip_select = true;
    }

    /// Get the operations log
    #[allow(dead_code)]
    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    /// Clear the operations log
    #[allow(dead_code)]
    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }
}

impl Transfer<u8> for MockSpi {
    type Error = MockError;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        let mut state = self.state.borrow_mut();

        if state.fail_next_transfer {
            state.fail_next_transfer = false;
            return Err(MockError::Transfer);
        }

        for word in words.iter_mut() {
            *word = state.exchange_byte(*word);
        }

        Ok(words)
    }
}

impl OutputPin for MockChipSelect {
    type Error = MockError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();

        if state.fail_next_chip_select {
            state.fail_next_chip_select = false;
            return Err(MockError::ChipSelect);
        }

        state.operations.push(Operation::SelectLow);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();

        if state.fail_next_chip_select {
            state.fail_next_chip_select = false;
            return Err(MockError::ChipSelect);
        }

        state.release();
        Ok(())
    }
}
