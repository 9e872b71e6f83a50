//! Building register writes and sending them over I²C.
//!
//! Every transaction with the ADAU1361 starts with the two byte register
//! sub-address, high byte first. Writes then carry one or more payload bytes,
//! which the chip stores in consecutive registers.

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::BusAddress;

//
// Public Types
//

/// One complete write transaction: a register address and its payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterCommand {
    frame: [u8; MAX_FRAME],
    len: usize,
}

/// One row of a command table.
///
/// A row always carries exactly one payload byte. Tables are replayed in
/// order, so later rows may rely on earlier ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandRow {
    /// The register sub-address
    pub register: u16,
    /// The byte to write
    pub value: u8,
}

/// Reasons a [`RegisterCommand`] cannot be built.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A write must carry at least one byte
    EmptyPayload,
    /// The payload is wider than any ADAU1361 register
    PayloadTooLong,
}

/// A failed table write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TableError<E> {
    /// Index of the row that failed. Rows before it were written, rows after
    /// it were not.
    pub row: usize,
    /// The bus error for that row
    pub error: E,
}

/// A borrowed I²C bus, bound to the address of one ADAU1361.
///
/// The bus may be shared with other devices. Nothing here locks it, so the
/// caller must make sure no one else uses it until this is dropped.
pub struct ControlPort<'a, B> {
    bus: &'a mut B,
    address: u8,
}

//
// Public Data
//

/// The widest payload we can send in one frame (the PLL control register).
pub const MAX_PAYLOAD: usize = 6;

//
// Private Data
//

const MAX_FRAME: usize = MAX_PAYLOAD + 2;

//
// impls on Public Types
//

impl RegisterCommand {
    /// Build a write of `payload` to the register at `register`.
    pub fn new(register: u16, payload: &[u8]) -> Result<RegisterCommand, CommandError> {
        if payload.is_empty() {
            return Err(CommandError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD {
            return Err(CommandError::PayloadTooLong);
        }
        let mut frame = [0u8; MAX_FRAME];
        frame[..2].copy_from_slice(&register.to_be_bytes());
        frame[2..2 + payload.len()].copy_from_slice(payload);
        Ok(RegisterCommand {
            frame,
            len: payload.len() + 2,
        })
    }

    /// The register this command starts writing at.
    pub fn register(&self) -> u16 {
        u16::from_be_bytes([self.frame[0], self.frame[1]])
    }

    /// The bytes written after the address.
    pub fn payload(&self) -> &[u8] {
        &self.frame[2..self.len]
    }

    /// The whole frame, as it goes on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame[..self.len]
    }
}

impl CommandRow {
    /// Make a table row.
    pub const fn new(register: u16, value: u8) -> CommandRow {
        CommandRow { register, value }
    }

    /// The row as it goes on the wire.
    pub fn to_bytes(self) -> [u8; 3] {
        let [hi, lo] = self.register.to_be_bytes();
        [hi, lo, self.value]
    }
}

impl<'a, B, E> ControlPort<'a, B>
where
    B: Write<Error = E> + WriteRead<Error = E>,
{
    /// Bind a bus to a device address.
    pub fn new(bus: &'a mut B, address: BusAddress) -> ControlPort<'a, B> {
        ControlPort {
            bus,
            address: address.into(),
        }
    }

    /// Send one command. Bus errors are passed straight back.
    pub fn send(&mut self, command: &RegisterCommand) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "ADAU1361 write 0x{:04x} <- {=[u8]:x}",
            command.register(),
            command.payload()
        );
        self.bus.write(self.address, command.as_bytes())
    }

    /// Write a single byte register.
    pub fn write_register(&mut self, register: impl Into<u16>, value: u8) -> Result<(), E> {
        let row = CommandRow::new(register.into(), value);
        #[cfg(feature = "defmt")]
        defmt::debug!("ADAU1361 write 0x{:04x} <- 0x{:02x}", row.register, value);
        self.bus.write(self.address, &row.to_bytes())
    }

    /// Write every row of a table, in order.
    ///
    /// Stops at the first failure. The error says which row failed; nothing
    /// after it was sent.
    pub fn send_table(&mut self, rows: &[CommandRow]) -> Result<(), TableError<E>> {
        for (row, command) in rows.iter().enumerate() {
            self.write_register(command.register, command.value)
                .map_err(|error| {
                    #[cfg(feature = "defmt")]
                    defmt::error!("ADAU1361 table write failed at row {}", row);
                    TableError { row, error }
                })?;
        }
        Ok(())
    }

    /// Read `buffer.len()` consecutive bytes starting at `register`.
    pub fn read(&mut self, register: impl Into<u16>, buffer: &mut [u8]) -> Result<(), E> {
        let address = register.into().to_be_bytes();
        self.bus.write_read(self.address, &address, buffer)
    }

    /// Read one single byte register.
    pub fn read_register(&mut self, register: impl Into<u16>) -> Result<u8, E> {
        let mut buffer = [0u8; 1];
        self.read(register, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Change only the `mask` bits of a register to those in `value`.
    ///
    /// The current contents are read back from the chip first, so bits
    /// outside `mask` keep whatever value the chip holds. Returns the byte
    /// that was written.
    pub fn modify_register(
        &mut self,
        register: impl Into<u16>,
        value: u8,
        mask: u8,
    ) -> Result<u8, E> {
        let register = register.into();
        let current = self.read_register(register)?;
        let updated = (current & !mask) | (value & mask);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "ADAU1361 modify 0x{:04x}: 0x{:02x} -> 0x{:02x}",
            register,
            current,
            updated
        );
        self.bus
            .write(self.address, &CommandRow::new(register, updated).to_bytes())?;
        Ok(updated)
    }
}

//
// Tests
//


//
// End of file
//
