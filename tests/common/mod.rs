//! A pretend ADAU1361 on a pretend I²C bus.
//!
//! Holds a register map, logs every transaction, and can be told to fail a
//! write or to hold off PLL lock.

#![allow(dead_code)]

use std::collections::BTreeMap;

use adau1361::register::Register;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

/// The error our pretend bus reports (a missing ACK).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BusFault;

/// One logged bus transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write { register: u16, payload: Vec<u8> },
    Read { register: u16, len: usize },
}

pub struct FakeCodec {
    pub address: u8,
    pub registers: BTreeMap<u16, u8>,
    pub log: Vec<Op>,
    /// How many PLL status reads show "not locked" before lock. `None` means
    /// never lock.
    pub lock_after: Option<usize>,
    /// Log index of the first PLL status read that showed lock
    pub locked_at: Option<usize>,
    /// Fail the write with this index (counting writes only, from zero)
    pub fail_write: Option<usize>,
    lock_reads: usize,
    writes: usize,
}

/// Counts the sleeps it is asked for.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub calls: u32,
    pub total_us: u64,
}

pub const ADDRESS: u8 = 0x38;

impl FakeCodec {
    pub fn new() -> FakeCodec {
        FakeCodec {
            address: ADDRESS,
            registers: BTreeMap::new(),
            log: Vec::new(),
            lock_after: Some(0),
            locked_at: None,
            fail_write: None,
            lock_reads: 0,
            writes: 0,
        }
    }

    pub fn locking_after(reads: usize) -> FakeCodec {
        FakeCodec {
            lock_after: Some(reads),
            ..FakeCodec::new()
        }
    }

    pub fn register(&self, register: Register) -> u8 {
        self.registers.get(&register.addr()).copied().unwrap_or(0)
    }

    pub fn set_register(&mut self, register: Register, value: u8) {
        self.registers.insert(register.addr(), value);
    }

    /// Every write, as (register, payload).
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.log
            .iter()
            .filter_map(|op| match op {
                Op::Write { register, payload } => Some((*register, payload.clone())),
                Op::Read { .. } => None,
            })
            .collect()
    }

    /// Log indices of writes to one register with one value.
    pub fn positions_of_write(&self, register: Register, value: u8) -> Vec<usize> {
        self.log
            .iter()
            .enumerate()
            .filter(|(_, op)| {
                **op == Op::Write {
                    register: register.addr(),
                    payload: vec![value],
                }
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn lock_reads(&self) -> usize {
        self.lock_reads
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Write for FakeCodec {
    type Error = BusFault;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault> {
        if address != self.address || bytes.len() < 3 {
            return Err(BusFault);
        }
        let register = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.log.push(Op::Write {
            register,
            payload: bytes[2..].to_vec(),
        });
        let index = self.writes;
        self.writes += 1;
        if self.fail_write == Some(index) {
            return Err(BusFault);
        }
        for (offset, value) in bytes[2..].iter().enumerate() {
            self.registers.insert(register + offset as u16, *value);
        }
        Ok(())
    }
}

impl WriteRead for FakeCodec {
    type Error = BusFault;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusFault> {
        if address != self.address || bytes.len() != 2 {
            return Err(BusFault);
        }
        let register = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.log.push(Op::Read {
            register,
            len: buffer.len(),
        });
        for (offset, slot) in buffer.iter_mut().enumerate() {
            *slot = self
                .registers
                .get(&(register + offset as u16))
                .copied()
                .unwrap_or(0);
        }
        if register == Register::PllControl.addr() && buffer.len() == 6 {
            let locked = matches!(self.lock_after, Some(n) if self.lock_reads >= n);
            self.lock_reads += 1;
            if locked {
                buffer[5] |= 0x02;
                if self.locked_at.is_none() {
                    self.locked_at = Some(self.log.len() - 1);
                }
            } else {
                buffer[5] &= !0x02;
            }
        }
        Ok(())
    }
}

impl DelayUs<u32> for CountingDelay {
    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_us += u64::from(us);
    }
}
