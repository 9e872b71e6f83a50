//! The ADAU1361 PLL, and waiting for it to lock.
//!
//! The PLL turns the board's master clock (MCLK) into the 1024 × fs core
//! clock. In fractional mode the output is `MCLK / X × (R + N / M)`.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::board::BoardError;
use crate::command::{ControlPort, RegisterCommand};
use crate::register::{Register, PLL_CONTROL_LEN, PLL_ENABLE, PLL_LOCK};
use crate::Error;

//
// Public Types
//

/// The PLL coefficients.
///
/// Take the values from the tables in the datasheet, or work them out with
/// [`PllSettings::for_clocks`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllSettings {
    /// Fractional denominator
    pub m: u16,
    /// Fractional numerator
    pub n: u16,
    /// Integer part of the multiplier, 2 to 8
    pub r: u8,
    /// Input clock divider, 1 to 4
    pub x: u8,
    /// True for fractional mode, false for integer mode
    pub fractional: bool,
}

/// How long to wait for the PLL to lock.
///
/// The lock flag is read up to `attempts` times. Between reads that do not
/// show lock, we sleep for `interval_us` microseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockPolicy {
    /// Maximum number of lock flag reads
    pub attempts: u32,
    /// Sleep between reads, in microseconds
    pub interval_us: u32,
}

//
// Public Data
//

/// 12 MHz MCLK to a 49.152 MHz core clock (32 kHz, 48 kHz and 96 kHz).
///
/// See the PLL section of the datasheet.
pub const PLL_12MHZ_48K: PllSettings = PllSettings {
    m: 125,
    n: 12,
    r: 4,
    x: 1,
    fractional: true,
};

/// 12 MHz MCLK to a 45.1584 MHz core clock (44.1 kHz).
///
/// See the PLL section of the datasheet.
pub const PLL_12MHZ_44K1: PllSettings = PllSettings {
    m: 625,
    n: 477,
    r: 3,
    x: 1,
    fractional: true,
};

//
// Private Data
//

const PLL_INPUT_MIN_HZ: u64 = 8_000_000;
const PLL_INPUT_MAX_HZ: u64 = 27_000_000;

//
// impls on Public Types
//

impl PllSettings {
    /// Work out the coefficients that turn `mclk_hz` into `core_hz`.
    ///
    /// Uses the smallest input divider that puts the PLL input between 8 MHz
    /// and 27 MHz.
    pub fn for_clocks(mclk_hz: u32, core_hz: u32) -> Result<PllSettings, BoardError> {
        let mclk = u64::from(mclk_hz);
        let core = u64::from(core_hz);
        let x = (1..=4u64)
            .find(|x| mclk >= PLL_INPUT_MIN_HZ * x && mclk <= PLL_INPUT_MAX_HZ * x)
            .ok_or(BoardError::InvalidPll)?;
        // core = mclk / x * (r + n / m)
        let scaled = core * x;
        let r = scaled / mclk;
        let remainder = scaled % mclk;
        let r = u8::try_from(r).map_err(|_| BoardError::InvalidPll)?;
        let settings = if remainder == 0 {
            PllSettings {
                m: 0,
                n: 0,
                r,
                x: x as u8,
                fractional: false,
            }
        } else {
            let divisor = gcd(remainder, mclk);
            let n = remainder / divisor;
            let m = mclk / divisor;
            if m > u64::from(u16::MAX) {
                return Err(BoardError::InvalidPll);
            }
            PllSettings {
                m: m as u16,
                n: n as u16,
                r,
                x: x as u8,
                fractional: true,
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the coefficients are ones the chip accepts.
    pub fn validate(&self) -> Result<(), BoardError> {
        let r_ok = (2..=8).contains(&self.r);
        let x_ok = (1..=4).contains(&self.x);
        let fraction_ok = !self.fractional || (self.m != 0 && self.n < self.m);
        if r_ok && x_ok && fraction_ok {
            Ok(())
        } else {
            Err(BoardError::InvalidPll)
        }
    }

    /// The six bytes of the PLL control register, with the PLL enabled.
    ///
    /// Assumes the settings pass [`PllSettings::validate`]; out of range `r`
    /// and `x` values lose their high bits.
    pub fn frame(&self) -> [u8; PLL_CONTROL_LEN] {
        let [m_hi, m_lo] = self.m.to_be_bytes();
        let [n_hi, n_lo] = self.n.to_be_bytes();
        let config =
            (self.r << 3) | ((self.x.saturating_sub(1) & 0b11) << 1) | u8::from(self.fractional);
        [m_hi, m_lo, n_hi, n_lo, config, PLL_ENABLE]
    }

    /// The PLL control register write for these settings.
    ///
    /// Fails with [`BoardError::InvalidPll`] if the settings do not pass
    /// [`PllSettings::validate`].
    pub fn command(&self) -> Result<RegisterCommand, BoardError> {
        self.validate()?;
        RegisterCommand::new(Register::PllControl.addr(), &self.frame())
            .map_err(|_| BoardError::InvalidPll)
    }
}

impl LockPolicy {
    /// 100 reads, 100 µs apart.
    pub const DEFAULT: LockPolicy = LockPolicy {
        attempts: 100,
        interval_us: 100,
    };
}

impl Default for LockPolicy {
    fn default() -> LockPolicy {
        LockPolicy::DEFAULT
    }
}

//
// Crate Functions
//

/// Poll the PLL lock flag until it is set.
///
/// Gives up with [`Error::PllLockTimeout`] once the policy's attempts are
/// used, or [`Error::Cancelled`] if `cancel` is set before a read.
pub(crate) fn wait_for_lock<B, D, E>(
    port: &mut ControlPort<'_, B>,
    delay: &mut D,
    policy: LockPolicy,
    cancel: &AtomicBool,
) -> Result<(), Error<E>>
where
    B: Write<Error = E> + WriteRead<Error = E>,
    D: DelayUs<u32>,
{
    for attempt in 0..policy.attempts {
        if cancel.load(Ordering::Relaxed) {
            #[cfg(feature = "defmt")]
            defmt::warn!("ADAU1361 PLL lock wait cancelled");
            return Err(Error::Cancelled);
        }
        let mut status = [0u8; PLL_CONTROL_LEN];
        port.read(Register::PllControl, &mut status)
            .map_err(Error::Bus)?;
        if status[PLL_CONTROL_LEN - 1] & PLL_LOCK != 0 {
            #[cfg(feature = "defmt")]
            defmt::debug!("ADAU1361 PLL locked after {} reads", attempt + 1);
            return Ok(());
        }
        if attempt + 1 < policy.attempts {
            delay.delay_us(policy.interval_us);
        }
    }
    #[cfg(feature = "defmt")]
    defmt::warn!("ADAU1361 PLL did not lock in {} reads", policy.attempts);
    Err(Error::PllLockTimeout)
}

//
// Private Functions
//

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

//
// Tests
//


//
// End of file
//
