//! The bring-up sequence.
//!
//! Reset -> clock from MCLK -> PLL configured -> PLL locked -> clock from PLL
//! -> board routing -> default gains -> ready.
//!
//! The core clock must not be switched to the PLL until the PLL reports lock.
//! Any failure stops the sequence where it is; nothing is undone.

use core::sync::atomic::AtomicBool;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::command::ControlPort;
use crate::gain::EXPOSED_PATHS;
use crate::pll::wait_for_lock;
use crate::register::{Register, CLOCK_CONTROL_DEFAULT, CLOCK_CONTROL_PLL};
use crate::{BoardProfile, Codec, Error, State};

impl<P> Codec<P>
where
    P: BoardProfile,
{
    /// Bring the ADAU1361 up and start the converters.
    ///
    /// Configures the PLL for the sample rate, waits for it to lock, moves the
    /// core clock onto it, replays the board routing table and then sets the
    /// line input, aux input, line output and headphone output to 0 dB,
    /// unmuted. Paths the board does not expose are left as the routing table
    /// set them.
    ///
    /// On failure the chip is left part configured; see [`Codec::state`] for
    /// how far it got. Calling this again starts over from the beginning.
    pub fn start<B, D, E>(&mut self, bus: &mut B, delay: &mut D) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
        D: DelayUs<u32>,
    {
        let never = AtomicBool::new(false);
        self.start_cancellable(bus, delay, &never)
    }

    /// As [`Codec::start`], but gives up with [`Error::Cancelled`] if
    /// `cancel` is set while waiting for the PLL to lock.
    pub fn start_cancellable<B, D, E>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        cancel: &AtomicBool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
        D: DelayUs<u32>,
    {
        #[cfg(feature = "defmt")]
        defmt::info!("ADAU1361 starting at {} Hz", self.rate.hz());
        self.state = State::Reset;
        let result = self.run_bring_up(bus, delay, cancel);
        #[cfg(feature = "defmt")]
        match &result {
            Ok(()) => defmt::info!("ADAU1361 ready"),
            Err(_) => defmt::error!("ADAU1361 bring-up stopped in state {}", self.state),
        }
        result
    }

    fn run_bring_up<B, D, E>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        cancel: &AtomicBool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
        D: DelayUs<u32>,
    {
        let mut port = ControlPort::new(&mut *bus, self.address);

        // Never run the core from an unconfigured PLL
        port.write_register(Register::ClockControl, CLOCK_CONTROL_DEFAULT)
            .map_err(Error::Bus)?;
        self.state = State::ClockSourceDefault;

        self.state = State::PllConfiguring;
        let pll = self.board.pll_settings(self.rate)?;
        port.send(&pll.command()?).map_err(Error::Bus)?;

        wait_for_lock(&mut port, delay, self.lock_policy, cancel)?;
        self.state = State::PllLocked;

        port.write_register(Register::ClockControl, CLOCK_CONTROL_PLL)
            .map_err(Error::Bus)?;
        self.state = State::ClockSourcePll;
        #[cfg(feature = "defmt")]
        defmt::info!("ADAU1361 core clock on PLL");

        self.state = State::BoardConfiguring;
        port.write_register(Register::Converter0, self.rate.converter_bits())
            .map_err(Error::Bus)?;
        let table = self.board.board_table()?;
        port.send_table(table)?;
        drop(port);

        for path in EXPOSED_PATHS {
            if !self.board.exposes(path) {
                continue;
            }
            self.apply_gain(bus, path, 0.0, 0.0, false)?;
        }
        self.state = State::Ready;
        Ok(())
    }
}

//
// End of file
//
