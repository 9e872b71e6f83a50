//! # ADAU1361 Driver
//!
//! This is driver for the Analog Devices ADAU1361 audio CODEC.
//!
//! Specifically, this driver is for setting the registers in the ADAU1361
//! over I²C - this driver does not handle the digital audio interface (I²S, or
//! similar).
//!
//! The ADAU1361 has the following inputs and outputs that we control:
//!
//! * Stereo analog Line-level Input
//! * Stereo analog Aux Input
//! * Stereo differential Microphone Input (if the board wires it up)
//! * Stereo analog Line-level Output
//! * Stereo analog Headphone Output
//!
//! Unlike some CODECs, the ADAU1361 registers can be read back. Gain changes
//! read the register they touch and only modify the bits belonging to that
//! path, because most of those registers also hold settings for other paths.
//!
//! What depends on the board (the MCLK frequency and which pins are wired) is
//! supplied through a [`BoardProfile`]. The [`Umb1361a`] profile covers the
//! UMB-ADAU1361-A board.
//!
//! The I²C bus is borrowed for each call, so it can be shared with other
//! devices. This driver does no locking: if other code also uses the bus, you
//! must stop it doing so while a call here is in progress.
//!
//! # Example
//!
//! You might setup the Codec like this:
//!
//! ```rust
//! # struct I2c;
//! # impl embedded_hal::blocking::i2c::Write for I2c {
//! #     type Error = ();
//! #     fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # impl embedded_hal::blocking::i2c::WriteRead for I2c {
//! #     type Error = ();
//! #     fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
//! #         // Pretend the PLL is already locked
//! #         buffer.fill(0x02);
//! #         Ok(())
//! #     }
//! # }
//! # struct Delay;
//! # impl embedded_hal::blocking::delay::DelayUs<u32> for Delay {
//! #     fn delay_us(&mut self, _us: u32) {}
//! # }
//! # let mut i2c = I2c;
//! # let mut delay = Delay;
//! let mut codec = adau1361::Codec::new(
//!     adau1361::Umb1361a,
//!     adau1361::SampleRate::Fs48k,
//!     adau1361::BusAddress::DEFAULT,
//! );
//! if let Err(e) = codec.start(&mut i2c, &mut delay) {
//!     // Codec didn't come up
//! }
//! if let Err(e) = codec.set_hp_output_gain(&mut i2c, -6.0, -6.0, false) {
//!     // Codec didn't respond
//! }
//! if let Err(e) = codec.set_line_input_gain(&mut i2c, 0.0, 0.0, true) {
//!     // Codec didn't respond
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]
#![deny(missing_docs)]

use embedded_hal::blocking::i2c::{Write, WriteRead};

pub mod board;
mod bring_up;
pub mod command;
pub mod gain;
pub mod pll;
pub mod register;

pub use board::{BoardError, BoardProfile, Umb1361a};
pub use command::{CommandError, CommandRow, ControlPort, RegisterCommand, TableError};
pub use gain::{quantize, GainSetting, Path, Quantized};
pub use pll::{LockPolicy, PllSettings};

//
// Public Types
//

/// The 7-bit I²C address of an ADAU1361.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(u8);

/// The sample rates we can run the converters at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    /// 32 kHz
    Fs32k,
    /// 44.1 kHz
    Fs44k1,
    /// 48 kHz
    Fs48k,
    /// 96 kHz
    Fs96k,
}

/// Where the bring-up sequence has got to.
///
/// If [`Codec::start`] fails, this is the last state it reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing has been written
    Reset,
    /// The core clock has been pointed at MCLK
    ClockSourceDefault,
    /// The PLL settings have been asked for and are being written
    PllConfiguring,
    /// The PLL reports lock
    PllLocked,
    /// The core clock is running from the PLL
    ClockSourcePll,
    /// The board routing table and the default gains are being written
    BoardConfiguring,
    /// Ready for gain changes
    Ready,
}

/// The ways in which talking to the ADAU1361 can fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The I²C bus reported an error
    Bus(E),
    /// The I²C bus reported an error part way through a command table
    TableRow {
        /// Index of the row that failed
        row: usize,
        /// The bus error
        error: E,
    },
    /// The board profile could not supply a valid configuration
    Board(BoardError),
    /// A register command could not be built
    Command(CommandError),
    /// The PLL did not lock in the time allowed
    PllLockTimeout,
    /// Bring-up was cancelled while waiting for the PLL
    Cancelled,
    /// [`Codec::start`] has not completed
    NotReady,
    /// The board has nothing wired to this path
    Unsupported(Path),
}

/// Represents our ADAU1361 chip, and the board it sits on.
///
/// Call [`Codec::start`] once, then set gains as required.
pub struct Codec<P> {
    address: BusAddress,
    rate: SampleRate,
    board: P,
    lock_policy: LockPolicy,
    state: State,
    gains: [GainSetting; NUM_PATHS],
}

//
// Private Data
//

const NUM_PATHS: usize = Path::ALL.len();

//
// impls on Public Types
//

impl BusAddress {
    /// The address with both ADDR pins low.
    pub const DEFAULT: BusAddress = BusAddress(0x38);

    /// Use any 7-bit address.
    ///
    /// Returns `None` if the value does not fit in 7 bits.
    pub const fn new(address: u8) -> Option<BusAddress> {
        if address <= 0x7F {
            Some(BusAddress(address))
        } else {
            None
        }
    }

    /// The address selected by the ADDR0 and ADDR1 pins.
    pub const fn from_pins(addr0_high: bool, addr1_high: bool) -> BusAddress {
        BusAddress(0x38 | ((addr1_high as u8) << 1) | (addr0_high as u8))
    }
}

impl From<BusAddress> for u8 {
    fn from(addr: BusAddress) -> u8 {
        addr.0
    }
}

impl SampleRate {
    /// Every rate we support.
    pub const ALL: [SampleRate; 4] = [
        SampleRate::Fs32k,
        SampleRate::Fs44k1,
        SampleRate::Fs48k,
        SampleRate::Fs96k,
    ];

    /// The sample rate in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            SampleRate::Fs32k => 32_000,
            SampleRate::Fs44k1 => 44_100,
            SampleRate::Fs48k => 48_000,
            SampleRate::Fs96k => 96_000,
        }
    }

    /// The core clock the PLL must produce: 1024 × the base rate of this
    /// rate's family.
    pub const fn core_clock_hz(self) -> u32 {
        match self {
            SampleRate::Fs44k1 => 1024 * 44_100,
            SampleRate::Fs32k | SampleRate::Fs48k | SampleRate::Fs96k => 1024 * 48_000,
        }
    }

    /// The converter rate (CONVSR) bits for register R17.
    pub const fn converter_bits(self) -> u8 {
        match self {
            // base rate / 1.5
            SampleRate::Fs32k => 0b101,
            SampleRate::Fs44k1 | SampleRate::Fs48k => 0b000,
            // base rate × 2
            SampleRate::Fs96k => 0b110,
        }
    }
}

impl<E> From<BoardError> for Error<E> {
    fn from(error: BoardError) -> Error<E> {
        Error::Board(error)
    }
}

impl<E> From<CommandError> for Error<E> {
    fn from(error: CommandError) -> Error<E> {
        Error::Command(error)
    }
}

impl<E> From<TableError<E>> for Error<E> {
    fn from(error: TableError<E>) -> Error<E> {
        Error::TableRow {
            row: error.row,
            error: error.error,
        }
    }
}

impl<P> Codec<P>
where
    P: BoardProfile,
{
    /// Create a new ADAU1361 CODEC proxy object.
    ///
    /// Nothing is sent to the chip until you call [`Codec::start`].
    pub fn new(board: P, rate: SampleRate, address: BusAddress) -> Codec<P> {
        Codec {
            address,
            rate,
            board,
            lock_policy: LockPolicy::DEFAULT,
            state: State::Reset,
            gains: [GainSetting::UNITY; NUM_PATHS],
        }
    }

    /// Change how long [`Codec::start`] waits for the PLL to lock.
    pub fn with_lock_policy(mut self, lock_policy: LockPolicy) -> Codec<P> {
        self.lock_policy = lock_policy;
        self
    }

    /// Where bring-up has got to.
    pub fn state(&self) -> State {
        self.state
    }

    /// The sample rate this codec was created for.
    pub fn sample_rate(&self) -> SampleRate {
        self.rate
    }

    /// The I²C address of the chip.
    pub fn address(&self) -> BusAddress {
        self.address
    }

    /// The board profile.
    pub fn board(&self) -> &P {
        &self.board
    }

    /// The last gain applied to a path.
    ///
    /// This is the gain as requested, before it was rounded and clamped.
    pub fn gain(&self, path: Path) -> GainSetting {
        self.gains[path as usize]
    }

    /// Set the line input gain, in dB, and whether it is muted.
    ///
    /// Gains outside -12 dB to +6 dB are clamped. Other inputs are left as
    /// they are; mute them explicitly if you don't want them. This input has
    /// no mute bit, so while muted its gain code on the chip is 000.
    pub fn set_line_input_gain<B, E>(
        &mut self,
        bus: &mut B,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        self.set_gain(bus, Path::LineInput, left_db, right_db, mute)
    }

    /// Set the aux input gain, in dB, and whether it is muted.
    ///
    /// Gains outside -12 dB to +6 dB are clamped. This input has no mute bit,
    /// so while muted its gain code on the chip is 000.
    pub fn set_aux_input_gain<B, E>(
        &mut self,
        bus: &mut B,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        self.set_gain(bus, Path::AuxInput, left_db, right_db, mute)
    }

    /// Set the microphone input gain, in dB, and whether it is muted.
    ///
    /// Gains outside -12 dB to +35.25 dB are clamped. Fails with
    /// [`Error::Unsupported`] unless the board wires up the microphone input.
    pub fn set_mic_input_gain<B, E>(
        &mut self,
        bus: &mut B,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        self.set_gain(bus, Path::MicInput, left_db, right_db, mute)
    }

    /// Set the line output gain, in dB, and whether it is muted.
    ///
    /// Gains outside -57 dB to +6 dB are clamped.
    pub fn set_line_output_gain<B, E>(
        &mut self,
        bus: &mut B,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        self.set_gain(bus, Path::LineOutput, left_db, right_db, mute)
    }

    /// Set the headphone output gain, in dB, and whether it is muted.
    ///
    /// Gains outside -57 dB to +6 dB are clamped.
    pub fn set_hp_output_gain<B, E>(
        &mut self,
        bus: &mut B,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        self.set_gain(bus, Path::HeadphoneOutput, left_db, right_db, mute)
    }

    /// Set the gain of any path, in dB, and whether it is muted.
    ///
    /// Writes the left and right registers of the path, touching only the
    /// bits that belong to it.
    pub fn set_gain<B, E>(
        &mut self,
        bus: &mut B,
        path: Path,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        if self.state != State::Ready {
            return Err(Error::NotReady);
        }
        if !self.board.exposes(path) {
            return Err(Error::Unsupported(path));
        }
        self.apply_gain(bus, path, left_db, right_db, mute)
    }

    /// Mute or unmute a path, keeping its last gain.
    pub fn set_mute<B, E>(&mut self, bus: &mut B, path: Path, mute: bool) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        let GainSetting {
            left_db, right_db, ..
        } = self.gain(path);
        self.set_gain(bus, path, left_db, right_db, mute)
    }

    /// Quantize and write a gain, with no state checks.
    fn apply_gain<B, E>(
        &mut self,
        bus: &mut B,
        path: Path,
        left_db: f32,
        right_db: f32,
        mute: bool,
    ) -> Result<(), Error<E>>
    where
        B: Write<Error = E> + WriteRead<Error = E>,
    {
        let quantized = quantize(path, left_db, right_db, mute);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "ADAU1361 {} gain {}/{} dB -> codes {}/{}, enabled {}",
            path,
            left_db,
            right_db,
            quantized.left,
            quantized.right,
            quantized.enabled
        );
        let mut port = ControlPort::new(bus, self.address);
        gain::write(&mut port, path, quantized).map_err(Error::Bus)?;
        self.gains[path as usize] = GainSetting {
            left_db,
            right_db,
            muted: mute,
        };
        Ok(())
    }
}

//
// End of file
//
