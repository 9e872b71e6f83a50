//! What the chip driver cannot know on its own: the board's clock and wiring.
//!
//! Implement [`BoardProfile`] for your board and hand it to
//! [`Codec::new`](crate::Codec::new). The bring-up sequence asks it for PLL
//! settings, writes them, and later replays its routing table.

use crate::command::CommandRow;
use crate::gain::Path;
use crate::pll::{PllSettings, PLL_12MHZ_44K1, PLL_12MHZ_48K};
use crate::register::Register;
use crate::SampleRate;

//
// Public Types
//

/// Board specific knowledge needed to bring up an ADAU1361.
pub trait BoardProfile {
    /// The PLL settings that give the core clock for `rate` from this board's
    /// MCLK.
    ///
    /// See [`SampleRate::core_clock_hz`] and [`PllSettings::for_clocks`].
    fn pll_settings(&self, rate: SampleRate) -> Result<PllSettings, BoardError>;

    /// Register writes for this board's signal routing.
    ///
    /// These are replayed in order once the core clock is running from the
    /// PLL. They should power up what is wired, power down what is not, and
    /// leave every exposed path muted; the gains are set afterwards.
    fn board_table(&self) -> Result<&[CommandRow], BoardError>;

    /// Whether this board has something wired to a path.
    ///
    /// Most boards do not wire up the microphone input.
    fn exposes(&self, path: Path) -> bool {
        path != Path::MicInput
    }
}

/// Reasons a board cannot be configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// The board cannot clock the chip at this sample rate
    UnsupportedRate(SampleRate),
    /// The PLL settings are out of range for the chip
    InvalidPll,
}

/// The UMB-ADAU1361-A codec board.
///
/// * 12 MHz oscillator on MCLK
/// * Codec is the serial port bus master (generates BCLK and LRCLK)
/// * Line input on the single-ended negative inputs (LINN/RINN); the positive
///   and differential inputs are killed
/// * Aux input, line output and headphone output wired
/// * No mono output and no cross-channel paths
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Umb1361a;

//
// Public Data
//

/// The frequency of the UMB-ADAU1361-A master clock.
pub const UMB_1361A_MCLK_HZ: u32 = 12_000_000;

//
// Private Data
//

static UMB_1361A_TABLE: [CommandRow; 31] = [
    // Normal bias on the record side
    CommandRow::new(Register::RecordPowerManagement.addr(), 0x00),
    // Left and right playback channels powered, normal bias
    CommandRow::new(Register::PlaybackPowerManagement.addr(), 0x03),
    // Codec generates BCLK and LRCLK
    CommandRow::new(Register::SerialPort0.addr(), 0x01),
    // 64 bit clocks per frame
    CommandRow::new(Register::SerialPort1.addr(), 0x00),
    CommandRow::new(Register::Converter1.addr(), 0x00),
    // Both ADCs on, high-pass filter on
    CommandRow::new(Register::AdcControl.addr(), 0x13),
    // ADC digital volume 0 dB
    CommandRow::new(Register::LeftDigitalVolume.addr(), 0x00),
    CommandRow::new(Register::RightDigitalVolume.addr(), 0x00),
    // Both DACs on, DAC volume 0 dB
    CommandRow::new(Register::DacControl0.addr(), 0x03),
    CommandRow::new(Register::DacControl1.addr(), 0x00),
    CommandRow::new(Register::DacControl2.addr(), 0x00),
    // Record mixers on, LINP/RINP killed, LINN/RINN muted until gain is set
    CommandRow::new(Register::RecordMixerLeft0.addr(), 0x01),
    CommandRow::new(Register::RecordMixerRight0.addr(), 0x01),
    // PGA boost and aux muted
    CommandRow::new(Register::RecordMixerLeft1.addr(), 0x00),
    CommandRow::new(Register::RecordMixerRight1.addr(), 0x00),
    // PGA off, so the differential input is killed
    CommandRow::new(Register::LeftDiffInputVolume.addr(), 0x00),
    CommandRow::new(Register::RightDiffInputVolume.addr(), 0x00),
    CommandRow::new(Register::RecordMicBias.addr(), 0x00),
    // Left DAC into the left playback mixer only, no bypass
    CommandRow::new(Register::PlaybackMixerLeft0.addr(), 0x21),
    CommandRow::new(Register::PlaybackMixerLeft1.addr(), 0x00),
    // Right DAC into the right playback mixer only, no bypass
    CommandRow::new(Register::PlaybackMixerRight0.addr(), 0x41),
    CommandRow::new(Register::PlaybackMixerRight1.addr(), 0x00),
    // Line output mixers take their own side at 0 dB
    CommandRow::new(Register::PlaybackLrMixerLeft.addr(), 0x03),
    CommandRow::new(Register::PlaybackLrMixerRight.addr(), 0x09),
    // Mono mixer off
    CommandRow::new(Register::PlaybackLrMixerMono.addr(), 0x00),
    // Headphone amplifier on in headphone mode, muted
    CommandRow::new(Register::PlaybackHeadphoneLeft.addr(), 0x01),
    CommandRow::new(Register::PlaybackHeadphoneRight.addr(), 0x01),
    // Line outputs in line mode, muted
    CommandRow::new(Register::PlaybackLineOutLeft.addr(), 0x00),
    CommandRow::new(Register::PlaybackLineOutRight.addr(), 0x00),
    // Clock every block
    CommandRow::new(Register::ClockEnable0.addr(), 0x7F),
    CommandRow::new(Register::ClockEnable1.addr(), 0x03),
];

//
// impls on Public Types
//

impl BoardProfile for Umb1361a {
    fn pll_settings(&self, rate: SampleRate) -> Result<PllSettings, BoardError> {
        Ok(match rate {
            SampleRate::Fs44k1 => PLL_12MHZ_44K1,
            SampleRate::Fs32k | SampleRate::Fs48k | SampleRate::Fs96k => PLL_12MHZ_48K,
        })
    }

    fn board_table(&self) -> Result<&[CommandRow], BoardError> {
        Ok(&UMB_1361A_TABLE[..])
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umb_pll_matches_derived_settings() {
        for rate in SampleRate::ALL {
            assert_eq!(
                Umb1361a.pll_settings(rate),
                PllSettings::for_clocks(UMB_1361A_MCLK_HZ, rate.core_clock_hz())
            );
        }
    }

    #[test]
    fn umb_table_powers_up_before_routing() {
        let table = Umb1361a.board_table().unwrap();
        let power = table
            .iter()
            .position(|row| row.register == Register::PlaybackPowerManagement.addr())
            .unwrap();
        let headphone = table
            .iter()
            .position(|row| row.register == Register::PlaybackHeadphoneLeft.addr())
            .unwrap();
        assert!(power < headphone);
    }

    #[test]
    fn umb_does_not_expose_mic() {
        assert!(!Umb1361a.exposes(Path::MicInput));
        assert!(Umb1361a.exposes(Path::HeadphoneOutput));
    }
}

//
// End of file
//
