//! Turning gains in dB into register codes.
//!
//! Each signal path has a left and a right register. The gain lives in a bit
//! field of that register; the other bits belong to something else (a mixer
//! enable, an amplifier mode, another input's gain) and are left alone by a
//! read-modify-write.
//!
//! | Path               | Registers | Field | Range            | Step    |
//! |--------------------|-----------|-------|------------------|---------|
//! | [`Path::LineInput`]      | R4 / R6   | [3:1] | -12 to +6 dB     | 3 dB    |
//! | [`Path::AuxInput`]       | R5 / R7   | [2:0] | -12 to +6 dB     | 3 dB    |
//! | [`Path::MicInput`]       | R8 / R9   | [7:2] | -12 to +35.25 dB | 0.75 dB |
//! | [`Path::LineOutput`]     | R31 / R32 | [7:2] | -57 to +6 dB     | 1 dB    |
//! | [`Path::HeadphoneOutput`]| R29 / R30 | [7:2] | -57 to +6 dB     | 1 dB    |
//!
//! Gains outside the range are clamped to the nearest end. Gains inside are
//! rounded to the nearest step, with exact halves going towards 0 dB.

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::command::ControlPort;
use crate::register::Register;

//
// Public Types
//

/// The signal paths whose gain we can set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Path {
    /// Line input, single-ended into the record mixer
    LineInput = 0,
    /// Aux input, into the record mixer
    AuxInput = 1,
    /// Microphone (differential) input, through the input PGA
    MicInput = 2,
    /// Line output
    LineOutput = 3,
    /// Headphone output
    HeadphoneOutput = 4,
}

/// The register codes for one gain request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quantized {
    /// Code for the left channel
    pub left: u8,
    /// Code for the right channel
    pub right: u8,
    /// False if the path is to be muted
    pub enabled: bool,
}

/// The last gain request applied to a path.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainSetting {
    /// Left gain in dB, as requested
    pub left_db: f32,
    /// Right gain in dB, as requested
    pub right_db: f32,
    /// Whether the path is muted
    pub muted: bool,
}

//
// Private Types
//

/// How a path is muted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mute {
    /// A bit next to the gain field. Set means audible.
    Bit(u8),
    /// Mixer inputs have no mute bit; a gain code of zero disconnects them.
    ZeroCode,
}

/// Where a path's gain lives and how it is encoded.
struct PathSpec {
    left: Register,
    right: Register,
    shift: u8,
    width: u8,
    min_code: u8,
    zero_code: u8,
    max_code: u8,
    step_db: f32,
    mute: Mute,
}

//
// Public Data
//

/// The paths set to 0 dB at the end of bring-up.
pub const EXPOSED_PATHS: [Path; 4] = [
    Path::LineInput,
    Path::AuxInput,
    Path::LineOutput,
    Path::HeadphoneOutput,
];

//
// Private Data
//

const LINE_INPUT: PathSpec = PathSpec {
    left: Register::RecordMixerLeft0,
    right: Register::RecordMixerRight0,
    shift: 1,
    width: 3,
    min_code: 1,
    zero_code: 5,
    max_code: 7,
    step_db: 3.0,
    mute: Mute::ZeroCode,
};

const AUX_INPUT: PathSpec = PathSpec {
    left: Register::RecordMixerLeft1,
    right: Register::RecordMixerRight1,
    shift: 0,
    width: 3,
    min_code: 1,
    zero_code: 5,
    max_code: 7,
    step_db: 3.0,
    mute: Mute::ZeroCode,
};

const MIC_INPUT: PathSpec = PathSpec {
    left: Register::LeftDiffInputVolume,
    right: Register::RightDiffInputVolume,
    shift: 2,
    width: 6,
    min_code: 0,
    zero_code: 16,
    max_code: 63,
    step_db: 0.75,
    mute: Mute::Bit(1 << 1),
};

const LINE_OUTPUT: PathSpec = PathSpec {
    left: Register::PlaybackLineOutLeft,
    right: Register::PlaybackLineOutRight,
    shift: 2,
    width: 6,
    min_code: 0,
    zero_code: 57,
    max_code: 63,
    step_db: 1.0,
    mute: Mute::Bit(1 << 1),
};

const HEADPHONE_OUTPUT: PathSpec = PathSpec {
    left: Register::PlaybackHeadphoneLeft,
    right: Register::PlaybackHeadphoneRight,
    shift: 2,
    width: 6,
    min_code: 0,
    zero_code: 57,
    max_code: 63,
    step_db: 1.0,
    mute: Mute::Bit(1 << 1),
};

//
// Public Functions
//

/// Work out the register codes for a gain request.
///
/// The left and right channels are done independently. Out of range gains
/// saturate; NaN is treated as 0 dB. The codes are computed even when
/// muting.
pub fn quantize(path: Path, left_db: f32, right_db: f32, mute: bool) -> Quantized {
    let spec = path.spec();
    Quantized {
        left: spec.code_for(left_db),
        right: spec.code_for(right_db),
        enabled: !mute,
    }
}

//
// impls on Public Types
//

impl Path {
    /// Every path, in index order.
    pub const ALL: [Path; 5] = [
        Path::LineInput,
        Path::AuxInput,
        Path::MicInput,
        Path::LineOutput,
        Path::HeadphoneOutput,
    ];

    /// The registers holding the left and right gain.
    pub fn registers(self) -> (Register, Register) {
        let spec = self.spec();
        (spec.left, spec.right)
    }

    /// The quietest and loudest gains, in dB.
    pub fn range_db(self) -> (f32, f32) {
        let spec = self.spec();
        (
            spec.db_for_code(spec.min_code),
            spec.db_for_code(spec.max_code),
        )
    }

    /// The size of one gain step, in dB.
    pub fn step_db(self) -> f32 {
        self.spec().step_db
    }

    /// The gain, in dB, that a code represents.
    pub fn db_for_code(self, code: u8) -> f32 {
        self.spec().db_for_code(code)
    }

    /// The bits of the gain register this path owns.
    pub fn register_mask(self) -> u8 {
        self.spec().mask()
    }

    /// The value of the owned bits for a given code and enable state.
    pub fn register_value(self, code: u8, enabled: bool) -> u8 {
        self.spec().encode(code, enabled)
    }

    fn spec(self) -> &'static PathSpec {
        match self {
            Path::LineInput => &LINE_INPUT,
            Path::AuxInput => &AUX_INPUT,
            Path::MicInput => &MIC_INPUT,
            Path::LineOutput => &LINE_OUTPUT,
            Path::HeadphoneOutput => &HEADPHONE_OUTPUT,
        }
    }
}

impl GainSetting {
    /// 0 dB on both channels, not muted.
    pub const UNITY: GainSetting = GainSetting {
        left_db: 0.0,
        right_db: 0.0,
        muted: false,
    };
}

impl Default for GainSetting {
    fn default() -> GainSetting {
        GainSetting::UNITY
    }
}

//
// impls on Private Types
//

impl PathSpec {
    fn field_mask(&self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.shift
    }

    fn mask(&self) -> u8 {
        match self.mute {
            Mute::Bit(bit) => self.field_mask() | bit,
            Mute::ZeroCode => self.field_mask(),
        }
    }

    fn encode(&self, code: u8, enabled: bool) -> u8 {
        let field = (code << self.shift) & self.field_mask();
        match self.mute {
            Mute::Bit(bit) if enabled => field | bit,
            Mute::Bit(_) => field,
            Mute::ZeroCode if enabled => field,
            Mute::ZeroCode => 0,
        }
    }

    fn db_for_code(&self, code: u8) -> f32 {
        (i32::from(code) - i32::from(self.zero_code)) as f32 * self.step_db
    }

    fn code_for(&self, db: f32) -> u8 {
        if db.is_nan() {
            return self.zero_code;
        }
        let steps = db / self.step_db;
        let magnitude = if steps < 0.0 { -steps } else { steps };
        // `as` saturates, so huge gains land on i32::MAX rather than wrapping
        let mut whole = magnitude as i32;
        if magnitude - whole as f32 > 0.5 {
            whole = whole.saturating_add(1);
        }
        let steps = if steps < 0.0 { -whole } else { whole };
        let code = i32::from(self.zero_code).saturating_add(steps);
        code.clamp(i32::from(self.min_code), i32::from(self.max_code)) as u8
    }
}

//
// Crate Functions
//

/// Write both channels of a path, one read-modify-write per register.
pub(crate) fn write<B, E>(
    port: &mut ControlPort<'_, B>,
    path: Path,
    quantized: Quantized,
) -> Result<(), E>
where
    B: Write<Error = E> + WriteRead<Error = E>,
{
    let spec = path.spec();
    let mask = spec.mask();
    port.modify_register(
        spec.left,
        spec.encode(quantized.left, quantized.enabled),
        mask,
    )?;
    port.modify_register(
        spec.right,
        spec.encode(quantized.right, quantized.enabled),
        mask,
    )?;
    Ok(())
}

//
// Tests
//


//
// End of file
//
