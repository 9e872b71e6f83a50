//! The ADAU1361 register map.
//!
//! Every register is addressed with a 16-bit sub-address. Most registers are
//! one byte wide; the PLL control register is six bytes wide and must be
//! written as a single block.

//
// Public Types
//

/// The set of registers in the ADAU1361
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Register {
    /// R0 - Clock source, input frequency and core enable
    ClockControl = 0x4000,
    /// R1 - PLL control (6 bytes)
    PllControl = 0x4002,
    /// R2 - Digital microphone and jack detection
    MicJackDetect = 0x4008,
    /// R3 - Record power management
    RecordPowerManagement = 0x4009,
    /// R4 - Left record mixer: LINP/LINN gains and mixer enable
    RecordMixerLeft0 = 0x400A,
    /// R5 - Left record mixer: PGA boost and aux gain
    RecordMixerLeft1 = 0x400B,
    /// R6 - Right record mixer: LINP/LINN gains and mixer enable
    RecordMixerRight0 = 0x400C,
    /// R7 - Right record mixer: PGA boost and aux gain
    RecordMixerRight1 = 0x400D,
    /// R8 - Left differential input (PGA) volume
    LeftDiffInputVolume = 0x400E,
    /// R9 - Right differential input (PGA) volume
    RightDiffInputVolume = 0x400F,
    /// R10 - Microphone bias
    RecordMicBias = 0x4010,
    /// R15 - Serial port 0 (clock mode, format)
    SerialPort0 = 0x4015,
    /// R16 - Serial port 1 (bits per frame)
    SerialPort1 = 0x4016,
    /// R17 - Converter 0 (converter sample rate)
    Converter0 = 0x4017,
    /// R18 - Converter 1
    Converter1 = 0x4018,
    /// R19 - ADC control
    AdcControl = 0x4019,
    /// R20 - Left ADC digital volume
    LeftDigitalVolume = 0x401A,
    /// R21 - Right ADC digital volume
    RightDigitalVolume = 0x401B,
    /// R22 - Left playback mixer: DAC selection and mixer enable
    PlaybackMixerLeft0 = 0x401C,
    /// R23 - Left playback mixer: record mixer bypass gains
    PlaybackMixerLeft1 = 0x401D,
    /// R24 - Right playback mixer: DAC selection and mixer enable
    PlaybackMixerRight0 = 0x401E,
    /// R25 - Right playback mixer: record mixer bypass gains
    PlaybackMixerRight1 = 0x401F,
    /// R26 - Left line output mixer
    PlaybackLrMixerLeft = 0x4020,
    /// R27 - Right line output mixer
    PlaybackLrMixerRight = 0x4021,
    /// R28 - Mono output mixer
    PlaybackLrMixerMono = 0x4022,
    /// R29 - Left headphone volume, mute and headphone enable
    PlaybackHeadphoneLeft = 0x4023,
    /// R30 - Right headphone volume, mute and headphone mode
    PlaybackHeadphoneRight = 0x4024,
    /// R31 - Left line output volume, mute and mode
    PlaybackLineOutLeft = 0x4025,
    /// R32 - Right line output volume, mute and mode
    PlaybackLineOutRight = 0x4026,
    /// R33 - Mono output
    PlaybackMonoOutput = 0x4027,
    /// R34 - Pop and click suppression
    PopClickSuppression = 0x4028,
    /// R35 - Playback power management
    PlaybackPowerManagement = 0x4029,
    /// R36 - DAC control 0
    DacControl0 = 0x402A,
    /// R37 - DAC control 1 (left DAC volume)
    DacControl1 = 0x402B,
    /// R38 - DAC control 2 (right DAC volume)
    DacControl2 = 0x402C,
    /// R64 - Clock enable 0
    ClockEnable0 = 0x40F9,
    /// R65 - Clock enable 1
    ClockEnable1 = 0x40FA,
}

//
// Public Data
//

/// R0 with the core clock taken from MCLK and the core disabled. This is the
/// chip's power-on value.
pub const CLOCK_CONTROL_DEFAULT: u8 = 0x00;

/// R0 with the core clock taken from the PLL (CLKSRC), input rate 1024 fs
/// (INFREQ) and the core enabled (COREN).
pub const CLOCK_CONTROL_PLL: u8 = 0b0000_1111;

/// The PLL lock flag, in the last byte of the PLL control register.
pub const PLL_LOCK: u8 = 1 << 1;

/// The PLL enable bit, in the last byte of the PLL control register.
pub const PLL_ENABLE: u8 = 1 << 0;

/// The width of the PLL control register, in bytes.
pub const PLL_CONTROL_LEN: usize = 6;

//
// impls on Public Types
//

impl Register {
    /// The 16-bit sub-address of this register.
    pub const fn addr(self) -> u16 {
        self as u16
    }
}

impl From<Register> for u16 {
    fn from(register: Register) -> u16 {
        register.addr()
    }
}

//
// End of file
//
