//! Bring-up sequencing, against a pretend chip.

mod common;

use core::sync::atomic::AtomicBool;

use adau1361::register::{Register, CLOCK_CONTROL_DEFAULT, CLOCK_CONTROL_PLL};
use adau1361::{
    BoardError, BoardProfile, BusAddress, Codec, CommandRow, Error, LockPolicy, Path,
    PllSettings, SampleRate, State, Umb1361a,
};
use common::{BusFault, CountingDelay, FakeCodec, Op};

/// Writes sent before the board table: R0, PLL, R0 again, R17.
const WRITES_BEFORE_TABLE: usize = 4;

fn umb(rate: SampleRate) -> Codec<Umb1361a> {
    Codec::new(Umb1361a, rate, BusAddress::DEFAULT)
}

struct NoClock;

impl BoardProfile for NoClock {
    fn pll_settings(&self, rate: SampleRate) -> Result<PllSettings, BoardError> {
        Err(BoardError::UnsupportedRate(rate))
    }

    fn board_table(&self) -> Result<&[CommandRow], BoardError> {
        Ok(&[])
    }
}

struct BadPll;

impl BoardProfile for BadPll {
    fn pll_settings(&self, _rate: SampleRate) -> Result<PllSettings, BoardError> {
        Ok(PllSettings {
            m: 0,
            n: 12,
            r: 4,
            x: 1,
            fractional: true,
        })
    }

    fn board_table(&self) -> Result<&[CommandRow], BoardError> {
        Ok(&[])
    }
}

/// Only the headphone output is wired.
struct HeadphonesOnly;

impl BoardProfile for HeadphonesOnly {
    fn pll_settings(&self, rate: SampleRate) -> Result<PllSettings, BoardError> {
        Umb1361a.pll_settings(rate)
    }

    fn board_table(&self) -> Result<&[CommandRow], BoardError> {
        Ok(&[])
    }

    fn exposes(&self, path: Path) -> bool {
        path == Path::HeadphoneOutput
    }
}

#[test]
fn start_reaches_ready_with_unity_gains() {
    let mut chip = FakeCodec::locking_after(2);
    let mut delay = CountingDelay::default();
    let mut codec = umb(SampleRate::Fs48k);
    assert_eq!(codec.state(), State::Reset);

    codec.start(&mut chip, &mut delay).unwrap();

    assert_eq!(codec.state(), State::Ready);
    assert_eq!(chip.register(Register::ClockControl), CLOCK_CONTROL_PLL);
    assert_eq!(chip.register(Register::Converter0), 0b000);
    // LINN at 0 dB, record mixer still enabled
    assert_eq!(chip.register(Register::RecordMixerLeft0), 0x0B);
    assert_eq!(chip.register(Register::RecordMixerRight0), 0x0B);
    // Aux at 0 dB
    assert_eq!(chip.register(Register::RecordMixerLeft1), 0x05);
    assert_eq!(chip.register(Register::RecordMixerRight1), 0x05);
    // Line out at 0 dB, unmuted, line mode
    assert_eq!(chip.register(Register::PlaybackLineOutLeft), 0xE6);
    assert_eq!(chip.register(Register::PlaybackLineOutRight), 0xE6);
    // Headphones at 0 dB, unmuted, amplifier still on
    assert_eq!(chip.register(Register::PlaybackHeadphoneLeft), 0xE7);
    assert_eq!(chip.register(Register::PlaybackHeadphoneRight), 0xE7);
    // Two reads without lock, so two sleeps
    assert_eq!(chip.lock_reads(), 3);
    assert_eq!(delay.calls, 2);
    assert_eq!(delay.total_us, 200);
}

#[test]
fn clock_moves_to_pll_only_after_lock() {
    let mut chip = FakeCodec::locking_after(4);
    let mut codec = umb(SampleRate::Fs48k);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();

    let default_clock = chip.positions_of_write(Register::ClockControl, CLOCK_CONTROL_DEFAULT);
    let pll_clock = chip.positions_of_write(Register::ClockControl, CLOCK_CONTROL_PLL);
    let first_pll_write = chip
        .log
        .iter()
        .position(|op| {
            matches!(op, Op::Write { register, .. } if *register == Register::PllControl.addr())
        })
        .unwrap();
    let locked_at = chip.locked_at.unwrap();

    assert_eq!(default_clock.len(), 1);
    assert_eq!(pll_clock.len(), 1);
    assert!(default_clock[0] < first_pll_write);
    assert!(first_pll_write < locked_at);
    assert!(locked_at < pll_clock[0]);
}

#[test]
fn pll_frame_follows_sample_rate() {
    let mut chip = FakeCodec::new();
    let mut codec = umb(SampleRate::Fs44k1);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();
    let pll_write = chip
        .writes()
        .into_iter()
        .find(|(register, _)| *register == Register::PllControl.addr())
        .unwrap();
    assert_eq!(pll_write.1, vec![0x02, 0x71, 0x01, 0xDD, 0x19, 0x01]);

    let mut chip = FakeCodec::new();
    let mut codec = umb(SampleRate::Fs96k);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();
    assert_eq!(chip.register(Register::Converter0), 0b110);

    let mut chip = FakeCodec::new();
    let mut codec = umb(SampleRate::Fs32k);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();
    assert_eq!(chip.register(Register::Converter0), 0b101);
}

#[test]
fn lock_timeout_is_bounded() {
    let mut chip = FakeCodec::new();
    chip.lock_after = None;
    let mut delay = CountingDelay::default();
    let mut codec = umb(SampleRate::Fs48k).with_lock_policy(LockPolicy {
        attempts: 5,
        interval_us: 10,
    });

    assert_eq!(
        codec.start(&mut chip, &mut delay),
        Err(Error::PllLockTimeout)
    );
    assert_eq!(codec.state(), State::PllConfiguring);
    assert_eq!(chip.lock_reads(), 5);
    // No sleep after the last read
    assert_eq!(delay.calls, 4);
    assert_eq!(delay.total_us, 40);
    assert!(chip
        .positions_of_write(Register::ClockControl, CLOCK_CONTROL_PLL)
        .is_empty());
}

#[test]
fn single_lock_read_never_sleeps() {
    let mut chip = FakeCodec::new();
    chip.lock_after = None;
    let mut delay = CountingDelay::default();
    let mut codec = umb(SampleRate::Fs48k).with_lock_policy(LockPolicy {
        attempts: 1,
        interval_us: 1_000,
    });

    assert_eq!(
        codec.start(&mut chip, &mut delay),
        Err(Error::PllLockTimeout)
    );
    assert_eq!(chip.lock_reads(), 1);
    assert_eq!(delay.calls, 0);
}

#[test]
fn start_only_sets_gains_the_board_exposes() {
    let mut chip = FakeCodec::new();
    let mut codec = Codec::new(HeadphonesOnly, SampleRate::Fs48k, BusAddress::DEFAULT);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();

    assert_eq!(codec.state(), State::Ready);
    // 0 dB is code 57, HPM set, HPEN untouched by the empty table
    assert_eq!(chip.register(Register::PlaybackHeadphoneLeft), 0xE6);
    for register in [
        Register::RecordMixerLeft0,
        Register::RecordMixerRight0,
        Register::RecordMixerLeft1,
        Register::RecordMixerRight1,
        Register::PlaybackLineOutLeft,
        Register::PlaybackLineOutRight,
    ] {
        assert!(!chip.log.iter().any(|op| match op {
            Op::Write { register: written, .. } | Op::Read { register: written, .. } =>
                *written == register.addr(),
        }));
    }
}

#[test]
fn cancelled_before_polling() {
    let mut chip = FakeCodec::new();
    let mut codec = umb(SampleRate::Fs48k);
    let cancel = AtomicBool::new(true);

    assert_eq!(
        codec.start_cancellable(&mut chip, &mut CountingDelay::default(), &cancel),
        Err(Error::Cancelled)
    );
    assert_eq!(chip.lock_reads(), 0);
    assert_eq!(codec.state(), State::PllConfiguring);
}

#[test]
fn table_failure_reports_row_and_stops() {
    let mut chip = FakeCodec::new();
    chip.fail_write = Some(WRITES_BEFORE_TABLE + 7);
    let mut codec = umb(SampleRate::Fs48k);

    assert_eq!(
        codec.start(&mut chip, &mut CountingDelay::default()),
        Err(Error::TableRow {
            row: 7,
            error: BusFault
        })
    );
    assert_eq!(codec.state(), State::BoardConfiguring);

    let table = Umb1361a.board_table().unwrap();
    let writes = chip.writes();
    assert_eq!(writes.len(), WRITES_BEFORE_TABLE + 8);
    let (last_register, _) = writes.last().unwrap();
    assert_eq!(*last_register, table[7].register);
    // Nothing at all after the failure, not even a read
    assert!(matches!(chip.log.last(), Some(Op::Write { .. })));
}

#[test]
fn missing_device_fails_first_write() {
    let mut chip = FakeCodec::new();
    let mut codec = Codec::new(Umb1361a, SampleRate::Fs48k, BusAddress::from_pins(true, true));

    assert_eq!(
        codec.start(&mut chip, &mut CountingDelay::default()),
        Err(Error::Bus(BusFault))
    );
    assert_eq!(codec.state(), State::Reset);
    assert!(chip.log.is_empty());
}

#[test]
fn board_errors_stop_before_pll_write() {
    let mut chip = FakeCodec::new();
    let mut codec = Codec::new(NoClock, SampleRate::Fs96k, BusAddress::DEFAULT);
    assert_eq!(
        codec.start(&mut chip, &mut CountingDelay::default()),
        Err(Error::Board(BoardError::UnsupportedRate(SampleRate::Fs96k)))
    );
    assert_eq!(codec.state(), State::PllConfiguring);
    assert_eq!(chip.writes().len(), 1);

    let mut chip = FakeCodec::new();
    let mut codec = Codec::new(BadPll, SampleRate::Fs48k, BusAddress::DEFAULT);
    assert_eq!(
        codec.start(&mut chip, &mut CountingDelay::default()),
        Err(Error::Board(BoardError::InvalidPll))
    );
    assert_eq!(chip.writes().len(), 1);
}

#[test]
fn failed_start_blocks_gain_changes() {
    let mut chip = FakeCodec::new();
    chip.lock_after = None;
    let mut codec = umb(SampleRate::Fs48k).with_lock_policy(LockPolicy {
        attempts: 1,
        interval_us: 1,
    });
    assert!(codec.start(&mut chip, &mut CountingDelay::default()).is_err());
    chip.clear_log();

    assert_eq!(
        codec.set_hp_output_gain(&mut chip, 0.0, 0.0, false),
        Err(Error::NotReady)
    );
    assert!(chip.log.is_empty());
}

#[test]
fn start_again_starts_over() {
    let mut chip = FakeCodec::new();
    let mut codec = umb(SampleRate::Fs48k);
    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();
    codec
        .set_hp_output_gain(&mut chip, -20.0, -20.0, false)
        .unwrap();
    chip.clear_log();

    codec.start(&mut chip, &mut CountingDelay::default()).unwrap();
    assert_eq!(codec.state(), State::Ready);
    assert_eq!(chip.log[0], Op::Write {
        register: Register::ClockControl.addr(),
        payload: vec![CLOCK_CONTROL_DEFAULT],
    });
    // The board table mutes the headphones again, then bring-up restores 0 dB
    assert_eq!(chip.register(Register::PlaybackHeadphoneLeft), 0xE7);
}
