use std::error::Error;
use std::time::Duration;

use airmon_core::sampler::{AnalogSampler, PulseTiming};
use airmon_core::AirmonError;
use airmon_traits::clock::test_clock::TestClock;
use airmon_traits::{AnalogInput, Clock, DigitalOutput, Level};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Set(u8, Level),
    Read(u8),
}

/// Board that timestamps every call against the shared test clock.
struct RecordingBoard {
    clock: TestClock,
    events: Vec<(Duration, Event)>,
    codes: Vec<u16>,
    fail_on_read: Option<usize>,
    reads: usize,
}

impl RecordingBoard {
    fn new(clock: TestClock, codes: Vec<u16>) -> Self {
        Self {
            clock,
            events: Vec::new(),
            codes,
            fail_on_read: None,
            reads: 0,
        }
    }

    fn at(&self) -> Duration {
        self.clock.now() - self.clock.origin()
    }
}

impl AnalogInput for RecordingBoard {
    fn read_analog(&mut self, channel: u8) -> Result<u16, Box<dyn Error + Send + Sync>> {
        self.events.push((self.at(), Event::Read(channel)));
        let i = self.reads;
        self.reads += 1;
        if self.fail_on_read == Some(i) {
            return Err(Box::new(std::io::Error::other("adc glitch")));
        }
        Ok(self.codes[i % self.codes.len()])
    }
}

impl DigitalOutput for RecordingBoard {
    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.events.push((self.at(), Event::Set(pin, level)));
        Ok(())
    }
}

fn us(n: u64) -> Duration {
    Duration::from_micros(n)
}

#[test]
fn pulse_order_and_timing_per_sample() {
    let clock = TestClock::new();
    let mut board = RecordingBoard::new(clock.clone(), vec![600]);
    let sampler = AnalogSampler::new(PulseTiming {
        samples: 2,
        ..PulseTiming::default()
    });

    let stats = sampler
        .sample_with_actuator(&mut board, &clock, 1, 5)
        .unwrap();
    assert_eq!(stats.count, 2);

    // one pulse = 280 us settle + 40 us hold + 10 ms recovery
    let pulse = us(280 + 40 + 10_000);
    let expected = vec![
        (us(0), Event::Set(5, Level::Low)),
        (us(280), Event::Read(1)),
        (us(320), Event::Set(5, Level::High)),
        (pulse, Event::Set(5, Level::Low)),
        (pulse + us(280), Event::Read(1)),
        (pulse + us(320), Event::Set(5, Level::High)),
    ];
    assert_eq!(board.events, expected);
    assert_eq!(clock.total_slept(), pulse * 2);
}

#[test]
fn mean_min_max_over_window() {
    let clock = TestClock::new();
    let mut board = RecordingBoard::new(clock.clone(), vec![590, 600, 610, 600, 600]);
    let sampler = AnalogSampler::new(PulseTiming {
        samples: 5,
        ..PulseTiming::default()
    });
    let s = sampler.sample_with_actuator(&mut board, &clock, 1, 5).unwrap();
    assert_eq!((s.min, s.max, s.count), (590, 610, 5));
    assert!((s.mean - 600.0).abs() < 1e-3);
}

#[test]
fn active_high_actuator_inverts_levels() {
    let clock = TestClock::new();
    let mut board = RecordingBoard::new(clock.clone(), vec![100]);
    let sampler = AnalogSampler::new(PulseTiming {
        samples: 1,
        active: Level::High,
        ..PulseTiming::default()
    });
    sampler.sample_with_actuator(&mut board, &clock, 0, 9).unwrap();
    let sets: Vec<_> = board
        .events
        .iter()
        .filter_map(|(_, e)| match e {
            Event::Set(_, l) => Some(*l),
            Event::Read(_) => None,
        })
        .collect();
    assert_eq!(sets, vec![Level::High, Level::Low]);
}

#[test]
fn failed_read_switches_actuator_off_before_returning() {
    let clock = TestClock::new();
    let mut board = RecordingBoard::new(clock.clone(), vec![600]);
    board.fail_on_read = Some(1);
    let sampler = AnalogSampler::new(PulseTiming::default());

    let err = sampler
        .sample_with_actuator(&mut board, &clock, 1, 5)
        .unwrap_err();
    assert!(matches!(err, AirmonError::Hardware(_)));
    let last = board.events.last().copied().unwrap();
    assert_eq!(last.1, Event::Set(5, Level::High));
}

#[test]
fn zero_samples_is_a_config_error() {
    let clock = TestClock::new();
    let mut board = RecordingBoard::new(clock.clone(), vec![600]);
    let sampler = AnalogSampler::new(PulseTiming {
        samples: 0,
        ..PulseTiming::default()
    });
    let err = sampler
        .sample_with_actuator(&mut board, &clock, 1, 5)
        .unwrap_err();
    assert!(matches!(err, AirmonError::Config(_)));
    assert!(board.events.is_empty());
}
