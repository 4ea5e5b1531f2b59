/// Playback scheduling - the scan loop and the input drain interleaved on one thread
///
/// The scan loop only suspends inside [`Sequencer::wait_until`], which keeps
/// draining input until the beat deadline. Every mutation is therefore fully
/// applied before the next column is read, without locks.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::transport::Transport;

use super::Sequencer;

/// Floor for the input poll so a zero interval cannot spin
const MIN_POLL: Duration = Duration::from_micros(100);

/// Time source for the sequencer
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Clock that only moves when slept on. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    nanos: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

impl<T: Transport, C: Clock> Sequencer<T, C> {
    /// Scan columns until `shutdown` is raised, then tear down.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        log::info!(
            "Sequencer ready at {} bpm, press stop to start playback",
            self.tempo
        );
        self.next_beat = self.clock.now();
        while !shutdown.load(Ordering::SeqCst) {
            if !self.scan_once(shutdown) {
                break;
            }
        }
        log::info!("Shutting down");
        self.teardown();
    }

    /// Play the current column for one beat.
    ///
    /// Returns `false` if `shutdown` was raised while waiting; the column is
    /// then left blinking and not advanced.
    pub fn scan_once(&mut self, shutdown: &AtomicBool) -> bool {
        let step = self.begin_step();

        self.next_beat += self.beat_interval();
        let now = self.clock.now();
        if self.next_beat < now {
            log::debug!("Scan loop {:?} behind, resyncing", now - self.next_beat);
            self.next_beat = now;
        }

        if !self.wait_until(self.next_beat, shutdown) {
            return false;
        }
        self.end_step(&step);
        true
    }

    /// Drain input until `deadline`, yielding between drains.
    fn wait_until(&mut self, deadline: Duration, shutdown: &AtomicBool) -> bool {
        let poll = self.settings.input_poll.max(MIN_POLL);
        loop {
            self.drain_input();
            if shutdown.load(Ordering::SeqCst) {
                return false;
            }
            let now = self.clock.now();
            if now >= deadline {
                return true;
            }
            self.clock.sleep(poll.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::InboundEvent;
    use crate::sequencer::drums::DrumSound;
    use crate::sequencer::grid::id_of;
    use crate::sequencer::{SequencerSettings, TempoSettings};
    use crate::transport::testing::{Command, RecordingTransport};

    fn settings() -> SequencerSettings {
        SequencerSettings {
            splash: Duration::ZERO,
            ..SequencerSettings::default()
        }
    }

    fn press(note: u8) -> InboundEvent {
        InboundEvent::Note {
            note,
            velocity: 127,
        }
    }

    fn control(control: u8) -> InboundEvent {
        InboundEvent::Control {
            control,
            value: 127,
        }
    }

    #[test]
    fn test_virtual_clock_is_shared() {
        let clock = VirtualClock::new();
        let mut other = clock.clone();
        other.sleep(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_one_step_takes_one_beat() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(transport, clock.clone(), settings()).unwrap();
        seq.apply(crate::control::Intent::ToggleRun);
        let start = clock.now();
        let shutdown = AtomicBool::new(false);

        assert!(seq.scan_once(&shutdown));
        assert_eq!(clock.now() - start, Duration::from_millis(500));
        assert_eq!(seq.current_column(), 1);
    }

    #[test]
    fn test_stopped_loop_never_moves() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(transport, clock.clone(), settings()).unwrap();
        let shutdown = AtomicBool::new(false);

        for _ in 0..10 {
            assert!(seq.scan_once(&shutdown));
            assert_eq!(seq.current_column(), 0);
        }
    }

    #[test]
    fn test_beats_do_not_drift() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(
            transport,
            clock.clone(),
            SequencerSettings {
                input_poll: Duration::from_millis(3),
                ..settings()
            },
        )
        .unwrap();
        let start = clock.now();
        let shutdown = AtomicBool::new(false);

        // 500ms is not a multiple of the poll, the last sleep must be cut short
        for _ in 0..16 {
            seq.scan_once(&shutdown);
        }
        assert_eq!(clock.now() - start, Duration::from_secs(8));
    }

    #[test]
    fn test_tempo_change_applies_to_next_beat() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(
            transport.clone(),
            clock.clone(),
            SequencerSettings {
                tempo: TempoSettings {
                    step: 60,
                    ..TempoSettings::default()
                },
                ..settings()
            },
        )
        .unwrap();
        let start = clock.now();
        transport.script(start, control(91));
        let shutdown = AtomicBool::new(false);

        seq.scan_once(&shutdown);
        assert_eq!(seq.tempo(), 180);
        assert_eq!(clock.now() - start, Duration::from_millis(500));

        seq.scan_once(&shutdown);
        assert_eq!(
            clock.now() - start,
            Duration::from_millis(500) + Duration::from_nanos(333_333_333)
        );
    }

    #[test]
    fn test_pressed_pad_sounds_when_its_column_plays() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(transport.clone(), clock.clone(), settings()).unwrap();
        let start = clock.now();
        transport.clear_log();

        transport.script(start, press(63));
        transport.script(start, control(19));
        let shutdown = Arc::new(AtomicBool::new(false));
        // columns 0, 1 and 2 complete by +1.5s
        transport.stop_at(start + Duration::from_millis(1600), shutdown.clone());
        seq.run(&shutdown);

        let shared = transport.shared.borrow();
        assert_eq!(shared.sounds().len(), 1);
        assert_eq!(shared.sounds()[0].1, DrumSound::Clap);

        let pad = id_of(2, 5);
        assert_eq!(
            shared.led_history(pad),
            vec![Some(87), Some(107), Some(87), None]
        );
        assert!(!shared.ports_open);
    }

    #[test]
    fn test_shutdown_mid_step_still_clears_everything() {
        let clock = VirtualClock::new();
        let transport = RecordingTransport::new(clock.clone());
        let mut seq = Sequencer::new(transport.clone(), clock.clone(), settings()).unwrap();
        let start = clock.now();

        transport.script(start, press(11));
        let shutdown = Arc::new(AtomicBool::new(false));
        transport.stop_at(start + Duration::from_millis(200), shutdown.clone());
        seq.run(&shutdown);

        assert!(clock.now() - start < Duration::from_millis(500));
        let shared = transport.shared.borrow();
        assert!(shared.leds().values().all(|led| led.is_none()));
        assert_eq!(shared.leds().len(), 81);
        assert_eq!(shared.commands.last(), Some(&Command::Release));
    }
}
