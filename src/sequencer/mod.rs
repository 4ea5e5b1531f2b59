/// Core sequencer logic - pad grid, run state, tempo and the column scan
///
/// The [`Sequencer`] exclusively owns the grid and run state. Input is applied
/// through [`Sequencer::apply`]; the scan is driven from `playback`.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::control::{ControlMap, Intent, TempoDirection};
use crate::error::Result;
use crate::midi::InboundEvent;
use crate::transport::Transport;

pub mod drums;
pub mod grid;
pub mod pad;
pub mod playback;

use drums::DrumSound;
use grid::{all_ids, Grid, PadId, PLAYABLE};
use pad::{Color, Pad, Palette};
use playback::Clock;

/// Pads lit by the startup animation ("LSS")
const SPLASH: [u8; 13] = [61, 51, 41, 31, 32, 65, 54, 45, 34, 68, 57, 48, 37];

/// When a row mute is shown on the LEDs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MuteRender {
    /// Redraw the row as soon as it is toggled
    #[default]
    Immediate,
    /// Leave the LEDs alone until each column is next scanned
    NextPass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoSettings {
    pub default_bpm: u32,
    pub step: u32,
    pub min: u32,
    pub max: u32,
}

impl TempoSettings {
    /// Tempo after one adjust intent, kept within `min..=max`.
    pub fn adjust(&self, bpm: u32, direction: TempoDirection) -> u32 {
        let next = match direction {
            TempoDirection::Up => bpm.saturating_add(self.step),
            TempoDirection::Down => bpm.saturating_sub(self.step),
        };
        next.max(self.min).min(self.max).max(1)
    }
}

impl Default for TempoSettings {
    fn default() -> Self {
        Self {
            default_bpm: 120,
            step: 5,
            min: 20,
            max: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequencerSettings {
    pub tempo: TempoSettings,
    pub palette: Palette,
    pub controls: ControlMap,
    pub mute_render: MuteRender,
    /// Yield between two input drains
    pub input_poll: Duration,
    /// How long the startup animation stays lit
    pub splash: Duration,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            tempo: TempoSettings::default(),
            palette: Palette::default(),
            controls: ControlMap::default(),
            mute_render: MuteRender::default(),
            input_poll: Duration::from_millis(1),
            splash: Duration::from_millis(1500),
        }
    }
}

/// One column in flight: blinked, with its sound decisions already taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub column: u8,
    pub triggered: Vec<DrumSound>,
}

pub struct Sequencer<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    settings: SequencerSettings,
    grid: Grid,
    running: bool,
    tempo: u32,
    column: u8,
    next_beat: Duration,
    released: bool,
}

impl<T: Transport, C: Clock> Sequencer<T, C> {
    /// Handshake with the device, play the startup animation and come up stopped.
    ///
    /// A handshake failure is returned before any pad state exists.
    pub fn new(mut transport: T, clock: C, settings: SequencerSettings) -> Result<Self> {
        transport.handshake()?;

        let tempo = settings
            .tempo
            .default_bpm
            .max(settings.tempo.min)
            .min(settings.tempo.max)
            .max(1);
        let mut seq = Self {
            transport,
            clock,
            settings,
            grid: Grid::new(),
            running: false,
            tempo,
            column: 0,
            next_beat: Duration::ZERO,
            released: false,
        };

        seq.reset_pads();
        seq.show_splash();
        seq.reset_pads();
        seq.next_beat = seq.clock.now();
        Ok(seq)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn current_column(&self) -> u8 {
        self.column
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pad(&self, x: u8, y: u8) -> Option<&Pad> {
        self.grid.get(x, y)
    }

    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    /// Length of one step at the current tempo
    pub fn beat_interval(&self) -> Duration {
        Duration::from_nanos(60_000_000_000 / u64::from(self.tempo.max(1)))
    }

    /// Recreate all 81 pads and switch every LED off.
    pub fn reset_pads(&mut self) {
        self.grid = Grid::new();
        for id in all_ids() {
            self.render(id, Color::Off);
        }
    }

    fn show_splash(&mut self) {
        for &id in SPLASH.iter() {
            if let Some(color) = self.grid.by_id(id).map(Pad::blink_color) {
                self.render(PadId(id), color);
            }
        }
        self.clock.sleep(self.settings.splash);
    }

    fn render(&mut self, id: PadId, color: Color) {
        let result = match self.settings.palette.code(color) {
            Some(code) => self.transport.set_led(id, code),
            None => self.transport.clear_led(id),
        };
        if let Err(e) = result {
            log::warn!("LED update for pad {} dropped: {}", id, e);
        }
    }

    /// Classify one inbound event and apply the resulting intent, if any.
    pub fn handle_event(&mut self, event: &InboundEvent) {
        log::debug!("Inbound {:?}", event);
        if let Some(intent) = self.settings.controls.classify(event) {
            self.apply(intent);
        }
    }

    /// Apply everything the transport buffered, in arrival order.
    pub fn drain_input(&mut self) -> usize {
        let events = self.transport.drain_pending_events();
        for event in &events {
            self.handle_event(event);
        }
        events.len()
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::ToggleRun => {
                self.running = !self.running;
                log::info!("{}", if self.running { "Playing" } else { "Stopped" });
            }
            Intent::AdjustTempo(direction) => {
                let tempo = self.settings.tempo.adjust(self.tempo, direction);
                if tempo != self.tempo {
                    log::info!("Tempo {} -> {} bpm", self.tempo, tempo);
                }
                self.tempo = tempo;
            }
            Intent::ToggleRowMute(y) => {
                let changed: Vec<(PadId, Color)> = self
                    .grid
                    .row_mut(y)
                    .map(|pad| {
                        let color = pad.toggle_muted();
                        (pad.id(), color)
                    })
                    .collect();
                log::debug!("Row {} mute toggled", y);
                if self.settings.mute_render == MuteRender::Immediate {
                    for (id, color) in changed {
                        self.render(id, color);
                    }
                }
            }
            Intent::TogglePadActive(coords) => {
                let Some(pad) = self.grid.get_mut(coords.x, coords.y) else {
                    log::warn!("No pad at {:?}", coords);
                    return;
                };
                let color = pad.toggle_active();
                let id = pad.id();
                self.render(id, color);
            }
        }
    }

    /// Blink the current column and trigger its audible pads.
    ///
    /// Sound decisions are taken here, from the state at the top of the step;
    /// later mutations only affect the column's next pass.
    pub fn begin_step(&mut self) -> Step {
        let column = self.column;
        let running = self.running;
        let cells: Vec<(PadId, Color, Option<DrumSound>)> = self
            .grid
            .column(column)
            .map(|pad| {
                let sound = pad
                    .sound()
                    .filter(|_| pad.y() < PLAYABLE && pad.should_sound(running));
                (pad.id(), pad.blink_color(), sound)
            })
            .collect();

        let mut triggered = Vec::new();
        for (id, blink, sound) in cells {
            self.render(id, blink);
            if let Some(sound) = sound {
                log::debug!("Column {}: {}", column, sound);
                if let Err(e) = self.transport.emit_sound(sound) {
                    log::warn!("Sound trigger {} dropped: {}", sound, e);
                }
                triggered.push(sound);
            }
        }

        Step { column, triggered }
    }

    /// Restore the steady colours of `step`'s column and advance if running.
    pub fn end_step(&mut self, step: &Step) {
        let steady: Vec<(PadId, Color)> = self
            .grid
            .column(step.column)
            .map(|pad| (pad.id(), pad.rendered_color()))
            .collect();
        for (id, color) in steady {
            self.render(id, color);
        }

        if self.running {
            self.column = (self.column + 1) % PLAYABLE;
        }
    }

    /// Switch every LED off and release the ports. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for id in all_ids() {
            if let Err(e) = self.transport.clear_led(id) {
                log::debug!("Could not clear pad {} on teardown: {}", id, e);
            }
        }
        self.transport.release();
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<T: Transport, C: Clock> Drop for Sequencer<T, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
