//! Control surface: turns classified inbound events into sequencer intents.
//!
//! Only full presses (value/velocity 127) do anything; releases are ignored.

use serde::{Deserialize, Serialize};

use crate::midi::InboundEvent;
use crate::sequencer::grid::{coords_of, Coords, PLAYABLE};

const FULL_PRESS: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoDirection {
    Up,
    Down,
}

/// A semantic action derived from one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ToggleRun,
    AdjustTempo(TempoDirection),
    ToggleRowMute(u8),
    TogglePadActive(Coords),
}

/// Control numbers of the function buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlMap {
    pub stop: u8,
    pub tempo_up: u8,
    pub tempo_down: u8,
}

impl Default for ControlMap {
    fn default() -> Self {
        // top-left arrows and the bottom button of the right column
        Self {
            stop: 19,
            tempo_up: 91,
            tempo_down: 92,
        }
    }
}

impl ControlMap {
    pub fn classify(&self, event: &InboundEvent) -> Option<Intent> {
        match *event {
            InboundEvent::Control { control, value } => self.classify_control(control, value),
            InboundEvent::Note { note, velocity } => classify_note(note, velocity),
            InboundEvent::Unrecognized(ref bytes) => {
                log::debug!("Dropping unrecognized message {:02X?}", bytes);
                None
            }
        }
    }

    fn classify_control(&self, control: u8, value: u8) -> Option<Intent> {
        if value != FULL_PRESS {
            return None;
        }

        if control == self.stop {
            return Some(Intent::ToggleRun);
        }
        if control == self.tempo_up {
            return Some(Intent::AdjustTempo(TempoDirection::Up));
        }
        if control == self.tempo_down {
            return Some(Intent::AdjustTempo(TempoDirection::Down));
        }

        // right column mutes its row
        let offset = i32::from(control) - 9;
        if offset % 10 == 0 {
            let row = offset / 10 - 1;
            if (0..i32::from(PLAYABLE)).contains(&row) {
                return Some(Intent::ToggleRowMute(row as u8));
            }
        }

        log::debug!("Ignoring control {}", control);
        None
    }
}

fn classify_note(note: u8, velocity: u8) -> Option<Intent> {
    if velocity != FULL_PRESS {
        return None;
    }
    match coords_of(note) {
        Ok(coords) => Some(Intent::TogglePadActive(coords)),
        Err(e) => {
            log::warn!("Ignoring press: {}", e);
            None
        }
    }
}
