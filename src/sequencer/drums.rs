/// General MIDI drum notes assigned to the playable rows
use std::fmt;

use crate::midi::midi_note_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumSound {
    Kick,
    Snare,
    Clap,
    HiHatClosed,
    HiHatOpen,
    Crash,
    TomMid,
    Ride,
}

impl DrumSound {
    /// The note sent to the sound output.
    pub fn note(self) -> u8 {
        match self {
            DrumSound::Kick => 36,
            DrumSound::Snare => 38,
            DrumSound::Clap => 39,
            DrumSound::HiHatClosed => 42,
            DrumSound::TomMid => 43,
            DrumSound::HiHatOpen => 44,
            DrumSound::Crash => 49,
            DrumSound::Ride => 51,
        }
    }

    /// Sound assigned to row `y`, top row first. The function row has none.
    pub fn for_row(y: u8) -> Option<Self> {
        match y {
            7 => Some(DrumSound::Kick),
            6 => Some(DrumSound::Snare),
            5 => Some(DrumSound::Clap),
            4 => Some(DrumSound::HiHatClosed),
            3 => Some(DrumSound::HiHatOpen),
            2 => Some(DrumSound::Crash),
            1 => Some(DrumSound::TomMid),
            0 => Some(DrumSound::Ride),
            _ => None,
        }
    }
}

impl fmt::Display for DrumSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrumSound::Kick => "kick",
            DrumSound::Snare => "snare",
            DrumSound::Clap => "clap",
            DrumSound::HiHatClosed => "closed hi-hat",
            DrumSound::HiHatOpen => "open hi-hat",
            DrumSound::Crash => "crash",
            DrumSound::TomMid => "mid tom",
            DrumSound::Ride => "ride",
        };
        write!(f, "{} ({})", name, midi_note_name(self.note()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_playable_row_has_a_distinct_sound() {
        let mut notes: Vec<u8> = (0..8)
            .map(|y| DrumSound::for_row(y).unwrap().note())
            .collect();
        notes.sort();
        notes.dedup();
        assert_eq!(notes.len(), 8);
    }

    #[test]
    fn test_function_row_is_silent() {
        assert_eq!(DrumSound::for_row(8), None);
    }

    #[test]
    fn test_display_includes_note_name() {
        assert_eq!(DrumSound::Kick.to_string(), "kick (C2)");
    }
}
