/// launchseq - a Launchpad step sequencer
///
/// This library provides the pieces for driving a grid controller as a drum sequencer:
/// - Grid addressing and the pad state machine
/// - Control surface mapping of inbound MIDI to intents
/// - The sequencer engine with its interleaved scan and input loops
/// - A midir transport for the controller and the sound output

pub mod config;
pub mod control;
pub mod error;
pub mod midi;
pub mod sequencer;
pub mod transport;

#[cfg(feature = "audition")]
pub mod audio;

// Re-export commonly used types
pub use config::Config;
pub use control::{ControlMap, Intent, TempoDirection};
pub use error::{Error, Result};
pub use midi::{midi_note_name, DeviceModel, InboundEvent, MidiTransport, TransportOptions};
pub use sequencer::drums::DrumSound;
pub use sequencer::grid::{coords_of, id_of, Coords, PadId};
pub use sequencer::pad::{Color, Pad, Palette};
pub use sequencer::playback::{Clock, SystemClock, VirtualClock};
pub use sequencer::{MuteRender, Sequencer, SequencerSettings, Step, TempoSettings};
pub use transport::Transport;

#[cfg(feature = "audition")]
pub use audio::AudioOutput;
