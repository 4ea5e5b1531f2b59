/// MIDI plumbing: inbound decoding, device registry and the midir transport
pub mod device;
pub mod transport;

pub use device::DeviceModel;
pub use transport::{list_ports, MidiTransport, TransportOptions};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// An inbound message, classified once at the transport boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Function button press (127) or release (0)
    Control { control: u8, value: u8 },
    /// Grid button press (127) or release (0)
    Note { note: u8, velocity: u8 },
    /// Anything else the device sent; dropped by the sequencer
    Unrecognized(Vec<u8>),
}

impl InboundEvent {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            [status, control, value, ..] if status & 0xF0 == CONTROL_CHANGE => {
                InboundEvent::Control {
                    control: *control,
                    value: *value,
                }
            }
            [status, note, velocity, ..] if status & 0xF0 == NOTE_ON => InboundEvent::Note {
                note: *note,
                velocity: *velocity,
            },
            [status, note, _, ..] if status & 0xF0 == NOTE_OFF => InboundEvent::Note {
                note: *note,
                velocity: 0,
            },
            _ => InboundEvent::Unrecognized(bytes.to_vec()),
        }
    }
}

/// Note On on channel 0, used for LED colours
pub fn led_on(id: u8, color: u8) -> [u8; 3] {
    [NOTE_ON, id & 0x7F, color & 0x7F]
}

/// Note Off on channel 0, switches an LED off
pub fn led_off(id: u8) -> [u8; 3] {
    [NOTE_OFF, id & 0x7F, 0]
}

pub fn note_on(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off(channel: u8, note: u8) -> [u8; 3] {
    [NOTE_OFF | (channel & 0x0F), note & 0x7F, 0]
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}
