/// Transport over midir: the controller's ports plus a sound output port
use crossbeam_channel::{unbounded, Receiver};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::{Error, Result};
use crate::sequencer::drums::DrumSound;
use crate::sequencer::grid::PadId;
use crate::transport::Transport;

use super::{led_off, led_on, note_off, note_on, DeviceModel, InboundEvent};

const CLIENT_NAME: &str = "launchseq";

/// Where to find the controller and where to send drum triggers
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub model: DeviceModel,
    /// Substring overriding the model's port match
    pub port: Option<String>,
    /// Name of the virtual port created for the sound output
    pub output_name: String,
    /// Existing port to send drum triggers to instead of a virtual one
    pub connect_to: Option<String>,
    pub channel: u8,
    pub velocity: u8,
}

pub struct MidiTransport {
    model: DeviceModel,
    device_in: Option<MidiInputConnection<()>>,
    device_out: Option<MidiOutputConnection>,
    sound_out: Option<MidiOutputConnection>,
    events: Receiver<InboundEvent>,
    channel: u8,
    velocity: u8,
    #[cfg(feature = "audition")]
    audition: Option<crate::audio::AudioOutput>,
}

fn unavailable(e: impl std::fmt::Display) -> Error {
    Error::TransportUnavailable(e.to_string())
}

/// First port whose name contains `pattern`, case-insensitive.
fn find_port<T: MidiIO>(io: &T, pattern: &str) -> Result<(T::Port, String)> {
    let pattern_lower = pattern.to_lowercase();
    io.ports()
        .into_iter()
        .find_map(|port| {
            let name = io.port_name(&port).ok()?;
            name.to_lowercase()
                .contains(&pattern_lower)
                .then_some((port, name))
        })
        .ok_or_else(|| unavailable(format!("no MIDI port matching '{}'", pattern)))
}

fn send(conn: &mut Option<MidiOutputConnection>, bytes: &[u8]) -> Result<()> {
    match conn {
        Some(conn) => conn
            .send(bytes)
            .map_err(|e| Error::TransportWrite(e.to_string())),
        None => Err(Error::TransportWrite("port already released".to_string())),
    }
}

impl MidiTransport {
    pub fn open(options: &TransportOptions) -> Result<Self> {
        let pattern = options
            .port
            .clone()
            .unwrap_or_else(|| options.model.port_match().to_string());

        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(unavailable)?;
        midi_in.ignore(Ignore::All);
        let (in_port, in_name) = find_port(&midi_in, &pattern)?;

        let (tx, events) = unbounded();
        let device_in = midi_in
            .connect(
                &in_port,
                "launchseq-in",
                move |_timestamp, bytes, _| {
                    let event = InboundEvent::from_bytes(bytes);
                    log::trace!("[MIDI IN] {:?} -> {:?}", bytes, event);
                    let _ = tx.send(event);
                },
                (),
            )
            .map_err(unavailable)?;
        log::info!("Listening to {}", in_name);

        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;
        let (out_port, out_name) = find_port(&midi_out, &pattern)?;
        let device_out = midi_out
            .connect(&out_port, "launchseq-out")
            .map_err(unavailable)?;
        log::info!("Writing LEDs to {}", out_name);

        let sound_out = Self::open_sound_output(options)?;

        Ok(Self {
            model: options.model,
            device_in: Some(device_in),
            device_out: Some(device_out),
            sound_out: Some(sound_out),
            events,
            channel: options.channel,
            velocity: options.velocity,
            #[cfg(feature = "audition")]
            audition: None,
        })
    }

    fn open_sound_output(options: &TransportOptions) -> Result<MidiOutputConnection> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;

        if let Some(target) = &options.connect_to {
            let (port, name) = find_port(&midi_out, target)?;
            let conn = midi_out
                .connect(&port, "launchseq-sounds")
                .map_err(unavailable)?;
            log::info!("Sending drum triggers to {}", name);
            return Ok(conn);
        }

        let conn = create_virtual_output(midi_out, &options.output_name)?;
        log::info!("Created virtual output '{}'", options.output_name);
        Ok(conn)
    }

    /// Also play every drum trigger through the local audio output.
    #[cfg(feature = "audition")]
    pub fn set_audition(&mut self, audition: crate::audio::AudioOutput) {
        self.audition = Some(audition);
    }
}

#[cfg(unix)]
fn create_virtual_output(midi_out: MidiOutput, name: &str) -> Result<MidiOutputConnection> {
    use midir::os::unix::VirtualOutput;

    midi_out.create_virtual(name).map_err(unavailable)
}

#[cfg(not(unix))]
fn create_virtual_output(_midi_out: MidiOutput, _name: &str) -> Result<MidiOutputConnection> {
    Err(unavailable(
        "virtual MIDI ports are not supported on this platform; set output.connect_to",
    ))
}

impl Transport for MidiTransport {
    fn handshake(&mut self) -> Result<()> {
        for msg in self.model.handshake() {
            send(&mut self.device_out, &msg).map_err(unavailable)?;
        }
        log::info!("{} switched to programmer mode", self.model.name());
        Ok(())
    }

    fn set_led(&mut self, id: PadId, color: u8) -> Result<()> {
        send(&mut self.device_out, &led_on(id.0, color))
    }

    fn clear_led(&mut self, id: PadId) -> Result<()> {
        send(&mut self.device_out, &led_off(id.0))
    }

    fn drain_pending_events(&mut self) -> Vec<InboundEvent> {
        self.events.try_iter().collect()
    }

    fn emit_sound(&mut self, sound: DrumSound) -> Result<()> {
        #[cfg(feature = "audition")]
        if let Some(audition) = &self.audition {
            audition.trigger(sound);
        }
        let note = sound.note();
        send(&mut self.sound_out, &note_on(self.channel, note, self.velocity))?;
        send(&mut self.sound_out, &note_off(self.channel, note))
    }

    fn release(&mut self) {
        let mut closed = false;
        if let Some(conn) = self.device_in.take() {
            conn.close();
            closed = true;
        }
        if let Some(conn) = self.device_out.take() {
            conn.close();
            closed = true;
        }
        if let Some(conn) = self.sound_out.take() {
            conn.close();
            closed = true;
        }
        if closed {
            log::info!("MIDI ports released");
        }
    }
}

impl Drop for MidiTransport {
    fn drop(&mut self) {
        self.release();
    }
}

/// Names of every MIDI input and output port, for `list-ports`.
pub fn list_ports() -> Result<(Vec<String>, Vec<String>)> {
    fn names<T: MidiIO>(io: &T) -> Vec<String> {
        io.ports()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                io.port_name(p)
                    .unwrap_or_else(|_| format!("Unknown port {}", i))
            })
            .collect()
    }

    let midi_in = MidiInput::new("launchseq-probe").map_err(unavailable)?;
    let midi_out = MidiOutput::new("launchseq-probe").map_err(unavailable)?;
    Ok((names(&midi_in), names(&midi_out)))
}
