/// Local audition of drum triggers using cpal
///
/// Every trigger also plays a short decaying tone on the default output
/// device, handy when no synth is listening on the sound port yet.
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::{Error, Result};
use crate::sequencer::drums::DrumSound;

/// One voice per playable row
const MAX_VOICES: usize = 8;

/// Seconds until a voice has decayed by 60dB
const VOICE_LENGTH: f32 = 0.15;

/// Drum notes sit too low to be heard as clicks
const TRANSPOSE: u8 = 24;

#[derive(Debug, Clone, Copy, Default)]
struct Voice {
    phase: f32,
    phase_inc: f32,
    amp: f32,
    alive: bool,
}

/// Fixed voice pool rendered inside the audio callback
struct Voices {
    voices: [Voice; MAX_VOICES],
    sample_rate: f32,
    decay: f32,
}

impl Voices {
    fn new(sample_rate: f32) -> Self {
        Self {
            voices: [Voice::default(); MAX_VOICES],
            sample_rate,
            decay: 0.001_f32.powf(1.0 / (VOICE_LENGTH * sample_rate)),
        }
    }

    fn trigger(&mut self, sound: DrumSound) {
        let frequency = midi_note_to_frequency(sound.note().saturating_add(TRANSPOSE));
        // steal the quietest voice when all are busy
        let slot = self
            .voices
            .iter()
            .position(|v| !v.alive)
            .unwrap_or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.amp.total_cmp(&b.1.amp))
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });
        self.voices[slot] = Voice {
            phase: 0.0,
            phase_inc: frequency / self.sample_rate,
            amp: 0.2,
            alive: true,
        };
    }

    fn next_sample(&mut self) -> f32 {
        let mut out = 0.0;
        for v in self.voices.iter_mut().filter(|v| v.alive) {
            out += (v.phase * 2.0 * std::f32::consts::PI).sin() * v.amp;
            v.phase += v.phase_inc;
            if v.phase >= 1.0 {
                v.phase -= 1.0;
            }
            v.amp *= self.decay;
            if v.amp < 0.0002 {
                v.alive = false;
            }
        }
        out
    }

    fn active(&self) -> usize {
        self.voices.iter().filter(|v| v.alive).count()
    }
}

pub struct AudioOutput {
    _stream: cpal::Stream,
    tx: Sender<DrumSound>,
}

impl AudioOutput {
    pub fn new() -> Result<Self> {
        let (tx, rx) = bounded(64);
        let stream = Self::setup_audio_stream(rx)?;
        Ok(Self {
            _stream: stream,
            tx,
        })
    }

    fn setup_audio_stream(rx: Receiver<DrumSound>) -> Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::TransportUnavailable("no default audio output".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| Error::TransportUnavailable(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let mut voices = Voices::new(sample_rate);
                device.build_output_stream(
                    &config.into(),
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        while let Ok(sound) = rx.try_recv() {
                            voices.trigger(sound);
                        }
                        for frame in data.chunks_mut(channels) {
                            let sample = voices.next_sample();
                            for out in frame.iter_mut() {
                                *out = sample;
                            }
                        }
                    },
                    |err| log::error!("Audio stream error: {}", err),
                    None,
                )
            }
            other => {
                return Err(Error::TransportUnavailable(format!(
                    "unsupported sample format {:?} (only f32)",
                    other
                )))
            }
        }
        .map_err(|e| Error::TransportUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| Error::TransportUnavailable(e.to_string()))?;
        log::info!("Auditioning drum triggers on the default audio output");
        Ok(stream)
    }

    pub fn trigger(&self, sound: DrumSound) {
        let _ = self.tx.try_send(sound);
    }
}

fn midi_note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_decays_to_silence() {
        let mut voices = Voices::new(1000.0);
        voices.trigger(DrumSound::Kick);
        assert_eq!(voices.active(), 1);
        for _ in 0..1000 {
            voices.next_sample();
        }
        assert_eq!(voices.active(), 0);
    }

    #[test]
    fn test_voice_pool_is_bounded() {
        let mut voices = Voices::new(44100.0);
        for _ in 0..20 {
            voices.trigger(DrumSound::Snare);
        }
        assert_eq!(voices.active(), MAX_VOICES);
    }

    #[test]
    fn test_a4_frequency() {
        assert!((midi_note_to_frequency(69) - 440.0).abs() < 1e-3);
    }
}
