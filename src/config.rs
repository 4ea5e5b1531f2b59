//! Configuration file support for launchseq
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/launchseq/config.toml`
//! - macOS: `~/Library/Application Support/launchseq/config.toml`
//! - Windows: `%APPDATA%\launchseq\config.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::control::ControlMap;
use crate::error::{Error, Result};
use crate::midi::{DeviceModel, TransportOptions};
use crate::sequencer::pad::Palette;
use crate::sequencer::{MuteRender, SequencerSettings, TempoSettings};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When row mutes show up on the LEDs
    pub mute_render: MuteRender,
    pub device: DeviceSettings,
    pub output: OutputSettings,
    pub tempo: TempoConfig,
    pub timing: TimingSettings,
    pub colors: ColorSettings,
    pub controls: ControlMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub model: DeviceModel,
    /// Substring matched against port names instead of the model's default
    pub port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Name of the virtual port drum triggers are sent to
    pub port_name: String,
    /// Existing port to connect to instead of creating a virtual one
    pub connect_to: Option<String>,
    pub channel: u8,
    pub velocity: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            port_name: "Launchpad Step Sequencer".to_string(),
            connect_to: None,
            channel: 0,
            velocity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub default_bpm: u32,
    pub step: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        let t = TempoSettings::default();
        Self {
            default_bpm: t.default_bpm,
            step: t.step,
            min: t.min,
            max: t.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub input_poll_ms: u64,
    pub splash_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            input_poll_ms: 1,
            splash_ms: 1500,
        }
    }
}

/// Launchpad palette indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub active: u8,
    pub muted: u8,
    pub blink: u8,
}

impl Default for ColorSettings {
    fn default() -> Self {
        let p = Palette::default();
        Self {
            active: p.active,
            muted: p.dimmed,
            blink: p.blink,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "launchseq") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG)?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.tempo;
        if t.min == 0 || t.min > t.max {
            return Err(Error::Config(format!(
                "tempo range {}..={} is empty or starts at zero",
                t.min, t.max
            )));
        }
        if !(t.min..=t.max).contains(&t.default_bpm) {
            return Err(Error::Config(format!(
                "default tempo {} outside {}..={}",
                t.default_bpm, t.min, t.max
            )));
        }
        if self.output.channel > 15 {
            return Err(Error::Config(format!(
                "MIDI channel {} out of range (0-15)",
                self.output.channel
            )));
        }
        if self.output.velocity == 0 || self.output.velocity > 127 {
            return Err(Error::Config(format!(
                "velocity {} out of range (1-127)",
                self.output.velocity
            )));
        }
        let c = &self.colors;
        if [c.active, c.muted, c.blink].iter().any(|&v| v > 127) {
            return Err(Error::Config("palette indices must be 0-127".to_string()));
        }
        if self.timing.input_poll_ms == 0 {
            return Err(Error::Config("input_poll_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn to_sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings {
            tempo: TempoSettings {
                default_bpm: self.tempo.default_bpm,
                step: self.tempo.step,
                min: self.tempo.min,
                max: self.tempo.max,
            },
            palette: Palette {
                active: self.colors.active,
                dimmed: self.colors.muted,
                blink: self.colors.blink,
            },
            controls: self.controls,
            mute_render: self.mute_render,
            input_poll: Duration::from_millis(self.timing.input_poll_ms),
            splash: Duration::from_millis(self.timing.splash_ms),
        }
    }

    pub fn to_transport_options(&self) -> TransportOptions {
        TransportOptions {
            model: self.device.model,
            port: self.device.port.clone(),
            output_name: self.output.port_name.clone(),
            connect_to: self.output.connect_to.clone(),
            channel: self.output.channel,
            velocity: self.output.velocity,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# launchseq configuration file

# When muting a row shows on the LEDs: "immediate" or "next-pass"
mute_render = "immediate"

[device]
# Controller model: "mini-mk3" or "x"
model = "mini-mk3"

# Substring of the MIDI port name, overrides the model default
# port = "LPMiniMK3 MIDI"

[output]
# Virtual MIDI port drum triggers are sent to
port_name = "Launchpad Step Sequencer"

# Send to an existing port instead (required where virtual ports are unavailable)
# connect_to = "loopMIDI Port"

# MIDI channel (0-15) and velocity (1-127) of drum triggers
channel = 0
velocity = 64

[tempo]
default_bpm = 120
# Change per press of the up/down arrows
step = 5
min = 20
max = 300

[timing]
# Pause between two reads of the controller input
input_poll_ms = 1
# How long the startup animation is shown
splash_ms = 1500

[colors]
# Launchpad palette indices (0-127)
active = 87
muted = 19
blink = 107

[controls]
# Control numbers of the function buttons
stop = 19
tempo_up = 91
tempo_down = 92
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            mute_render = "next-pass"
            [device]
            model = "x"
            [tempo]
            step = 1
            "#,
        )
        .unwrap();
        assert_eq!(parsed.device.model, DeviceModel::X);
        assert_eq!(parsed.mute_render, MuteRender::NextPass);
        assert_eq!(parsed.tempo.step, 1);
        assert_eq!(parsed.tempo.default_bpm, 120);
        assert_eq!(parsed.output.port_name, "Launchpad Step Sequencer");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.tempo.default_bpm = 96;
        config.output.connect_to = Some("IAC Driver".to_string());

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_tempo_range_is_rejected() {
        let mut config = Config::default();
        config.tempo.min = 200;
        config.tempo.max = 100;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.tempo.default_bpm = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tempo]\nstep = \"fast\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_settings_conversion() {
        let mut config = Config::default();
        config.colors.muted = 1;
        config.timing.splash_ms = 0;
        let settings = config.to_sequencer_settings();
        assert_eq!(settings.palette.dimmed, 1);
        assert_eq!(settings.splash, Duration::ZERO);
        assert_eq!(settings.tempo, TempoSettings::default());

        let options = config.to_transport_options();
        assert_eq!(options.model, DeviceModel::MiniMk3);
        assert_eq!(options.velocity, 64);
    }
}
