/// Supported controller models
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Novation SysEx header shared by the MK3 family
const NOVATION_HEADER: [u8; 5] = [0xF0, 0x00, 0x20, 0x29, 0x02];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceModel {
    #[default]
    MiniMk3,
    X,
}

impl DeviceModel {
    pub fn all() -> &'static [DeviceModel] {
        &[DeviceModel::MiniMk3, DeviceModel::X]
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceModel::MiniMk3 => "Launchpad Mini MK3",
            DeviceModel::X => "Launchpad X",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DeviceModel::MiniMk3 => "mini-mk3",
            DeviceModel::X => "x",
        }
    }

    /// Substring identifying the device's MIDI ports (not its DAW ports)
    pub fn port_match(self) -> &'static str {
        match self {
            DeviceModel::MiniMk3 => "LPMiniMK3 MIDI",
            DeviceModel::X => "LPX MIDI",
        }
    }

    fn device_byte(self) -> u8 {
        match self {
            DeviceModel::MiniMk3 => 0x0D,
            DeviceModel::X => 0x0C,
        }
    }

    /// SysEx messages switching the device into programmer mode.
    pub fn handshake(self) -> Vec<Vec<u8>> {
        let sysex = |body: [u8; 2]| {
            let mut msg = NOVATION_HEADER.to_vec();
            msg.push(self.device_byte());
            msg.extend_from_slice(&body);
            msg.push(0xF7);
            msg
        };
        vec![sysex([0x00, 0x7F]), sysex([0x0E, 0x01])]
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DeviceModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceModel::all()
            .iter()
            .copied()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = DeviceModel::all().iter().map(|m| m.key()).collect();
                Error::Config(format!(
                    "unknown device '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mini_mk3_handshake() {
        assert_eq!(
            DeviceModel::MiniMk3.handshake(),
            vec![
                vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x00, 0x7F, 0xF7],
                vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x0E, 0x01, 0xF7],
            ]
        );
    }

    #[test]
    fn test_x_uses_its_own_device_byte() {
        for msg in DeviceModel::X.handshake() {
            assert_eq!(msg[5], 0x0C);
        }
    }

    #[test]
    fn test_parse_model() {
        assert_eq!("mini-mk3".parse::<DeviceModel>().unwrap(), DeviceModel::MiniMk3);
        assert_eq!("X".parse::<DeviceModel>().unwrap(), DeviceModel::X);
        assert!("launchkey".parse::<DeviceModel>().is_err());
    }
}
