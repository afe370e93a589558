//! Start-up configuration, read from YAML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock patch on the computer keyboard:
//!
//! ```yaml
//! controller: midi
//! lookahead: 0.005
//! midi:
//!   port: 0
//!   channel: 0
//! patch:
//!   waveform: sawtooth
//!   master_gain: 0.25
//!   amp_envelope:
//!     attack_time: 0.01
//!     decay_time: 0.3
//!     sustain_level: 0.6
//!     release_time: 0.8
//!   filter:
//!     type: lowpass
//!     cutoff_hz: 2000.0
//!     resonance: 4.0
//!   tuning:
//!     divisions: 19
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::synth::Patch;
use crate::SynthError;

/// Longest lookahead accepted, in seconds. Beyond this notes feel detached from keys.
pub const MAX_LOOKAHEAD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    #[default]
    Keyboard,
    Midi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Index into the MIDI input ports; `None` picks the first one.
    pub port: Option<usize>,
    /// Zero-based channel to listen on; `None` listens on all.
    pub channel: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub patch: Patch,
    pub controller: ControllerKind,
    pub midi: MidiConfig,
    /// Seconds added to the clock when stamping note events.
    pub lookahead: f64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SynthError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SynthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, SynthError> {
        // An empty document deserialises as null rather than an empty map
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if !(0.0..=MAX_LOOKAHEAD).contains(&self.lookahead) {
            return Err(SynthError::InvalidConfig(format!(
                "lookahead must be between 0 and {} seconds, got {}",
                MAX_LOOKAHEAD, self.lookahead
            )));
        }
        if let Some(channel) = self.midi.channel {
            if channel > 15 {
                return Err(SynthError::InvalidConfig(format!(
                    "midi channel must be 0-15, got {}",
                    channel
                )));
            }
        }
        self.patch
            .validate()
            .map_err(|err| SynthError::InvalidConfig(err.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, SynthError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
