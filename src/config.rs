// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Keyboard configuration.

use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::layout::ACCIDENTAL_WIDTH_RATIO;
use crate::range::{NoteRange, NoteRangeInput, RangeError};

/// Typed error for config load/parse failures so callers can distinguish
/// e.g. file-not-found from parse errors without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Config value error: {0}")]
    Value(#[from] serde_json::Error),
}

/// Declarative keyboard setup. Every field has a default, so an empty config
/// yields a one-octave c4 to c5 keyboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyboardConfig {
    /// The range of keys to display. Accepts note names or raw numbers.
    #[serde(default = "default_note_range")]
    pub note_range: NoteRangeInput,

    /// Whether dragging across keys retriggers notes as the finger moves.
    #[serde(default)]
    pub glissando: bool,

    /// Width of accidental keys relative to natural keys.
    #[serde(default = "default_accidental_width_ratio")]
    pub accidental_width_ratio: f64,

    /// Playback volume, 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Whether to release all loaded samples when the keyboard goes away.
    #[serde(default = "default_auto_unload")]
    pub auto_unload_on_unmount: bool,
}

fn default_note_range() -> NoteRangeInput {
    NoteRangeInput::NamePair(["c4".to_string(), "c5".to_string()])
}

fn default_accidental_width_ratio() -> f64 {
    ACCIDENTAL_WIDTH_RATIO
}

fn default_volume() -> f32 {
    1.0
}

fn default_auto_unload() -> bool {
    true
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            note_range: default_note_range(),
            glissando: false,
            accidental_width_ratio: default_accidental_width_ratio(),
            volume: default_volume(),
            auto_unload_on_unmount: default_auto_unload(),
        }
    }
}

impl KeyboardConfig {
    /// Loads a config from a JSON/YAML/TOML file.
    pub fn from_file(path: &Path) -> Result<KeyboardConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?)
    }

    /// Deserializes a config from an in-memory JSON value, for callers
    /// embedding the keyboard behind a JSON boundary.
    pub fn from_value(value: serde_json::Value) -> Result<KeyboardConfig, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The validated, normalized note range.
    pub fn note_range(&self) -> Result<NoteRange, RangeError> {
        self.note_range.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = KeyboardConfig::default();
        let range = config.note_range().expect("default range is valid");
        assert_eq!(range.first, 60);
        assert_eq!(range.last, 72);
        assert!(!config.glissando);
        assert_eq!(config.accidental_width_ratio, 0.65);
        assert_eq!(config.volume, 1.0);
        assert!(config.auto_unload_on_unmount);
    }

    #[test]
    fn test_empty_value_uses_defaults() {
        let config = KeyboardConfig::from_value(json!({})).expect("empty config");
        assert_eq!(config.note_range().unwrap(), NoteRange::default());
    }

    #[test]
    fn test_note_range_as_names() {
        let config = KeyboardConfig::from_value(json!({
            "note_range": ["a0", "c8"],
            "glissando": true,
        }))
        .expect("valid config");
        let range = config.note_range().unwrap();
        assert_eq!(range.first, 21);
        assert_eq!(range.last, 108);
        assert!(config.glissando);
    }

    #[test]
    fn test_note_range_as_numbers() {
        let config = KeyboardConfig::from_value(json!({
            "note_range": { "first": 48, "last": 59 },
        }))
        .expect("valid config");
        let range = config.note_range().unwrap();
        assert_eq!(range.first, 48);
        assert_eq!(range.last, 59);
    }

    #[test]
    fn test_invalid_range_surfaces_error() {
        let config = KeyboardConfig::from_value(json!({
            "note_range": ["c5", "c4"],
        }))
        .expect("deserializes fine");
        assert!(config.note_range().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(KeyboardConfig::from_value(json!({ "not_a_field": 1 })).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("keyboard.json");
        std::fs::write(
            &path,
            r#"{ "note_range": ["c3", "c6"], "volume": 0.5 }"#,
        )
        .expect("write config");

        let config = KeyboardConfig::from_file(&path).expect("load config");
        let range = config.note_range().unwrap();
        assert_eq!(range.first, 48);
        assert_eq!(range.last, 84);
        assert_eq!(config.volume, 0.5);
    }
}
