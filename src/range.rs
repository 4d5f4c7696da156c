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

//! Note range normalization.
//!
//! Ranges arrive from configuration in several shapes: a pair of note names,
//! a pair of numbers, or a named-fields object of either. All of them
//! normalize to a single canonical [`NoteRange`]. Malformed input fails with
//! a descriptive error rather than being silently corrected.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::note::{self, NoteError, NoteNumber};

/// Errors from range normalization.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// A note-name bound failed to parse.
    #[error("invalid note range: {0}")]
    InvalidNote(#[from] NoteError),

    /// The first bound is above the last.
    #[error("invalid note range: first ({first}) > last ({last})")]
    Inverted { first: String, last: String },

    /// A numeric bound is NaN or infinite.
    #[error("note range bounds must be finite numbers, got ({0}, {1})")]
    NonFinite(f64, f64),

    /// A numeric bound is not an integral note number within the supported
    /// bound.
    #[error("note range bound {0} is not a note number")]
    NotANoteNumber(f64),
}

/// A note range as it appears in configuration, in any of the accepted
/// shapes. Use [`NoteRangeInput::normalize`] to obtain a [`NoteRange`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NoteRangeInput {
    /// A pair of note names, e.g. `["c4", "c5"]`.
    NamePair([String; 2]),
    /// A pair of note numbers, e.g. `[60, 72]`.
    NumberPair([f64; 2]),
    /// Named note-name fields, e.g. `{first: "c4", last: "c5"}`.
    NamedNames { first: String, last: String },
    /// Named note-number fields, e.g. `{first: 60, last: 72}`.
    NamedNumbers { first: f64, last: f64 },
}

impl NoteRangeInput {
    /// Normalizes this input into a canonical numeric range.
    pub fn normalize(&self) -> Result<NoteRange, RangeError> {
        debug!(input = ?self, "Normalizing note range");
        match self {
            NoteRangeInput::NamePair([first, last]) => NoteRange::from_names(first, last),
            NoteRangeInput::NamedNames { first, last } => NoteRange::from_names(first, last),
            NoteRangeInput::NumberPair([first, last]) => NoteRange::from_numbers(*first, *last),
            NoteRangeInput::NamedNumbers { first, last } => NoteRange::from_numbers(*first, *last),
        }
    }
}

/// A canonical, validated note range. Both bounds are inclusive and
/// `first <= last` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRange {
    /// The first (lowest) note in the range.
    pub first: NoteNumber,
    /// The last (highest) note in the range.
    pub last: NoteNumber,
}

impl NoteRange {
    /// Creates a range from two already-numeric note numbers.
    pub fn new(first: NoteNumber, last: NoteNumber) -> Result<NoteRange, RangeError> {
        note::attributes(first)?;
        note::attributes(last)?;
        if first > last {
            return Err(RangeError::Inverted {
                first: first.to_string(),
                last: last.to_string(),
            });
        }
        Ok(NoteRange { first, last })
    }

    /// Creates a range from a pair of note names.
    pub fn from_names(first: &str, last: &str) -> Result<NoteRange, RangeError> {
        let first_note = note::from_name(first)?;
        let last_note = note::from_name(last)?;
        if first_note > last_note {
            return Err(RangeError::Inverted {
                first: first.to_string(),
                last: last.to_string(),
            });
        }
        Ok(NoteRange {
            first: first_note,
            last: last_note,
        })
    }

    /// Creates a range from a pair of numbers, validating finiteness and that
    /// both are integral note numbers.
    pub fn from_numbers(first: f64, last: f64) -> Result<NoteRange, RangeError> {
        if !first.is_finite() || !last.is_finite() {
            return Err(RangeError::NonFinite(first, last));
        }
        let to_note = |n: f64| -> Result<NoteNumber, RangeError> {
            if n.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&n) {
                return Err(RangeError::NotANoteNumber(n));
            }
            let note = n as NoteNumber;
            note::attributes(note)?;
            Ok(note)
        };
        NoteRange::new(to_note(first)?, to_note(last)?)
    }

    /// Iterates over all note numbers in the range, inclusive.
    pub fn iter(&self) -> impl Iterator<Item = NoteNumber> {
        self.first..=self.last
    }

    /// Returns true if the note lies within the range.
    pub fn contains(&self, note: NoteNumber) -> bool {
        (self.first..=self.last).contains(&note)
    }

    /// The number of notes in the range.
    pub fn len(&self) -> usize {
        usize::from(self.last - self.first) + 1
    }

    /// Ranges are never empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The number of natural ("white") keys in the range.
    pub fn natural_count(&self) -> usize {
        self.iter().filter(|n| note::is_natural(*n)).count()
    }
}

impl Default for NoteRange {
    /// The default keyboard range, one octave from middle C.
    fn default() -> Self {
        NoteRange { first: 60, last: 72 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_pair() {
        let range = NoteRangeInput::NamePair(["c4".into(), "c5".into()])
            .normalize()
            .unwrap();
        assert_eq!(range, NoteRange { first: 60, last: 72 });
    }

    #[test]
    fn test_normalize_number_pair() {
        let range = NoteRangeInput::NumberPair([60.0, 72.0]).normalize().unwrap();
        assert_eq!(range, NoteRange { first: 60, last: 72 });
    }

    #[test]
    fn test_normalize_named_fields() {
        let names = NoteRangeInput::NamedNames {
            first: "a0".into(),
            last: "c8".into(),
        };
        let range = names.normalize().unwrap();
        assert_eq!(range, NoteRange { first: 21, last: 108 });

        let numbers = NoteRangeInput::NamedNumbers {
            first: 21.0,
            last: 108.0,
        };
        assert_eq!(numbers.normalize().unwrap(), range);
    }

    #[test]
    fn test_inverted_range_fails() {
        let result = NoteRangeInput::NamePair(["c5".into(), "c4".into()]).normalize();
        let err = result.unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
        // The offending bounds appear in the message.
        assert!(err.to_string().contains("c5"));
        assert!(err.to_string().contains("c4"));
    }

    #[test]
    fn test_bad_name_fails() {
        let result = NoteRangeInput::NamePair(["x4".into(), "c5".into()]).normalize();
        assert!(matches!(result, Err(RangeError::InvalidNote(_))));
    }

    #[test]
    fn test_non_finite_fails() {
        for (first, last) in [(f64::NAN, 72.0), (60.0, f64::INFINITY)] {
            let result = NoteRangeInput::NumberPair([first, last]).normalize();
            assert!(matches!(result, Err(RangeError::NonFinite(..))));
        }
    }

    #[test]
    fn test_fractional_number_fails() {
        let result = NoteRangeInput::NumberPair([60.5, 72.0]).normalize();
        assert!(matches!(result, Err(RangeError::NotANoteNumber(_))));
    }

    #[test]
    fn test_deserialize_shapes() {
        let shapes = [
            r#"["c4", "c5"]"#,
            r#"[60, 72]"#,
            r#"{"first": "c4", "last": "c5"}"#,
            r#"{"first": 60, "last": 72}"#,
        ];
        for shape in shapes {
            let input: NoteRangeInput = serde_json::from_str(shape).unwrap();
            assert_eq!(
                input.normalize().unwrap(),
                NoteRange { first: 60, last: 72 },
                "shape {}",
                shape
            );
        }
    }

    #[test]
    fn test_range_helpers() {
        let range = NoteRange { first: 60, last: 72 };
        assert_eq!(range.len(), 13);
        assert!(range.contains(60));
        assert!(range.contains(72));
        assert!(!range.contains(73));
        // c4..c5 has 8 naturals: c d e f g a b c.
        assert_eq!(range.natural_count(), 8);
        assert_eq!(range.iter().count(), 13);
    }
}
