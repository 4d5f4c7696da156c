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

//! Key geometry computation.
//!
//! Given a note range and an optional container width, computes each key's
//! horizontal position and width. Black keys are not evenly spaced between
//! white keys on a real keyboard, so accidentals are positioned from an
//! empirical per-pitch offset table rather than by chromatic index.

use std::collections::BTreeMap;

use crate::note::{self, NoteError, NoteNumber};
use crate::range::NoteRange;

/// Default width of an accidental key relative to a natural key.
pub const ACCIDENTAL_WIDTH_RATIO: f64 = 0.65;

/// Natural-key units spanned by one octave.
const OCTAVE_WIDTH: f64 = 7.0;

/// Horizontal position of each pitch class within its octave, in natural-key
/// units, indexed by chromatic position (C=0 .. B=11). The accidental offsets
/// are empirical visual tuning; keep them exactly as they are.
const PITCH_POSITIONS: [f64; 12] = [
    0.0,  // C
    0.55, // Db
    1.0,  // D
    1.8,  // Eb
    2.0,  // E
    3.0,  // F
    3.5,  // Gb
    4.0,  // G
    4.7,  // Ab
    5.0,  // A
    5.85, // Bb
    6.0,  // B
];

/// The unit the computed geometry is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutUnit {
    /// Absolute pixels; used when the container width is known.
    Pixels,
    /// Fractions of the total keyboard width; resolved by the presentation
    /// layer once it knows its width.
    Fraction,
}

/// The horizontal placement of a single key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGeometry {
    /// Left edge, in the layout's unit.
    pub left: f64,
    /// Width, in the layout's unit.
    pub width: f64,
}

/// The computed geometry for every key in a range.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    unit: LayoutUnit,
    natural_key_width: f64,
    keys: BTreeMap<NoteNumber, KeyGeometry>,
}

impl KeyLayout {
    /// The unit the geometry is expressed in.
    pub fn unit(&self) -> LayoutUnit {
        self.unit
    }

    /// The width of one natural key, in the layout's unit.
    pub fn natural_key_width(&self) -> f64 {
        self.natural_key_width
    }

    /// The geometry of a single key, if it is in the laid-out range.
    pub fn geometry(&self, note: NoteNumber) -> Option<&KeyGeometry> {
        self.keys.get(&note)
    }

    /// Iterates over all keys in note-number order.
    pub fn iter(&self) -> impl Iterator<Item = (NoteNumber, &KeyGeometry)> {
        self.keys.iter().map(|(note, geometry)| (*note, geometry))
    }

    /// The number of keys in the layout.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the layout holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The absolute horizontal position of a note in natural-key units.
fn absolute_position(note: NoteNumber) -> Result<f64, NoteError> {
    let attributes = note::attributes(note)?;
    let pitch_position = PITCH_POSITIONS[attributes.pitch.chromatic_index() as usize];
    Ok(pitch_position + OCTAVE_WIDTH * f64::from(attributes.octave))
}

/// Computes the geometry of every key in the range.
///
/// With a container width the result is in pixels (rounded, matching screen
/// placement); without one it is in fractions of the total width. The layout
/// is derived state: recompute it whenever the range or width changes.
pub fn compute_layout(
    range: NoteRange,
    container_width: Option<f64>,
    accidental_width_ratio: f64,
) -> Result<KeyLayout, NoteError> {
    // A range of only accidentals has no naturals; one unit keeps the
    // division meaningful.
    let natural_count = range.natural_count().max(1) as f64;
    let (unit, natural_key_width) = match container_width {
        Some(width) => (LayoutUnit::Pixels, width / natural_count),
        None => (LayoutUnit::Fraction, 1.0 / natural_count),
    };

    let origin = absolute_position(range.first)?;
    let mut keys = BTreeMap::new();
    for note in range.iter() {
        let attributes = note::attributes(note)?;
        let relative = absolute_position(note)? - origin;
        let ratio = if attributes.is_accidental {
            accidental_width_ratio
        } else {
            1.0
        };
        let (left, width) = match unit {
            LayoutUnit::Pixels => (
                (relative * natural_key_width).round(),
                (ratio * natural_key_width).round(),
            ),
            LayoutUnit::Fraction => (relative * natural_key_width, ratio * natural_key_width),
        };
        keys.insert(note, KeyGeometry { left, width });
    }

    Ok(KeyLayout {
        unit,
        natural_key_width,
        keys,
    })
}
