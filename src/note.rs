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

//! The note domain model.
//!
//! Notes are identified by MIDI-style note numbers. Note number 60 is middle C
//! ("c4"); the rest of the crate relies on that fixed point, so it must never
//! change. Attributes (pitch class, octave, accidental) are derived from the
//! note number and served from a lookup table built once at startup.

use std::sync::OnceLock;

/// A MIDI-style note number. 60 is middle C.
pub type NoteNumber = u8;

/// The note number of "c0", the lowest note this crate can name.
pub const MIDI_NUMBER_C0: NoteNumber = 12;

/// The lowest supported note number.
pub const MIN_NOTE_NUMBER: NoteNumber = MIDI_NUMBER_C0;

/// The highest supported note number.
pub const MAX_NOTE_NUMBER: NoteNumber = 127;

const NOTES_IN_OCTAVE: u8 = 12;

/// Errors from note parsing and attribute lookup.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// The note name did not match `letter[#|b]?octave` or named an
    /// unrecognized pitch (e.g. "e#" or "cb").
    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),

    /// The note number lies outside the supported
    /// [`MIN_NOTE_NUMBER`]..=[`MAX_NOTE_NUMBER`] bound. Out-of-bound notes are
    /// rejected, never clamped.
    #[error("note number {0} is outside the supported range {MIN_NOTE_NUMBER}..={MAX_NOTE_NUMBER}")]
    OutOfRange(NoteNumber),
}

/// The twelve pitch classes in chromatic order. Sharps parse to their flat
/// spelling (e.g. "c#" is [`Pitch::Db`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pitch {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl Pitch {
    /// All pitch classes, indexed by chromatic position within the octave.
    pub const ALL: [Pitch; 12] = [
        Pitch::C,
        Pitch::Db,
        Pitch::D,
        Pitch::Eb,
        Pitch::E,
        Pitch::F,
        Pitch::Gb,
        Pitch::G,
        Pitch::Ab,
        Pitch::A,
        Pitch::Bb,
        Pitch::B,
    ];

    /// The chromatic position of this pitch within its octave (C=0 .. B=11).
    pub fn chromatic_index(self) -> u8 {
        self as u8
    }

    /// Whether this pitch is an accidental ("black key").
    pub fn is_accidental(self) -> bool {
        matches!(
            self,
            Pitch::Db | Pitch::Eb | Pitch::Gb | Pitch::Ab | Pitch::Bb
        )
    }

    /// The lowercase display spelling of this pitch.
    pub fn name(self) -> &'static str {
        match self {
            Pitch::C => "c",
            Pitch::Db => "db",
            Pitch::D => "d",
            Pitch::Eb => "eb",
            Pitch::E => "e",
            Pitch::F => "f",
            Pitch::Gb => "gb",
            Pitch::G => "g",
            Pitch::Ab => "ab",
            Pitch::A => "a",
            Pitch::Bb => "bb",
            Pitch::B => "b",
        }
    }

    /// Resolves a letter plus optional accidental to a pitch class. Spellings
    /// with no chromatic neighbor (e#, b#, cb, fb) are not recognized.
    fn from_spelling(letter: char, accidental: Option<char>) -> Option<Pitch> {
        let natural = match letter {
            'c' => Pitch::C,
            'd' => Pitch::D,
            'e' => Pitch::E,
            'f' => Pitch::F,
            'g' => Pitch::G,
            'a' => Pitch::A,
            'b' => Pitch::B,
            _ => return None,
        };
        match accidental {
            None => Some(natural),
            Some('#') => match natural {
                Pitch::C => Some(Pitch::Db),
                Pitch::D => Some(Pitch::Eb),
                Pitch::F => Some(Pitch::Gb),
                Pitch::G => Some(Pitch::Ab),
                Pitch::A => Some(Pitch::Bb),
                _ => None,
            },
            Some('b') => match natural {
                Pitch::D => Some(Pitch::Db),
                Pitch::E => Some(Pitch::Eb),
                Pitch::G => Some(Pitch::Gb),
                Pitch::A => Some(Pitch::Ab),
                Pitch::B => Some(Pitch::Bb),
                _ => None,
            },
            Some(_) => None,
        }
    }
}

/// Derived attributes of a note number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAttributes {
    /// The note number these attributes describe.
    pub note_number: NoteNumber,
    /// The pitch class.
    pub pitch: Pitch,
    /// The octave, with c4 == 60.
    pub octave: u8,
    /// Whether this note is an accidental ("black key").
    pub is_accidental: bool,
    /// The lowercase display name, e.g. "c4" or "db5".
    pub display_name: String,
}

fn attribute_table() -> &'static [NoteAttributes] {
    static TABLE: OnceLock<Vec<NoteAttributes>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (MIN_NOTE_NUMBER..=MAX_NOTE_NUMBER)
            .map(|note_number| {
                let offset = note_number - MIDI_NUMBER_C0;
                let pitch = Pitch::ALL[(offset % NOTES_IN_OCTAVE) as usize];
                let octave = offset / NOTES_IN_OCTAVE;
                NoteAttributes {
                    note_number,
                    pitch,
                    octave,
                    is_accidental: pitch.is_accidental(),
                    display_name: format!("{}{}", pitch.name(), octave),
                }
            })
            .collect()
    })
}

/// Returns the attributes of the given note number, or
/// [`NoteError::OutOfRange`] outside the supported bound.
pub fn attributes(note: NoteNumber) -> Result<&'static NoteAttributes, NoteError> {
    if note < MIN_NOTE_NUMBER {
        return Err(NoteError::OutOfRange(note));
    }
    attribute_table()
        .get((note - MIN_NOTE_NUMBER) as usize)
        .ok_or(NoteError::OutOfRange(note))
}

/// Returns the lowercase display name of the given note number.
pub fn display_name(note: NoteNumber) -> Result<&'static str, NoteError> {
    Ok(attributes(note)?.display_name.as_str())
}

/// Parses a note name of the form `letter[#|b]?octave` (case-insensitive,
/// e.g. "c4", "Db5", "f#3") into a note number.
pub fn from_name(name: &str) -> Result<NoteNumber, NoteError> {
    let invalid = || NoteError::InvalidNoteName(name.to_string());

    let lowered = name.trim().to_lowercase();
    let mut chars = lowered.chars();
    let letter = chars.next().ok_or_else(invalid)?;

    let rest = chars.as_str();
    let (accidental, octave_str) = match rest.chars().next() {
        Some(c @ ('#' | 'b')) if rest.len() > 1 => (Some(c), &rest[1..]),
        _ => (None, rest),
    };

    let pitch = Pitch::from_spelling(letter, accidental).ok_or_else(invalid)?;
    if octave_str.is_empty() || !octave_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let octave: u32 = octave_str.parse().map_err(|_| invalid())?;

    let note = u32::from(MIDI_NUMBER_C0)
        + u32::from(pitch.chromatic_index())
        + u32::from(NOTES_IN_OCTAVE) * octave;
    if note > u32::from(MAX_NOTE_NUMBER) {
        return Err(invalid());
    }
    Ok(note as NoteNumber)
}

/// Returns true if the note is a natural ("white key"). Notes outside the
/// supported bound are not naturals.
pub fn is_natural(note: NoteNumber) -> bool {
    attributes(note).map(|a| !a.is_accidental).unwrap_or(false)
}
