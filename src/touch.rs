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

//! Touch tracking for the keyboard.
//!
//! The tracker converts raw touch lifecycle events into the set of currently
//! pressed keys. Each active finger is a contact record keyed by contact id;
//! a key is pressed while at least one contact rests on it. In glissando
//! mode, contacts that slide between keys re-key their contact record, which
//! is what makes a single finger trigger a run of notes.
//!
//! All of the work here is pure state transition. The tracker never blocks
//! and performs no side effects; the controller diffs the pressed-key set it
//! produces.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::note::{self, NoteError, NoteNumber};

/// Identifies one finger for the duration of a gesture.
pub type ContactId = u64;

/// The on-screen bounds of a single key, in the same coordinate space as
/// touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl KeyBounds {
    /// The hit-test contract: whether a point falls within these bounds.
    /// Edges are inclusive.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A raw touch lifecycle event delivered by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// A finger touched down.
    Down { contact_id: ContactId, x: f64, y: f64 },
    /// A finger moved. Only evaluated in glissando mode.
    Move { contact_id: ContactId, x: f64, y: f64 },
    /// A finger lifted.
    Up { contact_id: ContactId },
    /// The gesture was terminated by the system. All contacts are dropped.
    Cancel,
}

/// One active finger and the key it currently rests on, if any.
#[derive(Debug, Clone, Copy)]
struct TouchContact {
    current_key: Option<NoteNumber>,
}

/// Tracks every active contact for one keyboard instance.
pub struct TouchTracker {
    /// Registered key bounds, with the accidental flag cached for hit-test
    /// precedence.
    bounds: HashMap<NoteNumber, (KeyBounds, bool)>,
    /// Active contacts keyed by contact id.
    contacts: HashMap<ContactId, TouchContact>,
    /// Whether moves re-evaluate the hit test.
    glissando: bool,
}

impl TouchTracker {
    /// Creates a tracker with no registered keys.
    pub fn new(glissando: bool) -> Self {
        Self {
            bounds: HashMap::new(),
            contacts: HashMap::new(),
            glissando,
        }
    }

    /// Enables or disables glissando for subsequent moves.
    pub fn set_glissando(&mut self, glissando: bool) {
        self.glissando = glissando;
    }

    /// Whether glissando is enabled.
    pub fn glissando(&self) -> bool {
        self.glissando
    }

    /// Registers (or updates) the bounds of a key. Call whenever the layout
    /// or container geometry changes.
    pub fn set_key_bounds(&mut self, note: NoteNumber, bounds: KeyBounds) -> Result<(), NoteError> {
        let attributes = note::attributes(note)?;
        self.bounds.insert(note, (bounds, attributes.is_accidental));
        Ok(())
    }

    /// Removes a key's bounds, e.g. when the range shrinks.
    pub fn remove_key_bounds(&mut self, note: NoteNumber) {
        self.bounds.remove(&note);
    }

    /// Hit-tests a point against all registered keys. Accidentals render on
    /// top of naturals, so a point inside both resolves to the accidental.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NoteNumber> {
        let mut hit: Option<(NoteNumber, bool)> = None;
        for (note, (bounds, accidental)) in &self.bounds {
            if !bounds.contains_point(x, y) {
                continue;
            }
            match hit {
                Some((_, true)) => {}
                Some((other, false)) => {
                    if *accidental || *note < other {
                        hit = Some((*note, *accidental));
                    }
                }
                None => hit = Some((*note, *accidental)),
            }
        }
        hit.map(|(note, _)| note)
    }

    /// Applies one touch event and returns the resulting pressed-key set.
    pub fn handle(&mut self, event: TouchEvent) -> BTreeSet<NoteNumber> {
        match event {
            TouchEvent::Down { contact_id, x, y } => {
                let current_key = self.hit_test(x, y);
                debug!(contact_id, key = ?current_key, "Touch down");
                self.contacts.insert(contact_id, TouchContact { current_key });
            }
            TouchEvent::Move { contact_id, x, y } => {
                if self.glissando {
                    // A contact that slid off every key stays tracked so a
                    // later re-entry is detected; a move for an unknown id
                    // starts tracking it.
                    let next_key = self.hit_test(x, y);
                    let contact = self
                        .contacts
                        .entry(contact_id)
                        .or_insert(TouchContact { current_key: None });
                    if contact.current_key != next_key {
                        debug!(
                            contact_id,
                            from = ?contact.current_key,
                            to = ?next_key,
                            "Touch moved between keys"
                        );
                        contact.current_key = next_key;
                    }
                }
            }
            TouchEvent::Up { contact_id } => {
                if let Some(contact) = self.contacts.remove(&contact_id) {
                    debug!(contact_id, key = ?contact.current_key, "Touch up");
                }
            }
            TouchEvent::Cancel => {
                if !self.contacts.is_empty() {
                    debug!(contacts = self.contacts.len(), "Gesture cancelled, dropping all contacts");
                }
                self.contacts.clear();
            }
        }
        self.pressed_keys()
    }

    /// The set of keys with at least one contact on them.
    pub fn pressed_keys(&self) -> BTreeSet<NoteNumber> {
        self.contacts
            .values()
            .filter_map(|contact| contact.current_key)
            .collect()
    }

    /// The number of active contacts, including ones currently off-key.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Drops all contacts without touching registered bounds.
    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
    }
}

impl std::fmt::Debug for TouchTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TouchTracker")
            .field("keys", &self.bounds.len())
            .field("contacts", &self.contacts.len())
            .field("glissando", &self.glissando)
            .finish()
    }
}
