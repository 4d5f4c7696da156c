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

//! The keyboard controller.
//!
//! The controller owns the authoritative set of currently sounding notes. It
//! diffs the previous set against each new one and emits exactly one note-on
//! and one note-off per continuous sounding interval, forwarding each to the
//! sound side and to observer callbacks. Re-submitting an unchanged set does
//! nothing, so overlapping touch events can never double-trigger a note.
//!
//! The top-priority invariant is that no key is ever left sounding: disable,
//! drop and gesture-cancel all force note-offs for everything active.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::note::{NoteError, NoteNumber};
use crate::sound::SoundEngine;
use crate::touch::{KeyBounds, TouchEvent, TouchTracker};

/// Context handed to observers with every note event: the set of notes that
/// was sounding before this change, for recording/undo-style consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContext {
    /// The active notes before this transition, in ascending order.
    pub prev_active_notes: Vec<NoteNumber>,
}

/// An external observer of note transitions (UI highlighting, logging,
/// recording). Observers are called synchronously; a panicking observer is
/// caught and logged so it can never corrupt sound state.
pub trait NoteObserver: Send {
    /// A note started sounding.
    fn on_note_on(&mut self, note: NoteNumber, context: &NoteContext);
    /// A note stopped sounding.
    fn on_note_off(&mut self, note: NoteNumber, context: &NoteContext);
}

/// The sound side of a note transition. Implementations must not block: the
/// controller runs on the gesture-delivery path.
pub trait NoteSink: Send + Sync {
    /// A note started sounding.
    fn note_on(&self, note: NoteNumber);
    /// A note stopped sounding.
    fn note_off(&self, note: NoteNumber);
}

/// A [`NoteSink`] that forwards to a [`SoundEngine`], spawning the async
/// play/stop calls so the gesture path never waits on asset I/O. Must be
/// used from within a tokio runtime.
pub struct EngineSink {
    engine: Arc<SoundEngine>,
    volume: f32,
}

impl EngineSink {
    /// Creates a sink playing at the given volume.
    pub fn new(engine: Arc<SoundEngine>, volume: f32) -> Self {
        Self { engine, volume }
    }
}

impl NoteSink for EngineSink {
    fn note_on(&self, note: NoteNumber) {
        let engine = self.engine.clone();
        let volume = self.volume;
        tokio::spawn(async move {
            if let Err(e) = engine.play(note, volume).await {
                warn!(note, error = %e, "Failed to play note");
            }
        });
    }

    fn note_off(&self, note: NoteNumber) {
        let engine = self.engine.clone();
        tokio::spawn(async move {
            engine.stop(note).await;
        });
    }
}

/// Owns the active-note set and fans transitions out to the sink and
/// observers.
pub struct KeyboardController {
    sink: Arc<dyn NoteSink>,
    observers: Vec<Box<dyn NoteObserver>>,
    active: BTreeSet<NoteNumber>,
    disabled: bool,
}

impl KeyboardController {
    /// Creates a controller over the given sink.
    pub fn new(sink: Arc<dyn NoteSink>) -> Self {
        Self {
            sink,
            observers: Vec::new(),
            active: BTreeSet::new(),
            disabled: false,
        }
    }

    /// Registers an observer for note transitions.
    pub fn add_observer(&mut self, observer: Box<dyn NoteObserver>) {
        self.observers.push(observer);
    }

    /// The currently sounding notes.
    pub fn active_notes(&self) -> &BTreeSet<NoteNumber> {
        &self.active
    }

    /// Whether the controller is disabled.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Replaces the active-note set, emitting one note-on per newly started
    /// note and one note-off per stopped note. Ignored while disabled.
    pub fn set_active_notes(&mut self, next: BTreeSet<NoteNumber>) {
        if self.disabled || next == self.active {
            return;
        }

        let started: Vec<NoteNumber> = next.difference(&self.active).copied().collect();
        let stopped: Vec<NoteNumber> = self.active.difference(&next).copied().collect();
        let context = NoteContext {
            prev_active_notes: self.active.iter().copied().collect(),
        };

        for note in &started {
            self.sink.note_on(*note);
            Self::notify_on(&mut self.observers, *note, &context);
        }
        for note in &stopped {
            self.sink.note_off(*note);
            Self::notify_off(&mut self.observers, *note, &context);
        }
        debug!(
            started = started.len(),
            stopped = stopped.len(),
            active = next.len(),
            "Active notes updated"
        );

        self.active = next;
    }

    /// Enables or disables the controller. Disabling forces a note-off for
    /// every active note before discarding state; disabling twice is a
    /// no-op.
    pub fn set_disabled(&mut self, disabled: bool) {
        if disabled && !self.disabled {
            self.flush_active();
        }
        self.disabled = disabled;
    }

    /// Forces note-off for everything active. The cleanup path for disable,
    /// drop and gesture interruption.
    fn flush_active(&mut self) {
        if self.active.is_empty() {
            return;
        }
        let stopped = std::mem::take(&mut self.active);
        let context = NoteContext {
            prev_active_notes: stopped.iter().copied().collect(),
        };
        for note in &stopped {
            self.sink.note_off(*note);
            Self::notify_off(&mut self.observers, *note, &context);
        }
        debug!(stopped = stopped.len(), "Flushed active notes");
    }

    fn notify_on(observers: &mut [Box<dyn NoteObserver>], note: NoteNumber, context: &NoteContext) {
        for observer in observers.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| observer.on_note_on(note, context))).is_err() {
                warn!(note, "Note-on observer panicked");
            }
        }
    }

    fn notify_off(observers: &mut [Box<dyn NoteObserver>], note: NoteNumber, context: &NoteContext) {
        for observer in observers.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| observer.on_note_off(note, context))).is_err() {
                warn!(note, "Note-off observer panicked");
            }
        }
    }
}

impl Drop for KeyboardController {
    /// Unmounting a keyboard must never leave notes sounding.
    fn drop(&mut self) {
        if !self.disabled {
            self.flush_active();
        }
    }
}

impl std::fmt::Debug for KeyboardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardController")
            .field("active", &self.active)
            .field("observers", &self.observers.len())
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// A complete interactive keyboard: touch tracking wired to the controller.
/// The presentation layer registers key bounds from the computed layout and
/// feeds raw touch events in; everything else follows.
pub struct VirtualKeyboard {
    tracker: TouchTracker,
    controller: KeyboardController,
}

impl VirtualKeyboard {
    /// Creates a keyboard over the given sink.
    pub fn new(sink: Arc<dyn NoteSink>, glissando: bool) -> Self {
        Self {
            tracker: TouchTracker::new(glissando),
            controller: KeyboardController::new(sink),
        }
    }

    /// Registers an observer for note transitions.
    pub fn add_observer(&mut self, observer: Box<dyn NoteObserver>) {
        self.controller.add_observer(observer);
    }

    /// Registers (or updates) one key's on-screen bounds.
    pub fn set_key_bounds(&mut self, note: NoteNumber, bounds: KeyBounds) -> Result<(), NoteError> {
        self.tracker.set_key_bounds(note, bounds)
    }

    /// Enables or disables glissando for subsequent moves.
    pub fn set_glissando(&mut self, glissando: bool) {
        self.tracker.set_glissando(glissando);
    }

    /// Applies one touch event, updating the active-note set.
    pub fn handle_touch(&mut self, event: TouchEvent) {
        let pressed = self.tracker.handle(event);
        self.controller.set_active_notes(pressed);
    }

    /// The currently sounding notes.
    pub fn active_notes(&self) -> &BTreeSet<NoteNumber> {
        self.controller.active_notes()
    }

    /// Enables or disables the keyboard, flushing active notes on disable.
    pub fn set_disabled(&mut self, disabled: bool) {
        if disabled {
            self.tracker.clear_contacts();
        }
        self.controller.set_disabled(disabled);
    }
}
