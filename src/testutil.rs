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

//! Shared test fixtures: mock players, scripted asset resolvers, recording
//! sinks/observers, and WAV fixture generation.

use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;

use crate::keyboard::{NoteContext, NoteObserver, NoteSink};
use crate::note::NoteNumber;
use crate::sound::{LoadError, LoadedSample, PlayerBackend, SampleAssets, SamplePlayer};

/// Initializes tracing output for tests. Safe to call repeatedly.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Writes a mono 16-bit sine wave to the given path.
pub fn write_sine_wav(path: &Path, frequency: f32, sample_rate: u32, duration_seconds: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let sample_count = (sample_rate as f32 * duration_seconds) as usize;
    for i in 0..sample_count {
        let t = i as f32 / sample_rate as f32;
        let value = (2.0 * PI * frequency * t).sin();
        writer.write_sample((value * i16::MAX as f32 * 0.5) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// What a mock player was asked to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    Play(f32),
    Pause,
}

/// Shared record of every mock player's actions and drops, keyed by note.
#[derive(Clone, Default)]
pub struct MockPlayerLog {
    actions: Arc<Mutex<HashMap<NoteNumber, Vec<PlayerAction>>>>,
    drops: Arc<Mutex<HashMap<NoteNumber, usize>>>,
}

impl MockPlayerLog {
    /// The actions recorded for a note.
    pub fn actions(&self, note: NoteNumber) -> Vec<PlayerAction> {
        self.actions.lock().get(&note).cloned().unwrap_or_default()
    }

    /// How many players for a note have been dropped (released).
    pub fn drop_count(&self, note: NoteNumber) -> usize {
        self.drops.lock().get(&note).copied().unwrap_or(0)
    }
}

/// A player that records its actions in a [`MockPlayerLog`].
pub struct MockPlayer {
    note: NoteNumber,
    log: MockPlayerLog,
}

impl MockPlayer {
    pub fn new(note: NoteNumber, log: MockPlayerLog) -> Self {
        Self { note, log }
    }
}

impl SamplePlayer for MockPlayer {
    fn play(&mut self, volume: f32) {
        self.log
            .actions
            .lock()
            .entry(self.note)
            .or_default()
            .push(PlayerAction::Play(volume));
    }

    fn pause(&mut self) {
        self.log
            .actions
            .lock()
            .entry(self.note)
            .or_default()
            .push(PlayerAction::Pause);
    }
}

impl Drop for MockPlayer {
    fn drop(&mut self) {
        *self.log.drops.lock().entry(self.note).or_default() += 1;
    }
}

struct CountingAssetsInner {
    available: HashSet<NoteNumber>,
    log: MockPlayerLog,
    load_counts: Mutex<HashMap<NoteNumber, usize>>,
    fail_next: AtomicBool,
    load_delay_ms: AtomicU64,
}

/// A scripted asset resolver that counts loads per note, can delay loads to
/// widen race windows, and can fail on demand.
#[derive(Clone)]
pub struct CountingAssets {
    inner: Arc<CountingAssetsInner>,
}

impl CountingAssets {
    /// Creates assets where only the given notes have samples.
    pub fn new(available: Vec<NoteNumber>, log: MockPlayerLog) -> Self {
        Self {
            inner: Arc::new(CountingAssetsInner {
                available: available.into_iter().collect(),
                log,
                load_counts: Mutex::new(HashMap::new()),
                fail_next: AtomicBool::new(false),
                load_delay_ms: AtomicU64::new(0),
            }),
        }
    }

    /// Makes every load sleep, widening race windows in concurrency tests.
    pub fn with_load_delay(self, millis: u64) -> Self {
        self.inner.load_delay_ms.store(millis, Ordering::Relaxed);
        self
    }

    /// Makes the next load fail with a backend error.
    pub fn fail_next_load(&self) {
        self.inner.fail_next.store(true, Ordering::Relaxed);
    }

    /// How many times the given note's asset has been loaded.
    pub fn load_count(&self, note: NoteNumber) -> usize {
        self.inner.load_counts.lock().get(&note).copied().unwrap_or(0)
    }
}

impl SampleAssets for CountingAssets {
    fn load(&self, note: NoteNumber) -> Result<Option<Box<dyn SamplePlayer>>, LoadError> {
        *self.inner.load_counts.lock().entry(note).or_default() += 1;

        let delay = self.inner.load_delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.inner.fail_next.swap(false, Ordering::Relaxed) {
            return Err(LoadError::Backend("injected load failure".to_string()));
        }
        if !self.inner.available.contains(&note) {
            return Ok(None);
        }
        Ok(Some(Box::new(MockPlayer::new(note, self.inner.log.clone()))))
    }
}

/// A player backend that produces players which do nothing.
pub struct NullBackend;

struct NullPlayer;

impl SamplePlayer for NullPlayer {
    fn play(&mut self, _volume: f32) {}
    fn pause(&mut self) {}
}

impl PlayerBackend for NullBackend {
    fn create_player(&self, _sample: LoadedSample) -> Result<Box<dyn SamplePlayer>, LoadError> {
        Ok(Box::new(NullPlayer))
    }
}

/// A note event as seen by a recording sink or observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    On(NoteNumber),
    Off(NoteNumber),
}

/// A [`NoteSink`] that records the order of note-on/note-off calls.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NoteEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<NoteEvent> {
        self.events.lock().clone()
    }
}

impl NoteSink for RecordingSink {
    fn note_on(&self, note: NoteNumber) {
        self.events.lock().push(NoteEvent::On(note));
    }

    fn note_off(&self, note: NoteNumber) {
        self.events.lock().push(NoteEvent::Off(note));
    }
}

/// An observer recording events along with the previous-active context it was
/// handed.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(NoteEvent, Vec<NoteNumber>)>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<(NoteEvent, Vec<NoteNumber>)> {
        self.events.lock().clone()
    }
}

impl NoteObserver for RecordingObserver {
    fn on_note_on(&mut self, note: NoteNumber, context: &NoteContext) {
        self.events
            .lock()
            .push((NoteEvent::On(note), context.prev_active_notes.clone()));
    }

    fn on_note_off(&mut self, note: NoteNumber, context: &NoteContext) {
        self.events
            .lock()
            .push((NoteEvent::Off(note), context.prev_active_notes.clone()));
    }
}
