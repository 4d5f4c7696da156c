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

//! The sound engine: a per-note cache of playable assets.
//!
//! Every note has a slot guarded by its own async mutex. That mutex is the
//! per-note mutual-exclusion token: it serializes load, play, stop and unload
//! for a note, which deduplicates concurrent loads (the second caller waits
//! on the lock and then finds the cache populated) and makes a play racing
//! an unload resolve deterministically to one order or the other. Slots for
//! different notes never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::assets::SampleAssets;
use super::error::LoadError;
use super::player::SamplePlayer;
use crate::note::NoteNumber;
use crate::playsync::CancelHandle;

/// The cached state for one note. The player is present only between a
/// successful load and an unload.
#[derive(Default)]
struct SlotState {
    player: Option<Box<dyn SamplePlayer>>,
    /// A missing asset is logged once per note, not per tap.
    warned_missing: bool,
}

/// One note's slot. Slots persist after unload so the mutex identity stays
/// stable; only the player inside is dropped.
#[derive(Default)]
struct NoteSlot {
    state: AsyncMutex<SlotState>,
}

/// The sound engine manages loading, caching and playback of per-note sample
/// assets. Construct one per asset set and share it via `Arc`; multiple
/// keyboard instances may point at the same engine.
pub struct SoundEngine {
    /// The asset resolution collaborator.
    assets: Arc<dyn SampleAssets>,
    /// Per-note slots. The outer lock is only held long enough to clone the
    /// slot Arc.
    slots: Mutex<HashMap<NoteNumber, Arc<NoteSlot>>>,
}

impl SoundEngine {
    /// Creates a new sound engine over the given assets.
    pub fn new(assets: Arc<dyn SampleAssets>) -> Self {
        Self {
            assets,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the slot for a note, creating it on first use.
    fn slot(&self, note: NoteNumber) -> Arc<NoteSlot> {
        self.slots.lock().entry(note).or_default().clone()
    }

    /// Runs the blocking asset load on a blocking thread.
    async fn load_asset(
        &self,
        note: NoteNumber,
    ) -> Result<Option<Box<dyn SamplePlayer>>, LoadError> {
        let assets = self.assets.clone();
        tokio::task::spawn_blocking(move || assets.load(note))
            .await
            .map_err(|e| LoadError::Task(e.to_string()))?
    }

    /// Plays the note's sample, restarting it from the beginning if it is
    /// already sounding. Loads and caches the asset on first use; a note with
    /// no asset is not an error. A load failure is surfaced to this caller
    /// only and leaves nothing cached, so a later play retries.
    pub async fn play(&self, note: NoteNumber, volume: f32) -> Result<(), LoadError> {
        let slot = self.slot(note);
        let mut state = slot.state.lock().await;

        if let Some(player) = state.player.as_mut() {
            player.play(volume);
            return Ok(());
        }

        match self.load_asset(note).await? {
            Some(mut player) => {
                player.play(volume);
                state.player = Some(player);
                debug!(note, volume, "Sample loaded and playing");
                Ok(())
            }
            None => {
                if !state.warned_missing {
                    warn!(note, "No sound asset for note");
                    state.warned_missing = true;
                }
                Ok(())
            }
        }
    }

    /// Stops the note's sample if it is loaded. A note with no loaded asset
    /// is a no-op, never an error.
    pub async fn stop(&self, note: NoteNumber) {
        let slot = self.slot(note);
        let mut state = slot.state.lock().await;
        if let Some(player) = state.player.as_mut() {
            player.pause();
            debug!(note, "Sample stopped");
        }
    }

    /// Releases the note's loaded asset. Waits for any in-flight load on the
    /// note to finish first, so a resource is never orphaned mid-creation.
    pub async fn unload(&self, note: NoteNumber) {
        // Not creating a slot here: a note never touched has nothing to
        // unload.
        let slot = self.slots.lock().get(&note).cloned();
        if let Some(slot) = slot {
            let mut state = slot.state.lock().await;
            if state.player.take().is_some() {
                debug!(note, "Sample unloaded");
            }
        }
    }

    /// Sequentially unloads every note in the inclusive range. Notes outside
    /// the range are untouched, so other keyboards sharing this engine keep
    /// their assets.
    pub async fn unload_range(&self, first: NoteNumber, last: NoteNumber) {
        for note in first..=last {
            self.unload(note).await;
        }
        debug!(first, last, "Unloaded sample range");
    }

    /// Sequentially unloads every cached note.
    pub async fn unload_all(&self) {
        let notes: Vec<NoteNumber> = self.slots.lock().keys().copied().collect();
        for note in notes {
            self.unload(note).await;
        }
        debug!("Unloaded all samples");
    }

    /// Returns true if the note currently has a loaded asset.
    pub async fn is_loaded(&self, note: NoteNumber) -> bool {
        let slot = self.slots.lock().get(&note).cloned();
        match slot {
            Some(slot) => slot.state.lock().await.player.is_some(),
            None => false,
        }
    }

    /// Begins loading the given notes in the background, skipping notes that
    /// are already cached. Returns immediately; cancellation is cooperative.
    /// An individual load that finishes after cancellation is discarded, not
    /// cached. The task yields between notes so interactive playback is not
    /// starved.
    pub fn preload(self: &Arc<Self>, notes: Vec<NoteNumber>) -> PreloadHandle {
        let cancel = CancelHandle::new();
        let engine = self.clone();
        let handle = cancel.clone();
        let join = tokio::spawn(async move {
            for note in notes {
                if handle.is_cancelled() {
                    debug!(note, "Preload cancelled, not scheduling further loads");
                    break;
                }

                let slot = engine.slot(note);
                let mut state = slot.state.lock().await;
                if state.player.is_some() {
                    continue;
                }

                match engine.load_asset(note).await {
                    Ok(Some(player)) => {
                        if handle.is_cancelled() {
                            debug!(note, "Discarding sample loaded after cancellation");
                            break;
                        }
                        state.player = Some(player);
                        debug!(note, "Sample preloaded");
                    }
                    Ok(None) => {
                        if !state.warned_missing {
                            warn!(note, "No sound asset for note");
                            state.warned_missing = true;
                        }
                    }
                    Err(e) => {
                        // Transient: the slot stays empty so a later play
                        // retries the load.
                        warn!(note, error = %e, "Failed to preload sample");
                    }
                }
                drop(state);
                tokio::task::yield_now().await;
            }
        });
        PreloadHandle { cancel, join }
    }
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

/// The handle returned by [`SoundEngine::preload`].
pub struct PreloadHandle {
    cancel: CancelHandle,
    join: JoinHandle<()>,
}

impl PreloadHandle {
    /// Stops scheduling further loads. Any load already in flight finishes
    /// but its result is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true if the preload has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the preload task to finish.
    pub async fn wait(self) {
        let _ = self.join.await;
    }
}
