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

//! The playable-asset seam to the platform audio backend.

use super::error::LoadError;
use super::loader::LoadedSample;

/// An opaque playable handle for one note's sample. Owned exclusively by the
/// sound engine; dropped on unload, at which point the implementation must
/// release any native resources.
pub trait SamplePlayer: Send {
    /// Starts playback from the beginning of the sample, restarting it if it
    /// is already sounding. Fast repeated taps rely on the restart.
    fn play(&mut self, volume: f32);

    /// Stops playback. The next play starts from the beginning again.
    fn pause(&mut self);
}

/// Creates platform playback voices from decoded sample data. Supplied by
/// the embedder: the engine never talks to an audio device directly.
pub trait PlayerBackend: Send + Sync {
    /// Wraps a decoded sample in a playable voice.
    fn create_player(&self, sample: LoadedSample) -> Result<Box<dyn SamplePlayer>, LoadError>;
}
