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

//! Per-note sample playback.
//!
//! This module provides:
//! - An async engine caching one playable asset per note
//! - Deduplication of concurrent loads and cancellable preloading
//! - In-memory sample decoding (symphonia) for directory-backed assets
//! - Explicit unload lifecycle so views can bound native resource usage

mod assets;
mod engine;
mod error;
mod loader;
mod player;

pub use assets::{DirectoryAssets, SampleAssets};
pub use engine::{PreloadHandle, SoundEngine};
pub use error::LoadError;
pub use loader::{decode_file, LoadedSample};
pub use player::{PlayerBackend, SamplePlayer};
