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

//! Asset resolution: mapping notes to playable samples.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::error::LoadError;
use super::loader;
use super::player::{PlayerBackend, SamplePlayer};
use crate::note::{self, NoteNumber};

/// Resolves and loads the sample asset for a note.
///
/// This is a blocking call (asset open/decode); the engine runs it on a
/// blocking thread. `Ok(None)` means the note legitimately has no asset, a
/// normal "nothing to play" outcome. Errors are transient and never cached.
pub trait SampleAssets: Send + Sync + 'static {
    /// Loads the player for a note's sample, or None if the note has no
    /// asset.
    fn load(&self, note: NoteNumber) -> Result<Option<Box<dyn SamplePlayer>>, LoadError>;
}

/// Directory-backed assets: each note's sample lives at
/// `<root>/<display_name>.<ext>`, e.g. `<root>/c4.wav` or `<root>/db5.flac`.
/// Extensions are tried in order.
pub struct DirectoryAssets {
    root: PathBuf,
    extensions: Vec<String>,
    backend: Arc<dyn PlayerBackend>,
}

impl DirectoryAssets {
    /// Creates directory-backed assets with the default extension list.
    pub fn new(root: impl Into<PathBuf>, backend: Arc<dyn PlayerBackend>) -> Self {
        Self {
            root: root.into(),
            extensions: ["wav", "flac", "mp3", "ogg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            backend,
        }
    }

    /// Overrides the extensions tried when resolving a note's file.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Resolves the asset file for a note, if one exists.
    fn resolve(&self, note: NoteNumber) -> Option<PathBuf> {
        let name = match note::display_name(note) {
            Ok(name) => name,
            Err(_) => {
                debug!(note, "No asset lookup for out-of-range note");
                return None;
            }
        };
        self.extensions
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }
}

impl SampleAssets for DirectoryAssets {
    fn load(&self, note: NoteNumber) -> Result<Option<Box<dyn SamplePlayer>>, LoadError> {
        let path = match self.resolve(note) {
            Some(path) => path,
            None => return Ok(None),
        };
        let sample = loader::decode_file(&path)?;
        self.backend.create_player(sample).map(Some)
    }
}

impl std::fmt::Debug for DirectoryAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryAssets")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .finish()
    }
}
