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

use std::path::PathBuf;

/// Typed error for sample asset loading so callers can distinguish a missing
/// file from a decode failure. Load failures are transient: nothing is
/// cached, and a later play retries the load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The asset file could not be opened.
    #[error("failed to open sample asset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The asset file could not be decoded into PCM.
    #[error("failed to decode sample asset {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The platform audio backend refused to create a player.
    #[error("audio backend error: {0}")]
    Backend(String),

    /// The blocking load task failed to run to completion.
    #[error("sample load task failed: {0}")]
    Task(String),
}
