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

//! A multi-touch virtual piano keyboard and sample playback engine.
//!
//! The crate is split into a pure geometry/state side and an async sound
//! side:
//!
//! - [`note`] names notes and maps between names and MIDI numbers.
//! - [`range`] parses and validates key ranges from config input.
//! - [`layout`] computes per-key geometry for a range.
//! - [`touch`] tracks multi-touch contacts against key bounds.
//! - [`keyboard`] diffs active-note sets and drives sound and observers.
//! - [`sound`] loads, caches and plays per-note samples.
//! - [`config`] is the declarative setup for all of the above.

pub mod config;
pub mod keyboard;
pub mod layout;
pub mod note;
pub mod playsync;
pub mod range;
pub mod sound;
pub mod touch;

#[cfg(test)]
mod testutil;
