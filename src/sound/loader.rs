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

//! Sample decoding.
//!
//! Note samples are short one-shots, so they are decoded entirely into memory
//! for zero-latency playback rather than streamed.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use super::error::LoadError;

/// A decoded sample held in memory. The PCM data is shared via an Arc so
/// clones are cheap.
#[derive(Clone)]
pub struct LoadedSample {
    /// Interleaved f32 samples.
    data: Arc<Vec<f32>>,
    /// Number of channels.
    channel_count: u16,
    /// Sample rate of the audio data.
    sample_rate: u32,
}

impl LoadedSample {
    /// Creates a loaded sample from raw interleaved PCM.
    pub fn new(data: Vec<f32>, channel_count: u16, sample_rate: u32) -> Self {
        Self {
            data: Arc::new(data),
            channel_count,
            sample_rate,
        }
    }

    /// The interleaved PCM data.
    pub fn data(&self) -> &Arc<Vec<f32>> {
        &self.data
    }

    /// The number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// The sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The memory used by the sample data.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// The duration of the sample.
    pub fn duration(&self) -> Duration {
        if self.channel_count == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.data.len() as f64 / f64::from(self.channel_count);
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }
}

impl std::fmt::Debug for LoadedSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedSample")
            .field("channels", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("duration_ms", &self.duration().as_millis())
            .field("memory_kb", &(self.memory_size() / 1024))
            .finish()
    }
}

/// Decodes an audio file (WAV, FLAC, MP3, etc.) entirely into memory.
pub fn decode_file(path: &Path) -> Result<LoadedSample, LoadError> {
    let decode_error = |message: String| LoadError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // A hint from the extension helps the format registry guess the format.
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error("no audio track found".to_string()))?;
    let track_id = track.id;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(e.to_string()))?;

    let mut data: Vec<f32> = Vec::new();
    let mut channel_count: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut sample_buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            // Some decoders report EOF as a decode error.
            Err(SymphoniaError::DecodeError(_)) => break,
            Err(e) => return Err(decode_error(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Recoverable corruption; skip the packet.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(decode_error(e.to_string())),
        };

        let spec = *decoded.spec();
        if sample_buffer.is_none() {
            channel_count = spec.channels.count() as u16;
            sample_rate = spec.rate;
            sample_buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buffer) = sample_buffer.as_mut() {
            buffer.copy_interleaved_ref(decoded);
            data.extend_from_slice(buffer.samples());
        }
    }

    if channel_count == 0 || data.is_empty() {
        return Err(decode_error("no decodable audio data".to_string()));
    }

    let loaded = LoadedSample::new(data, channel_count, sample_rate);
    debug!(
        path = ?path,
        channels = loaded.channel_count(),
        sample_rate = loaded.sample_rate(),
        duration_ms = loaded.duration().as_millis(),
        memory_kb = loaded.memory_size() / 1024,
        "Sample decoded into memory"
    );
    Ok(loaded)
}
