//! Offline waveform analysis: decode a track, fold it to mono, and reduce
//! it to a fixed-length envelope of peak amplitudes.
//!
//! Runs once at startup. The envelope is immutable afterwards and drives
//! the scrolling visualization for the rest of the session.

use std::path::{Path, PathBuf};

use hound::WavReader;

use crate::error::VisError;
use crate::params::AnalysisConfig;

/// Decoded audio track: interleaved f32 samples plus stream parameters.
///
/// Decoded once and shared by the analyzer and the playback engine, so the
/// file is only read from disk a single time.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Interleaved samples, `channels` per frame, normalized to [-1, 1]
    pub samples: Vec<f32>,
    /// Channels per frame (1 = mono, 2 = stereo, ...)
    pub channels: u16,
    /// Sample rate (Hz)
    pub sample_rate: u32,
    path: PathBuf,
}

impl AudioTrack {
    /// Decode a WAV file. Integer formats are normalized by `2^(bits-1)`,
    /// float formats pass through unchanged.
    pub fn load(path: &Path) -> Result<Self, VisError> {
        let decode_err = |source| VisError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = WavReader::open(path).map_err(decode_err)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / max_value))
                    .collect::<Result<_, _>>()
                    .map_err(decode_err)?
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(decode_err)?,
        };

        if samples.is_empty() {
            return Err(VisError::EmptyTrack(path.to_path_buf()));
        }

        Ok(Self {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            path: path.to_path_buf(),
        })
    }

    /// Path the track was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of sample frames (interleaved samples / channels)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Track duration in seconds (frames / sample rate).
    /// Positive for any non-empty track.
    pub fn duration_s(&self) -> f32 {
        self.frame_count() as f32 / self.sample_rate as f32
    }

    /// Fold interleaved frames to a single mono channel by averaging all
    /// channels of each frame. Lossy on purpose: the visualization shows
    /// one amplitude, not one per channel.
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = self.channels as usize;
        if channels == 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

/// Fixed-length sequence of per-chunk peak amplitudes representing the
/// whole track's visual shape. Immutable after analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    peaks: Vec<f32>,
}

impl Envelope {
    /// Compute the envelope of a track.
    ///
    /// The mono signal is partitioned into `bars` chunks of `floor(N/bars)`
    /// samples; each bar is the peak absolute value within its chunk
    /// (peak-hold, not RMS — transient spikes survive, sustained energy is
    /// not averaged in). Trailing samples past `bars * floor(N/bars)` are
    /// dropped. Fewer mono samples than bars yields an all-zero envelope.
    pub fn from_track(track: &AudioTrack, config: &AnalysisConfig) -> Result<Self, VisError> {
        config.validate()?;

        let mono = track.to_mono();
        let chunk_size = mono.len() / config.bars;

        let peaks = if chunk_size == 0 {
            vec![0.0; config.bars]
        } else {
            mono.chunks_exact(chunk_size)
                .take(config.bars)
                .map(|chunk| chunk.iter().fold(0.0f32, |peak, s| peak.max(s.abs())))
                .collect()
        };

        Ok(Self { peaks })
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// All bar values, ordered from track start to track end
    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    /// Bar value at `index`, or `None` past the end of the track
    pub fn get(&self, index: usize) -> Option<f32> {
        self.peaks.get(index).copied()
    }

    #[cfg(test)]
    pub(crate) fn from_peaks(peaks: Vec<f32>) -> Self {
        Self { peaks }
    }
}

/// Decode `path` and compute its envelope in one step.
///
/// Returns the envelope and the track duration in seconds.
pub fn analyze(path: &Path, config: &AnalysisConfig) -> Result<(Envelope, f32), VisError> {
    let track = AudioTrack::load(path)?;
    let envelope = Envelope::from_track(&track, config)?;
    Ok((envelope, track.duration_s()))
}
