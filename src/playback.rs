//! Audio playback engine: plays the decoded track through the default
//! output device and exposes the instant playback began.
//!
//! The visualization never queries the stream for its live position; it
//! derives everything from the start instant and wall-clock time, assuming
//! constant-rate playback. Over a long session the two can drift apart — an
//! accepted approximation.

use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::analysis::AudioTrack;
use crate::error::VisError;

/// Playback engine holding the output stream alive and the playback
/// reference timestamp.
pub struct PlaybackSystem {
    /// Output stream (kept alive; dropping it stops playback)
    _stream: cpal::Stream,

    /// When playback began — the sole basis for all elapsed-time math
    started_at: Instant,
}

impl PlaybackSystem {
    /// Start playing the track through the default output device.
    ///
    /// The stream runs at the track's own channel count and sample rate; the
    /// output callback copies interleaved samples straight through and fills
    /// with silence once the track is exhausted.
    pub fn start(track: &AudioTrack) -> Result<Self, VisError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VisError::AudioBackend("no output device found".to_string()))?;

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = track.sample_rate,
            channels = track.channels,
            "starting playback"
        );

        let config = cpal::StreamConfig {
            channels: track.channels,
            sample_rate: cpal::SampleRate(track.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // The callback owns its own cursor; the render side never reads it.
        let samples = track.samples.clone();
        let mut cursor = 0usize;
        let mut end_logged = false;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let remaining = samples.len() - cursor;
                    let take = remaining.min(data.len());

                    data[..take].copy_from_slice(&samples[cursor..cursor + take]);
                    data[take..].fill(0.0);
                    cursor += take;

                    if remaining == 0 && !end_logged {
                        end_logged = true;
                        tracing::debug!("track exhausted, playing silence");
                    }
                },
                |err| tracing::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| VisError::AudioBackend(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VisError::AudioBackend(format!("failed to start output stream: {e}")))?;

        Ok(Self {
            _stream: stream,
            started_at: Instant::now(),
        })
    }

    /// The playback reference: the instant playback began
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Seconds elapsed since playback began
    pub fn elapsed_s(&self) -> f32 {
        self.started_at.elapsed().as_secs_f32()
    }
}
