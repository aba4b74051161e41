//! Playback timeline: maps elapsed playback time onto the envelope and
//! maintains the bounded scrolling window of bars handed to rendering.
//!
//! Everything here is pure or single-threaded deterministic state, so the
//! whole synchronization stage is testable without audio or GPU backends.

use std::collections::VecDeque;

use crate::analysis::Envelope;

/// Map elapsed playback time to an envelope index.
///
/// Returns `floor((elapsed / duration) * envelope_len)`. The result is NOT
/// clamped: at or past the end of the track it lands at or beyond
/// `envelope_len`, which callers must treat as "no further advance" —
/// [`ScrollBuffer::on_tick`] does exactly that.
///
/// `duration_s` must be positive; the analyzer guarantees it for any
/// non-empty track.
pub fn envelope_index(elapsed_s: f32, duration_s: f32, envelope_len: usize) -> usize {
    debug_assert!(duration_s > 0.0, "track duration must be positive");
    ((elapsed_s / duration_s) * envelope_len as f32) as usize
}

/// Bounded sliding window of recently-reached envelope values, ordered
/// oldest-to-newest left-to-right for rendering.
///
/// Invariant: `len() <= capacity()` after every tick. Values are appended
/// at the tail only when the envelope index advances and evicted from the
/// head once capacity is exceeded.
#[derive(Debug)]
pub struct ScrollBuffer {
    values: VecDeque<f32>,
    capacity: usize,
    last_index: Option<usize>,
}

impl ScrollBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
            last_index: None,
        }
    }

    /// Advance the window for one tick.
    ///
    /// No-op when the index has not moved since the last consumed tick
    /// (ticks occur far more often than index changes), when it points past
    /// the end of the envelope (track over, clock overrun), or when it would
    /// move backwards. On an advance, the newest bar is appended and the
    /// head is evicted until the capacity invariant holds again.
    ///
    /// If a delayed tick skips the index forward by more than one step, only
    /// the newest value is pushed; the intermediate envelope values are
    /// dropped, matching single-push-per-tick behavior at any cadence.
    pub fn on_tick(&mut self, index: usize, envelope: &Envelope) {
        let Some(value) = envelope.get(index) else {
            return;
        };

        if let Some(last) = self.last_index {
            if index <= last {
                return;
            }
        }

        self.last_index = Some(index);
        self.values.push_back(value);

        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Bars currently visible, oldest first
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Last envelope index consumed, if any bar has been pushed yet
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Envelope;

    fn collect(buffer: &ScrollBuffer) -> Vec<f32> {
        buffer.values().collect()
    }

    #[test]
    fn test_envelope_index_proportional() {
        assert_eq!(envelope_index(0.0, 4.0, 4), 0);
        assert_eq!(envelope_index(1.0, 4.0, 4), 1);
        assert_eq!(envelope_index(3.5, 4.0, 4), 3);
        // Half-way through a 200s track with 1024 bars
        assert_eq!(envelope_index(100.0, 200.0, 1024), 512);
    }

    #[test]
    fn test_envelope_index_at_end_is_out_of_range() {
        // elapsed == duration must land at or beyond the envelope, never
        // inside it.
        assert!(envelope_index(4.0, 4.0, 4) >= 4);
        assert!(envelope_index(5.0, 4.0, 4) >= 4);
    }

    #[test]
    fn test_on_tick_is_idempotent() {
        let envelope = Envelope::from_peaks(vec![0.1, 0.5, 0.9]);
        let mut buffer = ScrollBuffer::new(8);

        buffer.on_tick(1, &envelope);
        let after_first = collect(&buffer);
        buffer.on_tick(1, &envelope);

        assert_eq!(collect(&buffer), after_first);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let envelope = Envelope::from_peaks(vec![0.1, 0.5]);
        let mut buffer = ScrollBuffer::new(4);

        buffer.on_tick(1, &envelope);
        buffer.on_tick(2, &envelope);
        buffer.on_tick(100, &envelope);

        assert_eq!(collect(&buffer), vec![0.5]);
        assert_eq!(buffer.last_index(), Some(1));
    }

    #[test]
    fn test_backwards_index_is_ignored() {
        let envelope = Envelope::from_peaks(vec![0.1, 0.5, 0.9]);
        let mut buffer = ScrollBuffer::new(4);

        buffer.on_tick(2, &envelope);
        buffer.on_tick(0, &envelope);

        assert_eq!(collect(&buffer), vec![0.9]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let envelope = Envelope::from_peaks((0..64).map(|i| i as f32 / 64.0).collect());
        let mut buffer = ScrollBuffer::new(5);

        for index in 0..64 {
            // Repeat each index a few times like real ticks do.
            for _ in 0..3 {
                buffer.on_tick(index, &envelope);
                assert!(buffer.len() <= buffer.capacity());
            }
        }

        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_skip_pushes_only_newest_value() {
        let envelope = Envelope::from_peaks(vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        let mut buffer = ScrollBuffer::new(8);

        buffer.on_tick(0, &envelope);
        // Delayed tick: index jumped 0 -> 3; intermediates are dropped.
        buffer.on_tick(3, &envelope);

        assert_eq!(collect(&buffer), vec![0.1, 0.4]);
    }

    #[test]
    fn test_end_to_end_scroll_scenario() {
        // Envelope [0.1, 0.5, 0.9, 0.2], duration 4s, capacity 2.
        let envelope = Envelope::from_peaks(vec![0.1, 0.5, 0.9, 0.2]);
        let duration = 4.0;
        let mut buffer = ScrollBuffer::new(2);

        let mut tick = |elapsed: f32, buffer: &mut ScrollBuffer| {
            let index = envelope_index(elapsed, duration, envelope.len());
            buffer.on_tick(index, &envelope);
        };

        tick(0.0, &mut buffer);
        assert_eq!(collect(&buffer), vec![0.1]);

        tick(2.0, &mut buffer);
        assert_eq!(collect(&buffer), vec![0.1, 0.9]);

        tick(3.0, &mut buffer);
        assert_eq!(collect(&buffer), vec![0.9, 0.2]);
    }
}
