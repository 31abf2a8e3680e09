//! Bounded views over host-owned frame buffers
//!
//! The core only ever sees these views, never the raw pointers. Each view
//! borrows its storage for exactly one emulate call.

use fx_core::hints::{cold_path, fast_array_set, likely, unlikely};
use fx_core::types::{LineWidth, Pixel, Sample};

/// Pixel buffer view with a pitch given in pixels
#[derive(Debug)]
pub struct PixelView<'a> {
    pixels: &'a mut [Pixel],
    pitch: usize,
    height: usize,
}

impl<'a> PixelView<'a> {
    /// `pixels` must hold at least `pitch * height` elements; any excess is
    /// not exposed.
    pub(crate) fn new(pixels: &'a mut [Pixel], pitch: usize, height: usize) -> Self {
        let len = pitch * height;
        debug_assert!(pixels.len() >= len);
        Self {
            pixels: &mut pixels[..len],
            pitch,
            height,
        }
    }

    /// Stride between lines, in pixels
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mutable access to one full line
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [Pixel]> {
        if unlikely(y >= self.height) {
            return None;
        }
        let start = y * self.pitch;
        Some(&mut self.pixels[start..start + self.pitch])
    }

    /// Write a single pixel; returns `false` if `(x, y)` is outside the buffer
    pub fn put(&mut self, x: usize, y: usize, pixel: Pixel) -> bool {
        if likely(x < self.pitch && y < self.height) {
            self.pixels[y * self.pitch + x] = pixel;
            true
        } else {
            false
        }
    }

    /// Fill the whole buffer
    pub fn fill(&mut self, pixel: Pixel) {
        fast_array_set(self.pixels, pixel);
    }

    pub fn as_slice(&self) -> &[Pixel] {
        self.pixels
    }
}

/// Per-line width view, one entry per framebuffer line
#[derive(Debug)]
pub struct LineWidthView<'a> {
    widths: &'a mut [LineWidth],
}

impl<'a> LineWidthView<'a> {
    pub(crate) fn new(widths: &'a mut [LineWidth]) -> Self {
        Self { widths }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Set the width of `line`; returns `false` if the line does not exist
    pub fn set(&mut self, line: usize, width: LineWidth) -> bool {
        match self.widths.get_mut(line) {
            Some(slot) => {
                *slot = width;
                true
            }
            None => false,
        }
    }

    /// Set every line to the same width
    pub fn fill(&mut self, width: LineWidth) {
        fast_array_set(self.widths, width);
    }

    pub fn as_slice(&self) -> &[LineWidth] {
        self.widths
    }
}

/// Interleaved audio output view
///
/// Capacity is counted in sample frames (one sample per channel). Writes
/// past capacity are dropped and counted, never stored.
#[derive(Debug)]
pub struct SoundView<'a> {
    samples: &'a mut [Sample],
    channels: usize,
    capacity: usize,
    written: usize,
    dropped: usize,
}

impl<'a> SoundView<'a> {
    /// `samples` must hold at least `capacity * channels` elements.
    pub(crate) fn new(samples: &'a mut [Sample], channels: usize, capacity: usize) -> Self {
        let channels = channels.max(1);
        debug_assert!(samples.len() >= capacity * channels);
        Self {
            samples,
            channels,
            capacity,
            written: 0,
            dropped: 0,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Maximum sample frames this call may produce
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sample frames written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Sample frames discarded because the buffer was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.written
    }

    /// Append interleaved sample frames, truncating at capacity.
    ///
    /// A trailing partial frame in `samples` is ignored. Returns the number
    /// of whole frames stored.
    pub fn push_frames(&mut self, samples: &[Sample]) -> usize {
        let frames = samples.len() / self.channels;
        let stored = frames.min(self.remaining());
        if unlikely(stored < frames) {
            cold_path();
            self.dropped += frames - stored;
        }

        let start = self.written * self.channels;
        let len = stored * self.channels;
        self.samples[start..start + len].copy_from_slice(&samples[..len]);
        self.written += stored;
        stored
    }

    /// Append one sample frame; returns `false` if it was dropped
    pub fn push_frame(&mut self, frame: &[Sample]) -> bool {
        debug_assert_eq!(frame.len(), self.channels);
        self.push_frames(frame) == 1
    }

    /// Forget everything written during this call
    pub fn clear(&mut self) {
        self.written = 0;
        self.dropped = 0;
    }

    /// The sample frames written so far, interleaved
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples[..self.written * self.channels]
    }
}
