//! Frame digests for deterministic replay checks
//!
//! Two runs with the same settings and inputs must produce bit-identical
//! frames. Hashing each frame's visible output makes that cheap to compare.

use fx_frame::{FrameBuffers, FrameInfo};
use sha1::{Digest, Sha1};

/// SHA-1 of one frame's visible output and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDigest([u8; 20]);

impl FrameDigest {
    /// Hash the metadata, the populated part of the display rectangle, the
    /// line widths and the audio of one frame.
    ///
    /// Pixels are left out of skipped frames since they are stale.
    pub fn of_frame(buffers: &FrameBuffers, info: &FrameInfo) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(info.y.to_le_bytes());
        hasher.update(info.w.to_le_bytes());
        hasher.update(info.h.to_le_bytes());
        hasher.update(info.master_cycles.to_le_bytes());
        hasher.update(info.sound_frames.to_le_bytes());
        hasher.update([info.flags.bits()]);

        if !info.is_skip() {
            let start = info.y.max(0) as usize;
            let end = start + info.h.max(0) as usize;
            let (first, step) = if info.interlace_on() {
                (start + info.interlace_field() as usize, 2)
            } else {
                (start, 1)
            };
            for line in (first..end).step_by(step) {
                let Some(row) = buffers.row(line) else { break };
                hasher.update(bytemuck::cast_slice::<u32, u8>(row));
            }
        }

        if let Some(widths) = buffers.line_widths() {
            hasher.update(bytemuck::cast_slice::<i32, u8>(widths));
        }

        let sound = buffers.sound(info.sound_frames.max(0) as usize);
        hasher.update(bytemuck::cast_slice::<i16, u8>(sound));

        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Running hash over a sequence of frame digests
#[derive(Debug, Clone, Default)]
pub struct DigestChain {
    hasher: Sha1,
    frames: u64,
}

impl DigestChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, digest: &FrameDigest) {
        self.hasher.update(digest.as_bytes());
        self.frames += 1;
    }

    /// Frames folded in so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Digest of the sequence so far
    pub fn current(&self) -> FrameDigest {
        FrameDigest(self.hasher.clone().finalize().into())
    }
}
