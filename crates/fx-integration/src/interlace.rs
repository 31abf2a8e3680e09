//! Interlace field history
//!
//! The core only reports the field of the current frame; remembering the
//! previous one is the host's job.

use fx_core::ContractViolation;
use fx_frame::FrameInfo;

/// Tracks the interlace field across consecutive frames
#[derive(Debug, Clone, Default)]
pub struct InterlaceTracker {
    /// Field of the previous frame, if it was interlaced
    last_field: Option<bool>,
    /// Interlaced frames observed since the last reset
    fields_seen: u64,
}

impl InterlaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame, checking that fields alternate.
    ///
    /// History is cleared whenever interlacing turns off, so the first
    /// interlaced frame after a mode switch may carry either field.
    pub fn observe(&mut self, info: &FrameInfo) -> Result<(), ContractViolation> {
        if !info.interlace_on() {
            if self.last_field.take().is_some() {
                tracing::debug!("Interlace off after {} fields", self.fields_seen);
            }
            return Ok(());
        }

        let field = info.interlace_field();
        if self.last_field == Some(field) {
            return Err(ContractViolation::InterlaceFieldRepeated { field });
        }
        if self.last_field.is_none() {
            tracing::debug!("Interlace on, starting with field {}", field as u8);
        }

        self.last_field = Some(field);
        self.fields_seen += 1;
        Ok(())
    }

    /// Field of the most recent interlaced frame
    pub fn last_field(&self) -> Option<bool> {
        self.last_field
    }

    pub fn fields_seen(&self) -> u64 {
        self.fields_seen
    }

    pub fn reset(&mut self) {
        self.last_field = None;
        self.fields_seen = 0;
    }
}
