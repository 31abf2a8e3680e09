//! Host-side deinterlacer
//!
//! Interlaced frames only carry every other line of the display rectangle.
//! The deinterlacer keeps a progressive copy of the picture and fills the
//! missing lines either from the previous field (weave) or by repeating the
//! current field's lines (bob).

use fx_core::types::Pixel;
use fx_frame::{FrameBuffers, FrameInfo, FrameLayout};

/// How missing lines are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeinterlaceMode {
    /// Keep the other field's lines from the previous frame
    #[default]
    Weave,
    /// Duplicate each line of the current field into its neighbour
    Bob,
}

/// Progressive output buffer built from interlaced frames
#[derive(Debug, Clone)]
pub struct Deinterlacer {
    mode: DeinterlaceMode,
    layout: FrameLayout,
    output: Vec<Pixel>,
}

impl Deinterlacer {
    pub fn new(mode: DeinterlaceMode, layout: FrameLayout) -> Self {
        Self {
            mode,
            layout,
            output: vec![0; layout.pixel_count()],
        }
    }

    pub fn mode(&self) -> DeinterlaceMode {
        self.mode
    }

    /// Fold the latest frame into the output.
    ///
    /// Skipped frames are ignored since their pixels are stale.
    pub fn process(&mut self, buffers: &FrameBuffers, info: &FrameInfo) {
        if info.is_skip() {
            return;
        }
        if buffers.layout() != self.layout {
            tracing::debug!("Deinterlacer layout changed, reallocating");
            *self = Self::new(self.mode, buffers.layout());
        }

        let pitch = self.layout.width as usize;
        let start = info.y.max(0) as usize;
        let end = (start + info.h.max(0) as usize).min(self.layout.height as usize);

        if !info.interlace_on() {
            let range = start * pitch..end * pitch;
            self.output[range.clone()].copy_from_slice(&buffers.pixels()[range]);
            return;
        }

        let field = info.interlace_field() as usize;
        for line in (start + field..end).step_by(2) {
            let Some(row) = buffers.row(line) else { break };
            self.output[line * pitch..(line + 1) * pitch].copy_from_slice(row);

            if self.mode == DeinterlaceMode::Bob {
                // Fill the neighbouring line of the other field.
                let other = if field == 0 { line + 1 } else { line - 1 };
                if other >= start && other < end {
                    self.output[other * pitch..(other + 1) * pitch].copy_from_slice(row);
                }
            }
        }
    }

    /// The progressive picture
    pub fn frame(&self) -> &[Pixel] {
        &self.output
    }

    /// One output line
    pub fn row(&self, y: usize) -> Option<&[Pixel]> {
        if y >= self.layout.height as usize {
            return None;
        }
        let pitch = self.layout.width as usize;
        self.output.get(y * pitch..(y + 1) * pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_core::{FixedClock, MasterClock};
    use fx_frame::{FrameFlags, SystemGeometry};

    fn geometry() -> SystemGeometry {
        SystemGeometry {
            fb_width: 4,
            fb_height: 8,
            master_clock: MasterClock::new(FixedClock::from_raw(1000 << 32)),
            fps: FixedClock::from_raw(10 << 32),
            sound_rate: 0,
            sound_channels: 2,
        }
    }

    /// Draw `value` on the lines of `field` and return the frame metadata.
    fn draw_field(buffers: &mut FrameBuffers, field: bool, value: Pixel) -> FrameInfo {
        let mut target = buffers.target();
        for line in (field as usize..8).step_by(2) {
            target.pixels().row_mut(line).unwrap().fill(value);
        }
        target.set_display_rect(0, 4, 8);
        target.set_master_cycles(100);
        target.set_interlace(true, field);
        target.finish()
    }

    #[test]
    fn test_weave_combines_fields() {
        let geometry = geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, false, 0).unwrap();
        let mut deinterlacer = Deinterlacer::new(DeinterlaceMode::Weave, buffers.layout());

        let info = draw_field(&mut buffers, false, 1);
        deinterlacer.process(&buffers, &info);
        let info = draw_field(&mut buffers, true, 2);
        deinterlacer.process(&buffers, &info);

        for line in 0..8 {
            let expected = if line % 2 == 0 { 1 } else { 2 };
            assert_eq!(deinterlacer.row(line).unwrap(), &[expected; 4], "line {}", line);
        }
    }

    #[test]
    fn test_bob_repeats_lines() {
        let geometry = geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, false, 0).unwrap();
        let mut deinterlacer = Deinterlacer::new(DeinterlaceMode::Bob, buffers.layout());

        let info = draw_field(&mut buffers, true, 7);
        deinterlacer.process(&buffers, &info);
        assert!(deinterlacer.frame().iter().all(|&p| p == 7));
    }

    #[test]
    fn test_progressive_and_skip() {
        let geometry = geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, false, 0).unwrap();
        let mut deinterlacer = Deinterlacer::new(DeinterlaceMode::default(), buffers.layout());

        let info = {
            let mut target = buffers.target();
            target.pixels().fill(3);
            target.set_display_rect(2, 4, 4);
            target.set_master_cycles(100);
            target.finish()
        };
        deinterlacer.process(&buffers, &info);
        assert_eq!(deinterlacer.row(1).unwrap(), &[0; 4]);
        assert_eq!(deinterlacer.row(2).unwrap(), &[3; 4]);
        assert_eq!(deinterlacer.row(5).unwrap(), &[3; 4]);
        assert_eq!(deinterlacer.row(6).unwrap(), &[0; 4]);
        assert!(deinterlacer.row(8).is_none());
        assert!(deinterlacer.row(usize::MAX).is_none());

        buffers.target().pixels().fill(9);
        let skipped = FrameInfo { flags: FrameFlags::SKIP, h: 8, ..info };
        deinterlacer.process(&buffers, &skipped);
        assert_eq!(deinterlacer.row(2).unwrap(), &[3; 4]);
    }
}
