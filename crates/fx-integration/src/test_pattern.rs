//! Reference core that produces a deterministic test pattern
//!
//! Draws scrolling color bars over the configured scanline range and a
//! square wave on the audio channels. Cycle and sample budgets come from
//! drift-free integer accumulators, so output is bit-identical run to run.

use crate::emulation::EmulationCore;
use fx_core::types::{Pixel, Sample};
use fx_core::{ClockError, FixedClock, FrameCycleAccumulator, MasterClock, Settings};
use fx_frame::{FrameTarget, SystemGeometry};
use std::sync::Arc;

/// Color bars, XRGB8888
const BARS: [Pixel; 8] = [
    0x00FF_FFFF,
    0x00FF_FF00,
    0x0000_FFFF,
    0x0000_FF00,
    0x00FF_00FF,
    0x00FF_0000,
    0x0000_00FF,
    0x0000_0000,
];

/// Square wave half period, in sample frames
const TONE_HALF_PERIOD: u32 = 50;

const TONE_AMPLITUDE: Sample = 4096;

/// Test pattern core
pub struct TestPatternCore {
    settings: Arc<Settings>,
    geometry: SystemGeometry,
    /// Master cycles per frame
    cycles: FrameCycleAccumulator,
    /// Audio sample frames per frame
    samples: FrameCycleAccumulator,
    /// Output width, clamped to the pitch at draw time
    width: u32,
    interlaced: bool,
    field: bool,
    frame: u64,
    tone_phase: u32,
    scratch: Vec<Sample>,
}

impl TestPatternCore {
    /// PC-FX timing, display width from the high dot clock setting
    pub fn new(settings: Arc<Settings>) -> Result<Self, ClockError> {
        Self::with_geometry(settings, SystemGeometry::PCFX)
    }

    pub fn with_geometry(settings: Arc<Settings>, geometry: SystemGeometry) -> Result<Self, ClockError> {
        let sound_clock = MasterClock::new(
            FixedClock::from_ratio(geometry.sound_rate as i64, 1).ok_or(ClockError::ZeroDivisor)?,
        );

        tracing::info!(
            "Test pattern core: {}x{} lines {}..={}, cpu {:?}, ports {:?}/{:?}",
            settings.high_dotclock_width(),
            settings.visible_lines(),
            settings.scanline_start(),
            settings.scanline_end(),
            settings.cpu_emulation(),
            settings.port_device(0),
            settings.port_device(1),
        );

        Ok(Self {
            width: settings.high_dotclock_width(),
            cycles: FrameCycleAccumulator::new(geometry.master_clock, geometry.fps)?,
            samples: FrameCycleAccumulator::new(sound_clock, geometry.fps)?,
            settings,
            geometry,
            interlaced: false,
            field: false,
            frame: 0,
            tone_phase: 0,
            scratch: Vec::new(),
        })
    }

    /// Override the output width
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Produce interlaced frames, alternating fields
    pub fn with_interlace(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    /// Frames produced since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    fn draw(&self, target: &mut FrameTarget<'_>, y: usize, h: usize, width: usize) {
        let bar_width = (width / BARS.len()).max(1);
        let scroll = self.frame as usize;
        let (first, step) = if self.interlaced {
            (y + self.field as usize, 2)
        } else {
            (y, 1)
        };

        let pixels = target.pixels();
        for line in (first..y + h).step_by(step) {
            let Some(row) = pixels.row_mut(line) else { break };
            for (x, pixel) in row[..width].iter_mut().enumerate() {
                *pixel = BARS[((x + scroll) / bar_width) % BARS.len()];
            }
        }
    }

    fn render_audio(&mut self, target: &mut FrameTarget<'_>) {
        let frames = self.samples.next_frame() as usize;
        let channels = target.sound().channels();

        self.scratch.clear();
        for _ in 0..frames {
            let high = (self.tone_phase / TONE_HALF_PERIOD) % 2 == 0;
            let sample = if high { TONE_AMPLITUDE } else { -TONE_AMPLITUDE };
            self.scratch.extend(std::iter::repeat(sample).take(channels));
            self.tone_phase = self.tone_phase.wrapping_add(1);
        }

        let stored = target.sound().push_frames(&self.scratch);
        if stored < frames {
            tracing::warn!("Sound buffer full, dropped {} sample frames", frames - stored);
        }
    }
}

impl EmulationCore for TestPatternCore {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn geometry(&self) -> SystemGeometry {
        self.geometry
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn emulate_frame(&mut self, target: &mut FrameTarget<'_>) {
        let height = target.height();
        let width = (self.width as usize).min(target.pitch());

        // Interlaced output covers twice the lines at twice the start offset.
        let scale = if self.interlaced { 2 } else { 1 };
        let y = (self.settings.scanline_start() as usize * scale).min(height);
        let h = (self.settings.visible_lines() as usize * scale).min(height - y);

        target.set_master_cycles(self.cycles.next_frame());
        target.set_display_rect(y as i32, width as i32, h as i32);
        target.set_interlace(self.interlaced, self.field);

        if !target.is_skip() {
            self.draw(target, y, h, width);
        }
        if let Some(widths) = target.line_widths() {
            widths.fill(width as i32);
        }
        self.render_audio(target);

        if self.interlaced {
            self.field = !self.field;
        }
        self.frame += 1;
    }

    fn reset(&mut self) {
        tracing::debug!("Resetting test pattern core after {} frames", self.frame);
        self.cycles.reset();
        self.samples.reset();
        self.field = false;
        self.frame = 0;
        self.tone_phase = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_frame::FrameBuffers;

    #[test]
    fn test_pcfx_defaults() {
        let core = TestPatternCore::new(Arc::new(Settings::default())).unwrap();
        assert_eq!(core.name(), "test-pattern");
        assert_eq!(core.geometry(), SystemGeometry::PCFX);
        assert_eq!(core.settings().scanline_start(), 4);
    }

    #[test]
    fn test_frame_fills_rect_and_line_widths() {
        let mut core = TestPatternCore::new(Arc::new(Settings::default()))
            .unwrap()
            .with_width(256);
        let geometry = core.geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, true, 1024).unwrap();
        buffers.poison_line_widths();

        let info = {
            let mut target = buffers.target();
            core.emulate_frame(&mut target);
            target.finish()
        };

        assert_eq!((info.y, info.w, info.h), (4, 256, 232));
        assert!(info.master_cycles > 0);
        assert!(info.sound_frames > 0 && info.sound_frames <= 1024);
        assert!(buffers.line_widths().unwrap().iter().all(|&w| w == 256));
        assert_eq!(buffers.row(4).unwrap()[0], BARS[0]);
        assert_eq!(buffers.row(3).unwrap()[0], 0);
        assert_eq!(core.frame_count(), 1);
    }

    #[test]
    fn test_skip_still_reports_cycles() {
        let mut core = TestPatternCore::new(Arc::new(Settings::default())).unwrap();
        let geometry = core.geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, false, 1024).unwrap();

        let info = {
            let mut target = buffers.target();
            target.set_skip(true);
            core.emulate_frame(&mut target);
            target.finish()
        };

        assert!(info.is_skip());
        assert!(info.master_cycles > 0);
        assert!(buffers.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_reset_restarts_timing() {
        let mut core = TestPatternCore::new(Arc::new(Settings::default())).unwrap();
        let geometry = core.geometry();
        let mut buffers = FrameBuffers::new(geometry.min_layout(), &geometry, false, 1024).unwrap();

        let mut run = |core: &mut TestPatternCore| {
            let mut target = buffers.target();
            core.emulate_frame(&mut target);
            target.finish()
        };
        let first = run(&mut core);
        run(&mut core);
        core.reset();
        assert_eq!(core.frame_count(), 0);
        assert_eq!(run(&mut core).master_cycles, first.master_cycles);
    }
}
