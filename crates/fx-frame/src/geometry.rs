//! System and framebuffer geometry

use fx_core::{FixedClock, MasterClock};

/// Fixed properties of an emulated system that the host must size its
/// buffers against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemGeometry {
    /// Minimum framebuffer width (and therefore pitch), in pixels
    pub fb_width: u32,
    /// Minimum framebuffer height, in lines
    pub fb_height: u32,
    /// Master clock used as the time base for `master_cycles`
    pub master_clock: MasterClock,
    /// Nominal frame rate, 32.32 fixed point
    pub fps: FixedClock,
    /// Audio output rate in Hz
    pub sound_rate: u32,
    /// Interleaved audio channels per sample frame
    pub sound_channels: u32,
}

impl SystemGeometry {
    /// PC-FX: 1024x480 framebuffer, 263 lines of 455 dots at 7.16 MHz
    pub const PCFX: Self = Self {
        fb_width: 1024,
        fb_height: 480,
        master_clock: MasterClock::PCFX,
        fps: match FixedClock::from_ratio(78_750_000, 11 * 455 * 263) {
            Some(fps) => fps,
            None => panic!("PC-FX frame rate out of range"),
        },
        sound_rate: 44_100,
        sound_channels: 2,
    };

    /// Upper bound on audio sample frames produced in one video frame
    pub fn sound_frames_per_frame(&self) -> u32 {
        let rate = self.sound_rate as i128 * (1i128 << 32);
        let fps = self.fps.raw().max(1) as i128;
        ((rate + fps - 1) / fps) as u32
    }

    /// Smallest layout that satisfies this system
    pub fn min_layout(&self) -> FrameLayout {
        FrameLayout::new(self.fb_width, self.fb_height)
    }
}

/// Framebuffer dimensions as declared by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameLayout {
    /// Declared width; the pitch handed to the core equals this
    pub width: u32,
    /// Number of lines
    pub height: u32,
}

impl FrameLayout {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count of the whole framebuffer
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcfx_geometry() {
        let geometry = SystemGeometry::PCFX;
        let fps = geometry.fps.to_f64();
        assert!((fps - 59.826).abs() < 0.001, "fps = {}", fps);
        assert_eq!(geometry.min_layout(), FrameLayout::new(1024, 480));
        assert_eq!(geometry.sound_frames_per_frame(), 738);
    }

    #[test]
    fn test_pixel_count() {
        assert_eq!(FrameLayout::new(256, 240).pixel_count(), 61_440);
    }
}
