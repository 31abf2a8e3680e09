//! C-layout frame exchange struct
//!
//! Field order and widths are part of the ABI and must not change.

use crate::geometry::{FrameLayout, SystemGeometry};
use crate::target::{FrameFlags, FrameInfo, FrameTarget};
use crate::validate::validate_input;
use crate::view::{LineWidthView, PixelView, SoundView};
use fx_core::hints::assume_aligned;
use fx_core::types::{LineWidth, MasterCycles, Pitch, Pixel, Sample};
use fx_core::ContractViolation;
use std::mem::{align_of, offset_of};

/// Per-frame handoff between host and core.
///
/// The host owns `pixels`, `line_widths` and `sound_buf` and fills in the
/// pointer and capacity fields. The core fills in everything else.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct EmulateSpec {
    /// Framebuffer, `pitch32` pixels per line. Written by the core.
    pub pixels: *mut Pixel,
    /// Stride in pixels. Must equal the declared width and be at least the
    /// system's minimum frame width.
    pub pitch32: Pitch,

    /// Optional per-line widths, one per framebuffer line. Null when unused,
    /// in which case `w` is authoritative. When set the core must write every
    /// element every frame.
    pub line_widths: *mut LineWidth,

    /// Interleaved 16-bit audio, `sound_buf_max_size` sample frames long
    pub sound_buf: *mut Sample,

    /// Master clock cycles this frame consumed. Set by the core.
    pub master_cycles: MasterCycles,

    /// Capacity of `sound_buf` in sample frames. Set by the host.
    pub sound_buf_max_size: i32,

    /// Sample frames written this frame. Set by the core, never above
    /// `sound_buf_max_size`.
    pub sound_buf_size: i32,

    /// Display rectangle: first line, width and height
    pub y: i32,
    pub w: i32,
    pub h: i32,

    /// When set only every other line (starting at `interlace_field`) holds
    /// data, and `h` is the full-frame height.
    pub interlace_on: bool,
    pub interlace_field: bool,

    /// Pixel output for this frame may be stale
    pub skip: bool,
}

const _: () = {
    assert!(offset_of!(EmulateSpec, pixels) == 0);
    assert!(offset_of!(EmulateSpec, pitch32) > offset_of!(EmulateSpec, pixels));
    assert!(offset_of!(EmulateSpec, line_widths) > offset_of!(EmulateSpec, pitch32));
    assert!(offset_of!(EmulateSpec, sound_buf) > offset_of!(EmulateSpec, line_widths));
    assert!(offset_of!(EmulateSpec, master_cycles) > offset_of!(EmulateSpec, sound_buf));
    assert!(offset_of!(EmulateSpec, sound_buf_max_size) > offset_of!(EmulateSpec, master_cycles));
    assert!(offset_of!(EmulateSpec, sound_buf_size) > offset_of!(EmulateSpec, sound_buf_max_size));
    assert!(offset_of!(EmulateSpec, y) > offset_of!(EmulateSpec, sound_buf_size));
    assert!(offset_of!(EmulateSpec, w) == offset_of!(EmulateSpec, y) + 4);
    assert!(offset_of!(EmulateSpec, h) == offset_of!(EmulateSpec, w) + 4);
    assert!(offset_of!(EmulateSpec, interlace_on) == offset_of!(EmulateSpec, h) + 4);
    assert!(offset_of!(EmulateSpec, interlace_field) == offset_of!(EmulateSpec, interlace_on) + 1);
    assert!(offset_of!(EmulateSpec, skip) == offset_of!(EmulateSpec, interlace_field) + 1);
};

#[cfg(target_pointer_width = "64")]
const _: () = {
    assert!(std::mem::size_of::<EmulateSpec>() == 64);
    assert!(offset_of!(EmulateSpec, master_cycles) == 32);
};

impl Default for EmulateSpec {
    fn default() -> Self {
        Self {
            pixels: std::ptr::null_mut(),
            pitch32: 0,
            line_widths: std::ptr::null_mut(),
            sound_buf: std::ptr::null_mut(),
            master_cycles: 0,
            sound_buf_max_size: 0,
            sound_buf_size: 0,
            y: 0,
            w: 0,
            h: 0,
            interlace_on: false,
            interlace_field: false,
            skip: false,
        }
    }
}

impl EmulateSpec {
    /// Read the core-written metadata back out
    pub fn frame_info(&self) -> FrameInfo {
        let mut flags = FrameFlags::empty();
        flags.set(FrameFlags::INTERLACE_ON, self.interlace_on);
        flags.set(FrameFlags::INTERLACE_FIELD, self.interlace_field);
        flags.set(FrameFlags::SKIP, self.skip);

        FrameInfo {
            y: self.y,
            w: self.w,
            h: self.h,
            master_cycles: self.master_cycles,
            sound_frames: self.sound_buf_size,
            sound_dropped: 0,
            flags,
            uses_line_widths: !self.line_widths.is_null(),
        }
    }

    /// Store core-written metadata. Pointer and capacity fields are left alone.
    pub fn apply_info(&mut self, info: &FrameInfo) {
        self.master_cycles = info.master_cycles;
        self.sound_buf_size = info.sound_frames;
        self.y = info.y;
        self.w = info.w;
        self.h = info.h;
        self.interlace_on = info.interlace_on();
        self.interlace_field = info.interlace_field();
        self.skip = info.is_skip();
    }

    /// Validate the host-supplied fields, expose the buffers as bounded
    /// views for the duration of `f`, then write the reported metadata back.
    /// The host's `skip` request is visible to `f` through the target.
    ///
    /// Nothing is written to any buffer if validation fails.
    ///
    /// # Safety
    /// `pixels` must be valid for `pitch32 * layout.height` writes,
    /// `line_widths` (if non-null) for `layout.height` writes, and
    /// `sound_buf` (if non-null) for `sound_buf_max_size * sound_channels`
    /// writes. None of them may alias each other or be accessed elsewhere
    /// while `f` runs.
    pub unsafe fn with_target<R>(
        &mut self,
        layout: FrameLayout,
        geometry: &SystemGeometry,
        f: impl FnOnce(&mut FrameTarget<'_>) -> R,
    ) -> Result<R, ContractViolation> {
        validate_input(self, layout, geometry)?;

        let pitch = self.pitch32 as usize;
        let height = layout.height as usize;
        let channels = geometry.sound_channels.max(1) as usize;
        let sound_capacity = self.sound_buf_max_size as usize;

        let pixels_ptr = assume_aligned(self.pixels, align_of::<Pixel>());
        let pixels = std::slice::from_raw_parts_mut(pixels_ptr, pitch * height);

        let line_widths = if self.line_widths.is_null() {
            None
        } else {
            Some(LineWidthView::new(std::slice::from_raw_parts_mut(
                self.line_widths,
                height,
            )))
        };

        let sound: &mut [Sample] = if sound_capacity == 0 {
            &mut []
        } else {
            std::slice::from_raw_parts_mut(self.sound_buf, sound_capacity * channels)
        };

        let mut target = FrameTarget::new(
            PixelView::new(pixels, pitch, height),
            line_widths,
            SoundView::new(sound, channels, sound_capacity),
        );
        target.set_skip(self.skip);
        let result = f(&mut target);
        let info = target.finish();

        self.apply_info(&info);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_core::{FixedClock, MasterClock};

    fn geometry() -> SystemGeometry {
        SystemGeometry {
            fb_width: 16,
            fb_height: 4,
            master_clock: MasterClock::new(FixedClock::from_raw(1000 << 32)),
            fps: FixedClock::from_raw(10 << 32),
            sound_rate: 80,
            sound_channels: 2,
        }
    }

    #[test]
    fn test_default_is_empty() {
        let spec = EmulateSpec::default();
        assert!(spec.pixels.is_null());
        assert!(spec.line_widths.is_null());
        assert!(!spec.frame_info().uses_line_widths);
    }

    #[test]
    fn test_info_round_trip_through_fields() {
        let mut spec = EmulateSpec::default();
        let info = FrameInfo {
            y: 2,
            w: 256,
            h: 480,
            master_cycles: 357_955,
            sound_frames: 735,
            sound_dropped: 0,
            flags: FrameFlags::INTERLACE_ON | FrameFlags::INTERLACE_FIELD,
            uses_line_widths: false,
        };
        spec.apply_info(&info);
        assert!(spec.interlace_on && spec.interlace_field && !spec.skip);
        assert_eq!(spec.frame_info(), info);
    }

    #[test]
    fn test_with_target_writes_through() {
        let geometry = geometry();
        let layout = FrameLayout::new(16, 4);
        let mut pixels = vec![0u32; 64];
        let mut widths = vec![0i32; 4];
        let mut sound = vec![0i16; 8];

        let mut spec = EmulateSpec {
            pixels: pixels.as_mut_ptr(),
            pitch32: 16,
            line_widths: widths.as_mut_ptr(),
            sound_buf: sound.as_mut_ptr(),
            sound_buf_max_size: 4,
            ..Default::default()
        };

        let stored = unsafe {
            spec.with_target(layout, &geometry, |target| {
                target.pixels().fill(0x00FF_00FF);
                target.line_widths().unwrap().fill(16);
                target.set_display_rect(0, 16, 4);
                target.set_master_cycles(100);
                target.sound().push_frames(&[9; 12])
            })
        }
        .unwrap();

        assert_eq!(stored, 4);
        assert_eq!(spec.sound_buf_size, 4);
        assert_eq!(spec.master_cycles, 100);
        assert_eq!((spec.y, spec.w, spec.h), (0, 16, 4));
        assert!(pixels.iter().all(|&p| p == 0x00FF_00FF));
        assert_eq!(widths, [16; 4]);
        assert_eq!(sound, [9; 8]);
    }

    #[test]
    fn test_with_target_rejects_bad_pitch_before_writing() {
        let geometry = geometry();
        let mut pixels = vec![0u32; 64];
        let mut spec = EmulateSpec {
            pixels: pixels.as_mut_ptr(),
            pitch32: 15,
            ..Default::default()
        };

        let result = unsafe {
            spec.with_target(FrameLayout::new(16, 4), &geometry, |target| {
                target.pixels().fill(1);
            })
        };
        assert_eq!(
            result,
            Err(ContractViolation::PitchMismatch { pitch32: 15, width: 16 })
        );
        assert!(pixels.iter().all(|&p| p == 0));
    }
}
