//! Boundary checks for the frame contract
//!
//! Input checks run before the core is allowed to touch any buffer; output
//! checks run right after it returns.

use crate::geometry::{FrameLayout, SystemGeometry};
use crate::spec::EmulateSpec;
use crate::target::FrameInfo;
use fx_core::types::{LineWidth, LINE_WIDTH_POISON};
use fx_core::ContractViolation;

/// Check a host-declared layout against the system's minimums.
pub fn check_layout(layout: FrameLayout, geometry: &SystemGeometry) -> Result<(), ContractViolation> {
    if layout.width < geometry.fb_width {
        return Err(ContractViolation::PitchTooSmall {
            pitch32: layout.width as i32,
            min_width: geometry.fb_width,
        });
    }
    if layout.height < geometry.fb_height {
        return Err(ContractViolation::FramebufferTooShort {
            lines: layout.height,
            required: geometry.fb_height,
        });
    }
    Ok(())
}

/// Check the host-supplied fields of `spec` before handing it to a core.
pub fn validate_input(
    spec: &EmulateSpec,
    layout: FrameLayout,
    geometry: &SystemGeometry,
) -> Result<(), ContractViolation> {
    if spec.pixels.is_null() {
        return Err(ContractViolation::NullPointer("pixels"));
    }
    if spec.pitch32 < 0 || spec.pitch32 as u32 != layout.width {
        return Err(ContractViolation::PitchMismatch {
            pitch32: spec.pitch32,
            width: layout.width,
        });
    }
    check_layout(layout, geometry)?;
    if spec.sound_buf_max_size < 0 {
        return Err(ContractViolation::NegativeSoundCapacity(spec.sound_buf_max_size));
    }
    if spec.sound_buf_max_size > 0 && spec.sound_buf.is_null() {
        return Err(ContractViolation::NullPointer("sound_buf"));
    }
    Ok(())
}

/// Check what a core reported for one frame.
///
/// `line_widths` is the host's line width storage when per-line widths were
/// requested; it must have been poisoned with [`LINE_WIDTH_POISON`] before
/// the call so that unwritten lines show up here.
pub fn validate_output(
    info: &FrameInfo,
    layout: FrameLayout,
    sound_capacity: i32,
    line_widths: Option<&[LineWidth]>,
) -> Result<(), ContractViolation> {
    if info.sound_frames < 0 || info.sound_frames > sound_capacity {
        return Err(ContractViolation::SoundOverrun {
            size: info.sound_frames,
            max: sound_capacity,
        });
    }

    if info.master_cycles < 0 {
        return Err(ContractViolation::NegativeMasterCycles(info.master_cycles));
    }
    if !info.is_skip() && info.master_cycles == 0 {
        return Err(ContractViolation::NoMasterCycles(info.master_cycles));
    }

    let pitch32 = layout.width as i32;
    let height = layout.height as i64;
    let rect_fits = info.y >= 0
        && info.h >= 0
        && info.y as i64 + info.h as i64 <= height
        && (line_widths.is_some() || (info.w >= 0 && info.w <= pitch32));
    if !rect_fits {
        return Err(ContractViolation::DisplayRectOutOfBounds {
            y: info.y,
            w: info.w,
            h: info.h,
            pitch32,
            height: layout.height,
        });
    }

    if let Some(widths) = line_widths {
        for (line, &width) in widths.iter().enumerate() {
            if width == LINE_WIDTH_POISON {
                return Err(ContractViolation::StaleLineWidth { line: line as u32 });
            }
            if width < 0 || width > pitch32 {
                return Err(ContractViolation::LineWidthOutOfRange {
                    line: line as u32,
                    width,
                    pitch32,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::FrameFlags;
    use fx_core::{FixedClock, MasterClock};

    fn geometry() -> SystemGeometry {
        SystemGeometry {
            fb_width: 256,
            fb_height: 240,
            master_clock: MasterClock::new(FixedClock::from_raw(21_477_272 << 32)),
            fps: FixedClock::from_raw(60 << 32),
            sound_rate: 44_100,
            sound_channels: 2,
        }
    }

    fn good_frame() -> FrameInfo {
        FrameInfo {
            y: 8,
            w: 256,
            h: 224,
            master_cycles: 357_955,
            sound_frames: 735,
            ..Default::default()
        }
    }

    #[test]
    fn test_check_layout() {
        let geometry = geometry();
        assert!(check_layout(FrameLayout::new(256, 240), &geometry).is_ok());
        assert!(check_layout(FrameLayout::new(320, 480), &geometry).is_ok());
        assert_eq!(
            check_layout(FrameLayout::new(255, 240), &geometry),
            Err(ContractViolation::PitchTooSmall { pitch32: 255, min_width: 256 })
        );
        assert_eq!(
            check_layout(FrameLayout::new(256, 200), &geometry),
            Err(ContractViolation::FramebufferTooShort { lines: 200, required: 240 })
        );
    }

    #[test]
    fn test_validate_input() {
        let geometry = geometry();
        let layout = FrameLayout::new(256, 240);
        let mut pixels = vec![0u32; layout.pixel_count()];

        let spec = EmulateSpec::default();
        assert_eq!(
            validate_input(&spec, layout, &geometry),
            Err(ContractViolation::NullPointer("pixels"))
        );

        let mut spec = EmulateSpec {
            pixels: pixels.as_mut_ptr(),
            pitch32: 256,
            ..Default::default()
        };
        assert!(validate_input(&spec, layout, &geometry).is_ok());

        spec.sound_buf_max_size = -1;
        assert_eq!(
            validate_input(&spec, layout, &geometry),
            Err(ContractViolation::NegativeSoundCapacity(-1))
        );

        spec.sound_buf_max_size = 800;
        assert_eq!(
            validate_input(&spec, layout, &geometry),
            Err(ContractViolation::NullPointer("sound_buf"))
        );

        spec.sound_buf_max_size = 0;
        spec.pitch32 = -256;
        assert!(matches!(
            validate_input(&spec, layout, &geometry),
            Err(ContractViolation::PitchMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_output_accepts_good_frame() {
        let layout = FrameLayout::new(256, 240);
        assert!(validate_output(&good_frame(), layout, 800, None).is_ok());
    }

    #[test]
    fn test_validate_output_sound_overrun() {
        let layout = FrameLayout::new(256, 240);
        let frame = FrameInfo { sound_frames: 801, ..good_frame() };
        assert_eq!(
            validate_output(&frame, layout, 800, None),
            Err(ContractViolation::SoundOverrun { size: 801, max: 800 })
        );
    }

    #[test]
    fn test_validate_output_master_cycles() {
        let layout = FrameLayout::new(256, 240);
        let frame = FrameInfo { master_cycles: 0, ..good_frame() };
        assert_eq!(
            validate_output(&frame, layout, 800, None),
            Err(ContractViolation::NoMasterCycles(0))
        );

        // Skipped frames are exempt from the positive-cycles rule.
        let frame = FrameInfo { master_cycles: 0, flags: FrameFlags::SKIP, ..good_frame() };
        assert!(validate_output(&frame, layout, 800, None).is_ok());

        // Negative counts are never valid, skipped or not.
        for flags in [FrameFlags::empty(), FrameFlags::SKIP] {
            let frame = FrameInfo { master_cycles: -1_000_000, flags, ..good_frame() };
            assert_eq!(
                validate_output(&frame, layout, 800, None),
                Err(ContractViolation::NegativeMasterCycles(-1_000_000))
            );
        }
    }

    #[test]
    fn test_validate_output_display_rect() {
        let layout = FrameLayout::new(256, 240);
        for frame in [
            FrameInfo { w: 257, ..good_frame() },
            FrameInfo { h: 241, y: 0, ..good_frame() },
            FrameInfo { y: 20, h: 224, ..good_frame() },
            FrameInfo { y: -1, ..good_frame() },
        ] {
            assert!(matches!(
                validate_output(&frame, layout, 800, None),
                Err(ContractViolation::DisplayRectOutOfBounds { .. })
            ));
        }

        // With per-line widths the scalar width is not authoritative.
        let widths = vec![256; 240];
        let frame = FrameInfo { w: 9999, uses_line_widths: true, ..good_frame() };
        assert!(validate_output(&frame, layout, 800, Some(&widths)).is_ok());
    }

    #[test]
    fn test_validate_output_line_widths() {
        let layout = FrameLayout::new(256, 240);
        let mut widths = vec![256; 240];
        widths[137] = LINE_WIDTH_POISON;
        assert_eq!(
            validate_output(&good_frame(), layout, 800, Some(&widths)),
            Err(ContractViolation::StaleLineWidth { line: 137 })
        );

        widths[137] = 300;
        assert_eq!(
            validate_output(&good_frame(), layout, 800, Some(&widths)),
            Err(ContractViolation::LineWidthOutOfRange { line: 137, width: 300, pitch32: 256 })
        );
    }
}
