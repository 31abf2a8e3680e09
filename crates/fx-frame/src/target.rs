//! Per-call frame target handed to the emulation core

use crate::view::{LineWidthView, PixelView, SoundView};
use bitflags::bitflags;
use fx_core::types::MasterCycles;

bitflags! {
    /// Boolean frame metadata
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u8 {
        /// Only every other line holds data this frame
        const INTERLACE_ON    = 0x01;
        /// Which field (odd lines when set) holds data
        const INTERLACE_FIELD = 0x02;
        /// Pixel data is stale and must not be presented
        const SKIP            = 0x04;
    }
}

/// Metadata reported by the core for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// First displayed line
    pub y: i32,
    /// Display width; ignored when per-line widths are in use
    pub w: i32,
    /// Display height (full-frame height when interlaced)
    pub h: i32,
    /// Master clock cycles the frame consumed
    pub master_cycles: MasterCycles,
    /// Audio sample frames written
    pub sound_frames: i32,
    /// Audio sample frames discarded for lack of room
    pub sound_dropped: u32,
    pub flags: FrameFlags,
    /// Whether per-line widths were supplied for this frame
    pub uses_line_widths: bool,
}

impl FrameInfo {
    pub fn is_skip(&self) -> bool {
        self.flags.contains(FrameFlags::SKIP)
    }

    pub fn interlace_on(&self) -> bool {
        self.flags.contains(FrameFlags::INTERLACE_ON)
    }

    pub fn interlace_field(&self) -> bool {
        self.flags.contains(FrameFlags::INTERLACE_FIELD)
    }

    /// Lines actually populated this frame
    pub fn populated_lines(&self) -> i32 {
        if self.interlace_on() {
            self.h / 2
        } else {
            self.h
        }
    }
}

/// Everything a core may touch while producing one frame.
///
/// Borrows the host's buffers for the duration of a single call; the core
/// cannot keep any of it once the call returns.
#[derive(Debug)]
pub struct FrameTarget<'a> {
    pixels: PixelView<'a>,
    line_widths: Option<LineWidthView<'a>>,
    sound: SoundView<'a>,
    y: i32,
    w: i32,
    h: i32,
    master_cycles: MasterCycles,
    flags: FrameFlags,
}

impl<'a> FrameTarget<'a> {
    pub fn new(
        pixels: PixelView<'a>,
        line_widths: Option<LineWidthView<'a>>,
        sound: SoundView<'a>,
    ) -> Self {
        Self {
            pixels,
            line_widths,
            sound,
            y: 0,
            w: 0,
            h: 0,
            master_cycles: 0,
            flags: FrameFlags::empty(),
        }
    }

    pub fn pixels(&mut self) -> &mut PixelView<'a> {
        &mut self.pixels
    }

    /// Per-line widths, if the host asked for them. When present every line
    /// must be written every frame.
    pub fn line_widths(&mut self) -> Option<&mut LineWidthView<'a>> {
        self.line_widths.as_mut()
    }

    pub fn sound(&mut self) -> &mut SoundView<'a> {
        &mut self.sound
    }

    /// Pitch of the pixel buffer, in pixels
    pub fn pitch(&self) -> usize {
        self.pixels.pitch()
    }

    /// Lines in the pixel buffer
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn set_display_rect(&mut self, y: i32, w: i32, h: i32) {
        self.y = y;
        self.w = w;
        self.h = h;
    }

    pub fn set_master_cycles(&mut self, cycles: MasterCycles) {
        self.master_cycles = cycles;
    }

    /// Report interlace state. `field` is ignored while interlace is off.
    pub fn set_interlace(&mut self, on: bool, field: bool) {
        self.flags.set(FrameFlags::INTERLACE_ON, on);
        self.flags.set(FrameFlags::INTERLACE_FIELD, on && field);
    }

    pub fn set_skip(&mut self, skip: bool) {
        self.flags.set(FrameFlags::SKIP, skip);
    }

    pub fn is_skip(&self) -> bool {
        self.flags.contains(FrameFlags::SKIP)
    }

    /// Snapshot of the metadata reported so far
    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            y: self.y,
            w: self.w,
            h: self.h,
            master_cycles: self.master_cycles,
            sound_frames: self.sound.written() as i32,
            sound_dropped: self.sound.dropped() as u32,
            flags: self.flags,
            uses_line_widths: self.line_widths.is_some(),
        }
    }

    /// End the call and release the borrowed buffers
    pub fn finish(self) -> FrameInfo {
        self.info()
    }
}
