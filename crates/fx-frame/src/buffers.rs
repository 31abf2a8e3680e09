//! Host-owned frame storage

use crate::geometry::{FrameLayout, SystemGeometry};
use crate::spec::EmulateSpec;
use crate::target::FrameTarget;
use crate::validate::check_layout;
use crate::view::{LineWidthView, PixelView, SoundView};
use fx_core::hints::fast_array_set;
use fx_core::types::{LineWidth, Pixel, Sample, LINE_WIDTH_POISON};
use fx_core::ContractViolation;

/// Buffers the host allocates once per session (or on resize) and lends to
/// the core for every frame.
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    layout: FrameLayout,
    pixels: Vec<Pixel>,
    line_widths: Option<Vec<LineWidth>>,
    sound: Vec<Sample>,
    sound_channels: usize,
    sound_capacity: usize,
}

impl FrameBuffers {
    /// Allocate storage for `layout`.
    ///
    /// `sound_capacity` is counted in sample frames. The layout is checked
    /// against `geometry` before anything is allocated.
    pub fn new(
        layout: FrameLayout,
        geometry: &SystemGeometry,
        use_line_widths: bool,
        sound_capacity: usize,
    ) -> Result<Self, ContractViolation> {
        check_layout(layout, geometry)?;
        if sound_capacity > i32::MAX as usize {
            return Err(ContractViolation::SoundCapacityTooLarge(sound_capacity as u64));
        }

        let sound_channels = geometry.sound_channels.max(1) as usize;
        tracing::debug!(
            "Allocating frame buffers: {}x{}, line widths: {}, sound: {} frames",
            layout.width,
            layout.height,
            use_line_widths,
            sound_capacity
        );

        Ok(Self {
            layout,
            pixels: vec![0; layout.pixel_count()],
            line_widths: use_line_widths.then(|| vec![0; layout.height as usize]),
            sound: vec![0; sound_capacity * sound_channels],
            sound_channels,
            sound_capacity,
        })
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Capacity of the sound buffer in sample frames
    pub fn sound_capacity(&self) -> usize {
        self.sound_capacity
    }

    pub fn sound_channels(&self) -> usize {
        self.sound_channels
    }

    pub fn uses_line_widths(&self) -> bool {
        self.line_widths.is_some()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Framebuffer as raw bytes, native endian
    pub fn pixel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// One framebuffer line
    pub fn row(&self, y: usize) -> Option<&[Pixel]> {
        if y >= self.layout.height as usize {
            return None;
        }
        let pitch = self.layout.width as usize;
        self.pixels.get(y * pitch..(y + 1) * pitch)
    }

    pub fn line_widths(&self) -> Option<&[LineWidth]> {
        self.line_widths.as_deref()
    }

    /// The first `frames` interleaved sample frames of the sound buffer
    pub fn sound(&self, frames: usize) -> &[Sample] {
        let frames = frames.min(self.sound_capacity);
        &self.sound[..frames * self.sound_channels]
    }

    /// Overwrite every line width with [`LINE_WIDTH_POISON`]
    pub fn poison_line_widths(&mut self) {
        if let Some(widths) = self.line_widths.as_mut() {
            fast_array_set(widths, LINE_WIDTH_POISON);
        }
    }

    /// Lend the buffers to a core for one call
    pub fn target(&mut self) -> FrameTarget<'_> {
        let pitch = self.layout.width as usize;
        let height = self.layout.height as usize;
        FrameTarget::new(
            PixelView::new(&mut self.pixels, pitch, height),
            self.line_widths.as_deref_mut().map(LineWidthView::new),
            SoundView::new(&mut self.sound, self.sound_channels, self.sound_capacity),
        )
    }

    /// C-layout descriptor pointing into this storage.
    ///
    /// The pointers are only valid until `self` is moved, resized or dropped.
    pub fn raw_spec(&mut self) -> EmulateSpec {
        EmulateSpec {
            pixels: self.pixels.as_mut_ptr(),
            pitch32: self.layout.width as i32,
            line_widths: self
                .line_widths
                .as_mut()
                .map_or(std::ptr::null_mut(), |w| w.as_mut_ptr()),
            sound_buf: self.sound.as_mut_ptr(),
            sound_buf_max_size: self.sound_capacity as i32,
            ..Default::default()
        }
    }

    /// Reallocate for a new layout. Contents are cleared.
    pub fn resize(&mut self, layout: FrameLayout, geometry: &SystemGeometry) -> Result<(), ContractViolation> {
        check_layout(layout, geometry)?;
        tracing::debug!("Resizing frame buffers to {}x{}", layout.width, layout.height);

        self.layout = layout;
        self.pixels = vec![0; layout.pixel_count()];
        if let Some(widths) = self.line_widths.as_mut() {
            *widths = vec![0; layout.height as usize];
        }
        Ok(())
    }
}
