//! Fixed-width aliases used across the host/core boundary
//!
//! Every field that crosses the boundary is expressed with one of these
//! aliases so that no implementation-defined widths leak into the ABI.

/// One framebuffer pixel (32-bit, format chosen by the core)
pub type Pixel = u32;

/// Width of one scanline, in pixels
pub type LineWidth = i32;

/// One signed 16-bit audio sample
pub type Sample = i16;

/// Count of master clock ticks
pub type MasterCycles = i64;

/// Framebuffer stride, in pixels
pub type Pitch = i32;

/// Sentinel written into per-line widths before a frame so that lines the
/// core forgot to set can be detected afterwards.
pub const LINE_WIDTH_POISON: LineWidth = LineWidth::MIN;
