//! Frame exchange contract for fxbox
//!
//! Once per emulated frame the host hands the core a set of buffers it owns
//! (pixels, optional per-line widths, interleaved audio) and the core hands
//! back its output plus the number of master clock cycles the frame took.
//!
//! [`EmulateSpec`] is the C-layout struct for crossing a raw ABI boundary.
//! Rust cores work against [`FrameTarget`], a set of bounded views that make
//! out-of-range writes impossible instead of undefined.

pub mod buffers;
pub mod geometry;
pub mod spec;
pub mod target;
pub mod validate;
pub mod view;

pub use buffers::FrameBuffers;
pub use geometry::{FrameLayout, SystemGeometry};
pub use spec::EmulateSpec;
pub use target::{FrameFlags, FrameInfo, FrameTarget};
pub use validate::{check_layout, validate_input, validate_output};
pub use view::{LineWidthView, PixelView, SoundView};
