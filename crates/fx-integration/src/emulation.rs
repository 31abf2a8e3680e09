//! Emulation core interface

use fx_core::Settings;
use fx_frame::{FrameTarget, SystemGeometry};

/// A system emulation core driven by the host.
///
/// Cores are built from an immutable [`Settings`] snapshot and are invoked synchronously, once per frame, from a single
/// thread. A call must not return before the frame is complete.
pub trait EmulationCore {
    /// Short human-readable name
    fn name(&self) -> &str;

    /// Buffer requirements and time base of the emulated system
    fn geometry(&self) -> SystemGeometry;

    /// Settings snapshot the core was built from
    fn settings(&self) -> &Settings;

    /// Produce one frame into `target`.
    ///
    /// The core must set `master_cycles` even when the host requested a
    /// skipped frame, write every line width when line widths are present,
    /// and report the current interlace field when interlacing.
    fn emulate_frame(&mut self, target: &mut FrameTarget<'_>);

    /// Return to power-on state
    fn reset(&mut self);
}
