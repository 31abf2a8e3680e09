//! Frame loop that ties a core to host-owned buffers
//!
//! A [`Session`] owns everything for one emulated machine:
//! - the frame buffers lent to the core each frame
//! - the core itself, built from a frozen settings snapshot
//! - interlace history, emulated time and run statistics
//!
//! Each frame is checked at the boundary: line widths are poisoned before
//! the call and the reported metadata is validated right after it.

use crate::deinterlace::{DeinterlaceMode, Deinterlacer};
use crate::digest::{DigestChain, FrameDigest};
use crate::emulation::EmulationCore;
use crate::interlace::InterlaceTracker;
use crate::pacing::FramePacer;
use crate::report::SessionReport;
use fx_core::types::MasterCycles;
use fx_core::{ContractViolation, Error, Result, Settings};
use fx_frame::{validate_output, FrameBuffers, FrameInfo, FrameLayout, SystemGeometry};
use std::time::Duration;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to produce frames
    Running,
    /// A frame broke the contract; no further frames are produced
    Faulted,
}

/// How the host sets up its side of the contract
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Framebuffer layout; defaults to the system's minimum
    pub layout: Option<FrameLayout>,
    /// Ask the core for per-line widths
    pub use_line_widths: bool,
    /// Sound buffer capacity in sample frames; defaults to twice one frame
    pub sound_capacity: Option<usize>,
    /// Keep a progressive copy of interlaced output
    pub deinterlace: Option<DeinterlaceMode>,
    /// Throttle to real time
    pub realtime: bool,
    /// Log every frame at trace level
    pub trace_frames: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            layout: None,
            use_line_widths: false,
            sound_capacity: None,
            deinterlace: None,
            realtime: false,
            trace_frames: false,
        }
    }
}

/// Run statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames produced
    pub frames: u64,
    /// Frames produced with the skip flag set
    pub skipped_frames: u64,
    /// Interlaced frames produced
    pub interlaced_frames: u64,
    /// Sum of reported master cycles
    pub master_cycles: MasterCycles,
    /// Sum of reported audio sample frames
    pub sound_frames: u64,
    /// Audio sample frames the core could not fit
    pub dropped_sound_frames: u64,
}

/// One emulated machine plus its host-side state
pub struct Session<C: EmulationCore> {
    core: C,
    geometry: SystemGeometry,
    buffers: FrameBuffers,
    interlace: InterlaceTracker,
    deinterlacer: Option<Deinterlacer>,
    pacer: FramePacer,
    digests: DigestChain,
    state: SessionState,
    stats: SessionStats,
    last_frame: Option<FrameInfo>,
    trace_frames: bool,
}

impl<C: EmulationCore> Session<C> {
    /// Allocate buffers for `core` and get ready for the first frame
    pub fn new(core: C, options: SessionOptions) -> Result<Self> {
        let geometry = core.geometry();
        let layout = options.layout.unwrap_or_else(|| geometry.min_layout());
        let sound_capacity = options
            .sound_capacity
            .unwrap_or(geometry.sound_frames_per_frame() as usize * 2);

        tracing::info!(
            "Initializing session for {}: {}x{} framebuffer, {} sound frames",
            core.name(),
            layout.width,
            layout.height,
            sound_capacity
        );

        let buffers = FrameBuffers::new(layout, &geometry, options.use_line_widths, sound_capacity)?;
        let mut pacer = FramePacer::new(geometry.master_clock);
        pacer.set_realtime(options.realtime);

        Ok(Self {
            core,
            geometry,
            deinterlacer: options.deinterlace.map(|mode| Deinterlacer::new(mode, layout)),
            buffers,
            interlace: InterlaceTracker::new(),
            pacer,
            digests: DigestChain::new(),
            state: SessionState::Running,
            stats: SessionStats::default(),
            last_frame: None,
            trace_frames: options.trace_frames,
        })
    }

    /// Produce one frame.
    ///
    /// `skip` asks the core to leave pixel output alone for this frame; it
    /// must still report timing and audio.
    pub fn run_frame(&mut self, skip: bool) -> Result<FrameInfo> {
        if self.state == SessionState::Faulted {
            tracing::warn!("Session is faulted, refusing to run another frame");
            return Err(Error::Faulted);
        }

        self.buffers.poison_line_widths();

        let info = {
            let mut target = self.buffers.target();
            target.set_skip(skip);
            self.core.emulate_frame(&mut target);
            target.finish()
        };

        let checked = validate_output(
            &info,
            self.buffers.layout(),
            self.buffers.sound_capacity() as i32,
            self.buffers.line_widths(),
        )
        .and_then(|()| self.check_cycle_total(&info))
        .and_then(|()| self.interlace.observe(&info));
        if let Err(violation) = checked {
            tracing::error!("Frame {} violated the contract: {}", self.stats.frames, violation);
            self.state = SessionState::Faulted;
            return Err(violation.into());
        }

        self.record(&info);
        Ok(info)
    }

    /// Produce `count` frames without skipping
    pub fn run_frames(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.run_frame(false)?;
        }
        Ok(())
    }

    fn check_cycle_total(&self, info: &FrameInfo) -> std::result::Result<(), ContractViolation> {
        let total = self.stats.master_cycles;
        match total.checked_add(info.master_cycles) {
            Some(_) => Ok(()),
            None => Err(ContractViolation::CycleCounterOverflow {
                total,
                cycles: info.master_cycles,
            }),
        }
    }

    fn record(&mut self, info: &FrameInfo) {
        let stats = &mut self.stats;
        stats.frames += 1;
        stats.skipped_frames += info.is_skip() as u64;
        stats.interlaced_frames += info.interlace_on() as u64;
        stats.master_cycles += info.master_cycles;
        stats.sound_frames += info.sound_frames as u64;
        stats.dropped_sound_frames += info.sound_dropped as u64;

        if info.sound_dropped > 0 {
            tracing::warn!(
                "Frame {} dropped {} sound frames",
                stats.frames,
                info.sound_dropped
            );
        }

        if let Some(deinterlacer) = self.deinterlacer.as_mut() {
            deinterlacer.process(&self.buffers, info);
        }
        self.digests.push(&FrameDigest::of_frame(&self.buffers, info));
        self.pacer.advance(info.master_cycles);
        self.pacer.throttle();
        self.last_frame = Some(*info);

        if self.trace_frames {
            tracing::trace!(
                "Frame {}: rect y={} {}x{}, {} cycles, {} sound frames, flags {:?}",
                self.stats.frames,
                info.y,
                info.w,
                info.h,
                info.master_cycles,
                info.sound_frames,
                info.flags
            );
        }
    }

    /// Reset the core and all host-side history. Statistics are kept.
    pub fn reset(&mut self) {
        tracing::info!("Resetting session");
        self.core.reset();
        self.interlace.reset();
        self.pacer.reset();
        self.last_frame = None;
        self.state = SessionState::Running;
    }

    /// Change the framebuffer layout between frames
    pub fn resize(&mut self, layout: FrameLayout) -> Result<()> {
        self.buffers.resize(layout, &self.geometry)?;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn settings(&self) -> &Settings {
        self.core.settings()
    }

    pub fn geometry(&self) -> &SystemGeometry {
        &self.geometry
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn last_frame(&self) -> Option<&FrameInfo> {
        self.last_frame.as_ref()
    }

    /// Progressive picture, if deinterlacing was requested
    pub fn deinterlaced(&self) -> Option<&Deinterlacer> {
        self.deinterlacer.as_ref()
    }

    /// Last interlace field reported, if the previous frame was interlaced
    pub fn last_field(&self) -> Option<bool> {
        self.interlace.last_field()
    }

    /// Emulated time since the last reset
    pub fn emulated_time(&self) -> Duration {
        self.pacer.emulated_time()
    }

    /// Digest over every frame produced so far
    pub fn digest(&self) -> FrameDigest {
        self.digests.current()
    }

    /// Summary of the run so far
    pub fn report(&self) -> SessionReport {
        SessionReport {
            core: self.core.name().to_string(),
            frames: self.stats.frames,
            skipped_frames: self.stats.skipped_frames,
            interlaced_frames: self.stats.interlaced_frames,
            master_cycles: self.stats.master_cycles,
            sound_frames: self.stats.sound_frames,
            dropped_sound_frames: self.stats.dropped_sound_frames,
            emulated_seconds: self.emulated_time().as_secs_f64(),
            digest: self.digest().to_hex(),
        }
    }
}
