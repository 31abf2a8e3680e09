//! Host runtime for the fxbox frame contract
//!
//! This crate drives an emulation core one frame at a time: it owns the
//! frame buffers, checks every frame against the contract, tracks interlace
//! history and emulated time, and summarises a run.

pub mod deinterlace;
pub mod digest;
pub mod emulation;
pub mod interlace;
pub mod pacing;
pub mod report;
pub mod session;
pub mod test_pattern;

pub use deinterlace::{DeinterlaceMode, Deinterlacer};
pub use digest::{DigestChain, FrameDigest};
pub use emulation::EmulationCore;
pub use interlace::InterlaceTracker;
pub use pacing::FramePacer;
pub use report::SessionReport;
pub use session::{Session, SessionOptions, SessionState, SessionStats};
pub use test_pattern::TestPatternCore;
