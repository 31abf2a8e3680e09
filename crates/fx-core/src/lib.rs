//! Core types for the fxbox frame host
//!
//! This crate provides the fixed-width type aliases, inert compiler hints,
//! master clock arithmetic, error handling, configuration, and logging
//! infrastructure shared by the frame contract and the host runtime.

pub mod clock;
pub mod config;
pub mod error;
pub mod hints;
pub mod logging;
pub mod settings;
pub mod types;

pub use clock::{master_clock_fixed, FixedClock, FrameCycleAccumulator, MasterClock};
pub use config::Config;
pub use error::{ClockError, ConfigError, ContractViolation, Error, Result};
pub use settings::{CpuEmulation, PortDevice, Settings};
