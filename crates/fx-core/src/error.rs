//! Error types for the fxbox frame host

use thiserror::Error;

/// Main error type for the frame host
#[derive(Error, Debug)]
pub enum Error {
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frame contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session faulted on an earlier frame; reset before running again")]
    Faulted,
}

/// Master clock conversion errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ClockError {
    #[error("Clock multiplier is not finite: {0}")]
    NotFinite(f64),

    #[error("Clock multiplier is negative: {0}")]
    Negative(f64),

    #[error("Clock multiplier {0} does not fit in 32.32 fixed point")]
    OutOfRange(f64),

    #[error("Clock ratio has a zero divisor")]
    ZeroDivisor,
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{key} = {value} is out of range (expected {expected})")]
    OutOfRange {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Scanline range is empty: start {start} > end {end}")]
    InvalidScanlineRange { start: u32, end: u32 },
}

/// Violations of the host/core frame contract.
///
/// These are detected at the boundary, before any buffer is written or
/// right after the core returns, and never by inspecting corrupted memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Null {0} pointer")]
    NullPointer(&'static str),

    #[error("Pitch {pitch32} does not match framebuffer width {width}")]
    PitchMismatch { pitch32: i32, width: u32 },

    #[error("Pitch {pitch32} is below the minimum frame width {min_width}")]
    PitchTooSmall { pitch32: i32, min_width: u32 },

    #[error("Framebuffer holds {lines} lines, system needs {required}")]
    FramebufferTooShort { lines: u32, required: u32 },

    #[error("Negative sound buffer capacity: {0}")]
    NegativeSoundCapacity(i32),

    #[error("Sound buffer capacity {0} does not fit in 32 bits")]
    SoundCapacityTooLarge(u64),

    #[error("Sound buffer overrun: {size} frames reported, capacity {max}")]
    SoundOverrun { size: i32, max: i32 },

    #[error("Display rect y={y} w={w} h={h} exceeds {pitch32}x{height}")]
    DisplayRectOutOfBounds {
        y: i32,
        w: i32,
        h: i32,
        pitch32: i32,
        height: u32,
    },

    #[error("Non-skipped frame reported {0} master cycles")]
    NoMasterCycles(i64),

    #[error("Frame reported negative master cycles: {0}")]
    NegativeMasterCycles(i64),

    #[error("Master cycle total {total} overflows when adding {cycles}")]
    CycleCounterOverflow { total: i64, cycles: i64 },

    #[error("Line width for line {line} was not written this frame")]
    StaleLineWidth { line: u32 },

    #[error("Line width {width} on line {line} exceeds pitch {pitch32}")]
    LineWidthOutOfRange { line: u32, width: i32, pitch32: i32 },

    #[error("Interlace field {field} repeated on consecutive frames")]
    InterlaceFieldRepeated { field: bool },
}

/// Result type alias for frame host operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContractViolation::SoundOverrun { size: 801, max: 800 };
        assert_eq!(
            format!("{}", err),
            "Sound buffer overrun: 801 frames reported, capacity 800"
        );

        let err = ClockError::OutOfRange(3.0e9);
        assert_eq!(
            format!("{}", err),
            "Clock multiplier 3000000000 does not fit in 32.32 fixed point"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ContractViolation::StaleLineWidth { line: 12 }.into();
        assert!(matches!(err, Error::Contract(ContractViolation::StaleLineWidth { line: 12 })));

        let err: Error = ClockError::ZeroDivisor.into();
        assert!(matches!(err, Error::Clock(_)));
    }
}
