//! Validated settings snapshot consumed by the emulation core
//!
//! A [`Settings`] value is built once from a [`Config`] before the first
//! frame and is immutable afterwards. Cores take it at construction, so two
//! sessions with different settings can run side by side.

use crate::config::Config;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Valid high dot clock output widths
pub const HIGH_DOTCLOCK_WIDTHS: [u32; 3] = [256, 341, 1024];

/// Valid CD access speed multipliers
pub const CD_SPEED_RANGE: std::ops::RangeInclusive<u32> = 2..=10;

/// Last scanline index a display range may reference
pub const MAX_SCANLINE: u32 = 239;

/// Highest resampler quality level
pub const MAX_RESAMP_QUALITY: u32 = 5;

/// Accepted resampler rate error bounds
pub const RESAMP_RATE_ERROR_RANGE: std::ops::RangeInclusive<f64> = 0.000_000_1..=0.000_035;

/// CPU emulation accuracy mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CpuEmulation {
    Fast,
    Accurate,
    #[default]
    Auto,
}

impl CpuEmulation {
    /// Numeric code used on the wire (0 = fast, 1 = accurate, 2 = auto)
    pub fn code(&self) -> i32 {
        match self {
            Self::Fast => 0,
            Self::Accurate => 1,
            Self::Auto => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Fast),
            1 => Some(Self::Accurate),
            2 => Some(Self::Auto),
            _ => None,
        }
    }
}

/// Device plugged into a controller port
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDevice {
    None,
    #[default]
    Gamepad,
    Mouse,
}

/// Immutable settings snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    cpu_emulation: CpuEmulation,
    cd_speed: u32,
    high_dotclock_width: u32,
    scanline_start: u32,
    scanline_end: u32,
    resamp_quality: u32,
    resamp_rate_error: f64,
    no_sprite_limit: bool,
    adpcm_buggy: bool,
    adpcm_no_clicks: bool,
    chroma_interpolate: bool,
    port_devices: [PortDevice; 2],
    pixel_pro: bool,
}

impl Settings {
    /// Validate a configuration and freeze it.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let video = &config.video;
        let audio = &config.audio;

        if !CD_SPEED_RANGE.contains(&config.cd.speed) {
            return Err(out_of_range("cd.speed", config.cd.speed, "2..=10"));
        }
        if !HIGH_DOTCLOCK_WIDTHS.contains(&video.high_dotclock_width) {
            return Err(out_of_range(
                "video.high_dotclock_width",
                video.high_dotclock_width,
                "256, 341 or 1024",
            ));
        }
        if video.scanline_start > MAX_SCANLINE {
            return Err(out_of_range("video.scanline_start", video.scanline_start, "0..=239"));
        }
        if video.scanline_end > MAX_SCANLINE {
            return Err(out_of_range("video.scanline_end", video.scanline_end, "0..=239"));
        }
        if video.scanline_start > video.scanline_end {
            return Err(ConfigError::InvalidScanlineRange {
                start: video.scanline_start,
                end: video.scanline_end,
            });
        }
        if audio.resamp_quality > MAX_RESAMP_QUALITY {
            return Err(out_of_range("audio.resamp_quality", audio.resamp_quality, "0..=5"));
        }
        if !RESAMP_RATE_ERROR_RANGE.contains(&audio.resamp_rate_error) {
            return Err(out_of_range(
                "audio.resamp_rate_error",
                audio.resamp_rate_error,
                "0.0000001..=0.000035",
            ));
        }

        Ok(Self {
            cpu_emulation: config.cpu.emulation,
            cd_speed: config.cd.speed,
            high_dotclock_width: video.high_dotclock_width,
            scanline_start: video.scanline_start,
            scanline_end: video.scanline_end,
            resamp_quality: audio.resamp_quality,
            resamp_rate_error: audio.resamp_rate_error,
            no_sprite_limit: video.no_sprite_limit,
            adpcm_buggy: audio.adpcm_buggy,
            adpcm_no_clicks: audio.adpcm_no_clicks,
            chroma_interpolate: video.chroma_interpolate,
            port_devices: config.input.ports,
            pixel_pro: video.pixel_pro,
        })
    }

    pub fn cpu_emulation(&self) -> CpuEmulation {
        self.cpu_emulation
    }

    pub fn cd_speed(&self) -> u32 {
        self.cd_speed
    }

    pub fn high_dotclock_width(&self) -> u32 {
        self.high_dotclock_width
    }

    pub fn scanline_start(&self) -> u32 {
        self.scanline_start
    }

    pub fn scanline_end(&self) -> u32 {
        self.scanline_end
    }

    /// Number of displayed scanlines (the range is inclusive)
    pub fn visible_lines(&self) -> u32 {
        self.scanline_end - self.scanline_start + 1
    }

    pub fn resamp_quality(&self) -> u32 {
        self.resamp_quality
    }

    pub fn resamp_rate_error(&self) -> f64 {
        self.resamp_rate_error
    }

    pub fn no_sprite_limit(&self) -> bool {
        self.no_sprite_limit
    }

    pub fn adpcm_buggy(&self) -> bool {
        self.adpcm_buggy
    }

    pub fn adpcm_no_clicks(&self) -> bool {
        self.adpcm_no_clicks
    }

    pub fn chroma_interpolate(&self) -> bool {
        self.chroma_interpolate
    }

    /// Device selected for controller port `port` (0 or 1)
    pub fn port_device(&self, port: usize) -> Option<PortDevice> {
        self.port_devices.get(port).copied()
    }

    pub fn pixel_pro(&self) -> bool {
        self.pixel_pro
    }
}

impl Default for Settings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            cpu_emulation: config.cpu.emulation,
            cd_speed: config.cd.speed,
            high_dotclock_width: config.video.high_dotclock_width,
            scanline_start: config.video.scanline_start,
            scanline_end: config.video.scanline_end,
            resamp_quality: config.audio.resamp_quality,
            resamp_rate_error: config.audio.resamp_rate_error,
            no_sprite_limit: config.video.no_sprite_limit,
            adpcm_buggy: config.audio.adpcm_buggy,
            adpcm_no_clicks: config.audio.adpcm_no_clicks,
            chroma_interpolate: config.video.chroma_interpolate,
            port_devices: config.input.ports,
            pixel_pro: config.video.pixel_pro,
        }
    }
}

fn out_of_range(key: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        key,
        value: value.to_string(),
        expected,
    }
}
