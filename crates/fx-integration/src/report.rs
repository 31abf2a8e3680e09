//! Serializable summary of a session

use serde::{Deserialize, Serialize};

/// What a session produced, suitable for logging or comparing runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub core: String,
    pub frames: u64,
    pub skipped_frames: u64,
    pub interlaced_frames: u64,
    pub master_cycles: i64,
    pub sound_frames: u64,
    pub dropped_sound_frames: u64,
    pub emulated_seconds: f64,
    /// Hex SHA-1 over every frame digest, in order
    pub digest: String,
}

impl SessionReport {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Whether two runs produced identical output
    pub fn same_output(&self, other: &Self) -> bool {
        self.frames == other.frames
            && self.master_cycles == other.master_cycles
            && self.digest == other.digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SessionReport {
        SessionReport {
            core: "test-pattern".to_string(),
            frames: 60,
            skipped_frames: 2,
            interlaced_frames: 0,
            master_cycles: 21_477_272,
            sound_frames: 44_100,
            dropped_sound_frames: 0,
            emulated_seconds: 1.0,
            digest: "00".repeat(20),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let report = report();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"master_cycles\": 21477272"));
        assert_eq!(SessionReport::from_json(&json).unwrap(), report);
    }

    #[test]
    fn test_same_output_ignores_timing() {
        let a = report();
        let b = SessionReport { emulated_seconds: 2.0, skipped_frames: 0, ..report() };
        assert!(a.same_output(&b));
        let c = SessionReport { digest: "ff".repeat(20), ..report() };
        assert!(!a.same_output(&c));
    }
}
