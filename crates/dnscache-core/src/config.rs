//! Configuration for the table and extraction pipeline
//!
//! Two presets cover the common shapes: a fixed 100-bucket table that never
//! rehashes, and a small table that doubles whenever it gets crowded.

/// Default bucket count for a fixed-capacity table
pub const DEFAULT_CAPACITY: usize = 100;

/// Record type tag kept by the extractor unless told otherwise
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// Largest accepted bucket count. Keeps `hash * 31 + codepoint` within `u64`.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// dnscache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of buckets the table starts with
    pub capacity: usize,
    /// Rehash into twice the buckets once `len / capacity` would exceed this.
    /// `None` keeps the capacity fixed.
    pub max_load_factor: Option<f64>,
    /// Record type tag the extractor keeps (e.g. "A", "AAAA")
    pub record_type: String,
}

impl Config {
    /// Fixed 100-bucket table, A records only
    pub fn fixed() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_load_factor: None,
            record_type: DEFAULT_RECORD_TYPE.to_string(),
        }
    }

    /// 16 buckets to start, doubling past a 0.75 load factor
    pub fn growable() -> Self {
        Self {
            capacity: 16,
            max_load_factor: Some(0.75),
            record_type: DEFAULT_RECORD_TYPE.to_string(),
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(format!("capacity must be in [1, {}]", MAX_CAPACITY));
        }
        if let Some(lf) = self.max_load_factor {
            if !lf.is_finite() || lf <= 0.0 {
                return Err("max_load_factor must be a positive finite number".into());
            }
        }
        if self.record_type.is_empty() || self.record_type.chars().any(char::is_whitespace) {
            return Err("record_type must be a single non-empty token".into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self { Self::fixed() }
}
