//! Equalizer band level encoding
//!
//! Stored configuration keeps band levels as a `;`-separated list of decibel
//! floats (`"1.5;0;-2;0;0"`). Engines take centibels.

use crate::error::{Result, SessionFxError};

/// Separator between band values in the stored string
pub const BAND_SEPARATOR: &str = ";";

/// Convert a level in dB to centibels, rounding to the nearest integer
///
/// Halves round toward positive infinity, so -0.125 dB is -12 cB.
pub fn db_to_centibels(db: f32) -> i32 {
    (db * 100.0 + 0.5).floor() as i32
}

/// Convert a level in centibels back to dB
pub fn centibels_to_db(cb: i32) -> f32 {
    cb as f32 / 100.0
}

/// Parse a stored band string into dB values
///
/// Whitespace around entries is ignored. An empty string yields no bands.
pub fn parse_band_levels(encoded: &str) -> Result<Vec<f32>> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }

    encoded
        .split(BAND_SEPARATOR)
        .map(|entry| {
            entry
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| SessionFxError::InvalidParameter {
                    key: "band level".to_string(),
                    value: entry.to_string(),
                })
        })
        .collect()
}

/// Encode dB values into the stored band string
pub fn format_band_levels(levels: &[f32]) -> String {
    levels
        .iter()
        .map(|level| level.to_string())
        .collect::<Vec<_>>()
        .join(BAND_SEPARATOR)
}
