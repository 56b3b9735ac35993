//! Typed effect parameters decoded from a stored profile
//!
//! Decoding is lenient: a missing key takes its default and a malformed
//! value is logged and replaced by the default, so a bad setting never stops
//! the remaining effects from being configured.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::bands::parse_band_levels;
use crate::error::{Result, SessionFxError};

/// Raw key/value pairs of one stored profile
pub type ProfileValues = BTreeMap<String, Value>;

/// Stored parameter keys
pub mod keys {
    pub const COMPRESSION_ENABLE: &str = "dsp.compression.enable";
    pub const COMPRESSION_MODE: &str = "dsp.compression.mode";
    pub const BASS_ENABLE: &str = "dsp.bass.enable";
    pub const BASS_STRENGTH: &str = "dsp.bass.mode";
    pub const TONE_ENABLE: &str = "dsp.tone.enable";
    pub const TONE_BANDS: &str = "dsp.tone.eq.custom";
    pub const TONE_LOUDNESS: &str = "dsp.tone.loudness";
    pub const VIRTUALIZER_ENABLE: &str = "dsp.headphone.enable";
    pub const VIRTUALIZER_STRENGTH: &str = "dsp.headphone.mode";
}

/// Number of flat bands used when a profile has no stored equalizer curve
pub const DEFAULT_BAND_COUNT: usize = 5;

/// Loudness correction reference used when none is stored (100 dB, in cB)
pub const DEFAULT_LOUDNESS: i16 = 10000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressorParams {
    pub enabled: bool,
    pub mode: i16,
}

/// Parameters for strength-driven effects (bass boost, virtualizer)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthParams {
    pub enabled: bool,
    pub strength: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneParams {
    pub enabled: bool,
    /// Band levels in dB
    pub bands: Vec<f32>,
    /// Loudness correction reference in cB
    pub loudness: i16,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            enabled: false,
            bands: vec![0.0; DEFAULT_BAND_COUNT],
            loudness: DEFAULT_LOUDNESS,
        }
    }
}

/// Full parameter set applied to one effect chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectParameters {
    pub compressor: CompressorParams,
    pub bass_boost: StrengthParams,
    pub tone: ToneParams,
    pub virtualizer: StrengthParams,
}

impl EffectParameters {
    /// Decode a stored profile
    pub fn from_values(values: &ProfileValues) -> Self {
        let defaults = Self::default();
        Self {
            compressor: CompressorParams {
                enabled: lenient(values, keys::COMPRESSION_ENABLE, read_bool, false),
                mode: lenient(values, keys::COMPRESSION_MODE, read_i16, 0),
            },
            bass_boost: StrengthParams {
                enabled: lenient(values, keys::BASS_ENABLE, read_bool, false),
                strength: lenient(values, keys::BASS_STRENGTH, read_i16, 0),
            },
            tone: ToneParams {
                enabled: lenient(values, keys::TONE_ENABLE, read_bool, false),
                bands: lenient(values, keys::TONE_BANDS, read_bands, defaults.tone.bands),
                loudness: lenient(values, keys::TONE_LOUDNESS, read_i16, DEFAULT_LOUDNESS),
            },
            virtualizer: StrengthParams {
                enabled: lenient(values, keys::VIRTUALIZER_ENABLE, read_bool, false),
                strength: lenient(values, keys::VIRTUALIZER_STRENGTH, read_i16, 0),
            },
        }
    }

    /// Copy of these parameters with the equalizer bands replaced
    pub fn with_band_override(&self, bands: &[f32]) -> Self {
        let mut params = self.clone();
        params.tone.bands = bands.to_vec();
        params
    }
}

fn lenient<T>(
    values: &ProfileValues,
    key: &str,
    read: fn(&str, &Value) -> Result<T>,
    default: T,
) -> T {
    match values.get(key) {
        None | Some(Value::Null) => default,
        Some(value) => read(key, value).unwrap_or_else(|e| {
            warn!("{}; using default", e);
            default
        }),
    }
}

fn invalid(key: &str, value: &Value) -> SessionFxError {
    SessionFxError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn read_bool(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => s.trim().parse::<bool>().map_err(|_| invalid(key, value)),
        _ => Err(invalid(key, value)),
    }
}

fn read_i16(key: &str, value: &Value) -> Result<i16> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| i16::try_from(n).ok())
        .ok_or_else(|| invalid(key, value))
}

fn read_bands(key: &str, value: &Value) -> Result<Vec<f32>> {
    match value {
        Value::String(s) => parse_band_levels(s).map_err(|_| invalid(key, value)),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_f64()
                    .map(|db| db as f32)
                    .ok_or_else(|| invalid(key, value))
            })
            .collect(),
        _ => Err(invalid(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> ProfileValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_profile_decodes_to_defaults() {
        let params = EffectParameters::from_values(&ProfileValues::new());
        assert_eq!(params, EffectParameters::default());
        assert_eq!(params.tone.loudness, 10000);
        assert_eq!(params.tone.bands.len(), 5);
    }

    #[test]
    fn test_string_encoded_values() {
        let params = EffectParameters::from_values(&values(&[
            (keys::COMPRESSION_ENABLE, json!(true)),
            (keys::COMPRESSION_MODE, json!("2")),
            (keys::BASS_ENABLE, json!("true")),
            (keys::BASS_STRENGTH, json!("300")),
            (keys::TONE_BANDS, json!("1.0;2.0;-1.0;0;0.5")),
            (keys::TONE_LOUDNESS, json!("8500")),
            (keys::VIRTUALIZER_STRENGTH, json!(750)),
        ]));

        assert_eq!(params.compressor, CompressorParams { enabled: true, mode: 2 });
        assert_eq!(params.bass_boost, StrengthParams { enabled: true, strength: 300 });
        assert_eq!(params.tone.bands, vec![1.0, 2.0, -1.0, 0.0, 0.5]);
        assert_eq!(params.tone.loudness, 8500);
        assert_eq!(params.virtualizer.strength, 750);
        assert!(!params.virtualizer.enabled);
    }

    #[test]
    fn test_malformed_values_fall_back_per_key() {
        let params = EffectParameters::from_values(&values(&[
            (keys::BASS_ENABLE, json!(true)),
            (keys::BASS_STRENGTH, json!("strong")),
            (keys::TONE_LOUDNESS, json!(99999)),
            (keys::TONE_BANDS, json!("1;x;3")),
        ]));

        assert!(params.bass_boost.enabled);
        assert_eq!(params.bass_boost.strength, 0);
        assert_eq!(params.tone.loudness, DEFAULT_LOUDNESS);
        assert_eq!(params.tone.bands, vec![0.0; 5]);
    }

    #[test]
    fn test_bands_as_json_array() {
        let params =
            EffectParameters::from_values(&values(&[(keys::TONE_BANDS, json!([3.0, -3.0]))]));
        assert_eq!(params.tone.bands, vec![3.0, -3.0]);
    }

    #[test]
    fn test_band_override_keeps_other_fields() {
        let base = EffectParameters::from_values(&values(&[(keys::TONE_ENABLE, json!(true))]));
        let overridden = base.with_band_override(&[1.0, 2.0]);

        assert!(overridden.tone.enabled);
        assert_eq!(overridden.tone.bands, vec![1.0, 2.0]);
        assert_eq!(base.tone.bands, vec![0.0; 5]);
    }
}
