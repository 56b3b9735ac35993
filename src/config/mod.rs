//! Configuration Module
//!
//! Stored per-profile DSP settings and their decoding:
//! - Stores mapping a routing profile name to raw key/value pairs
//! - Typed effect parameters decoded from those pairs
//! - Equalizer band string encoding

pub mod bands;
pub mod params;
pub mod store;

pub use bands::{centibels_to_db, db_to_centibels, format_band_levels, parse_band_levels};
pub use params::{
    keys, CompressorParams, EffectParameters, ProfileValues, StrengthParams, ToneParams,
};
pub use store::{ConfigurationStore, JsonFileStore, MemoryStore};
