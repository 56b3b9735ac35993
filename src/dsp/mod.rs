//! DSP Effect Chains
//!
//! The fixed compressor / equalizer / bass boost / virtualizer bundle that
//! is attached to each audio session. Signal processing happens in the
//! platform engines; this module only configures them.

mod chain;

pub use chain::EffectChain;
