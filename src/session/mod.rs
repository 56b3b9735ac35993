//! Audio Session Tracking
//!
//! Maps live audio session ids to the effect chain attached to each.

mod registry;

pub use registry::SessionRegistry;

/// Platform-assigned audio session identifier
pub type SessionId = i32;
