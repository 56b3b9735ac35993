//! Session registry
//!
//! Sole owner of every `EffectChain`. Sessions are kept in id order so that
//! resyncs visit them deterministically.

use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::SessionId;
use crate::dsp::EffectChain;
use crate::engine::EngineFactory;
use crate::error::Result;

pub struct SessionRegistry {
    factory: Arc<dyn EngineFactory>,
    chains: BTreeMap<SessionId, EffectChain>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            chains: BTreeMap::new(),
        }
    }

    /// Attach a chain to a newly opened session
    ///
    /// Returns `Ok(false)` if the session already has a chain. When the
    /// engines cannot be created the session is left out of the registry and
    /// the error is logged and returned for the caller to report.
    pub fn on_session_opened(&mut self, id: SessionId) -> Result<bool> {
        if self.chains.contains_key(&id) {
            return Ok(false);
        }

        info!("New audio session: {}", id);
        match EffectChain::create(self.factory.as_ref(), id) {
            Ok(chain) => {
                self.chains.insert(id, chain);
                Ok(true)
            }
            Err(e) => {
                warn!("Not managing session {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Detach and release a session's chain. Returns whether it was present.
    pub fn on_session_closed(&mut self, id: SessionId) -> bool {
        match self.chains.remove(&id) {
            Some(chain) => {
                info!("Audio session removed: {}", id);
                chain.release();
                true
            }
            None => false,
        }
    }

    /// Ids of all sessions with a chain, in ascending order
    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.chains.keys().copied().collect()
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut EffectChain> {
        self.chains.get_mut(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.chains.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Release every chain
    pub fn clear(&mut self) {
        for (_, chain) in std::mem::take(&mut self.chains) {
            chain.release();
        }
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
