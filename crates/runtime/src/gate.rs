use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Shared set of lock tokens held by interactive tools.
///
/// Point queries only run while the set is empty. Clones share one set, so a
/// gate can be handed to every tool that needs it.
#[derive(Debug, Clone, Default)]
pub struct QueryGate {
    tokens: Arc<Mutex<BTreeSet<String>>>,
}

impl QueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the token was not already held.
    pub fn add_token(&self, token: impl Into<String>) -> bool {
        let token = token.into();
        debug!(%token, "query gate token added");
        self.tokens.lock().insert(token)
    }

    /// Returns `true` if the token was held.
    pub fn remove_token(&self, token: &str) -> bool {
        debug!(%token, "query gate token removed");
        self.tokens.lock().remove(token)
    }

    pub fn is_open(&self) -> bool {
        self.tokens.lock().is_empty()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().iter().cloned().collect()
    }

    /// Holds `token` until the returned guard is dropped.
    ///
    /// If the token was already present the guard leaves it in place on drop.
    pub fn hold(&self, token: impl Into<String>) -> GateHold {
        let token = token.into();
        let owned = self.add_token(token.clone());
        GateHold {
            gate: self.clone(),
            token,
            owned,
        }
    }
}

/// Token held on a [`QueryGate`] for the guard's lifetime.
#[derive(Debug)]
#[must_use = "the token is released as soon as the guard is dropped"]
pub struct GateHold {
    gate: QueryGate,
    token: String,
    owned: bool,
}

impl Drop for GateHold {
    fn drop(&mut self) {
        if self.owned {
            self.gate.remove_token(&self.token);
        }
    }
}
