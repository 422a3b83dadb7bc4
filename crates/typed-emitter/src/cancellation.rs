//! # Cancellation Registry
//!
//! Maps namespace names to the cancellation token that scopes their listeners.
//!
//! - The `"global"` namespace exists from construction.
//! - Other namespaces are created lazily on first registration.
//! - Revoking a namespace cancels its token and forgets it; the next
//!   registration under that name starts a fresh, independent scope.

use crate::error::{EmitterError, Result};
use crate::GLOBAL_NAMESPACE;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Per-emitter mapping from namespace to cancellation token source.
#[derive(Debug)]
pub(crate) struct CancellationRegistry {
    sources: HashMap<String, CancellationToken>,
}

impl CancellationRegistry {
    /// Create a registry holding only the global namespace.
    pub(crate) fn new() -> Self {
        let mut sources = HashMap::new();
        sources.insert(GLOBAL_NAMESPACE.to_string(), CancellationToken::new());
        Self { sources }
    }

    /// Return the live token for `namespace`, creating it if absent.
    ///
    /// Fails on an empty namespace without touching the registry.
    pub(crate) fn ensure(&mut self, namespace: &str) -> Result<CancellationToken> {
        if namespace.is_empty() {
            return Err(EmitterError::InvalidNamespace);
        }
        let token = self
            .sources
            .entry(namespace.to_string())
            .or_insert_with(CancellationToken::new);
        Ok(token.clone())
    }

    /// Cancel and discard the token for `namespace`.
    ///
    /// Returns the cancelled token, or `None` if the namespace had no live
    /// source.
    pub(crate) fn revoke(&mut self, namespace: &str) -> Option<CancellationToken> {
        let token = self.sources.remove(namespace)?;
        token.cancel();
        Some(token)
    }

    pub(crate) fn contains(&self, namespace: &str) -> bool {
        self.sources.contains_key(namespace)
    }

    /// Live namespace names, sorted.
    pub(crate) fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }
}
