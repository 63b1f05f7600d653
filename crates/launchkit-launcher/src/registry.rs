//! Tracking registry for live process handles.

use crate::handle::ProcessHandle;
use launchkit_common::{LaunchError, LaunchResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Table associating live handles with bookkeeping state.
///
/// Constructed explicitly and passed to [`Launcher::spawn`] rather than
/// hidden behind a process-wide singleton, so ownership and test isolation
/// stay clear.
///
/// A handle's natural-exit path does not unregister it; callers that poll a
/// handle to completion must call [`unregister`] themselves or the entry
/// leaks.
///
/// [`Launcher::spawn`]: crate::Launcher::spawn
/// [`unregister`]: LaunchRegistry::unregister
#[derive(Default)]
pub struct LaunchRegistry {
    handles: RwLock<HashMap<u64, Arc<ProcessHandle>>>,
}

impl std::fmt::Debug for LaunchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchRegistry")
            .field("handles", &self.handles.read().len())
            .finish()
    }
}

impl LaunchRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a handle to the registry. Spawn does this automatically.
    pub fn register(&self, handle: Arc<ProcessHandle>) {
        debug!(id = handle.id(), program = %handle.program(), "Handle registered");
        self.handles.write().insert(handle.id(), handle);
    }

    /// Remove a handle from the registry.
    pub fn unregister(&self, id: u64) -> LaunchResult<()> {
        match self.handles.write().remove(&id) {
            Some(handle) => {
                debug!(id, program = %handle.program(), "Handle unregistered");
                Ok(())
            }
            None => Err(LaunchError::not_found(id.to_string())),
        }
    }

    /// Look up a registered handle.
    pub fn get(&self, id: u64) -> Option<Arc<ProcessHandle>> {
        self.handles.read().get(&id).cloned()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.handles.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregister_unknown_handle_fails() {
        let registry = LaunchRegistry::new();
        assert!(registry.is_empty());

        let err = registry.unregister(999).unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }
}
