use super::handle::SwarmHandle;
use super::id::SwarmId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps info hashes to the swarms currently accepting peers.
///
/// Every operation is a single map access under one mutex, and no I/O ever
/// happens while it is held. A registration that returns before a peer's
/// lookup is always visible to that lookup.
#[derive(Default)]
pub struct SwarmRegistry {
    swarms: Mutex<HashMap<SwarmId, Arc<dyn SwarmHandle>>>,
}

impl SwarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its swarm id, returning any handle it replaced.
    pub fn register(&self, handle: Arc<dyn SwarmHandle>) -> Option<Arc<dyn SwarmHandle>> {
        let id = handle.swarm_id();
        let previous = self.swarms.lock().insert(id, handle);
        if previous.is_some() {
            debug!("Replaced swarm {}", id);
        } else {
            debug!("Registered swarm {}", id);
        }
        previous
    }

    /// Removes whatever handle is registered under `handle`'s swarm id.
    ///
    /// Must be called before the swarm goes away.
    pub fn unregister(&self, handle: &dyn SwarmHandle) -> Option<Arc<dyn SwarmHandle>> {
        self.unregister_id(&handle.swarm_id())
    }

    pub fn unregister_id(&self, id: &SwarmId) -> Option<Arc<dyn SwarmHandle>> {
        let removed = self.swarms.lock().remove(id);
        if removed.is_some() {
            debug!("Unregistered swarm {}", id);
        }
        removed
    }

    pub fn lookup(&self, id: &SwarmId) -> Option<Arc<dyn SwarmHandle>> {
        self.swarms.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &SwarmId) -> bool {
        self.swarms.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.swarms.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.swarms.lock().is_empty()
    }
}

impl std::fmt::Debug for SwarmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmRegistry")
            .field("swarms", &self.swarms.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}
