use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::transport::ShmTransportInner;
use shared::error::{Error, Result};

/// Maps a stable transport id to the single live control object mirroring the
/// worker-side transport.
///
/// Entries exist exactly while the control object is not yet closed:
/// registration happens at creation, unregistration is the last step of
/// terminal close. The registry is the only structure touched by both the
/// command path (registration) and the notification path (lookup); both
/// mutations are gated by the lifecycle state machine, so a plain mutex over
/// the map is all the locking this needs.
#[derive(Default)]
pub struct HandleRegistry {
    entries: Mutex<HashMap<String, Arc<ShmTransportInner>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        HandleRegistry::default()
    }

    /// Registers `transport` under `id`. Fails with `ErrDuplicateHandle` if
    /// the id is already taken; a collision is a programming or configuration
    /// error and is fatal to the creation attempt.
    pub(crate) fn register(&self, id: &str, transport: Arc<ShmTransportInner>) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(id) {
            return Err(Error::ErrDuplicateHandle(id.to_owned()));
        }
        entries.insert(id.to_owned(), transport);
        Ok(())
    }

    /// Removes the entry for `id`. Idempotent: unregistering an absent id is
    /// a no-op.
    pub(crate) fn unregister(&self, id: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(id);
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<Arc<ShmTransportInner>> {
        let entries = self.entries.lock().unwrap();
        entries.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
