//! A [`Store`] that can be handed to several threads.
//!
//! All access goes through one mutex, so store operations never interleave.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        SharedStore { inner: Arc::new(Mutex::new(store)) }
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // Operations never leave the store half-mutated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
