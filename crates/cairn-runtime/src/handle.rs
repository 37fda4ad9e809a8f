//! Handle lifecycle management
//!
//! Each load runs as its own task and publishes its state on a watch channel:
//! `Pending`, then exactly one of `Succeeded` or `Failed`. The manager's two
//! tracking lists sit behind a mutex since completion tasks may run on any
//! runtime worker.

use crate::loader::{Resource, ResourceLoader};
use cairn_core::{CairnError, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Unique id of a tracked load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of a load
#[derive(Debug)]
pub enum LoadState<T> {
    Pending,
    Succeeded(Arc<T>),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn status(&self) -> HandleStatus {
        match self {
            LoadState::Pending => HandleStatus::Pending,
            LoadState::Succeeded(_) => HandleStatus::Succeeded,
            LoadState::Failed(_) => HandleStatus::Failed,
        }
    }
}

impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            LoadState::Pending => LoadState::Pending,
            LoadState::Succeeded(value) => LoadState::Succeeded(Arc::clone(value)),
            LoadState::Failed(reason) => LoadState::Failed(reason.clone()),
        }
    }
}

/// Payload-free view of a [`LoadState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    Pending,
    Succeeded,
    Failed,
}

/// A tracked reference to a load
#[derive(Debug)]
pub struct TrackedHandle<T> {
    id: HandleId,
    key: String,
    retained: bool,
    state: watch::Receiver<LoadState<T>>,
}

impl<T> Clone for TrackedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            key: self.key.clone(),
            retained: self.retained,
            state: self.state.clone(),
        }
    }
}

impl<T> TrackedHandle<T> {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this handle survives [`HandleManager::release_all`]
    pub fn is_retained(&self) -> bool {
        self.retained
    }

    pub fn status(&self) -> HandleStatus {
        self.state.borrow().status()
    }

    pub fn is_done(&self) -> bool {
        self.status() != HandleStatus::Pending
    }

    /// Wait for the load to finish
    ///
    /// A failed load has already been released and untracked when this returns.
    pub async fn completion(&self) -> Result<Arc<T>> {
        let mut state = self.state.clone();
        let resolved = match state
            .wait_for(|s| !matches!(s, LoadState::Pending))
            .await
        {
            Ok(resolved) => resolved.clone(),
            Err(_) => {
                return Err(self.failure("load task ended without a result".to_string()));
            }
        };

        match resolved {
            LoadState::Succeeded(value) => Ok(value),
            LoadState::Failed(reason) => Err(self.failure(reason)),
            LoadState::Pending => Err(self.failure("load still pending".to_string())),
        }
    }

    fn failure(&self, reason: String) -> CairnError {
        CairnError::LoadFailed {
            key: self.key.clone(),
            reason,
        }
    }
}

#[derive(Debug)]
struct Tracked {
    id: HandleId,
    key: String,
    loaded: bool,
}

#[derive(Debug, Default)]
struct TrackingLists {
    next_id: u64,
    auto_release: Vec<Tracked>,
    retained: Vec<Tracked>,
}

impl TrackingLists {
    fn track(&mut self, key: &str, retain: bool) -> HandleId {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        let tracked = Tracked {
            id,
            key: key.to_string(),
            loaded: false,
        };
        if retain {
            self.retained.push(tracked);
        } else {
            self.auto_release.push(tracked);
        }
        id
    }

    fn untrack(&mut self, id: HandleId) -> Option<Tracked> {
        for list in [&mut self.auto_release, &mut self.retained] {
            if let Some(index) = list.iter().position(|t| t.id == id) {
                return Some(list.remove(index));
            }
        }
        None
    }

    /// Flag a handle's resource as loaded; `false` if it is no longer tracked
    fn mark_loaded(&mut self, id: HandleId) -> bool {
        match self
            .auto_release
            .iter_mut()
            .chain(self.retained.iter_mut())
            .find(|t| t.id == id)
        {
            Some(tracked) => {
                tracked.loaded = true;
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: HandleId) -> bool {
        self.auto_release
            .iter()
            .chain(self.retained.iter())
            .any(|t| t.id == id)
    }
}

/// Issues loads and tracks their handles until release
///
/// Loads are spawned on the current Tokio runtime.
#[derive(Clone)]
pub struct HandleManager {
    loader: Arc<dyn ResourceLoader>,
    lists: Arc<Mutex<TrackingLists>>,
}

impl HandleManager {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            lists: Arc::new(Mutex::new(TrackingLists::default())),
        }
    }

    /// Start loading `key`, tracking the handle as retained or auto-released
    pub fn load<T: Resource>(&self, key: &str, retain: bool) -> TrackedHandle<T> {
        let id = self.lists.lock().track(key, retain);
        let (sender, receiver) = watch::channel(LoadState::Pending);

        let loader = Arc::clone(&self.loader);
        let lists = Arc::clone(&self.lists);
        let task_key = key.to_string();
        tokio::spawn(async move {
            let key = task_key;
            let bytes = match loader.load(&key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    // no reference was taken
                    warn!(handle = %id, key = %key, error = %e, "load failed, dropping handle");
                    lists.lock().untrack(id);
                    sender.send_replace(LoadState::Failed(e.to_string()));
                    return;
                }
            };

            let value = match T::decode(&key, bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(handle = %id, key = %key, error = %e, "decode failed, releasing handle");
                    loader.release(&key);
                    lists.lock().untrack(id);
                    sender.send_replace(LoadState::Failed(e.to_string()));
                    return;
                }
            };

            if !lists.lock().mark_loaded(id) {
                debug!(handle = %id, key = %key, "handle released before load finished");
                loader.release(&key);
                sender.send_replace(LoadState::Failed(
                    "handle released before the load finished".to_string(),
                ));
                return;
            }
            sender.send_replace(LoadState::Succeeded(Arc::new(value)));
        });

        debug!(handle = %id, key, retain, "load issued");
        TrackedHandle {
            id,
            key: key.to_string(),
            retained: retain,
            state: receiver,
        }
    }

    /// Release every auto-released handle; retained handles are untouched
    ///
    /// Returns how many handles were dropped from tracking.
    pub fn release_all(&self) -> usize {
        let drained: Vec<Tracked> = self.lists.lock().auto_release.drain(..).collect();
        for tracked in drained.iter().filter(|t| t.loaded) {
            self.loader.release(&tracked.key);
        }
        debug!(released = drained.len(), "released auto-release handles");
        drained.len()
    }

    /// Release one handle from whichever list holds it
    ///
    /// Returns `false` if the handle was not tracked (already released or failed).
    pub fn release<T>(&self, handle: &TrackedHandle<T>) -> bool {
        let Some(tracked) = self.lists.lock().untrack(handle.id) else {
            return false;
        };
        if tracked.loaded {
            self.loader.release(&tracked.key);
        }
        true
    }

    pub fn is_tracked(&self, id: HandleId) -> bool {
        self.lists.lock().contains(id)
    }

    /// Handles that `release_all` would drop
    pub fn auto_count(&self) -> usize {
        self.lists.lock().auto_release.len()
    }

    pub fn retained_count(&self) -> usize {
        self.lists.lock().retained.len()
    }
}

impl fmt::Debug for HandleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lists = self.lists.lock();
        f.debug_struct("HandleManager")
            .field("auto_release", &lists.auto_release.len())
            .field("retained", &lists.retained.len())
            .finish_non_exhaustive()
    }
}
