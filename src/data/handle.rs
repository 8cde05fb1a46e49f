//! Load lifecycle.
//!
//! Consumers must not read the record sets until the load has completed.
//! `DataHandle` makes that explicit: reading early is `DataError::NotReady`
//! (retry later), which callers can tell apart from a loaded-but-empty
//! dataset (legitimately "no data").

use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use crate::data::Dataset;
use crate::error::DataError;

type ReadyCallback = Box<dyn FnOnce(&Arc<Dataset>) + Send>;

#[derive(Default)]
pub struct DataHandle {
    dataset: OnceLock<Arc<Dataset>>,
    waiters: Mutex<Vec<ReadyCallback>>,
}

impl DataHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.dataset.get().is_some()
    }

    /// The loaded dataset, or `NotReady` before `complete` was called.
    pub fn get(&self) -> Result<Arc<Dataset>, DataError> {
        self.dataset.get().cloned().ok_or(DataError::NotReady)
    }

    /// Run `callback` once the dataset is available (immediately if it already is).
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&Arc<Dataset>) + Send + 'static,
    {
        let mut waiters = self.waiters.lock().unwrap_or_else(|p| p.into_inner());
        match self.dataset.get() {
            Some(dataset) => {
                let dataset = Arc::clone(dataset);
                drop(waiters);
                callback(&dataset);
            }
            None => waiters.push(Box::new(callback)),
        }
    }

    /// Publish the dataset and notify waiters. Only the first call succeeds.
    pub fn complete(&self, dataset: Dataset) -> Result<Arc<Dataset>, DataError> {
        let mut waiters = self.waiters.lock().unwrap_or_else(|p| p.into_inner());
        let dataset = Arc::new(dataset);
        self.dataset
            .set(Arc::clone(&dataset))
            .map_err(|_| DataError::AlreadyLoaded)?;
        let pending = std::mem::take(&mut *waiters);
        drop(waiters);

        debug!(callbacks = pending.len(), "dataset ready");
        for callback in pending {
            callback(&dataset);
        }
        Ok(dataset)
    }
}

impl std::fmt::Debug for DataHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn get_before_complete_is_not_ready() {
        let handle = DataHandle::new();
        assert!(!handle.is_ready());
        assert_eq!(handle.get().unwrap_err(), DataError::NotReady);
    }

    #[test]
    fn callbacks_fire_once_before_and_after_completion() {
        let handle = DataHandle::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        handle.on_ready(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handle.complete(Dataset::default()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let c = Arc::clone(&calls);
        handle.on_ready(move |ds| {
            assert!(ds.covid.is_empty());
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(handle.get().unwrap().covid.is_empty());
    }

    #[test]
    fn second_completion_is_rejected() {
        let handle = DataHandle::new();
        handle.complete(Dataset::default()).unwrap();
        assert_eq!(handle.complete(Dataset::default()).unwrap_err(), DataError::AlreadyLoaded);
    }
}
