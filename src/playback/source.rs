//! Data sources
//!
//! A source is either bytes already in memory or a pending acquisition
//! that is run at most once. A failed acquisition still yields bytes: the
//! error message, so the failure shows up on screen.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use crate::codepage;
use crate::error::SourceError;

type Loader = Box<dyn FnOnce() -> Result<Vec<u8>, SourceError> + Send>;

/// Bytes to play
#[derive(Clone)]
pub enum DataSource {
    Bytes(Arc<[u8]>),
    Pending(PendingSource),
}

impl DataSource {
    /// Wrap raw bytes
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        DataSource::Bytes(Arc::from(bytes.into()))
    }

    /// Encode text through CP437
    pub fn text(text: &str) -> Self {
        DataSource::bytes(codepage::encode(text))
    }

    /// Defer acquisition to `loader`
    pub fn pending<F>(loader: F) -> Self
    where
        F: FnOnce() -> Result<Vec<u8>, SourceError> + Send + 'static,
    {
        DataSource::Pending(PendingSource::new(loader))
    }

    /// Whether the bytes are available without blocking
    pub fn is_ready(&self) -> bool {
        match self {
            DataSource::Bytes(_) => true,
            DataSource::Pending(pending) => pending.is_resolved(),
        }
    }

    /// Materialize the bytes, running the loader if needed
    pub fn resolve(&self) -> (Arc<[u8]>, Option<Arc<SourceError>>) {
        match self {
            DataSource::Bytes(bytes) => (Arc::clone(bytes), None),
            DataSource::Pending(pending) => pending.resolve(),
        }
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            DataSource::Pending(pending) => f
                .debug_struct("Pending")
                .field("resolved", &pending.is_resolved())
                .finish(),
        }
    }
}

impl From<Vec<u8>> for DataSource {
    fn from(bytes: Vec<u8>) -> Self {
        DataSource::bytes(bytes)
    }
}

impl From<&[u8]> for DataSource {
    fn from(bytes: &[u8]) -> Self {
        DataSource::bytes(bytes)
    }
}

impl From<&str> for DataSource {
    fn from(text: &str) -> Self {
        DataSource::text(text)
    }
}

struct PendingInner {
    loader: Mutex<Option<Loader>>,
    resolved: OnceLock<(Arc<[u8]>, Option<Arc<SourceError>>)>,
}

/// A memoized acquisition shared by every clone
#[derive(Clone)]
pub struct PendingSource {
    inner: Arc<PendingInner>,
}

impl PendingSource {
    pub fn new<F>(loader: F) -> Self
    where
        F: FnOnce() -> Result<Vec<u8>, SourceError> + Send + 'static,
    {
        Self {
            inner: Arc::new(PendingInner {
                loader: Mutex::new(Some(Box::new(loader))),
                resolved: OnceLock::new(),
            }),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get().is_some()
    }

    /// Run the loader once and return its memoized outcome
    pub fn resolve(&self) -> (Arc<[u8]>, Option<Arc<SourceError>>) {
        let (bytes, error) = self.inner.resolved.get_or_init(|| {
            let loader = match self.inner.loader.lock() {
                Ok(mut guard) => guard.take(),
                Err(poisoned) => poisoned.into_inner().take(),
            };
            let result = match loader {
                Some(loader) => loader(),
                None => Err(SourceError::Unavailable(
                    "source loader already consumed".to_string(),
                )),
            };
            match result {
                Ok(bytes) => {
                    tracing::debug!(len = bytes.len(), "source resolved");
                    (Arc::from(bytes), None)
                }
                Err(error) => {
                    tracing::warn!(%error, "source failed, playing error text");
                    let text = codepage::encode(&error.to_string());
                    (Arc::from(text), Some(Arc::new(error)))
                }
            }
        });
        (Arc::clone(bytes), error.clone())
    }
}
