//! Values returned by fallback-eligible reads

use serde::Serialize;

/// Where a read's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Decoded from a live backend response
    Live,
    /// Substituted from the static fallback dataset
    Fallback,
}

/// A read result tagged with its source
///
/// Callers that only need the data use [`Fetched::into_inner`]; a UI can
/// check [`Fetched::is_fallback`] to show an offline indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    /// The value
    pub data: T,
    /// Its source
    pub source: DataSource,
}

impl<T> Fetched<T> {
    /// Wrap a live value
    pub const fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    /// Wrap a fallback value
    pub const fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
        }
    }

    /// Whether the value is fallback data
    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    /// Discard the source tag
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Transform the value, keeping the source tag
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
        }
    }
}
