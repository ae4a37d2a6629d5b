//! In-memory fetcher

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::module::traits::ModuleFetcher;

/// Serves modules from a fixed identifier table
///
/// Stands in for an environment where modules are already linked in and
/// only need to be looked up by name.
#[derive(Debug, Default)]
pub struct StaticFetcher<T> {
    modules: HashMap<String, T>,
    batches: AtomicUsize,
}

impl<T> StaticFetcher<T> {
    pub fn new<I, K>(modules: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            batches: AtomicUsize::new(0),
        }
    }

    /// Register one more module
    pub fn insert(&mut self, identifier: impl Into<String>, module: T) {
        self.modules.insert(identifier.into(), module);
    }

    /// Number of batches served so far
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<T> ModuleFetcher<T> for StaticFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<T>> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        identifiers
            .iter()
            .map(|id| {
                self.modules
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Module not found: {}", id))
            })
            .collect()
    }
}
