//! Shared test fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use module_loader::ModuleFetcher;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fake fetcher that records every batch it is asked for
#[derive(Clone, Default)]
pub struct RecordingFetcher {
    modules: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `{"id": <identifier upper-cased>}` for each identifier
    pub fn serving(identifiers: &[&str]) -> Self {
        let fetcher = Self::new();
        for id in identifiers {
            fetcher.set(id, json!({ "id": id.to_uppercase() }));
        }
        fetcher
    }

    pub fn set(&self, identifier: &str, module: Value) {
        self.modules
            .lock()
            .unwrap()
            .insert(identifier.to_string(), module);
    }

    /// Make every following batch fail
    pub fn fail_batches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }

    /// Identifiers requested across all batches
    pub fn requested(&self) -> Vec<String> {
        self.requests().into_iter().flatten().collect()
    }
}

#[async_trait]
impl ModuleFetcher<Value> for RecordingFetcher {
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<Value>> {
        self.requests.lock().unwrap().push(identifiers.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("network unreachable");
        }
        let modules = self.modules.lock().unwrap();
        identifiers
            .iter()
            .map(|id| {
                modules
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Module not found: {}", id))
            })
            .collect()
    }
}

/// Module value served by [`RecordingFetcher::serving`]
pub fn module(id: &str) -> Value {
    json!({ "id": id.to_uppercase() })
}

pub fn no_required() -> Vec<(String, Vec<Value>)> {
    Vec::new()
}
