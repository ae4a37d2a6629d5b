//! Module system traits and interfaces
//!
//! Defines the seams the loader depends on: the fetch collaborator that
//! retrieves modules, the validator that accepts or rejects them, and the
//! error type shared by every stage.

use async_trait::async_trait;
use thiserror::Error;

/// Fetch collaborator
///
/// Given a non-empty ordered list of identifiers, returns the fetched
/// modules aligned index-for-index with the request. Any failure fails the
/// whole batch; there is no partial success.
///
/// The loader never performs I/O itself. Dynamic library loading, network
/// retrieval or reading manifests from disk all live behind this trait.
#[async_trait]
pub trait ModuleFetcher<T>: Send + Sync {
    /// Fetch a batch of modules
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<T>>;
}

#[async_trait]
impl<T, F> ModuleFetcher<T> for std::sync::Arc<F>
where
    F: ModuleFetcher<T> + ?Sized,
    T: Send + 'static,
{
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<T>> {
        (**self).fetch_batch(identifiers).await
    }
}

#[async_trait]
impl<T, F> ModuleFetcher<T> for Box<F>
where
    F: ModuleFetcher<T> + ?Sized,
    T: Send + 'static,
{
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<T>> {
        (**self).fetch_batch(identifiers).await
    }
}

/// Module validator
///
/// Synchronous predicate run against every required module at construction
/// and every fetched module before it is merged.
pub trait ModuleValidator<T>: Send + Sync {
    /// Returns true if the module is acceptable
    fn validate(&self, module: &T) -> bool;
}

impl<T, F> ModuleValidator<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn validate(&self, module: &T) -> bool {
        self(module)
    }
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Invalid module declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Invalid required modules: {0}")]
    InvalidRequiredModules(String),

    #[error("Module fetch failed: {0}")]
    FetchFailed(#[source] anyhow::Error),

    #[error("The module '{0}' is not valid")]
    InvalidModule(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ModuleError {
    /// Whether this error reports caller misuse
    ///
    /// Structural errors surface synchronously from registration or
    /// construction and are never produced by `load`.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ModuleError::InvalidDeclaration(_) | ModuleError::InvalidRequiredModules(_)
        )
    }
}

impl From<toml::de::Error> for ModuleError {
    fn from(e: toml::de::Error) -> Self {
        ModuleError::Config(e.to_string())
    }
}
