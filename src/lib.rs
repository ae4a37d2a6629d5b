//! Module Loader - dependency-aware dynamic module loading
//!
//! A registry that accepts named, categorized, optionally bundled module
//! declarations, resolves them into a deduplicated load order, fetches
//! them through a pluggable collaborator, validates each fetched module,
//! and exposes the results grouped by category.
//!
//! ## Design Principles
//!
//! 1. **No I/O in the core**: retrieval lives behind [`ModuleFetcher`]
//! 2. **Structural errors are synchronous**: bad declarations fail at registration
//! 3. **All-or-nothing loads**: a failed fetch or validation merges nothing
//! 4. **Stable ordering**: categories and modules keep declaration order
//!
//! ```rust,no_run
//! use module_loader::{ManifestFetcher, ModuleDeclaration, ModuleLoader};
//! use serde_json::Value;
//!
//! # async fn run() -> Result<(), module_loader::ModuleError> {
//! let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), ManifestFetcher::new("modules"))?;
//! loader
//!     .add(ModuleDeclaration::new("tools/save", "toolbar"))?
//!     .prepend(ModuleDeclaration::new("tools/open", "toolbar"))?;
//! let modules = loader.load(false).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod module;
pub mod utils;

pub use config::{LoaderConfig, LoggingConfig};
pub use module::{
    ExtendedLoader, FetchedPlan, LoadPlan, ManifestFetcher, ModuleDeclaration, ModuleError,
    ModuleFetcher, ModuleLoader, ModuleValidator, PlainObjectValidator, Position, StaticFetcher,
    TimeoutFetcher,
};
