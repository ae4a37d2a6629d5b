//! Module system for module-loader
//!
//! Dynamic, dependency-aware loading of categorized modules.
//!
//! ## Architecture
//!
//! - **Registry**: required modules at construction, dynamic declarations afterwards
//! - **Resolver**: deduplicated, exclusion-filtered, per-category ordered load plan
//! - **Loader**: bundles then modules, fetched through a [`ModuleFetcher`]
//! - **Validation**: every fetched module checked before an all-or-nothing merge

pub mod traits;
pub mod registry;
pub mod loader;
pub mod fetch;
pub mod validation;

pub use traits::{ModuleError, ModuleFetcher, ModuleValidator};
pub use registry::{LoadPlan, ModuleDeclaration, Position};
pub use loader::{ExtendedLoader, FetchedPlan, ModuleLoader};
pub use fetch::{ManifestFetcher, StaticFetcher, TimeoutFetcher};
pub use validation::PlainObjectValidator;
