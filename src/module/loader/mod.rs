//! Module loading system
//!
//! Registers dynamic modules, fetches them in two phases and merges the
//! validated results by category.

pub mod extension;
pub mod loader;

pub use extension::ExtendedLoader;
pub use loader::{FetchedPlan, ModuleLoader};
