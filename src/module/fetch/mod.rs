//! Fetch collaborators
//!
//! Implementations of [`ModuleFetcher`](crate::module::traits::ModuleFetcher):
//! an in-memory table, a manifest directory on disk, and a timeout
//! decorator for any of them.

pub mod manifest;
pub mod memory;
pub mod timeout;

pub use manifest::ManifestFetcher;
pub use memory::StaticFetcher;
pub use timeout::TimeoutFetcher;
