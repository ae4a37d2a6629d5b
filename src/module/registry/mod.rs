//! Module registry and dependency resolution
//!
//! Handles module declarations, per-category ordering and load planning.

pub mod declaration;
pub mod dependencies;
pub mod pending;
pub mod slots;

pub use declaration::{ModuleDeclaration, Position};
pub use dependencies::{LoadPlan, ModuleDependencies};
pub use pending::PendingModules;
pub use slots::CategorySlots;
