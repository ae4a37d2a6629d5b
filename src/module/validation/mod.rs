//! Module validation framework
//!
//! Provides the default module validator and the checks applied to
//! required modules at loader construction.

pub mod module_validator;

pub use module_validator::{validate_required, PlainObjectValidator};
