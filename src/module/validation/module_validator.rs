//! Module validators

use serde_json::Value;
use tracing::{debug, warn};

use crate::module::traits::{ModuleError, ModuleValidator};

/// Default validator for JSON-shaped modules
///
/// Accepts only key-value objects: `null`, arrays and primitives are
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainObjectValidator;

impl ModuleValidator<Value> for PlainObjectValidator {
    #[inline]
    fn validate(&self, module: &Value) -> bool {
        module.is_object()
    }
}

/// Validate the required modules of one category
///
/// Every module must pass `validator`; the error names the category.
pub fn validate_required<T, V>(
    category: &str,
    modules: &[T],
    validator: &V,
) -> Result<(), ModuleError>
where
    V: ModuleValidator<T> + ?Sized,
{
    if category.trim().is_empty() {
        return Err(ModuleError::InvalidRequiredModules(
            "Modules must belong to a category".to_string(),
        ));
    }

    if let Some(index) = modules.iter().position(|m| !validator.validate(m)) {
        warn!(
            "Required module #{} of category {} failed validation",
            index, category
        );
        return Err(ModuleError::InvalidRequiredModules(format!(
            "The list of category '{}' does not contain valid modules",
            category
        )));
    }

    debug!(
        "Validated {} required modules for category {}",
        modules.len(),
        category
    );
    Ok(())
}
