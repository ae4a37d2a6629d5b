//! Pending module registry
//!
//! Accumulates dynamic declarations and exclusions until they are resolved
//! into a load plan.

use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::module::registry::declaration::ModuleDeclaration;
use crate::module::registry::slots::CategorySlots;
use crate::module::traits::ModuleError;

/// Declarations awaiting fetch
#[derive(Debug, Clone, Default)]
pub struct PendingModules {
    /// Category -> ordered identifiers, categories in first-declaration order
    categories: IndexMap<String, CategorySlots>,
    /// Identifiers omitted from every fetch
    excluded: HashSet<String>,
    /// Bundle -> (category, identifier) pairs declared with it, bundles in
    /// first-seen order
    bundles: IndexMap<String, Vec<(String, String)>>,
}

impl PendingModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration
    ///
    /// Nothing is recorded if the declaration is structurally invalid.
    pub fn add(&mut self, declaration: ModuleDeclaration) -> Result<(), ModuleError> {
        declaration.validate()?;

        let ModuleDeclaration {
            identifier,
            bundle_identifier,
            category,
            position,
            ..
        } = declaration;

        debug!(
            "Declaring module {} in category {} ({})",
            identifier, category, position
        );

        if let Some(bundle) = bundle_identifier {
            let members = self.bundles.entry(bundle).or_default();
            let member = (category.clone(), identifier.clone());
            if !members.contains(&member) {
                members.push(member);
            }
        }

        let slots = self.categories.entry(category.clone()).or_default();
        if let Some(displaced) = slots.place(identifier.clone(), position) {
            warn!(
                "Module {} replaced {} at slot {} of category {}",
                identifier, displaced, position, category
            );
        }

        Ok(())
    }

    /// Exclude an identifier from future fetches
    pub fn exclude(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        debug!("Excluding module {}", identifier);
        self.excluded.insert(identifier);
    }

    pub fn is_excluded(&self, identifier: &str) -> bool {
        self.excluded.contains(identifier)
    }

    /// Pending categories and their slots, in first-declaration order
    pub fn categories(&self) -> impl Iterator<Item = (&String, &CategorySlots)> {
        self.categories.iter()
    }

    /// Pending slots of one category
    pub fn category(&self, category: &str) -> Option<&CategorySlots> {
        self.categories.get(category)
    }

    /// Bundles in first-seen order
    pub fn bundles(&self) -> impl Iterator<Item = &String> {
        self.bundles.keys()
    }

    /// (category, identifier) pairs declared with a bundle
    pub fn bundle_members(&self, bundle: &str) -> &[(String, String)] {
        self.bundles
            .get(bundle)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
