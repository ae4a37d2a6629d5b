//! Module dependency resolution
//!
//! Turns the pending registry into a load plan: which bundles and which
//! modules to fetch, in which order, and where each fetched module goes.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::module::registry::pending::PendingModules;

/// Immutable snapshot of one load
///
/// Computed once per load; later registry changes only affect the next
/// plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    /// Bundles to fetch first (empty unless bundles were requested); only
    /// bundles with a member routed by this plan
    pub bundles: Vec<String>,
    /// Deduplicated modules to fetch, in first-seen order across categories
    pub dependencies: Vec<String>,
    /// Category -> identifiers to merge, in declaration order
    pub routes: IndexMap<String, Vec<String>>,
    /// Identifier -> owning categories
    owners: HashMap<String, Vec<String>>,
}

impl LoadPlan {
    /// Categories a fetched identifier is routed to
    pub fn owners(&self, identifier: &str) -> &[String] {
        self.owners
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the plan fetches nothing
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty() && self.dependencies.is_empty()
    }
}

/// Dependency resolver
pub struct ModuleDependencies;

impl ModuleDependencies {
    /// Resolve pending declarations into a load plan
    ///
    /// `merged` holds the (category, identifier) pairs already merged by
    /// earlier loads; they are neither fetched nor routed again.
    pub fn resolve(
        pending: &PendingModules,
        merged: &HashSet<(String, String)>,
        load_bundles: bool,
    ) -> LoadPlan {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut plan = LoadPlan::default();

        for (category, slots) in pending.categories() {
            for identifier in slots.iter() {
                if pending.is_excluded(identifier) {
                    continue;
                }
                if merged.contains(&(category.clone(), identifier.clone())) {
                    continue;
                }

                let route = plan.routes.entry(category.clone()).or_default();
                if route.contains(identifier) {
                    continue;
                }
                route.push(identifier.clone());

                plan.owners
                    .entry(identifier.clone())
                    .or_default()
                    .push(category.clone());

                if seen.insert(identifier.as_str()) {
                    plan.dependencies.push(identifier.clone());
                }
            }
        }

        if load_bundles {
            plan.bundles = pending
                .bundles()
                .filter(|bundle| {
                    pending.bundle_members(bundle).iter().any(|(category, identifier)| {
                        plan.routes
                            .get(category)
                            .is_some_and(|route| route.contains(identifier))
                    })
                })
                .cloned()
                .collect();
        }

        debug!(
            "Dependency resolution complete: {} bundles, {:?}",
            plan.bundles.len(),
            plan.dependencies
        );

        plan
    }
}
