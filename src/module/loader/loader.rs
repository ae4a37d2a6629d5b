//! Module loader implementation
//!
//! Holds the required modules, accumulates dynamic declarations, and loads
//! them: bundles first (optionally), then every pending module as one
//! batch, validating each fetched module before anything is merged.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::module::registry::{
    LoadPlan, ModuleDeclaration, ModuleDependencies, PendingModules, Position,
};
use crate::module::traits::{ModuleError, ModuleFetcher, ModuleValidator};
use crate::module::validation::{validate_required, PlainObjectValidator};

/// Where a resolved module came from
///
/// Two entries are the same module only if their origins are equal, no
/// matter how their values compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ModuleOrigin {
    /// Required module, numbered in construction order
    Required(usize),
    /// Fetched module, by identifier
    Fetched(String),
}

/// Dynamic, category-aware module loader
pub struct ModuleLoader<T> {
    /// Validated modules per category, categories in insertion order
    resolved: IndexMap<String, Vec<T>>,
    /// Origin of each resolved module, aligned with `resolved`
    origins: IndexMap<String, Vec<ModuleOrigin>>,
    /// Declarations waiting for a load
    pending: PendingModules,
    /// (category, identifier) pairs merged by earlier loads
    merged: HashSet<(String, String)>,
    validator: Arc<dyn ModuleValidator<T>>,
    fetcher: Arc<dyn ModuleFetcher<T>>,
}

impl ModuleLoader<Value> {
    /// Create a loader for JSON-shaped modules
    ///
    /// Modules must be key-value objects, see [`PlainObjectValidator`].
    pub fn new<I, K, F>(required: I, fetcher: F) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: Into<String>,
        F: ModuleFetcher<Value> + 'static,
    {
        Self::with_validator(required, fetcher, PlainObjectValidator)
    }
}

impl<T> ModuleLoader<T>
where
    T: Clone + Send + 'static,
{
    /// Create a loader with a custom validator
    ///
    /// Every required module must satisfy `validator`; construction fails
    /// with an error naming the offending category otherwise. Required
    /// modules given twice for a category are concatenated.
    pub fn with_validator<I, K, F, V>(
        required: I,
        fetcher: F,
        validator: V,
    ) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = (K, Vec<T>)>,
        K: Into<String>,
        F: ModuleFetcher<T> + 'static,
        V: ModuleValidator<T> + 'static,
    {
        let mut resolved: IndexMap<String, Vec<T>> = IndexMap::new();
        let mut origins: IndexMap<String, Vec<ModuleOrigin>> = IndexMap::new();
        let mut next_required = 0usize;

        for (category, modules) in required {
            let category = category.into();
            validate_required(&category, &modules, &validator)?;
            origins
                .entry(category.clone())
                .or_default()
                .extend((next_required..next_required + modules.len()).map(ModuleOrigin::Required));
            next_required += modules.len();
            resolved.entry(category).or_default().extend(modules);
        }

        debug!(
            "Module loader created with {} required categories",
            resolved.len()
        );

        Ok(Self {
            resolved,
            origins,
            pending: PendingModules::new(),
            merged: HashSet::new(),
            validator: Arc::new(validator),
            fetcher: Arc::new(fetcher),
        })
    }

    /// Add a dynamic module to load
    pub fn add(&mut self, declaration: ModuleDeclaration) -> Result<&mut Self, ModuleError> {
        self.pending.add(declaration)?;
        Ok(self)
    }

    /// Add a list of dynamic modules, stopping at the first invalid one
    pub fn add_list<I>(&mut self, declarations: I) -> Result<&mut Self, ModuleError>
    where
        I: IntoIterator<Item = ModuleDeclaration>,
    {
        for declaration in declarations {
            self.pending.add(declaration)?;
        }
        Ok(self)
    }

    /// Add a dynamic module after the ones already in its category
    pub fn append(&mut self, declaration: ModuleDeclaration) -> Result<&mut Self, ModuleError> {
        self.add(declaration.at(Position::Append))
    }

    /// Add a dynamic module before the ones already in its category
    pub fn prepend(&mut self, declaration: ModuleDeclaration) -> Result<&mut Self, ModuleError> {
        self.add(declaration.at(Position::Prepend))
    }

    /// Exclude a module from future loads
    ///
    /// Modules already merged by a previous load stay resolved.
    pub fn remove(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.pending.exclude(identifier);
        self
    }

    /// Categories with resolved modules, in insertion order
    pub fn categories(&self) -> Vec<&str> {
        self.resolved.keys().map(String::as_str).collect()
    }

    /// Resolved modules of one category
    ///
    /// Empty if nothing was resolved for the category yet.
    pub fn modules_of(&self, category: &str) -> &[T] {
        self.resolved
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every resolved module, in category order
    ///
    /// A fetched module routed to several categories appears once. Distinct
    /// modules are all kept, even when their values are equal.
    pub fn modules(&self) -> Vec<T> {
        let mut seen: HashSet<&ModuleOrigin> = HashSet::new();
        let mut all: Vec<T> = Vec::new();
        for (category, modules) in &self.resolved {
            let Some(origins) = self.origins.get(category) else {
                continue;
            };
            for (origin, module) in origins.iter().zip(modules) {
                if seen.insert(origin) {
                    all.push(module.clone());
                }
            }
        }
        all
    }

    /// Pending declarations
    pub fn pending(&self) -> &PendingModules {
        &self.pending
    }

    /// Fetch collaborator used by [`ModuleLoader::load`]
    pub fn fetcher(&self) -> Arc<dyn ModuleFetcher<T>> {
        Arc::clone(&self.fetcher)
    }

    /// Snapshot the current declarations into a load plan
    pub fn plan(&self, load_bundles: bool) -> LoadPlan {
        ModuleDependencies::resolve(&self.pending, &self.merged, load_bundles)
    }

    /// Validate fetched modules and merge them
    ///
    /// Validation runs over every fetched module before the first merge, so
    /// a rejected module leaves the resolved state untouched. Pairs already
    /// merged by another plan are skipped.
    pub fn commit(&mut self, fetched: FetchedPlan<T>) -> Result<Vec<T>, ModuleError> {
        let FetchedPlan { plan, modules } = fetched;

        for (identifier, module) in plan.dependencies.iter().zip(&modules) {
            if !self.validator.validate(module) {
                warn!("Fetched module {} failed validation", identifier);
                return Err(ModuleError::InvalidModule(identifier.clone()));
            }
        }

        let by_identifier: HashMap<&str, &T> = plan
            .dependencies
            .iter()
            .map(String::as_str)
            .zip(modules.iter())
            .collect();

        let mut count = 0usize;
        for (category, identifiers) in &plan.routes {
            for identifier in identifiers {
                let Some(module) = by_identifier.get(identifier.as_str()) else {
                    continue;
                };
                if !self.merged.insert((category.clone(), identifier.clone())) {
                    debug!(
                        "Module {} already merged into category {}, skipping",
                        identifier, category
                    );
                    continue;
                }
                self.resolved
                    .entry(category.clone())
                    .or_default()
                    .push((*module).clone());
                self.origins
                    .entry(category.clone())
                    .or_default()
                    .push(ModuleOrigin::Fetched(identifier.clone()));
                count += 1;
            }
        }

        info!(
            "Merged {} modules into {} categories",
            count,
            plan.routes.len()
        );

        Ok(self.modules())
    }

    /// Load the dynamic modules
    ///
    /// Fetches bundles first when `load_bundles` is set, then every pending
    /// module in one batch. Resolves with [`ModuleLoader::modules`]. On any
    /// failure nothing is merged and the loader can be loaded again.
    pub async fn load(&mut self, load_bundles: bool) -> Result<Vec<T>, ModuleError> {
        let plan = self.plan(load_bundles);
        info!(
            "Loading {} modules ({} bundles)",
            plan.dependencies.len(),
            plan.bundles.len()
        );

        let fetcher = self.fetcher();
        let fetched = plan.fetch(fetcher.as_ref()).await.map_err(|e| {
            warn!("Module load failed: {}", e);
            e
        })?;

        self.commit(fetched)
    }
}

/// Load plan with its fetched modules, aligned with `plan.dependencies`
#[derive(Debug, Clone)]
pub struct FetchedPlan<T> {
    pub plan: LoadPlan,
    pub modules: Vec<T>,
}

impl LoadPlan {
    /// Run both fetch phases
    ///
    /// Phase 1 fetches the bundles (if any), phase 2 starts only once it
    /// has settled. Bundle contents are not used to shorten phase 2.
    pub async fn fetch<T, F>(self, fetcher: &F) -> Result<FetchedPlan<T>, ModuleError>
    where
        F: ModuleFetcher<T> + ?Sized,
    {
        fetch_modules(fetcher, &self.bundles).await?;
        let modules = fetch_modules(fetcher, &self.dependencies).await?;
        Ok(FetchedPlan {
            plan: self,
            modules,
        })
    }
}

/// Fetch one batch, short-circuiting empty requests
async fn fetch_modules<T, F>(fetcher: &F, identifiers: &[String]) -> Result<Vec<T>, ModuleError>
where
    F: ModuleFetcher<T> + ?Sized,
{
    if identifiers.is_empty() {
        return Ok(Vec::new());
    }

    debug!("Fetching batch: {:?}", identifiers);
    let modules = fetcher
        .fetch_batch(identifiers)
        .await
        .map_err(ModuleError::FetchFailed)?;

    if modules.len() != identifiers.len() {
        return Err(ModuleError::FetchFailed(anyhow::anyhow!(
            "Fetcher returned {} modules for {} identifiers",
            modules.len(),
            identifiers.len()
        )));
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::fetch::StaticFetcher;
    use serde_json::json;

    fn fetcher() -> StaticFetcher<Value> {
        StaticFetcher::new([
            ("a", json!({"id": "A"})),
            ("b", json!({"id": "B"})),
            ("bad", json!("not an object")),
        ])
    }

    #[test]
    fn test_required_modules_resolved_immediately() {
        let loader = ModuleLoader::new(
            vec![("core", vec![json!({"id": "core"})])],
            fetcher(),
        )
        .unwrap();
        assert_eq!(loader.categories(), vec!["core"]);
        assert_eq!(loader.modules_of("core"), &[json!({"id": "core"})]);
        assert!(loader.modules_of("missing").is_empty());
    }

    #[test]
    fn test_required_modules_validated() {
        let res = ModuleLoader::new(vec![("core", vec![json!([1])])], fetcher());
        assert!(matches!(res, Err(ModuleError::InvalidRequiredModules(_))));
    }

    #[test]
    fn test_required_categories_concatenated() {
        let loader = ModuleLoader::new(
            vec![
                ("core", vec![json!({"n": 1})]),
                ("core", vec![json!({"n": 2})]),
            ],
            fetcher(),
        )
        .unwrap();
        assert_eq!(loader.modules_of("core").len(), 2);
    }

    #[test]
    fn test_prepend_overrides_explicit_position() {
        let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), fetcher()).unwrap();
        loader
            .add(ModuleDeclaration::new("a", "x"))
            .unwrap()
            .prepend(ModuleDeclaration::new("b", "x").at(Position::Index(9)))
            .unwrap();
        let plan = loader.plan(false);
        assert_eq!(plan.dependencies, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_load_merges_in_declaration_order() {
        let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), fetcher()).unwrap();
        loader.add(ModuleDeclaration::new("a", "x")).unwrap();
        loader
            .add(ModuleDeclaration::new("b", "x").at(Position::Prepend))
            .unwrap();

        let all = loader.load(false).await.unwrap();
        assert_eq!(all, vec![json!({"id": "B"}), json!({"id": "A"})]);
        assert_eq!(loader.modules_of("x"), &[json!({"id": "B"}), json!({"id": "A"})]);
    }

    #[tokio::test]
    async fn test_invalid_fetched_module_rejected_without_merge() {
        let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), fetcher()).unwrap();
        loader.add(ModuleDeclaration::new("a", "x")).unwrap();
        loader.add(ModuleDeclaration::new("bad", "x")).unwrap();

        let err = loader.load(false).await.unwrap_err();
        assert!(matches!(err, ModuleError::InvalidModule(ref id) if id == "bad"));
        assert!(loader.modules_of("x").is_empty());
        assert!(loader.categories().is_empty());
    }

    #[tokio::test]
    async fn test_misaligned_fetch_fails() {
        struct Short;

        #[async_trait::async_trait]
        impl ModuleFetcher<Value> for Short {
            async fn fetch_batch(&self, _identifiers: &[String]) -> anyhow::Result<Vec<Value>> {
                Ok(vec![json!({})])
            }
        }

        let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), Short).unwrap();
        loader
            .add_list(vec![
                ModuleDeclaration::new("a", "x"),
                ModuleDeclaration::new("b", "x"),
            ])
            .unwrap();
        let err = loader.load(false).await.unwrap_err();
        assert!(matches!(err, ModuleError::FetchFailed(_)));
    }

    #[test]
    fn test_equal_required_modules_are_distinct() {
        let loader = ModuleLoader::new(
            vec![("a", vec![json!({})]), ("b", vec![json!({})])],
            fetcher(),
        )
        .unwrap();
        assert_eq!(loader.modules(), vec![json!({}), json!({})]);
    }

    #[tokio::test]
    async fn test_stale_plan_does_not_merge_twice() {
        let mut loader = ModuleLoader::new(Vec::<(String, Vec<Value>)>::new(), fetcher()).unwrap();
        loader.add(ModuleDeclaration::new("a", "x")).unwrap();

        let first = loader.plan(false);
        let second = loader.plan(false);
        let fetcher = loader.fetcher();

        let fetched = first.fetch(fetcher.as_ref()).await.unwrap();
        loader.commit(fetched).unwrap();
        let fetched = second.fetch(fetcher.as_ref()).await.unwrap();
        loader.commit(fetched).unwrap();

        assert_eq!(loader.modules_of("x"), &[json!({"id": "A"})]);
        assert_eq!(loader.modules(), vec![json!({"id": "A"})]);
    }

    #[tokio::test]
    async fn test_custom_validator() {
        let fetcher = StaticFetcher::new([("one", 1u32), ("two", 2u32)]);
        let mut loader =
            ModuleLoader::with_validator(vec![("n", vec![10u32])], fetcher, |m: &u32| *m > 0)
                .unwrap();
        loader.add(ModuleDeclaration::new("two", "n")).unwrap();
        loader.add(ModuleDeclaration::new("one", "n")).unwrap();
        let all = loader.load(false).await.unwrap();
        assert_eq!(all, vec![10, 2, 1]);
    }
}
