//! Manifest directory fetcher
//!
//! Each identifier names a document under a root directory: `a/b` is read
//! from `<root>/a/b.toml`, or `<root>/a/b.json` when no TOML file exists.
//! Identifiers that already carry a `.toml` or `.json` extension are used
//! as-is.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::module::traits::ModuleFetcher;

/// Fetches module documents from a directory
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    root: PathBuf,
}

impl ManifestFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate files for an identifier, in lookup order
    fn candidates(&self, identifier: &str) -> anyhow::Result<Vec<PathBuf>> {
        let relative = Path::new(identifier);
        let well_formed = relative.components().next().is_some()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            anyhow::bail!("Invalid module identifier: {}", identifier);
        }

        let base = self.root.join(relative);
        match base.extension().and_then(|e| e.to_str()) {
            Some("toml") | Some("json") => Ok(vec![base]),
            _ => Ok(vec![
                base.with_extension("toml"),
                base.with_extension("json"),
            ]),
        }
    }

    async fn fetch_one(&self, identifier: &str) -> anyhow::Result<Value> {
        for path in self.candidates(identifier)? {
            let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
                anyhow::anyhow!("Failed to check module {} ({:?}): {}", identifier, path, e)
            })?;
            if !exists {
                continue;
            }

            debug!("Reading module {} from {:?}", identifier, path);
            let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
                anyhow::anyhow!("Failed to read module {} ({:?}): {}", identifier, path, e)
            })?;

            let parsed = if path.extension().and_then(|e| e.to_str()) == Some("json") {
                serde_json::from_str::<Value>(&contents).map_err(|e| {
                    anyhow::anyhow!("Failed to parse module {} as JSON: {}", identifier, e)
                })?
            } else {
                toml::from_str::<Value>(&contents).map_err(|e| {
                    anyhow::anyhow!("Failed to parse module {} as TOML: {}", identifier, e)
                })?
            };
            return Ok(parsed);
        }

        anyhow::bail!("Module not found: {} (in {:?})", identifier, self.root)
    }
}

#[async_trait]
impl ModuleFetcher<Value> for ManifestFetcher {
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<Value>> {
        try_join_all(identifiers.iter().map(|id| self.fetch_one(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_reads_toml_and_json() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "plugins/a.toml", "name = \"a\"\nweight = 3\n");
        write(temp.path(), "plugins/b.json", r#"{"name": "b"}"#);

        let fetcher = ManifestFetcher::new(temp.path());
        let ids = vec!["plugins/b".to_string(), "plugins/a".to_string()];
        let modules = fetcher.fetch_batch(&ids).await.unwrap();
        assert_eq!(modules, vec![json!({"name": "b"}), json!({"name": "a", "weight": 3})]);
    }

    #[tokio::test]
    async fn test_explicit_extension() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "c.json", "[1, 2]");

        let fetcher = ManifestFetcher::new(temp.path());
        let modules = fetcher.fetch_batch(&["c.json".to_string()]).await.unwrap();
        assert_eq!(modules, vec![json!([1, 2])]);
    }

    #[tokio::test]
    async fn test_missing_module_fails_batch() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.toml", "x = 1");

        let fetcher = ManifestFetcher::new(temp.path());
        let ids = vec!["a".to_string(), "missing".to_string()];
        let err = fetcher.fetch_batch(&ids).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_unreadable_path_is_not_reported_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.toml", "x = 1");

        // A path component is a regular file, so the lookup fails with ENOTDIR
        let fetcher = ManifestFetcher::new(temp.path());
        let err = fetcher
            .fetch_batch(&["a.toml/b".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to check module"));
        assert!(!err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_path_escape_rejected() {
        let temp = TempDir::new().unwrap();
        let fetcher = ManifestFetcher::new(temp.path());
        assert!(fetcher.fetch_batch(&["../etc/passwd".to_string()]).await.is_err());
        assert!(fetcher.fetch_batch(&["/etc/passwd".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_document_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.toml", "this is = = not toml");
        let fetcher = ManifestFetcher::new(temp.path());
        let err = fetcher.fetch_batch(&["broken".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }
}
