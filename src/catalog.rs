//! Program Catalog
//!
//! Loads every resolved source concurrently and collects the records that
//! validate. A failing source is logged and recorded, never fatal to its
//! siblings. The resulting `Catalog` is read-only and replaced wholesale on
//! reload.

use futures::future::join_all;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::LoadError;
use crate::loader::DocumentLoader;
use crate::model::ProgramRecord;
use crate::resolver::SourceResolver;

/// Records in discovery order plus an id index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ProgramRecord>,
    index: FxHashMap<String, usize>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from records in discovery order. Later duplicates of an id are
    /// returned as failures.
    pub fn from_records(records: Vec<ProgramRecord>) -> (Self, Vec<SourceFailure>) {
        let mut catalog = Catalog::empty();
        let mut failures = Vec::new();

        for record in records {
            let key = record.id.to_string();
            if catalog.index.contains_key(&key) {
                let error = LoadError::malformed(&record.source_id, format!("duplicate id {}", key));
                failures.push(SourceFailure {
                    source_id: record.source_id.clone(),
                    error,
                });
                continue;
            }
            catalog.index.insert(key, catalog.records.len());
            catalog.records.push(record);
        }

        (catalog, failures)
    }

    /// Lookup by id as it appears in URLs.
    pub fn get(&self, id: &str) -> Option<&ProgramRecord> {
        self.index.get(id.trim()).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[ProgramRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique category slugs in first-seen order (feeds the category control).
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.records
            .iter()
            .flat_map(|r| r.categories.iter())
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

/// One source dropped from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: LoadError,
}

/// Outcome of loading a list of sources.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub failures: Vec<SourceFailure>,
}

/// Page-level catalog state handed to the controller and renderer.
#[derive(Debug, Clone)]
pub enum CatalogState {
    /// Sources resolved; the catalog may still be empty.
    Ready(CatalogBuild),
    /// Source resolution itself failed.
    Failed { reason: String },
}

impl CatalogState {
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogState::Ready(build) => Some(&build.catalog),
            CatalogState::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CatalogState::Failed { .. })
    }

    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            CatalogState::Ready(build) => &build.failures,
            CatalogState::Failed { .. } => &[],
        }
    }
}

/// Load every source concurrently; wait for all, keep the successes.
pub async fn build_catalog(loader: &DocumentLoader, source_ids: &[String]) -> CatalogBuild {
    let start = std::time::Instant::now();
    let results = join_all(source_ids.iter().map(|id| loader.load(id))).await;

    let mut records = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (source_id, result) in source_ids.iter().zip(results) {
        match result {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!("Dropping program source: {}", error);
                failures.push(SourceFailure {
                    source_id: source_id.clone(),
                    error,
                });
            }
        }
    }

    let (catalog, duplicates) = Catalog::from_records(records);
    for dup in &duplicates {
        tracing::warn!("Dropping program source: {}", dup.error);
    }
    failures.extend(duplicates);

    tracing::info!(
        "Catalog built in {:?}: {} programs, {} failed sources",
        start.elapsed(),
        catalog.len(),
        failures.len()
    );

    CatalogBuild { catalog, failures }
}

/// Resolve sources, then build the catalog.
pub async fn load_catalog(resolver: &SourceResolver, loader: &DocumentLoader) -> CatalogState {
    match resolver.resolve().await {
        Ok(sources) => CatalogState::Ready(build_catalog(loader, &sources).await),
        Err(e) => {
            tracing::error!("{}", e);
            CatalogState::Failed {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::loader::ImagePaths;
    use std::sync::Arc;

    fn doc(json: &str) -> String {
        format!(r#"<html><head><script type="application/json" id="program-data">{}</script></head></html>"#, json)
    }

    fn loader(fetcher: MemoryFetcher) -> DocumentLoader {
        DocumentLoader::new(Arc::new(fetcher), ImagePaths::default())
    }

    #[tokio::test]
    async fn test_failed_source_is_isolated() {
        let fetcher = MemoryFetcher::new()
            .with_document("p/one.html", doc(r#"{"id":1,"title":"One","fundFixed":1}"#))
            .with_document("p/two.html", doc(r#"{"id":2,"fundFixed":1}"#))
            .with_document("p/three.html", doc(r#"{"id":3,"title":"Three","fundFixed":1}"#));
        let sources: Vec<String> = ["p/one.html", "p/two.html", "p/three.html"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let build = build_catalog(&loader(fetcher), &sources).await;

        let titles: Vec<&str> = build.catalog.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Three"]);
        assert_eq!(build.failures.len(), 1);
        assert_eq!(build.failures[0].source_id, "p/two.html");
        assert!(build.failures[0].error.is_malformed());
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first() {
        let fetcher = MemoryFetcher::new()
            .with_document("p/a.html", doc(r#"{"id":1,"title":"A","fundFixed":1}"#))
            .with_document("p/b.html", doc(r#"{"id":1,"title":"B","fundFixed":1}"#));
        let sources = vec!["p/a.html".to_string(), "p/b.html".to_string()];

        let build = build_catalog(&loader(fetcher), &sources).await;
        assert_eq!(build.catalog.len(), 1);
        assert_eq!(build.catalog.get("1").unwrap().title, "A");
        assert_eq!(build.failures[0].source_id, "p/b.html");
    }

    #[tokio::test]
    async fn test_empty_sources_give_empty_ready_catalog() {
        let fetcher = MemoryFetcher::new().with_document("programmata/", "<p>nothing here</p>");
        let resolver = SourceResolver::new(Arc::new(fetcher.clone()), "programmata/", vec![]);

        let state = load_catalog(&resolver, &loader(fetcher)).await;
        assert!(!state.is_failed());
        assert!(state.catalog().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_failure_is_failed_state() {
        let fetcher = MemoryFetcher::new();
        let resolver = SourceResolver::new(Arc::new(fetcher.clone()), "programmata/", vec![]);

        let state = load_catalog(&resolver, &loader(fetcher)).await;
        assert!(state.is_failed());
        assert!(state.catalog().is_none());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let record = |id: i64, cats: &[&str]| {
            let raw = crate::model::RawProgramRecord {
                id: Some(crate::model::ProgramId::Int(id)),
                title: Some(format!("P{}", id)),
                fund_fixed: Some(1),
                categories: cats.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            };
            ProgramRecord::from_raw(raw, "p.html").unwrap()
        };
        let (catalog, failures) = Catalog::from_records(vec![
            record(1, &["education", "university"]),
            record(2, &["business", "education"]),
        ]);
        assert!(failures.is_empty());
        assert_eq!(catalog.categories(), vec!["education", "university", "business"]);
    }
}
