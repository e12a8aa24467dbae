//! Program Source Resolver
//!
//! Discovers which program documents exist. Two strategies, in order:
//! 1. Directory listing: fetch the listing page, keep `*.html` hyperlinks
//!    (minus the index page)
//! 2. Known list: probe a fixed set of document names concurrently, keep
//!    the ones that exist
//!
//! Output order is discovery order. An empty list is a valid result.

use futures::future::join_all;
use rustc_hash::FxHashSet;
use scraper::{Html, Selector};

use crate::error::ResolveError;
use crate::fetch::SharedFetcher;

const INDEX_DOCUMENT: &str = "index.html";

pub struct SourceResolver {
    fetcher: SharedFetcher,
    /// Directory holding program documents, with trailing '/'
    listing_path: String,
    /// Fallback document names, relative to `listing_path`
    known_sources: Vec<String>,
}

impl SourceResolver {
    pub fn new(fetcher: SharedFetcher, listing_path: &str, known_sources: Vec<String>) -> Self {
        let mut listing_path = listing_path.trim_start_matches('/').to_string();
        if !listing_path.is_empty() && !listing_path.ends_with('/') {
            listing_path.push('/');
        }
        Self {
            fetcher,
            listing_path,
            known_sources,
        }
    }

    /// Resolve source identifiers (paths relative to the site root).
    pub async fn resolve(&self) -> Result<Vec<String>, ResolveError> {
        match self.from_listing().await {
            Ok(sources) => {
                tracing::info!(
                    "Resolved {} program documents from listing {}",
                    sources.len(),
                    self.listing_path
                );
                return Ok(sources);
            }
            Err(e) => tracing::warn!("{}; falling back to known program list", e),
        }

        if self.known_sources.is_empty() {
            return Err(ResolveError::CatalogBuildFailed(format!(
                "listing {} unavailable and no known programs configured",
                self.listing_path
            )));
        }

        let sources = self.from_known_list().await;
        tracing::info!(
            "Resolved {}/{} known program documents",
            sources.len(),
            self.known_sources.len()
        );
        Ok(sources)
    }

    /// Directory-listing strategy.
    pub async fn from_listing(&self) -> Result<Vec<String>, ResolveError> {
        let body = self
            .fetcher
            .fetch_text(&self.listing_path)
            .await
            .map_err(|e| ResolveError::ListingUnavailable {
                path: self.listing_path.clone(),
                reason: e.to_string(),
            })?;

        let mut seen = FxHashSet::default();
        let sources = parse_listing_links(&body)
            .iter()
            .filter_map(|href| normalize_entry(href, &self.listing_path))
            .filter(|source| seen.insert(source.clone()))
            .collect();
        Ok(sources)
    }

    /// Known-list strategy: concurrent existence probes, list order kept.
    pub async fn from_known_list(&self) -> Vec<String> {
        let probes = self.known_sources.iter().map(|name| {
            let path = format!("{}{}", self.listing_path, name.trim_start_matches('/'));
            async move {
                if self.fetcher.exists(&path).await {
                    Some(path)
                } else {
                    tracing::debug!("Known program {} not found", path);
                    None
                }
            }
        });

        join_all(probes).await.into_iter().flatten().collect()
    }
}

/// Extract `href` values of every hyperlink in a listing page.
pub fn parse_listing_links(html: &str) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid listing selector: {}", e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let links = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect();
    links
}

/// Whether a file name looks like a program document.
pub fn is_program_document(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name.to_ascii_lowercase().ends_with(".html")
        && !name.eq_ignore_ascii_case(INDEX_DOCUMENT)
}

/// Turn a listing href into a site-relative source id, or drop it.
fn normalize_entry(href: &str, listing_path: &str) -> Option<String> {
    if href.starts_with('?') || href.starts_with('#') || href.contains("://") {
        return None;
    }

    let bare = href.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(bare).ok()?.into_owned();

    let path = match decoded.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("{}{}", listing_path, decoded.trim_start_matches("./")),
    };

    if path.split('/').any(|segment| segment == "..") {
        return None;
    }

    // Only documents directly inside the listing directory
    let name = path.strip_prefix(listing_path)?;
    if name.contains('/') || !is_program_document(name) {
        return None;
    }
    Some(path)
}
