//! Document Fetchers
//!
//! Every stage that touches the site goes through `DocumentFetcher`, keyed by
//! paths relative to the site root (e.g. `programmata/youth-pass.html`).
//!
//! Implementations:
//! - `HttpFetcher`: a deployed site over HTTP(S) (reqwest)
//! - `FsFetcher`: a site checkout on disk; directories render as an
//!   autoindex page, the way a plain static file server lists them
//! - `MemoryFetcher`: documents and assets held in memory

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::FetchError;

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the text body at `path`.
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Lightweight existence probe.
    async fn exists(&self, path: &str) -> bool;
}

pub type SharedFetcher = Arc<dyn DocumentFetcher>;

// ============================================================================
// HTTP
// ============================================================================

pub struct HttpFetcher {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpFetcher {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = reqwest::Url::parse(&normalized).map_err(|e| FetchError::InvalidLocation {
            location: normalized.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("programmata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: base.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, base })
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, FetchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidLocation {
                location: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn exists(&self, path: &str) -> bool {
        let Ok(url) = self.url_for(path) else {
            return false;
        };

        match self.client.head(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => true,
            // Some static hosts reject HEAD; retry with GET
            Ok(resp) if resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => self
                .client
                .get(url)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false),
            Ok(_) => false,
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

// ============================================================================
// Filesystem
// ============================================================================

pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a site path onto the root, refusing anything that escapes it.
    fn local_path(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidLocation {
                location: path.to_string(),
                reason: "path escapes site root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    async fn autoindex(dir: &Path, path: &str) -> Result<String, FetchError> {
        let io_err = |e: std::io::Error| FetchError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let mut html = String::with_capacity(64 * (names.len() + 1));
        html.push_str("<!DOCTYPE html>\n<html>\n<body>\n<ul>\n");
        for name in &names {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                urlencoding::encode(name),
                urlencoding::encode(name)
            ));
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        Ok(html)
    }
}

#[async_trait]
impl DocumentFetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let local = self.local_path(path)?;
        let metadata = match tokio::fs::metadata(&local).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound {
                    path: path.to_string(),
                })
            }
            Err(e) => {
                return Err(FetchError::Io {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if metadata.is_dir() {
            return Self::autoindex(&local, path).await;
        }

        tokio::fs::read_to_string(&local)
            .await
            .map_err(|e| FetchError::Io {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn exists(&self, path: &str) -> bool {
        match self.local_path(path) {
            Ok(local) => tokio::fs::metadata(&local)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Site held in memory: documents have bodies, assets only exist.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: FxHashMap<String, String>,
    assets: FxHashSet<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: &str, body: impl Into<String>) -> Self {
        self.documents.insert(path.to_string(), body.into());
        self
    }

    pub fn with_asset(mut self, path: &str) -> Self {
        self.assets.insert(path.to_string());
        self
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
            })
    }

    async fn exists(&self, path: &str) -> bool {
        self.documents.contains_key(path) || self.assets.contains(path)
    }
}
