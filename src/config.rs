// Site configuration from environment variables
//
// SITE_ROOT       base URL (http/https) or local directory of the site
// LISTING_PATH    directory holding program documents, relative to SITE_ROOT
// KNOWN_PROGRAMS  comma-separated fallback document names
// IMAGE_BASE      directory for bare image file names
// DEFAULT_IMAGE   placeholder image path
// PORT            catalog server port

use std::sync::Arc;

use crate::error::FetchError;
use crate::fetch::{FsFetcher, HttpFetcher, SharedFetcher};
use crate::loader::{DocumentLoader, ImagePaths};
use crate::resolver::SourceResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site_root: String,
    pub listing_path: String,
    pub known_programs: Vec<String>,
    pub image_base: String,
    pub default_image: String,
    pub port: u16,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let images = ImagePaths::default();
        Self {
            site_root: "site".to_string(),
            listing_path: "programmata/".to_string(),
            known_programs: vec!["youth-pass.html".to_string()],
            image_base: images.base,
            default_image: images.default_image,
            port: 3000,
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = SiteConfig::default();

        if let Some(root) = get("SITE_ROOT") {
            config.site_root = root;
        }
        if let Some(path) = get("LISTING_PATH") {
            config.listing_path = path;
        }
        if let Some(list) = lookup("KNOWN_PROGRAMS") {
            config.known_programs = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(base) = get("IMAGE_BASE") {
            config.image_base = base;
        }
        if let Some(image) = get("DEFAULT_IMAGE") {
            config.default_image = image;
        }
        if let Some(port) = get("PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT '{}'", port),
            }
        }

        config
    }

    pub fn is_remote(&self) -> bool {
        self.site_root.starts_with("http://") || self.site_root.starts_with("https://")
    }

    /// HTTP fetcher for URL roots, filesystem fetcher otherwise.
    pub fn fetcher(&self) -> Result<SharedFetcher, FetchError> {
        if self.is_remote() {
            Ok(Arc::new(HttpFetcher::new(&self.site_root)?))
        } else {
            Ok(Arc::new(FsFetcher::new(&self.site_root)))
        }
    }

    pub fn image_paths(&self) -> ImagePaths {
        let mut base = self.image_base.clone();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        ImagePaths {
            base,
            default_image: self.default_image.clone(),
        }
    }

    pub fn resolver(&self, fetcher: SharedFetcher) -> SourceResolver {
        SourceResolver::new(fetcher, &self.listing_path, self.known_programs.clone())
    }

    pub fn loader(&self, fetcher: SharedFetcher) -> DocumentLoader {
        DocumentLoader::new(fetcher, self.image_paths())
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  SITE_ROOT: {}", self.site_root);
        tracing::info!("  LISTING_PATH: {}", self.listing_path);
        tracing::info!("  KNOWN_PROGRAMS: {}", self.known_programs.join(","));
        tracing::info!("  IMAGE_BASE: {}", self.image_base);
        tracing::info!("  DEFAULT_IMAGE: {}", self.default_image);
        tracing::info!("  PORT: {}", self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> SiteConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SiteConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c, SiteConfig::default());
        assert_eq!(c.known_programs, vec!["youth-pass.html"]);
        assert!(!c.is_remote());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("SITE_ROOT", "https://youth.example.gr"),
            ("KNOWN_PROGRAMS", "a.html, b.html,,"),
            ("IMAGE_BASE", "img/p"),
            ("PORT", "8080"),
        ]);
        assert!(c.is_remote());
        assert_eq!(c.known_programs, vec!["a.html", "b.html"]);
        assert_eq!(c.image_paths().base, "img/p/");
        assert_eq!(c.port, 8080);
    }

    #[test]
    fn test_empty_known_list_and_bad_port() {
        let c = config(&[("KNOWN_PROGRAMS", ""), ("PORT", "http")]);
        assert!(c.known_programs.is_empty());
        assert_eq!(c.port, 3000);
    }

    #[test]
    fn test_fetcher_selection() {
        assert!(config(&[("SITE_ROOT", "./site")]).fetcher().is_ok());
        assert!(config(&[("SITE_ROOT", "http://localhost:8000")]).fetcher().is_ok());
    }
}
