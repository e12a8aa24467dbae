//! Program View Renderer
//!
//! Turns catalog state into HTML with Askama templates:
//! - `cards`: the listing grid (cards, no-results notice or error panel)
//!   and the full listing page with hydrated controls
//! - `detail`: the per-program detail page and the unknown-id page
//!
//! Output always replaces the container's previous content wholesale.

pub mod cards;
pub mod detail;

pub use cards::{render_grid, render_listing, CatalogView};
pub use detail::{render_detail, render_not_found};

/// Search input debounce advertised to the listing page script.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Age brackets offered by the age control.
pub const AGE_BRACKETS: &[&str] = &["15-17", "18-25", "26-30", "31-35"];

/// Where rendered links point. The static site and the HTTP surface use
/// different URL shapes for the same pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Listing page location (form action, reset link, tag links).
    pub listing_href: String,
    /// Prefix completed with a program id to form its detail link.
    pub detail_href_prefix: String,
    /// Prefix for site-relative assets (images, stylesheet).
    pub asset_prefix: String,
    /// Fallback image, site-relative.
    pub default_image: String,
}

impl RenderOptions {
    /// Links for pages written next to the site's own HTML files.
    pub fn static_site(default_image: &str) -> Self {
        Self {
            listing_href: "programs.html".to_string(),
            detail_href_prefix: "program-details.html?id=".to_string(),
            asset_prefix: String::new(),
            default_image: default_image.to_string(),
        }
    }

    /// Links for pages served by the catalog server.
    pub fn server(default_image: &str) -> Self {
        Self {
            listing_href: "/programs".to_string(),
            detail_href_prefix: "/programs/".to_string(),
            asset_prefix: "/".to_string(),
            default_image: default_image.to_string(),
        }
    }

    /// Resolve a site-relative asset path; absolute paths and URLs pass through.
    pub fn asset_href(&self, path: &str) -> String {
        if path.starts_with('/') || path.contains("://") {
            path.to_string()
        } else {
            format!("{}{}", self.asset_prefix, path)
        }
    }

    pub fn detail_href(&self, id: &str) -> String {
        format!("{}{}", self.detail_href_prefix, urlencoding::encode(id))
    }

    /// Listing link carrying a query string (bare listing when empty).
    pub fn listing_with_query(&self, query: &str) -> String {
        if query.is_empty() {
            self.listing_href.clone()
        } else {
            format!("{}?{}", self.listing_href, query)
        }
    }

    pub fn stylesheet(&self) -> String {
        self.asset_href("css/style.css")
    }
}

/// One `<option>` of a select control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }
    }
}
