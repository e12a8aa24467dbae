//! Programmata: youth funding program catalog.
//!
//! Discovers program documents on a site, extracts the structured record
//! embedded in each one, and renders a filterable, sortable catalog.
//!
//! Pipeline:
//! - `resolver`: which program documents exist (directory listing, then a
//!   known-name fallback)
//! - `loader`: fetch one document and validate its embedded record
//! - `catalog`: load all sources concurrently, isolate failures
//! - `filter`: pure search/age/category filters and sort keys
//! - `render`: Askama pages for the listing, cards and detail views
//! - `controller`: URL-synchronized view state and the re-render loop
//!
//! The `api` feature adds an axum server (`api_server`) hosting the pages.

pub mod categories;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod render;
pub mod resolver;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use catalog::{build_catalog, load_catalog, Catalog, CatalogBuild, CatalogState, SourceFailure};
pub use config::SiteConfig;
pub use controller::{CatalogController, ControlEvent, ViewState};
pub use debounce::SearchDebouncer;
pub use error::{FetchError, LoadError, RenderError, ResolveError};
pub use fetch::{DocumentFetcher, FsFetcher, HttpFetcher, MemoryFetcher, SharedFetcher};
pub use filter::{AgeRange, FilterCriteria, SortKey};
pub use loader::{DocumentLoader, ImagePaths};
pub use model::{Funding, ProgramId, ProgramRecord};
pub use render::RenderOptions;
pub use resolver::SourceResolver;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
