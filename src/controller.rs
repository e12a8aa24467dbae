//! Catalog UI Controller
//!
//! Holds the current filter/sort state, keeps it in sync with the shareable
//! URL query (`search`, `age`, `category`, `sort`) and re-renders the
//! listing on every change. Each change re-runs the pure filter/sort/render
//! sequence; the latest render supersedes earlier ones.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::catalog::CatalogState;
use crate::error::RenderError;
use crate::filter::{self, FilterCriteria, SortKey};
use crate::model::ProgramRecord;
use crate::render::{self, CatalogView, RenderOptions};

// ============================================================================
// URL-synchronized view state
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub criteria: FilterCriteria,
    pub sort: Option<SortKey>,
}

impl ViewState {
    /// Hydrate from a URL query string (with or without the leading `?`).
    /// Unknown parameters and unknown sort keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut state = ViewState::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            let value = decode_component(value);
            match key.as_str() {
                "search" => state.criteria.search = value,
                "age" => state.criteria.age = value,
                "category" => state.criteria.category = value,
                "sort" => {
                    state.sort = SortKey::parse(&value);
                    if state.sort.is_none() && !value.is_empty() {
                        tracing::debug!("Ignoring unknown sort key '{}'", value);
                    }
                }
                _ => {}
            }
        }

        state
    }

    /// Canonical query string; empty values and the default sort are omitted.
    pub fn to_query(&self) -> String {
        let params = [
            ("search", self.criteria.search.trim()),
            ("age", self.criteria.age.trim()),
            ("category", self.criteria.category.trim()),
            ("sort", self.sort.map(|k| k.as_str()).unwrap_or("")),
        ];

        params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Same state with the category filter replaced (tag clicks).
    pub fn with_category(&self, category: &str) -> Self {
        let mut next = self.clone();
        next.criteria.category = category.to_string();
        next
    }

    pub fn is_default(&self) -> bool {
        self.criteria.is_empty() && self.sort.is_none()
    }

    /// Filter then sort `records` for this state.
    pub fn apply<'a>(&self, records: &'a [ProgramRecord]) -> Vec<&'a ProgramRecord> {
        let filtered = filter::filter(records, &self.criteria);
        match self.sort {
            Some(key) => key.sorted(&filtered),
            None => filtered,
        }
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ============================================================================
// Controller
// ============================================================================

/// A user interaction with one of the listing controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Search(String),
    Age(String),
    Category(String),
    Sort(String),
    Reset,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub query: String,
    pub grid: String,
}

pub struct CatalogController {
    state: Arc<CatalogState>,
    view: ViewState,
    options: RenderOptions,
}

impl CatalogController {
    pub fn new(state: Arc<CatalogState>, options: RenderOptions) -> Self {
        Self {
            state,
            view: ViewState::default(),
            options,
        }
    }

    /// Restore controls from the page URL's query.
    pub fn hydrate(&mut self, query: &str) {
        self.view = ViewState::from_query(query);
    }

    pub fn set_search(&mut self, term: &str) {
        self.view.criteria.search = term.to_string();
    }

    pub fn set_age(&mut self, range_spec: &str) {
        self.view.criteria.age = range_spec.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.view.criteria.category = category.to_string();
    }

    pub fn set_sort(&mut self, key: &str) {
        self.view.sort = SortKey::parse(key);
    }

    /// Clear every control.
    pub fn reset(&mut self) {
        self.view = ViewState::default();
    }

    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Search(term) => self.set_search(&term),
            ControlEvent::Age(spec) => self.set_age(&spec),
            ControlEvent::Category(category) => self.set_category(&category),
            ControlEvent::Sort(key) => self.set_sort(&key),
            ControlEvent::Reset => self.reset(),
        }
    }

    /// Records currently visible (empty when the catalog failed to load).
    pub fn visible(&self) -> Vec<&ProgramRecord> {
        match self.state.catalog() {
            Some(catalog) => self.view.apply(catalog.records()),
            None => Vec::new(),
        }
    }

    pub fn render_grid(&self) -> Result<String, RenderError> {
        let catalog_view = CatalogView::from_state(&self.state, &self.view);
        render::render_grid(&catalog_view, &self.view, &self.options)
    }

    pub fn render_page(&self) -> Result<String, RenderError> {
        render::render_listing(&self.state, &self.view, &self.options)
    }

    /// Bookmarkable URL for the current view.
    pub fn shareable_url(&self, base: &str) -> String {
        let query = self.view.to_query();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, query)
        }
    }

    /// Event loop: apply each control event and publish the re-rendered grid.
    ///
    /// Search events are expected to arrive already debounced (see
    /// `SearchDebouncer`). Ends when either channel closes.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ControlEvent>,
        rendered: mpsc::Sender<RenderedView>,
    ) -> Result<(), RenderError> {
        while let Some(event) = events.recv().await {
            self.apply(event);
            let view = RenderedView {
                query: self.view.to_query(),
                grid: self.render_grid()?,
            };
            if rendered.send(view).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogBuild};
    use crate::model::{ProgramId, RawProgramRecord};

    fn state() -> Arc<CatalogState> {
        let make = |id: i64, title: &str, ages: (u32, u32), cat: &str| {
            let raw = RawProgramRecord {
                id: Some(ProgramId::Int(id)),
                title: Some(title.to_string()),
                age_min: Some(ages.0),
                age_max: Some(ages.1),
                fund_fixed: Some(100),
                categories: vec![cat.to_string()],
                ..Default::default()
            };
            ProgramRecord::from_raw(raw, "p.html").unwrap()
        };
        let (catalog, failures) = Catalog::from_records(vec![
            make(1, "Youth Pass", (18, 25), "education"),
            make(2, "Startup Fund", (20, 35), "business"),
            make(3, "Arts Grant", (18, 35), "arts"),
        ]);
        Arc::new(CatalogState::Ready(CatalogBuild { catalog, failures }))
    }

    fn controller() -> CatalogController {
        CatalogController::new(state(), RenderOptions::server("images/default.jpg"))
    }

    fn ids(records: &[&ProgramRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_query_round_trip_and_canonical_form() {
        let view = ViewState::from_query("?category=arts&search=youth+pass&age=18-25&sort=age-desc&x=1");
        assert_eq!(view.criteria.search, "youth pass");
        assert_eq!(view.criteria.age, "18-25");
        assert_eq!(view.sort, Some(SortKey::AgeDesc));
        assert_eq!(view.to_query(), "search=youth%20pass&age=18-25&category=arts&sort=age-desc");
        assert_eq!(ViewState::from_query(&view.to_query()), view);
    }

    #[test]
    fn test_encoded_keys_are_decoded() {
        let view = ViewState::from_query("%73earch=x&c%61tegory=arts");
        assert_eq!(view.criteria.search, "x");
        assert_eq!(view.criteria.category, "arts");
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let view = ViewState::from_query("search=&age=&category=&sort=");
        assert!(view.is_default());
        assert_eq!(view.to_query(), "");
        assert_eq!(ViewState::from_query("sort=popular").sort, None);
    }

    #[test]
    fn test_greek_search_survives_url() {
        let mut c = controller();
        c.set_search("Νέων");
        let url = c.shareable_url("/programs");
        let query = url.split_once('?').unwrap().1;
        assert_eq!(ViewState::from_query(query).criteria.search, "Νέων");
    }

    #[test]
    fn test_controls_drive_visible_records() {
        let mut c = controller();
        assert_eq!(ids(&c.visible()), vec!["1", "2", "3"]);

        c.set_age("30-40");
        assert_eq!(ids(&c.visible()), vec!["2", "3"]);

        c.set_sort("title-asc");
        assert_eq!(ids(&c.visible()), vec!["3", "2"]);

        c.set_category("business");
        assert_eq!(ids(&c.visible()), vec!["2"]);
        assert_eq!(c.shareable_url("/programs"), "/programs?age=30-40&category=business&sort=title-asc");

        c.reset();
        assert_eq!(ids(&c.visible()), vec!["1", "2", "3"]);
        assert_eq!(c.shareable_url("/programs"), "/programs");
    }

    #[test]
    fn test_hydrate_from_url() {
        let mut c = controller();
        c.hydrate("category=education");
        assert_eq!(ids(&c.visible()), vec!["1"]);
        assert!(c.render_grid().unwrap().contains("Youth Pass"));
    }

    #[test]
    fn test_failed_catalog_has_no_visible_records() {
        let failed = Arc::new(CatalogState::Failed { reason: "down".into() });
        let c = CatalogController::new(failed, RenderOptions::server("images/default.jpg"));
        assert!(c.visible().is_empty());
        assert!(c.render_grid().unwrap().contains("error-message"));
    }

    #[tokio::test]
    async fn test_event_loop_renders_each_change() {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (rendered_tx, mut rendered_rx) = mpsc::channel(8);
        let task = tokio::spawn(controller().run(events_rx, rendered_tx));

        events_tx.send(ControlEvent::Category("arts".into())).await.unwrap();
        let first = rendered_rx.recv().await.unwrap();
        assert_eq!(first.query, "category=arts");
        assert!(first.grid.contains("Arts Grant"));
        assert!(!first.grid.contains("Youth Pass"));

        events_tx.send(ControlEvent::Search("nothing matches".into())).await.unwrap();
        let second = rendered_rx.recv().await.unwrap();
        assert!(second.grid.contains("no-programs"));

        events_tx.send(ControlEvent::Reset).await.unwrap();
        let third = rendered_rx.recv().await.unwrap();
        assert_eq!(third.query, "");
        assert_eq!(third.grid.matches("class=\"program-card\"").count(), 3);

        drop(events_tx);
        task.await.unwrap().unwrap();
    }
}
