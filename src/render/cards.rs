// Listing grid and listing page rendering

use askama::Template;

use crate::catalog::CatalogState;
use crate::categories::category_display_name;
use crate::controller::ViewState;
use crate::error::RenderError;
use crate::filter::SortKey;
use crate::model::ProgramRecord;
use crate::render::{RenderOptions, SelectOption, AGE_BRACKETS, SEARCH_DEBOUNCE_MS};

/// What the listing container shows.
#[derive(Debug, Clone)]
pub enum CatalogView<'a> {
    Cards(Vec<&'a ProgramRecord>),
    /// Empty catalog or empty filtered subset.
    NoResults,
    /// The catalog could not be built at all.
    LoadFailed { reason: String },
}

impl<'a> CatalogView<'a> {
    pub fn from_records(records: Vec<&'a ProgramRecord>) -> Self {
        if records.is_empty() {
            CatalogView::NoResults
        } else {
            CatalogView::Cards(records)
        }
    }

    /// Filter and sort the catalog for the current view state.
    pub fn from_state(state: &'a CatalogState, view: &ViewState) -> Self {
        match state {
            CatalogState::Failed { reason } => CatalogView::LoadFailed {
                reason: reason.clone(),
            },
            CatalogState::Ready(build) => Self::from_records(view.apply(build.catalog.records())),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CatalogView::Cards(records) => records.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// View models
// ============================================================================

#[derive(Debug, Clone)]
struct TagLink {
    slug: String,
    name: String,
    href: String,
}

#[derive(Debug, Clone)]
struct ProgramCard {
    id: String,
    title: String,
    description: String,
    age_text: String,
    funding_text: String,
    image: String,
    default_image: String,
    detail_href: String,
    tags: Vec<TagLink>,
}

impl ProgramCard {
    fn build(record: &ProgramRecord, view: &ViewState, options: &RenderOptions) -> Self {
        let id = record.id.to_string();
        let tags = record
            .categories
            .iter()
            .map(|slug| TagLink {
                slug: slug.clone(),
                name: category_display_name(slug).to_string(),
                href: options.listing_with_query(&view.with_category(slug).to_query()),
            })
            .collect();

        Self {
            detail_href: options.detail_href(&id),
            id,
            title: record.title.clone(),
            description: record.description.clone(),
            age_text: record.age_text(),
            funding_text: record.funding.display_text(),
            image: options.asset_href(&record.image),
            default_image: options.asset_href(&options.default_image),
            tags,
        }
    }
}

#[derive(Template)]
#[template(path = "partials/program_grid.html")]
struct ProgramGridTemplate {
    cards: Vec<ProgramCard>,
    show_empty: bool,
    show_error: bool,
    error_reason: String,
    retry_href: String,
}

#[derive(Template)]
#[template(path = "pages/programs.html")]
struct ProgramsPageTemplate {
    page_title: String,
    stylesheet: String,
    listing_href: String,
    share_href: String,
    search: String,
    age_options: Vec<SelectOption>,
    category_options: Vec<SelectOption>,
    sort_options: Vec<SelectOption>,
    result_count: usize,
    grid: String,
    debounce_ms: u64,
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the listing container's content: one card per record, the
/// no-results notice, or the retryable error panel.
pub fn render_grid(
    catalog_view: &CatalogView<'_>,
    view: &ViewState,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let mut template = ProgramGridTemplate {
        cards: Vec::new(),
        show_empty: false,
        show_error: false,
        error_reason: String::new(),
        retry_href: options.listing_with_query(&view.to_query()),
    };

    match catalog_view {
        CatalogView::Cards(records) => {
            template.cards = records
                .iter()
                .map(|r| ProgramCard::build(r, view, options))
                .collect();
        }
        CatalogView::NoResults => template.show_empty = true,
        CatalogView::LoadFailed { reason } => {
            template.show_error = true;
            template.error_reason = reason.clone();
        }
    }

    Ok(template.render()?)
}

/// Render the full listing page with controls hydrated from `view`.
pub fn render_listing(
    state: &CatalogState,
    view: &ViewState,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let catalog_view = CatalogView::from_state(state, view);
    let grid = render_grid(&catalog_view, view, options)?;

    let age_options = std::iter::once(SelectOption::new("", "Όλες οι ηλικίες", &view.criteria.age))
        .chain(
            AGE_BRACKETS
                .iter()
                .map(|b| SelectOption::new(b, b, &view.criteria.age)),
        )
        .collect();

    let categories = state.catalog().map(|c| c.categories()).unwrap_or_default();
    let category_options = std::iter::once(SelectOption::new(
        "",
        "Όλες οι κατηγορίες",
        &view.criteria.category,
    ))
    .chain(
        categories
            .iter()
            .map(|slug| SelectOption::new(slug, category_display_name(slug), &view.criteria.category)),
    )
    .collect();

    let current_sort = view.sort.map(|k| k.as_str()).unwrap_or("");
    let sort_options = std::iter::once(SelectOption::new("", "Προεπιλογή", current_sort))
        .chain(
            SortKey::ALL
                .iter()
                .map(|k| SelectOption::new(k.as_str(), k.label(), current_sort)),
        )
        .collect();

    let template = ProgramsPageTemplate {
        page_title: "Προγράμματα".to_string(),
        stylesheet: options.stylesheet(),
        listing_href: options.listing_href.clone(),
        share_href: options.listing_with_query(&view.to_query()),
        search: view.criteria.search.clone(),
        age_options,
        category_options,
        sort_options,
        result_count: catalog_view.len(),
        grid,
        debounce_ms: SEARCH_DEBOUNCE_MS,
    };

    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogBuild};
    use crate::model::{ProgramId, RawProgramRecord};

    fn record(id: i64, title: &str, categories: &[&str]) -> ProgramRecord {
        let raw = RawProgramRecord {
            id: Some(ProgramId::Int(id)),
            title: Some(title.to_string()),
            description: Some("<b>desc</b>".to_string()),
            age_min: Some(18),
            age_max: Some(25),
            fund_fixed: Some(200),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            image: Some("images/programmata/a.jpg".to_string()),
            ..Default::default()
        };
        ProgramRecord::from_raw(raw, "p.html").unwrap()
    }

    fn ready(records: Vec<ProgramRecord>) -> CatalogState {
        let (catalog, failures) = Catalog::from_records(records);
        CatalogState::Ready(CatalogBuild { catalog, failures })
    }

    fn options() -> RenderOptions {
        RenderOptions::static_site("images/programmata/default-program.jpg")
    }

    #[test]
    fn test_cards_render_fields() {
        let r = record(1, "Youth Pass", &["education"]);
        let view = ViewState::default();
        let html = render_grid(&CatalogView::from_records(vec![&r]), &view, &options()).unwrap();

        assert_eq!(html.matches("class=\"program-card\"").count(), 1);
        assert!(html.contains("Youth Pass"));
        assert!(html.contains("Ηλικία: 18-25"));
        assert!(html.contains("Χρηματοδότηση: 200€"));
        assert!(html.contains("Εκπαίδευση"));
        assert!(html.contains("href=\"programs.html?category=education\""));
        assert!(html.contains("href=\"program-details.html?id=1\""));
        assert!(html.contains("images/programmata/default-program.jpg"));
        assert!(html.contains("&lt;b&gt;desc&lt;/b&gt;"), "descriptions are escaped");
    }

    #[test]
    fn test_empty_and_error_states() {
        let view = ViewState::default();

        let html = render_grid(&CatalogView::NoResults, &view, &options()).unwrap();
        assert!(html.contains("no-programs"));
        assert!(!html.contains("error-message"));

        let failed = CatalogView::LoadFailed { reason: "listing down".into() };
        let html = render_grid(&failed, &view, &options()).unwrap();
        assert!(html.contains("error-message"));
        assert!(html.contains("listing down"));
        assert!(!html.contains("no-programs"));
    }

    #[test]
    fn test_tag_links_keep_other_filters() {
        let r = record(1, "Youth Pass", &["education"]);
        let view = ViewState::from_query("search=pass&sort=age-asc");
        let html = render_grid(&CatalogView::from_records(vec![&r]), &view, &options()).unwrap();
        assert!(html.contains("programs.html?search=pass&amp;category=education&amp;sort=age-asc"));
    }

    #[test]
    fn test_listing_hydrates_controls() {
        let state = ready(vec![
            record(1, "Youth Pass", &["education"]),
            record(2, "Startup Fund", &["business"]),
        ]);
        let view = ViewState::from_query("search=fund&category=business&age=18-25&sort=title-desc");
        let html = render_listing(&state, &view, &options()).unwrap();

        assert!(html.contains("value=\"fund\""));
        assert!(html.contains("<option value=\"business\" selected>Επιχειρηματικότητα</option>"));
        assert!(html.contains("<option value=\"18-25\" selected>18-25</option>"));
        assert!(html.contains("<option value=\"title-desc\" selected>"));
        assert!(html.contains("1 προγράμματα"));
        assert!(html.contains("Startup Fund"));
        assert!(!html.contains("Youth Pass"));
    }

    #[test]
    fn test_failed_state_renders_error_page() {
        let state = CatalogState::Failed { reason: "no strategy".into() };
        let html = render_listing(&state, &ViewState::default(), &options()).unwrap();
        assert!(html.contains("error-message"));
        assert!(html.contains("0 προγράμματα"));
    }
}
