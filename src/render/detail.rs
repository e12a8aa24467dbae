// Program detail page rendering

use askama::Template;

use crate::categories::joined_display_names;
use crate::error::RenderError;
use crate::model::{ContentSection, ProgramRecord};
use crate::render::RenderOptions;

#[derive(Template)]
#[template(path = "pages/program_detail.html")]
struct ProgramDetailTemplate<'a> {
    page_title: &'a str,
    stylesheet: String,
    back_href: &'a str,
    age_text: String,
    funding_text: String,
    category_names: String,
    image: String,
    default_image: String,
    sections: Vec<ContentSection>,
    has_apply_link: bool,
    apply_link: &'a str,
}

/// Render the detail page for one program.
///
/// Section bodies are trusted rich text from the program document and are
/// inserted without escaping; everything else is escaped.
pub fn render_detail(record: &ProgramRecord, options: &RenderOptions) -> Result<String, RenderError> {
    let template = ProgramDetailTemplate {
        page_title: &record.title,
        stylesheet: options.stylesheet(),
        back_href: &options.listing_href,
        age_text: record.age_text(),
        funding_text: record.funding.display_text(),
        category_names: joined_display_names(&record.categories),
        image: options.asset_href(&record.image),
        default_image: options.asset_href(&options.default_image),
        sections: record.sections.clone(),
        has_apply_link: record.apply_link.is_some(),
        apply_link: record.apply_link.as_deref().unwrap_or(""),
    };

    Ok(template.render()?)
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
struct NotFoundTemplate<'a> {
    page_title: &'a str,
    stylesheet: String,
    back_href: &'a str,
    missing_id: &'a str,
}

/// Page shown for an unknown program id.
pub fn render_not_found(id: &str, options: &RenderOptions) -> Result<String, RenderError> {
    let template = NotFoundTemplate {
        page_title: "Το πρόγραμμα δεν βρέθηκε",
        stylesheet: options.stylesheet(),
        back_href: &options.listing_href,
        missing_id: id,
    };
    Ok(template.render()?)
}
