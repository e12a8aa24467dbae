//! Program Document Loader
//!
//! Fetches one program document, extracts its single embedded
//! `program-data` JSON block, validates it into a `ProgramRecord` and
//! resolves the record's image against the site.

use scraper::{Html, Selector};

use crate::error::LoadError;
use crate::fetch::SharedFetcher;
use crate::model::{ProgramRecord, RawProgramRecord};

/// Element id that marks the embedded record.
pub const PROGRAM_DATA_ID: &str = "program-data";

/// Script content types accepted as structured data.
const DATA_CONTENT_TYPES: &[&str] = &["application/json", "application/ld+json"];

/// Where bare image file names live, and what to show when they don't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePaths {
    pub base: String,
    pub default_image: String,
}

impl Default for ImagePaths {
    fn default() -> Self {
        Self {
            base: "images/programmata/".to_string(),
            default_image: "images/programmata/default-program.jpg".to_string(),
        }
    }
}

pub struct DocumentLoader {
    fetcher: SharedFetcher,
    images: ImagePaths,
}

impl DocumentLoader {
    pub fn new(fetcher: SharedFetcher, images: ImagePaths) -> Self {
        Self { fetcher, images }
    }

    /// Load and validate the record behind `source_id`.
    pub async fn load(&self, source_id: &str) -> Result<ProgramRecord, LoadError> {
        let html = self
            .fetcher
            .fetch_text(source_id)
            .await
            .map_err(|e| LoadError::fetch(source_id, &e))?;

        let block = extract_program_block(&html)
            .map_err(|reason| LoadError::malformed(source_id, reason))?;
        let mut record = decode_program(&block, source_id)?;

        record.image = self.resolve_image_path(&record.image).await;
        tracing::debug!("Loaded program {} ({}) from {}", record.id, record.title, source_id);
        Ok(record)
    }

    /// Resolve a record's image to a displayable path.
    ///
    /// Paths and URLs are kept verbatim; bare file names are looked up under
    /// the image base and replaced with the default asset when missing.
    pub async fn resolve_image_path(&self, image: &str) -> String {
        let image = image.trim();
        if image.is_empty() {
            return self.images.default_image.clone();
        }
        if image.contains('/') || image.starts_with("http") {
            return image.to_string();
        }

        let candidate = format!("{}{}", self.images.base, image);
        if self.fetcher.exists(&candidate).await {
            candidate
        } else {
            tracing::debug!("Image {} not found, using default", candidate);
            self.images.default_image.clone()
        }
    }
}

/// Extract the text of the single embedded program-data block.
///
/// A block is a `<script>` whose id is `program-data` or whose type is a
/// JSON content type. Zero or several blocks is an error.
pub fn extract_program_block(html: &str) -> Result<String, String> {
    let selector = Selector::parse("script").map_err(|e| format!("invalid selector: {}", e))?;
    let document = Html::parse_document(html);

    let blocks: Vec<String> = document
        .select(&selector)
        .filter(|script| {
            let el = script.value();
            el.attr("id") == Some(PROGRAM_DATA_ID)
                || el
                    .attr("type")
                    .map(|t| DATA_CONTENT_TYPES.contains(&t.trim().to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .map(|script| script.text().collect::<String>())
        .collect();

    match blocks.len() {
        0 => Err("no program-data block found".to_string()),
        1 => Ok(blocks.into_iter().next().unwrap_or_default()),
        n => Err(format!("expected one program-data block, found {}", n)),
    }
}

/// Decode a program-data block into a validated record.
pub fn decode_program(block: &str, source_id: &str) -> Result<ProgramRecord, LoadError> {
    let raw: RawProgramRecord = serde_json::from_str(block.trim())
        .map_err(|e| LoadError::malformed(source_id, format!("invalid JSON: {}", e)))?;
    ProgramRecord::from_raw(raw, source_id)
}
