//! Program Record Model
//!
//! Two shapes live here:
//! - `RawProgramRecord`: the JSON transport embedded in program documents
//!   (camelCase keys, almost everything optional)
//! - `ProgramRecord`: the validated, immutable record used by the filter,
//!   sort and render stages
//!
//! `ProgramRecord::from_raw` is the only way from one to the other.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LoadError;

/// Defaults applied when a document omits its age bounds.
pub const DEFAULT_AGE_MIN: u32 = 0;
pub const DEFAULT_AGE_MAX: u32 = 99;

// ============================================================================
// Identifiers and funding
// ============================================================================

/// Stable program identifier (documents use both numbers and slugs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramId::Int(n) => write!(f, "{}", n),
            ProgramId::Text(s) => f.write_str(s),
        }
    }
}

/// Funding offered by a program: a single amount or a min/max range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Funding {
    Fixed { amount: u64 },
    Range { min: u64, max: u64 },
}

impl Funding {
    /// Amount used for ordering: the fixed amount, or the bottom of the range.
    pub fn effective_min(&self) -> u64 {
        match *self {
            Funding::Fixed { amount } => amount,
            Funding::Range { min, .. } => min,
        }
    }

    /// Display text, e.g. `Χρηματοδότηση: 200€` or `Χρηματοδότηση: 5000€ - 20000€`.
    pub fn display_text(&self) -> String {
        match *self {
            Funding::Fixed { amount } => format!("Χρηματοδότηση: {}€", amount),
            Funding::Range { min, max } => format!("Χρηματοδότηση: {}€ - {}€", min, max),
        }
    }
}

/// One titled block of rich text on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Transport shape
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgramRecord {
    pub id: Option<ProgramId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub fund_fixed: Option<u64>,
    pub fund_min: Option<u64>,
    pub fund_max: Option<u64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub content: Option<RawContent>,
    pub details: Option<RawDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContent {
    #[serde(default)]
    pub sections: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetails {
    pub link: Option<String>,
}

// ============================================================================
// Validated record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRecord {
    pub id: ProgramId,
    pub title: String,
    pub description: String,
    pub age_min: u32,
    pub age_max: u32,
    pub funding: Funding,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Image path as resolved by the loader (empty until resolved).
    pub image: String,
    pub sections: Vec<ContentSection>,
    pub apply_link: Option<String>,
    /// Source document this record was decoded from.
    pub source_id: String,
}

impl ProgramRecord {
    /// Validate a transport record.
    ///
    /// Fails with `MalformedRecord` when the title or id is missing, the age
    /// interval is inverted, or the funding fields are not exactly one of
    /// `fundFixed` / `{fundMin, fundMax}`.
    pub fn from_raw(raw: RawProgramRecord, source_id: &str) -> Result<Self, LoadError> {
        let title = match raw.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(LoadError::malformed(source_id, "missing title")),
        };

        let id = raw
            .id
            .ok_or_else(|| LoadError::malformed(source_id, "missing id"))?;

        let age_min = raw.age_min.unwrap_or(DEFAULT_AGE_MIN);
        let age_max = raw.age_max.unwrap_or(DEFAULT_AGE_MAX);
        if age_min > age_max {
            return Err(LoadError::malformed(
                source_id,
                format!("ageMin {} exceeds ageMax {}", age_min, age_max),
            ));
        }

        let funding = decode_funding(raw.fund_fixed, raw.fund_min, raw.fund_max)
            .map_err(|reason| LoadError::malformed(source_id, reason))?;

        Ok(ProgramRecord {
            id,
            title,
            description: raw.description.unwrap_or_default(),
            age_min,
            age_max,
            funding,
            categories: raw.categories,
            tags: raw.tags,
            image: raw.image.unwrap_or_default(),
            sections: raw.content.map(|c| c.sections).unwrap_or_default(),
            apply_link: raw
                .details
                .and_then(|d| d.link)
                .filter(|link| !link.trim().is_empty()),
            source_id: source_id.to_string(),
        })
    }

    /// Age interval as shown on cards ("18-25").
    pub fn age_text(&self) -> String {
        format!("{}-{}", self.age_min, self.age_max)
    }
}

fn decode_funding(
    fixed: Option<u64>,
    min: Option<u64>,
    max: Option<u64>,
) -> Result<Funding, String> {
    match (fixed, min, max) {
        (Some(amount), None, None) => Ok(Funding::Fixed { amount }),
        (None, Some(min), Some(max)) if min <= max => Ok(Funding::Range { min, max }),
        (None, Some(min), Some(max)) => Err(format!("fundMin {} exceeds fundMax {}", min, max)),
        (Some(_), _, _) => Err("fundFixed combined with fundMin/fundMax".to_string()),
        (None, None, None) => Err("missing funding".to_string()),
        (None, _, _) => Err("incomplete funding range".to_string()),
    }
}
