//! Filter/Sort Engine
//!
//! Pure functions over catalog records. Nothing here mutates its input:
//! filtering returns borrowed subsets, sorting returns a new ordering.

use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::model::ProgramRecord;

// ============================================================================
// Criteria
// ============================================================================

/// Inclusive age interval from a `"min-max"` spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    /// Parse `"min-max"`. Blank or malformed specs give `None`.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        let parsed = spec.split_once('-').and_then(|(lo, hi)| {
            let min = lo.trim().parse::<u32>().ok()?;
            let max = hi.trim().parse::<u32>().ok()?;
            (min <= max).then_some(AgeRange { min, max })
        });
        if parsed.is_none() {
            tracing::debug!("Ignoring malformed age range '{}'", spec);
        }
        parsed
    }

    /// Interval overlap with a record's eligible ages.
    pub fn overlaps(&self, record: &ProgramRecord) -> bool {
        record.age_min <= self.max && record.age_max >= self.min
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// User-supplied filter values, as they appear in the controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub age: String,
    pub category: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.age.trim().is_empty() && self.category.trim().is_empty()
    }
}

// ============================================================================
// Matchers
// ============================================================================

/// Case-insensitive substring match on title, description and tags.
pub fn matches_search(record: &ProgramRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    record.title.to_lowercase().contains(&term)
        || record.description.to_lowercase().contains(&term)
        || record.tags.iter().any(|t| t.to_lowercase().contains(&term))
}

/// Overlap test against a `"min-max"` spec; absent or malformed specs match.
pub fn matches_age_range(record: &ProgramRecord, range_spec: &str) -> bool {
    AgeRange::parse(range_spec).map_or(true, |range| range.overlaps(record))
}

/// Membership in the record's categories; an empty category matches.
pub fn matches_category(record: &ProgramRecord, category: &str) -> bool {
    let category = category.trim();
    category.is_empty() || record.categories.iter().any(|c| c == category)
}

/// Records matching all criteria, in input order.
pub fn filter<'a>(records: &'a [ProgramRecord], criteria: &FilterCriteria) -> Vec<&'a ProgramRecord> {
    let age = AgeRange::parse(&criteria.age);
    records
        .iter()
        .filter(|r| matches_search(r, &criteria.search))
        .filter(|r| age.map_or(true, |range| range.overlaps(r)))
        .filter(|r| matches_category(r, &criteria.category))
        .collect()
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TitleAsc,
    TitleDesc,
    AgeAsc,
    AgeDesc,
    FundingAsc,
    FundingDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::AgeAsc,
        SortKey::AgeDesc,
        SortKey::FundingAsc,
        SortKey::FundingDesc,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "title-asc" => Some(SortKey::TitleAsc),
            "title-desc" => Some(SortKey::TitleDesc),
            "age-asc" => Some(SortKey::AgeAsc),
            "age-desc" => Some(SortKey::AgeDesc),
            "funding-asc" => Some(SortKey::FundingAsc),
            "funding-desc" => Some(SortKey::FundingDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::AgeAsc => "age-asc",
            SortKey::AgeDesc => "age-desc",
            SortKey::FundingAsc => "funding-asc",
            SortKey::FundingDesc => "funding-desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::TitleAsc => "Τίτλος (Α-Ω)",
            SortKey::TitleDesc => "Τίτλος (Ω-Α)",
            SortKey::AgeAsc => "Ηλικία (αύξουσα)",
            SortKey::AgeDesc => "Ηλικία (φθίνουσα)",
            SortKey::FundingAsc => "Χρηματοδότηση (αύξουσα)",
            SortKey::FundingDesc => "Χρηματοδότηση (φθίνουσα)",
        }
    }

    fn compare(&self, a: &ProgramRecord, b: &ProgramRecord) -> Ordering {
        match self {
            SortKey::TitleAsc => compare_titles(&a.title, &b.title),
            SortKey::TitleDesc => compare_titles(&b.title, &a.title),
            SortKey::AgeAsc => a.age_min.cmp(&b.age_min),
            SortKey::AgeDesc => b.age_min.cmp(&a.age_min),
            // Fixed and ranged funding both order by their effective minimum
            SortKey::FundingAsc => a.funding.effective_min().cmp(&b.funding.effective_min()),
            SortKey::FundingDesc => b.funding.effective_min().cmp(&a.funding.effective_min()),
        }
    }

    /// Stable sort into a new vector.
    pub fn sorted<'a>(&self, records: &[&'a ProgramRecord]) -> Vec<&'a ProgramRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary collation key: accents stripped (NFD minus combining marks),
/// then lowercased. "Έρευνα" keys as "ερευνα".
fn title_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Accent- and case-insensitive title order. Ties fall back to the
/// lowercased then raw title, so distinct titles never compare equal.
fn compare_titles(a: &str, b: &str) -> Ordering {
    title_key(a)
        .cmp(&title_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Sort by a key name; unknown keys keep the input order.
pub fn sort_by<'a>(records: &[&'a ProgramRecord], key: &str) -> Vec<&'a ProgramRecord> {
    match SortKey::parse(key) {
        Some(key) => key.sorted(records),
        None => records.to_vec(),
    }
}
