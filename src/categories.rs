//! Category Lookup Table
//!
//! Maps category slugs used in program documents to the display names shown
//! on cards, filters and detail pages. Unknown slugs render as-is.

/// A single category slug with its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryName {
    pub slug: &'static str,
    pub name: &'static str,
}

// ============================================================================
// EMBEDDED CATEGORY TABLE
// ============================================================================

pub static CATEGORY_NAMES: &[CategoryName] = &[
    CategoryName { slug: "education", name: "Εκπαίδευση" },
    CategoryName { slug: "business", name: "Επιχειρηματικότητα" },
    CategoryName { slug: "employment", name: "Εργασία" },
    CategoryName { slug: "research", name: "Έρευνα" },
    CategoryName { slug: "arts", name: "Τέχνες" },
    CategoryName { slug: "university", name: "Πανεπιστήμιο" },
    CategoryName { slug: "startup", name: "Startup" },
    CategoryName { slug: "training", name: "Κατάρτιση" },
    CategoryName { slug: "culture", name: "Πολιτισμός" },
    CategoryName { slug: "science", name: "Επιστήμη" },
    CategoryName { slug: "technology", name: "Τεχνολογία" },
    CategoryName { slug: "innovation", name: "Καινοτομία" },
    CategoryName { slug: "housing", name: "Στέγαση" },
];

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Display name for a category slug.
///
/// # Examples
/// ```
/// use programmata::categories::category_display_name;
///
/// assert_eq!(category_display_name("education"), "Εκπαίδευση");
/// assert_eq!(category_display_name("sports"), "sports");
/// ```
pub fn category_display_name(slug: &str) -> &str {
    CATEGORY_NAMES
        .iter()
        .find(|c| c.slug == slug)
        .map(|c| c.name)
        .unwrap_or(slug)
}

/// Comma-joined display names, as on the detail page meta line.
pub fn joined_display_names(slugs: &[String]) -> String {
    slugs
        .iter()
        .map(|s| category_display_name(s))
        .collect::<Vec<_>>()
        .join(", ")
}
