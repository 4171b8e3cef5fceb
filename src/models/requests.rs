//! Request DTOs for the BFF API
//!
//! Query strings and bodies as the frontend sends them. Numeric fields are
//! kept as raw strings so that unparsable values fall back to defaults
//! instead of failing extraction.

use serde::Deserialize;

use crate::booking::BookingStatus;

/// Categories the upstream accepts for headlines and sources.
pub const CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// Accepted `sortBy` values for search.
pub const SORT_OPTIONS: [&str; 3] = ["relevancy", "popularity", "publishedAt"];

/// Shortest search query accepted, after trimming.
pub const MIN_QUERY_LEN: usize = 2;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_SORT: &str = "publishedAt";

fn validate_category(category: Option<&str>) -> Option<String> {
    let category = category?.trim();
    if CATEGORIES.contains(&category.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(format!(
            "Invalid category '{}'. Valid categories: {}",
            category,
            CATEGORIES.join(", ")
        ))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Trimmed, lowercased code such as a country or language, or `default`.
fn code_or(value: &Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or(default).to_ascii_lowercase()
}

// == Headlines ==
/// Query for `GET /news/headlines`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesQuery {
    pub category: Option<String>,
    pub country: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl HeadlinesQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_category(non_blank(&self.category))
    }

    pub fn category(&self) -> String {
        code_or(&self.category, DEFAULT_CATEGORY)
    }

    pub fn country(&self) -> String {
        code_or(&self.country, DEFAULT_COUNTRY)
    }
}

// == Search ==
/// Query for `GET /news/search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub language: Option<String>,
}

impl SearchQuery {
    pub fn validate(&self) -> Option<String> {
        let query_len = self.q.as_deref().map(|q| q.trim().chars().count()).unwrap_or(0);
        if query_len < MIN_QUERY_LEN {
            return Some(format!(
                "Search query must be at least {} characters",
                MIN_QUERY_LEN
            ));
        }

        if let Some(sort_by) = non_blank(&self.sort_by) {
            if !SORT_OPTIONS.contains(&sort_by) {
                return Some(format!(
                    "Invalid sortBy '{}'. Valid options: {}",
                    sort_by,
                    SORT_OPTIONS.join(", ")
                ));
            }
        }
        None
    }

    /// Trimmed query text. Call after `validate`.
    pub fn query(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn sort_by(&self) -> &str {
        non_blank(&self.sort_by).unwrap_or(DEFAULT_SORT)
    }

    pub fn language(&self) -> String {
        code_or(&self.language, DEFAULT_LANGUAGE)
    }
}

// == Sources ==
/// Query for `GET /news/sources`; every filter is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesQuery {
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

impl SourcesQuery {
    pub fn validate(&self) -> Option<String> {
        validate_category(non_blank(&self.category))
    }

    pub fn category(&self) -> String {
        code_or(&self.category, "")
    }

    pub fn language(&self) -> String {
        code_or(&self.language, "")
    }

    pub fn country(&self) -> String {
        code_or(&self.country, "")
    }
}

// == Bookings ==
/// Query for `GET /consultations`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<String>,
}

impl ListBookingsQuery {
    /// Parsed status filter. `Ok(None)` when no filter was given.
    pub fn status(&self) -> Result<Option<BookingStatus>, String> {
        match non_blank(&self.status) {
            None => Ok(None),
            Some(raw) => BookingStatus::parse(raw).map(Some).ok_or_else(|| invalid_status(raw)),
        }
    }
}

/// Body for `PATCH /consultations/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl StatusUpdateRequest {
    pub fn status(&self) -> Result<BookingStatus, String> {
        BookingStatus::parse(&self.status).ok_or_else(|| invalid_status(&self.status))
    }
}

fn invalid_status(raw: &str) -> String {
    let valid: Vec<&str> = BookingStatus::ALL.iter().map(BookingStatus::as_str).collect();
    format!("Invalid status '{}'. Valid statuses: {}", raw, valid.join(", "))
}
