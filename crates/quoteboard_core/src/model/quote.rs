//! Quote domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by file-backed and SQLite stores.
//! - Define paged listing and search selector shapes returned by repositories.
//!
//! # Invariants
//! - `id` is assigned once by a repository and never reused after deletion.
//! - `content` and `author` may be empty but are always present.
//! - `SearchType` is a closed set; each variant maps to one fixed column label.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier assigned by a repository on create.
pub type QuoteId = i64;

/// Persisted quote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Repository-assigned identifier, monotonic per store.
    pub id: QuoteId,
    /// Quote body.
    pub content: String,
    /// Author attribution.
    pub author: String,
}

impl Quote {
    pub fn new(id: QuoteId, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            author: author.into(),
        }
    }
}

/// Create input: a quote before the repository assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub content: String,
    pub author: String,
}

impl NewQuote {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }

    /// Binds this input to a repository-assigned identifier.
    pub fn with_id(&self, id: QuoteId) -> Quote {
        Quote::new(id, self.content.clone(), self.author.clone())
    }
}

/// One page-limited listing result.
///
/// `quotes` is ordered by identifier descending (most recent first) and holds
/// up to `PAGE_SIZE * current_page` records; every page is a prefix of the
/// next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedQuotes {
    /// Number of records matching the listing or search filter.
    ///
    /// Consumers have always received the matching row count under this name,
    /// not a count of pages.
    pub max_page: u64,
    /// 1-based page requested by the caller.
    pub current_page: u32,
    pub quotes: Vec<Quote>,
}

/// Field selector for keyword search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Match against `author`.
    Author,
    /// Match against `content`.
    Content,
}

impl SearchType {
    /// Storage column / record field label for this selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Content => "content",
        }
    }

    /// Returns whether `quote`'s selected field contains `keyword`.
    ///
    /// Case-sensitive plain substring match; an empty keyword matches all.
    pub fn matches(self, quote: &Quote, keyword: &str) -> bool {
        match self {
            Self::Author => quote.author.contains(keyword),
            Self::Content => quote.content.contains(keyword),
        }
    }
}

/// Rejected `SearchType` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSearchType(pub String);

impl Display for UnknownSearchType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown search type `{}`; expected author|content",
            self.0
        )
    }
}

impl Error for UnknownSearchType {}

impl FromStr for SearchType {
    type Err = UnknownSearchType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "author" => Ok(Self::Author),
            "content" => Ok(Self::Content),
            _ => Err(UnknownSearchType(value.to_string())),
        }
    }
}
