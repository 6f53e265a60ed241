//! Quote repository contract and shared error taxonomy.
//!
//! # Responsibility
//! - Define the operation set every storage backend implements.
//! - Define semantic errors (`NotFound`, `Malformed`, transient I/O) shared by
//!   all backends, so callers never depend on a concrete store.
//! - Own page-window rules used by both backends.
//!
//! # Invariants
//! - Listing pages are 1-based; page `p` returns at most `PAGE_SIZE * p`
//!   records in descending identifier order, without an offset.
//! - Faults are never swallowed: every failed operation returns `Err`.

use crate::codec::record::CodecError;
use crate::db::DbError;
use crate::model::quote::{NewQuote, PagedQuotes, Quote, QuoteId, SearchType};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Records per listing page.
pub const PAGE_SIZE: u32 = 20;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for quote persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Delete/update target does not exist.
    NotFound(QuoteId),
    /// Storage medium fault; the operation had no durable effect.
    Io { path: PathBuf, source: io::Error },
    /// The record was written but the next-id counter was not persisted.
    CounterNotPersisted {
        id: QuoteId,
        path: PathBuf,
        source: io::Error,
    },
    /// A record document already occupies the identifier `create` assigned.
    IdTaken { id: QuoteId, path: PathBuf },
    /// The next identifier would overflow `QuoteId`.
    IdsExhausted(QuoteId),
    /// Stored record text does not match the record codec shape.
    Malformed {
        path: Option<PathBuf>,
        source: CodecError,
    },
    /// Listing pages start at 1.
    InvalidPage(u32),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether the fault comes from the storage medium and a retry
    /// may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io { .. } | Self::CounterNotPersisted { .. } => true,
            Self::Db(err) => err.is_transient(),
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "quote not found: {id}"),
            Self::Io { path, source } => write!(f, "i/o failure at `{}`: {source}", path.display()),
            Self::CounterNotPersisted { id, path, source } => write!(
                f,
                "quote {id} was stored but next id could not be written to `{}`: {source}",
                path.display()
            ),
            Self::IdTaken { id, path } => write!(
                f,
                "quote id {id} is already stored at `{}`; refusing to overwrite",
                path.display()
            ),
            Self::IdsExhausted(id) => write!(f, "quote id space exhausted after {id}"),
            Self::Malformed {
                path: Some(path),
                source,
            } => write!(f, "malformed quote record `{}`: {source}", path.display()),
            Self::Malformed { path: None, source } => write!(f, "malformed quote record: {source}"),
            Self::InvalidPage(page) => write!(f, "invalid page {page}; pages start at 1"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "quote repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "quote repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "quote repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted quote data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::CounterNotPersisted { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::IdTaken { .. }
            | Self::IdsExhausted(_)
            | Self::InvalidPage(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Malformed {
            path: None,
            source: value,
        }
    }
}

/// Repository interface for quote storage backends.
///
/// Mutating operations take `&mut self`; a store's durable bookkeeping (such
/// as the file-backed next-id counter) is only touched under an exclusive
/// borrow.
pub trait QuoteRepository {
    /// Assigns the next identifier, persists the quote and returns it.
    fn create(&mut self, quote: &NewQuote) -> RepoResult<Quote>;
    /// Returns every stored quote in ascending identifier order.
    fn find_all(&self) -> RepoResult<Vec<Quote>>;
    /// Looks up one quote; absence is `Ok(None)`.
    fn find(&self, id: QuoteId) -> RepoResult<Option<Quote>>;
    /// Removes one quote, failing with `NotFound` when absent.
    fn delete(&mut self, id: QuoteId) -> RepoResult<()>;
    /// Replaces content and author, failing with `NotFound` when absent.
    fn update(&mut self, id: QuoteId, content: &str, author: &str) -> RepoResult<()>;
    /// Writes the consolidated document and returns its path.
    fn build(&self) -> RepoResult<PathBuf>;
    /// Returns the `PAGE_SIZE * page` most recent quotes.
    fn find_paged(&self, page: u32) -> RepoResult<PagedQuotes>;
    /// Same window as `find_paged`, restricted to quotes whose `kind` field
    /// contains `keyword`.
    fn search(&self, kind: SearchType, keyword: &str, page: u32) -> RepoResult<PagedQuotes>;
}

impl<R: QuoteRepository + ?Sized> QuoteRepository for Box<R> {
    fn create(&mut self, quote: &NewQuote) -> RepoResult<Quote> {
        (**self).create(quote)
    }

    fn find_all(&self) -> RepoResult<Vec<Quote>> {
        (**self).find_all()
    }

    fn find(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        (**self).find(id)
    }

    fn delete(&mut self, id: QuoteId) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn update(&mut self, id: QuoteId, content: &str, author: &str) -> RepoResult<()> {
        (**self).update(id, content, author)
    }

    fn build(&self) -> RepoResult<PathBuf> {
        (**self).build()
    }

    fn find_paged(&self, page: u32) -> RepoResult<PagedQuotes> {
        (**self).find_paged(page)
    }

    fn search(&self, kind: SearchType, keyword: &str, page: u32) -> RepoResult<PagedQuotes> {
        (**self).search(kind, keyword, page)
    }
}

/// Maximum number of records returned for `page`.
pub fn page_limit(page: u32) -> RepoResult<u32> {
    if page == 0 {
        return Err(RepoError::InvalidPage(page));
    }
    Ok(PAGE_SIZE.saturating_mul(page))
}

/// Builds a page from already-filtered quotes in any order.
pub(crate) fn paginate(mut matching: Vec<Quote>, page: u32) -> RepoResult<PagedQuotes> {
    let limit = page_limit(page)?;
    let max_page = matching.len() as u64;

    matching.sort_by(|left, right| right.id.cmp(&left.id));
    matching.truncate(limit as usize);

    Ok(PagedQuotes {
        max_page,
        current_page: page,
        quotes: matching,
    })
}
