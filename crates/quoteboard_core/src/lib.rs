//! Core persistence logic for the quote board.
//! This crate owns the quote repository contract and both storage backends.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::aggregate::aggregate_documents;
pub use codec::record::{decode_quote, encode_quote, CodecError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::quote::{NewQuote, PagedQuotes, Quote, QuoteId, SearchType, UnknownSearchType};
pub use repo::file_repo::FileQuoteRepository;
pub use repo::layout::{StoreLayout, DEFAULT_STORE_DIR};
pub use repo::quote_repo::{QuoteRepository, RepoError, RepoResult, PAGE_SIZE};
pub use repo::sqlite_repo::SqliteQuoteRepository;
pub use service::quote_service::{QuoteService, SearchRequest};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
