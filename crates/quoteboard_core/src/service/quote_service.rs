//! Quote use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD, listing, search and build entry points.
//! - Delegate persistence to any `QuoteRepository` implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::quote::{NewQuote, PagedQuotes, Quote, QuoteId, SearchType};
use crate::repo::quote_repo::{QuoteRepository, RepoError, RepoResult};
use std::path::PathBuf;

/// Use-case service wrapper for quote operations.
pub struct QuoteService<R: QuoteRepository> {
    repo: R,
}

/// Search request as issued by list/search callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub kind: SearchType,
    pub keyword: String,
    /// 1-based page.
    pub page: u32,
}

impl<R: QuoteRepository> QuoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gives back the wrapped repository.
    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Registers a quote and returns its assigned id.
    pub fn register(
        &mut self,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> RepoResult<QuoteId> {
        let created = self.repo.create(&NewQuote::new(content, author))?;
        Ok(created.id)
    }

    pub fn get(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        self.repo.find(id)
    }

    pub fn list_all(&self) -> RepoResult<Vec<Quote>> {
        self.repo.find_all()
    }

    /// Returns the listing window for `page` (1-based).
    pub fn list(&self, page: u32) -> RepoResult<PagedQuotes> {
        self.repo.find_paged(page)
    }

    pub fn search(&self, request: &SearchRequest) -> RepoResult<PagedQuotes> {
        self.repo.search(request.kind, &request.keyword, request.page)
    }

    /// Revises an existing quote.
    ///
    /// Returns `RepoError::NotFound` unchanged when the id is unknown.
    pub fn revise(&mut self, id: QuoteId, content: &str, author: &str) -> RepoResult<()> {
        self.repo.update(id, content, author)
    }

    /// Deletes a quote, reporting whether it existed.
    ///
    /// Unknown ids yield `Ok(false)`; every other failure propagates.
    pub fn remove(&mut self, id: QuoteId) -> RepoResult<bool> {
        match self.repo.delete(id) {
            Ok(()) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Rebuilds the consolidated artifact and returns its path.
    pub fn build(&self) -> RepoResult<PathBuf> {
        self.repo.build()
    }
}
