//! File-backed quote repository.
//!
//! # Responsibility
//! - Store one record document per quote under a `StoreLayout` root.
//! - Own the durable next-id counter (`lastId.txt`).
//! - Serve paged listing and search from a full directory scan, with the same
//!   window semantics as the SQLite repository.
//!
//! # Invariants
//! - The counter only advances after the record document was written.
//! - `create` never replaces an existing record document, and a reopened
//!   store resumes above the highest record id on disk.
//! - The build artifact and counter file are never read as records.
//! - The store directory is created on first write.

use crate::codec::aggregate::aggregate_documents;
use crate::codec::record::{decode_quote, encode_quote};
use crate::model::quote::{NewQuote, PagedQuotes, Quote, QuoteId, SearchType};
use crate::repo::layout::StoreLayout;
use crate::repo::quote_repo::{paginate, QuoteRepository, RepoError, RepoResult};
use log::{debug, error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FIRST_ID: QuoteId = 1;

/// Quote repository over a directory of record documents.
#[derive(Debug)]
pub struct FileQuoteRepository {
    layout: StoreLayout,
    next_id: QuoteId,
}

impl FileQuoteRepository {
    /// Opens a store rooted at `root`, loading the next-id counter.
    ///
    /// A missing, unparsable or lagging counter resets to one past the highest
    /// record id on disk (or `1` for an empty store) and is written back. When
    /// the store directory does not exist yet, that write is deferred to the
    /// first `create`.
    pub fn open(root: impl Into<PathBuf>) -> RepoResult<Self> {
        Self::with_layout(StoreLayout::new(root))
    }

    pub fn with_layout(layout: StoreLayout) -> RepoResult<Self> {
        let next_id = load_counter(&layout)?;
        Ok(Self { layout, next_id })
    }

    /// Identifier the next `create` will assign.
    pub fn next_id(&self) -> QuoteId {
        self.next_id
    }

    fn read_record(&self, path: &Path) -> RepoResult<Quote> {
        let text = fs::read_to_string(path).map_err(|err| RepoError::io(path, err))?;
        decode_quote(&text).map_err(|source| RepoError::Malformed {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    fn matching(&self, kind: Option<(SearchType, &str)>) -> RepoResult<Vec<Quote>> {
        let quotes = self.find_all()?;
        Ok(match kind {
            Some((kind, keyword)) => quotes
                .into_iter()
                .filter(|quote| kind.matches(quote, keyword))
                .collect(),
            None => quotes,
        })
    }
}

impl QuoteRepository for FileQuoteRepository {
    fn create(&mut self, quote: &NewQuote) -> RepoResult<Quote> {
        let created = quote.with_id(self.next_id);
        let Some(following) = created.id.checked_add(1) else {
            error!(
                "event=quote_create module=repo status=error backend=file id={} error_code=id_space_exhausted",
                created.id
            );
            return Err(RepoError::IdsExhausted(created.id));
        };

        let record_path = self.layout.record_path(created.id);
        if let Err(err) = self
            .layout
            .write_new_creating_root(&record_path, &encode_quote(&created))
        {
            error!(
                "event=quote_create module=repo status=error backend=file id={} error={}",
                created.id, err
            );
            return Err(match err.kind() {
                ErrorKind::AlreadyExists => RepoError::IdTaken {
                    id: created.id,
                    path: record_path,
                },
                _ => RepoError::io(record_path, err),
            });
        }

        // The record is durable from here on; never hand its id out again.
        self.next_id = following;
        let counter_path = self.layout.counter_path();
        if let Err(source) = fs::write(&counter_path, self.next_id.to_string()) {
            error!(
                "event=quote_create module=repo status=error backend=file id={} error_code=counter_write_failed error={}",
                created.id, source
            );
            return Err(RepoError::CounterNotPersisted {
                id: created.id,
                path: counter_path,
                source,
            });
        }

        info!(
            "event=quote_create module=repo status=ok backend=file id={}",
            created.id
        );
        Ok(created)
    }

    fn find_all(&self) -> RepoResult<Vec<Quote>> {
        let root = self.layout.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RepoError::io(root, err)),
        };

        let mut quotes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| RepoError::io(root, err))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if StoreLayout::record_id(name).is_none() {
                continue;
            }

            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match self.read_record(&path) {
                Ok(quote) => quotes.push(quote),
                Err(RepoError::Io { path, source }) => {
                    warn!(
                        "event=record_skip module=repo status=error backend=file path={} error={}",
                        path.display(),
                        source
                    );
                }
                Err(err) => return Err(err),
            }
        }

        quotes.sort_by_key(|quote| quote.id);
        Ok(quotes)
    }

    fn find(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        let path = self.layout.record_path(id);
        match self.read_record(&path) {
            Ok(quote) => Ok(Some(quote)),
            Err(RepoError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete(&mut self, id: QuoteId) -> RepoResult<()> {
        let path = self.layout.record_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("event=quote_delete module=repo status=ok backend=file id={id}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(RepoError::NotFound(id)),
            Err(err) => Err(RepoError::io(path, err)),
        }
    }

    fn update(&mut self, id: QuoteId, content: &str, author: &str) -> RepoResult<()> {
        let path = self.layout.record_path(id);
        if !path.is_file() {
            return Err(RepoError::NotFound(id));
        }

        let quote = Quote::new(id, content, author);
        fs::write(&path, encode_quote(&quote)).map_err(|err| RepoError::io(&path, err))?;
        info!("event=quote_update module=repo status=ok backend=file id={id}");
        Ok(())
    }

    fn build(&self) -> RepoResult<PathBuf> {
        let blocks = self
            .find_all()?
            .iter()
            .map(encode_quote)
            .collect::<Vec<_>>();
        self.layout.write_build(&aggregate_documents(&blocks))
    }

    fn find_paged(&self, page: u32) -> RepoResult<PagedQuotes> {
        paginate(self.matching(None)?, page)
    }

    fn search(&self, kind: SearchType, keyword: &str, page: u32) -> RepoResult<PagedQuotes> {
        paginate(self.matching(Some((kind, keyword)))?, page)
    }
}

fn load_counter(layout: &StoreLayout) -> RepoResult<QuoteId> {
    let path = layout.counter_path();
    let stored = fs::read_to_string(&path)
        .ok()
        .and_then(|text| text.trim().parse::<QuoteId>().ok())
        .filter(|id| *id >= FIRST_ID);
    // Never below the records already on disk, whatever the counter says.
    let floor = layout
        .highest_record_id()?
        .map_or(FIRST_ID, |highest| highest.saturating_add(1));

    if let Some(next_id) = stored.filter(|id| *id >= floor) {
        debug!("event=counter_load module=repo status=ok next_id={next_id}");
        return Ok(next_id);
    }

    match fs::write(&path, floor.to_string()) {
        Ok(()) => {}
        // Deferred: the directory appears with the first record.
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(RepoError::io(path, err)),
    }
    info!(
        "event=counter_load module=repo status=reset stored={} next_id={floor}",
        stored.map_or_else(|| "none".to_string(), |id| id.to_string())
    );
    Ok(floor)
}
