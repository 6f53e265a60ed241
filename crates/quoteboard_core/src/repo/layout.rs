//! On-disk layout of a quote store directory.
//!
//! # Responsibility
//! - Resolve record, counter and build-artifact paths under one root.
//! - Own the consolidated artifact writer shared by every backend.
//!
//! # Invariants
//! - Only `<digits>.json` names are record documents; `data.json` and
//!   `lastId.txt` never are.
//! - Directories are created on first write, never when a layout is built.

use crate::model::quote::QuoteId;
use crate::repo::quote_repo::{RepoError, RepoResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Store root used when the caller does not pick one.
pub const DEFAULT_STORE_DIR: &str = "db/wiseSaying";
pub const RECORD_EXTENSION: &str = "json";
pub const BUILD_FILE_NAME: &str = "data.json";
pub const COUNTER_FILE_NAME: &str = "lastId.txt";

static RECORD_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.json$").expect("record file pattern is valid"));

/// Paths of one quote store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/{id}.json`
    pub fn record_path(&self, id: QuoteId) -> PathBuf {
        self.root.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// `<root>/lastId.txt`
    pub fn counter_path(&self) -> PathBuf {
        self.root.join(COUNTER_FILE_NAME)
    }

    /// `<root>/data.json`
    pub fn build_path(&self) -> PathBuf {
        self.root.join(BUILD_FILE_NAME)
    }

    /// Parses a record identifier from a file name.
    ///
    /// Returns `None` for the build artifact, the counter and any other file.
    pub fn record_id(file_name: &str) -> Option<QuoteId> {
        RECORD_FILE_NAME
            .captures(file_name)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
    }

    /// Writes `contents` to `path`, creating the root directory when it does
    /// not exist yet.
    pub(crate) fn write_creating_root(&self, path: &Path, contents: &str) -> RepoResult<()> {
        self.with_root(path, || fs::write(path, contents))
    }

    /// Like `write_creating_root`, but fails with `AlreadyExists` instead of
    /// replacing a file at `path`.
    pub(crate) fn write_new_creating_root(&self, path: &Path, contents: &str) -> io::Result<()> {
        let write_new = || {
            let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
            file.write_all(contents.as_bytes())
        };
        match write_new() {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.root)?;
                write_new()
            }
            other => other,
        }
    }

    /// Highest identifier among record documents on disk, by file name.
    pub(crate) fn highest_record_id(&self) -> RepoResult<Option<QuoteId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(RepoError::io(&self.root, err)),
        };

        let mut highest = None;
        for entry in entries {
            let entry = entry.map_err(|err| RepoError::io(&self.root, err))?;
            let id = entry.file_name().to_str().and_then(Self::record_id);
            highest = highest.max(id);
        }
        Ok(highest)
    }

    fn with_root(&self, path: &Path, write: impl Fn() -> io::Result<()>) -> RepoResult<()> {
        match write() {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.root).map_err(|err| RepoError::io(&self.root, err))?;
                write().map_err(|err| RepoError::io(path, err))
            }
            Err(err) => Err(RepoError::io(path, err)),
        }
    }

    /// Persists the consolidated document as `data.json` and returns its path.
    pub fn write_build(&self, document: &str) -> RepoResult<PathBuf> {
        let path = self.build_path();
        self.write_creating_root(&path, document)?;
        info!(
            "event=quote_build module=repo status=ok bytes={} path={}",
            document.len(),
            path.display()
        );
        Ok(path)
    }
}
