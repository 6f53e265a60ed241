//! SQLite-backed quote repository.
//!
//! # Responsibility
//! - Map the quote contract onto parameterized statements over `quote`.
//! - Implement page-limited listing and search as a count query plus a
//!   bounded, descending result query.
//!
//! # Invariants
//! - Insert, update and delete must affect exactly one row.
//! - Search columns come only from the closed `SearchType` enumeration.
//! - Keywords are bound parameters and match as literal, case-sensitive
//!   substrings.

use crate::codec::aggregate::aggregate_documents;
use crate::codec::record::encode_quote;
use crate::db::migrations::latest_version;
use crate::model::quote::{NewQuote, PagedQuotes, Quote, QuoteId, SearchType};
use crate::repo::layout::StoreLayout;
use crate::repo::quote_repo::{page_limit, QuoteRepository, RepoError, RepoResult};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::PathBuf;

const QUOTE_SELECT_SQL: &str = "SELECT
    quote_id,
    content,
    author
FROM quote";

/// SQLite-backed quote repository.
///
/// Holds no state besides the borrowed connection and the layout that
/// receives the build artifact.
pub struct SqliteQuoteRepository<'conn> {
    conn: &'conn Connection,
    layout: StoreLayout,
}

impl<'conn> SqliteQuoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// `layout` decides where `build` writes `data.json`.
    pub fn try_new(conn: &'conn Connection, layout: StoreLayout) -> RepoResult<Self> {
        ensure_quote_connection_ready(conn)?;
        Ok(Self { conn, layout })
    }

    fn paged(&self, filter: Option<(SearchType, &str)>, page: u32) -> RepoResult<PagedQuotes> {
        let limit = page_limit(page)?;

        let mut where_sql = String::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some((kind, keyword)) = filter {
            where_sql = format!(" WHERE instr({}, ?) > 0", kind.label());
            bind_values.push(Value::Text(keyword.to_string()));
        }

        let max_page: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM quote{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        bind_values.push(Value::Integer(i64::from(limit)));
        let mut stmt = self.conn.prepare(&format!(
            "{QUOTE_SELECT_SQL}{where_sql} ORDER BY quote_id DESC LIMIT ?;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
        let mut quotes = Vec::new();
        while let Some(row) = rows.next()? {
            quotes.push(parse_quote_row(row)?);
        }

        Ok(PagedQuotes {
            max_page: u64::try_from(max_page).map_err(|_| {
                RepoError::InvalidData(format!("negative row count `{max_page}`"))
            })?,
            current_page: page,
            quotes,
        })
    }
}

impl QuoteRepository for SqliteQuoteRepository<'_> {
    fn create(&mut self, quote: &NewQuote) -> RepoResult<Quote> {
        let changed = self.conn.execute(
            "INSERT INTO quote (content, author) VALUES (?1, ?2);",
            params![quote.content.as_str(), quote.author.as_str()],
        )?;
        if changed != 1 {
            error!(
                "event=quote_create module=repo status=error backend=sqlite changed={changed}"
            );
            return Err(RepoError::InvalidData(format!(
                "insert affected {changed} rows, expected 1"
            )));
        }

        let created = quote.with_id(self.conn.last_insert_rowid());
        info!(
            "event=quote_create module=repo status=ok backend=sqlite id={}",
            created.id
        );
        Ok(created)
    }

    fn find_all(&self) -> RepoResult<Vec<Quote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUOTE_SELECT_SQL} ORDER BY quote_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut quotes = Vec::new();
        while let Some(row) = rows.next()? {
            quotes.push(parse_quote_row(row)?);
        }
        Ok(quotes)
    }

    fn find(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        let quote = self
            .conn
            .query_row(
                &format!("{QUOTE_SELECT_SQL} WHERE quote_id = ?1;"),
                [id],
                |row| Ok(parse_quote_row(row)),
            )
            .optional()?;
        quote.transpose()
    }

    fn delete(&mut self, id: QuoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM quote WHERE quote_id = ?1;", [id])?;
        if changed != 1 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=quote_delete module=repo status=ok backend=sqlite id={id}");
        Ok(())
    }

    fn update(&mut self, id: QuoteId, content: &str, author: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE quote
             SET content = ?1, author = ?2
             WHERE quote_id = ?3;",
            params![content, author, id],
        )?;
        if changed != 1 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=quote_update module=repo status=ok backend=sqlite id={id}");
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
        self.paged(None, page)
    }

    fn search(&self, kind: SearchType, keyword: &str, page: u32) -> RepoResult<PagedQuotes> {
        self.paged(Some((kind, keyword)), page)
    }
}

fn parse_quote_row(row: &Row<'_>) -> RepoResult<Quote> {
    Ok(Quote {
        id: row.get("quote_id")?,
        content: row.get("content")?,
        author: row.get("author")?,
    })
}

fn ensure_quote_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "quote")? {
        return Err(RepoError::MissingRequiredTable("quote"));
    }

    for column in ["quote_id", "content", "author"] {
        if !table_has_column(conn, "quote", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "quote",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
