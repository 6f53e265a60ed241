//! Domain model for quote records.
//!
//! # Responsibility
//! - Define the record shape shared by every storage backend.
//! - Keep identity assignment out of the model; repositories own it.
//!
//! # Invariants
//! - A `Quote` always carries a repository-assigned `QuoteId`.
//! - Unsaved input is represented by `NewQuote`, never by a placeholder id.

pub mod quote;
