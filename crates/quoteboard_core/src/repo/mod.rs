//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the quote data access contract (`quote_repo`).
//! - Provide interchangeable file-backed (`file_repo`) and SQLite
//!   (`sqlite_repo`) implementations with identical observable behavior.
//! - Resolve store directory paths and write the build artifact (`layout`).
//!
//! # Invariants
//! - Callers depend on `QuoteRepository`, never on a concrete backend.
//! - Repository APIs return semantic errors (`NotFound`, `Malformed`) in
//!   addition to transport errors.

pub mod file_repo;
pub mod layout;
pub mod quote_repo;
pub mod sqlite_repo;
