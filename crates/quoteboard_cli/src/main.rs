//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a quote store (file-backed, or SQLite when a database path is
//!   given) and report its state.
//! - Rebuild the consolidated `data.json` artifact.
//!
//! Usage: `quoteboard_cli [STORE_DIR] [DB_PATH]`

use clap::Parser;
use log::{error, info};
use quoteboard_core::db::open_db;
use quoteboard_core::{
    core_version, default_log_level, init_logging, FileQuoteRepository, QuoteRepository,
    QuoteService, SqliteQuoteRepository, StoreLayout, DEFAULT_STORE_DIR,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "quoteboard_cli")]
#[command(about = "Report on a quote store and rebuild its data.json", long_about = None)]
struct Cli {
    /// Store directory holding record files and the build artifact.
    #[arg(default_value = DEFAULT_STORE_DIR)]
    store_dir: PathBuf,
    /// SQLite database file; the file-backed store is used when omitted.
    db_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("quoteboard_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let Cli { store_dir, db_path } = cli;

    init_logging(default_log_level(), std::env::current_dir()?.join("logs"))?;

    let conn = db_path.as_ref().map(open_db).transpose()?;
    let repo: Box<dyn QuoteRepository + '_> = match &conn {
        Some(conn) => Box::new(SqliteQuoteRepository::try_new(
            conn,
            StoreLayout::new(&store_dir),
        )?),
        None => Box::new(FileQuoteRepository::open(&store_dir)?),
    };
    let backend = if conn.is_some() { "sqlite" } else { "file" };
    info!(
        "event=cli_run module=cli status=start backend={backend} store_dir={}",
        store_dir.display()
    );

    let service = QuoteService::new(repo);
    println!("quoteboard_core version={}", core_version());
    println!("backend={backend}");

    let first_page = service.list(1)?;
    println!("quotes={}", first_page.max_page);
    for quote in &first_page.quotes {
        println!("{} / {} / {}", quote.id, quote.author, quote.content);
    }

    let artifact = service.build()?;
    println!("built={}", artifact.display());
    info!("event=cli_run module=cli status=ok backend={backend}");
    Ok(())
}
