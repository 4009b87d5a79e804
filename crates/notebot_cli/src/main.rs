//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notebot_core` linkage.
//! - Open the store, seed/migrate it, and print the active catalog entry.

use notebot_core::db::open_db;
use notebot_core::{CatalogRegistry, SqliteCatalogRegistry};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Same resolution order as the original bot process: DB_PATH env var,
    // falling back to a file next to the working directory.
    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "notebot.db".to_string());

    match run(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notebot_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open_db(db_path)?;
    let mut registry = SqliteCatalogRegistry::try_new(&mut conn)?;

    println!("notebot_core ping={}", notebot_core::ping());
    println!("notebot_core version={}", notebot_core::core_version());

    let active = registry.get_active()?;
    println!("active model: {} ({})", active.label, active.key);

    for item in registry.list_items()? {
        let marker = if item.active { "*" } else { " " };
        println!("{marker} {} {}", item.id, item.label);
    }

    Ok(())
}
