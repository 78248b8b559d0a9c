//! Schema runner for the quarry desk database.
//!
//! `DATABASE_URL` selects the database; it defaults to `./quarry.db`.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const USAGE: &str = "Usage: cargo run -p migration -- [up [n]|down [n]|fresh|refresh|status]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());
    let steps = match args.next() {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| format!("invalid step count: {raw}"))?),
        None => None,
    };

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./quarry.db?mode=rwc".to_string());
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, steps).await?,
        "down" => migration::Migrator::down(&db, Some(steps.unwrap_or(1))).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "refresh" => migration::Migrator::refresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
