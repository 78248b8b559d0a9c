//! Handles settings for the engine.
//!
//! Values are layered: built-in defaults, then an optional `settings.toml`,
//! then `QUARRY__`-prefixed environment variables (`QUARRY__APP__LEVEL=debug`).

use config::{Config, ConfigError, Environment, File};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

/// Product-name rules applied by the expense aggregator.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportRules {
    /// Products whose name contains any of these (case-insensitively) are
    /// loaded by the buyer and never charged the loader fee.
    pub loader_fee_exempt_keywords: Vec<String>,
    /// Products whose name contains this are charged the rejects fee instead of
    /// the land-rate fee.
    pub rejects_keyword: String,
}

impl Default for ReportRules {
    fn default() -> Self {
        Self {
            loader_fee_exempt_keywords: vec!["beam".to_string(), "hardcore".to_string()],
            rejects_keyword: "reject".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    #[serde(default)]
    pub rules: ReportRules,
}

impl Settings {
    /// Loads `settings.toml` from the working directory, if present.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("settings")
    }

    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("database", "memory")?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("QUARRY").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        sea_orm::Database::connect(self.database.url()).await
    }

    pub fn rules(&self) -> ReportRules {
        self.rules.clone()
    }

    /// Installs a global `fmt` subscriber filtered at `app.level`.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_tracing(&self) {
        let filter = format!(
            "quarry_engine={level},migration={level},sea_orm=warn",
            level = self.app.level
        );
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_err()
        {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}
