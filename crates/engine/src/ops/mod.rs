use sea_orm::DatabaseConnection;

use crate::{ReportRules, ResultEngine};

mod collections;
mod expenses;
mod fees;
mod ledger;
mod queries;
mod multi_site;
mod records;
mod reports;

pub use records::{NewBanking, NewExpense, NewFuelUsage, NewPrepayment, NewSale};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Every public operation gets its own transaction: it is the request-scoped
/// handle on the shared pool, released when the operation returns.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rules: ReportRules,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn rules(&self) -> &ReportRules {
        &self.rules
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    rules: Option<ReportRules>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the product-name fee rules (defaults to [`ReportRules::default`]).
    pub fn rules(mut self, rules: ReportRules) -> EngineBuilder {
        self.rules = Some(rules);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            rules: self.rules.unwrap_or_default(),
        })
    }
}
