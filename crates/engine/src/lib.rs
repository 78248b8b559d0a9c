//! Financial reconciliation and reporting engine for a quarry sales desk.
//!
//! The engine reads the raw records of a site (sales, manual expenses, fuel
//! usage, bankings, prepayments), derives the four-source expense model from
//! the site's fee schedule, carries each day's closing cash-in-hand forward as
//! the next day's opening balance, and returns a fully computed [`ReportData`].
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use chrono::NaiveDate;
//! use quarry_engine::{DateRange, Engine, Settings};
//!
//! let settings = Settings::new()?;
//! settings.init_tracing();
//! let engine = Engine::builder()
//!     .database(settings.connect().await?)
//!     .rules(settings.rules())
//!     .build()
//!     .await?;
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 2).ok_or("bad date")?;
//! let report = engine
//!     .build_manager_report(None, DateRange::day(day), None)
//!     .await?;
//! println!("cash in hand: {}", report.cash_in_hand);
//! # Ok(())
//! # }
//! ```

pub use bankings::Banking;
pub use error::EngineError;
pub use expenses::Expense;
pub use fuel_usages::FuelUsage;
pub use money::Money;
pub use ops::{
    Engine, EngineBuilder, NewBanking, NewExpense, NewFuelUsage, NewPrepayment, NewSale,
};
pub use prepayments::Prepayment;
pub use quantity::Quantity;
pub use report::{
    BankingRow, ClerkBreakdown, CollectionRow, Collections, DailySummary, DateRange,
    ExpenseBreakdown, ExpenseLine, ExpenseTotals, FuelUsageRow, LineType, PrepaymentRow,
    Prepayments, ProductBreakdown, ReportData, ReportKind, SaleRow,
};
pub use sales::{PaymentStatus, Sale};
pub use settings::{ReportRules, Settings};
pub use sites::{Site, SiteFees};

mod bankings;
mod brokers;
mod daily_balances;
mod error;
mod expenses;
mod fuel_usages;
mod money;
mod operators;
mod ops;
mod prepayments;
mod products;
mod quantity;
mod report;
mod sales;
pub mod settings;
mod sites;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
