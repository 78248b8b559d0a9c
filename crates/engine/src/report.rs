//! The report object handed to exporters.
//!
//! [`ReportData`] is plain data: every figure is computed by the engine before
//! it is returned, and renderers (PDF, spreadsheet, text) only read it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, Quantity, ResultEngine, sales::PaymentStatus, util::UNKNOWN};

/// Inclusive calendar-day range `[from, to]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        let range = Self { from, to };
        range.validate()?;
        Ok(range)
    }

    /// Re-run by every builder: a deserialized range never went through [`DateRange::new`].
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.from > self.to {
            return Err(EngineError::InvalidRange(format!(
                "from ({}) must not be after to ({})",
                self.from, self.to
            )));
        }
        Ok(())
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Single-day ranges are the only ones allowed to write the ledger.
    pub fn is_single_day(&self) -> bool {
        self.from == self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// One operator's desk.
    Clerk,
    /// A whole site, optionally narrowed to one operator.
    Manager,
    /// Several sites merged together.
    MultiSite,
}

/// The four expense sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    UserExpense,
    CommissionExpense,
    LoadersFeeExpense,
    LandRateFeeExpense,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub date: NaiveDate,
    pub line_type: LineType,
    pub description: String,
    pub amount: Money,
}

/// Per-category expense totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub user: Money,
    pub commission: Money,
    pub loaders_fee: Money,
    pub land_rate_fee: Money,
}

impl ExpenseTotals {
    pub fn from_lines(lines: &[ExpenseLine]) -> Self {
        let mut totals = Self::default();
        for line in lines {
            match line.line_type {
                LineType::UserExpense => totals.user += line.amount,
                LineType::CommissionExpense => totals.commission += line.amount,
                LineType::LoadersFeeExpense => totals.loaders_fee += line.amount,
                LineType::LandRateFeeExpense => totals.land_rate_fee += line.amount,
            }
        }
        totals
    }

    /// `TotalExpenses`: the sum of all four categories.
    pub fn total(&self) -> Money {
        self.user + self.commission + self.loaders_fee + self.land_rate_fee
    }

    fn add(&mut self, other: &ExpenseTotals) {
        self.user += other.user;
        self.commission += other.commission;
        self.loaders_fee += other.loaders_fee;
        self.land_rate_fee += other.land_rate_fee;
    }
}

/// Expense lines of a period together with their category totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub lines: Vec<ExpenseLine>,
    pub totals: ExpenseTotals,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRow {
    pub sale_id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub vehicle_registration: String,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: Quantity,
    pub price_per_unit: Money,
    pub gross_amount: Money,
    pub broker_name: Option<String>,
    pub client: Option<String>,
    pub reference: Option<String>,
    pub payment_status: PaymentStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelUsageRow {
    pub date: NaiveDate,
    pub old_stock: Quantity,
    pub new_stock: Quantity,
    pub machine_consumption: Quantity,
    pub loader_consumption: Quantity,
    pub balance: Quantity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankingRow {
    pub date: NaiveDate,
    pub item: String,
    pub amount_banked: Money,
    pub reference: Option<String>,
}

/// Payment received in the period for a sale made before it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRow {
    pub sale_date: NaiveDate,
    pub payment_received_on: NaiveDate,
    pub vehicle_registration: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub amount: Money,
    pub client: String,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collections {
    pub rows: Vec<CollectionRow>,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentRow {
    pub date: NaiveDate,
    pub vehicle_registration: Option<String>,
    pub client: String,
    pub product_name: String,
    pub amount_paid: Money,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prepayments {
    pub rows: Vec<PrepaymentRow>,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub sales_count: u64,
    pub quantity: Quantity,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBreakdown {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub sales_count: u64,
    pub quantity: Quantity,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClerkBreakdown {
    pub operator_id: Uuid,
    pub operator_name: String,
    pub sales_count: u64,
    pub quantity: Quantity,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub kind: ReportKind,
    pub range: DateRange,
    pub site_name: String,
    pub operator_name: Option<String>,
    pub land_rate_visible: bool,

    /// Closing balance of the day before `from`.
    pub actual_opening_balance: Money,
    /// Closing balance of the day before `to` ("Cash-in-Hand B/F"). This is
    /// the balance term of `net_earnings`.
    pub cash_in_hand_carry_forward: Money,

    pub total_quantity: Quantity,
    pub total_sales: Money,
    pub unpaid: Money,
    pub sales: Vec<SaleRow>,

    pub expenses: Vec<ExpenseLine>,
    pub expense_totals: ExpenseTotals,

    pub fuel_usages: Vec<FuelUsageRow>,

    pub bankings: Vec<BankingRow>,
    pub total_banked: Money,

    pub collections: Vec<CollectionRow>,
    pub total_collections: Money,

    pub prepayments: Vec<PrepaymentRow>,
    pub total_prepayments: Money,

    pub earnings: Money,
    pub net_earnings: Money,
    pub cash_in_hand: Money,

    pub daily_summaries: Vec<DailySummary>,
    pub product_breakdown: Vec<ProductBreakdown>,
    pub clerk_breakdown: Vec<ClerkBreakdown>,
}

impl ReportData {
    /// A zeroed report, returned for sites that do not exist.
    pub fn empty(kind: ReportKind, range: DateRange) -> Self {
        Self {
            kind,
            range,
            site_name: UNKNOWN.to_string(),
            operator_name: None,
            land_rate_visible: false,
            actual_opening_balance: Money::ZERO,
            cash_in_hand_carry_forward: Money::ZERO,
            total_quantity: Quantity::ZERO,
            total_sales: Money::ZERO,
            unpaid: Money::ZERO,
            sales: Vec::new(),
            expenses: Vec::new(),
            expense_totals: ExpenseTotals::default(),
            fuel_usages: Vec::new(),
            bankings: Vec::new(),
            total_banked: Money::ZERO,
            collections: Vec::new(),
            total_collections: Money::ZERO,
            prepayments: Vec::new(),
            total_prepayments: Money::ZERO,
            earnings: Money::ZERO,
            net_earnings: Money::ZERO,
            cash_in_hand: Money::ZERO,
            daily_summaries: Vec::new(),
            product_breakdown: Vec::new(),
            clerk_breakdown: Vec::new(),
        }
    }

    pub fn total_expenses(&self) -> Money {
        self.expense_totals.total()
    }

    /// Recomputes the summary figures from the collected totals.
    pub(crate) fn apply_formulas(&mut self) {
        self.earnings = self.total_sales - self.total_expenses();
        self.net_earnings = (self.earnings
            + self.cash_in_hand_carry_forward
            + self.total_collections
            + self.total_prepayments)
            - self.unpaid;
        self.cash_in_hand = self.net_earnings - self.total_banked;
    }

    /// Fills the daily / product / clerk tables from the sale rows.
    pub(crate) fn fill_breakdowns(&mut self) {
        self.daily_summaries = daily_summaries(&self.sales);
        self.product_breakdown = product_breakdown(&self.sales);
        self.clerk_breakdown = clerk_breakdown(&self.sales);
    }

    /// Merges per-site reports into one, summing every total.
    pub(crate) fn merge(
        kind: ReportKind,
        range: DateRange,
        site_name: String,
        parts: Vec<ReportData>,
    ) -> Self {
        let mut merged = Self::empty(kind, range);
        merged.site_name = site_name;

        for part in parts {
            merged.land_rate_visible |= part.land_rate_visible;
            merged.actual_opening_balance += part.actual_opening_balance;
            merged.cash_in_hand_carry_forward += part.cash_in_hand_carry_forward;
            merged.total_quantity += part.total_quantity;
            merged.total_sales += part.total_sales;
            merged.unpaid += part.unpaid;
            merged.sales.extend(part.sales);
            merged.expenses.extend(part.expenses);
            merged.expense_totals.add(&part.expense_totals);
            merged.fuel_usages.extend(part.fuel_usages);
            merged.bankings.extend(part.bankings);
            merged.total_banked += part.total_banked;
            merged.collections.extend(part.collections);
            merged.total_collections += part.total_collections;
            merged.prepayments.extend(part.prepayments);
            merged.total_prepayments += part.total_prepayments;
        }

        merged.sales.sort_by_key(|row| row.date);
        merged.expenses.sort_by_key(|line| line.date);
        merged.fuel_usages.sort_by_key(|row| row.date);
        merged.bankings.sort_by_key(|row| row.date);
        merged.collections.sort_by_key(|row| row.payment_received_on);
        merged.prepayments.sort_by_key(|row| row.date);

        merged.apply_formulas();
        merged.fill_breakdowns();
        merged
    }
}

fn daily_summaries(sales: &[SaleRow]) -> Vec<DailySummary> {
    let mut by_day: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    for sale in sales {
        let entry = by_day.entry(sale.date).or_insert_with(|| DailySummary {
            date: sale.date,
            sales_count: 0,
            quantity: Quantity::ZERO,
            revenue: Money::ZERO,
        });
        entry.sales_count += 1;
        entry.quantity += sale.quantity;
        entry.revenue += sale.gross_amount;
    }
    by_day.into_values().collect()
}

fn product_breakdown(sales: &[SaleRow]) -> Vec<ProductBreakdown> {
    let mut by_product: BTreeMap<Option<Uuid>, ProductBreakdown> = BTreeMap::new();
    for sale in sales {
        let entry = by_product
            .entry(sale.product_id)
            .or_insert_with(|| ProductBreakdown {
                product_id: sale.product_id,
                product_name: sale.product_name.clone(),
                sales_count: 0,
                quantity: Quantity::ZERO,
                revenue: Money::ZERO,
            });
        entry.sales_count += 1;
        entry.quantity += sale.quantity;
        entry.revenue += sale.gross_amount;
    }
    let mut rows: Vec<ProductBreakdown> = by_product.into_values().collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

fn clerk_breakdown(sales: &[SaleRow]) -> Vec<ClerkBreakdown> {
    let mut by_operator: BTreeMap<Uuid, ClerkBreakdown> = BTreeMap::new();
    for sale in sales {
        let entry = by_operator
            .entry(sale.operator_id)
            .or_insert_with(|| ClerkBreakdown {
                operator_id: sale.operator_id,
                operator_name: sale.operator_name.clone(),
                sales_count: 0,
                quantity: Quantity::ZERO,
                revenue: Money::ZERO,
            });
        entry.sales_count += 1;
        entry.quantity += sale.quantity;
        entry.revenue += sale.gross_amount;
    }
    let mut rows: Vec<ClerkBreakdown> = by_operator.into_values().collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}
