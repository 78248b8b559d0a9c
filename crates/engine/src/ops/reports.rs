//! Period report builder.
//!
//! A report is one transaction: every source of the period is read
//! concurrently, the reconciliation formulas are applied, and single-day
//! reports store the site's cash-in-hand as that day's closing balance.

use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

use crate::{
    BankingRow, DateRange, FuelUsageRow, Money, Quantity, ReportData, ReportKind, ResultEngine,
    Sale, SaleRow,
};

use super::{
    Engine,
    collections::{collection_rows, prepayment_rows},
    expenses::derive_expenses,
    queries::{NameKeys, Names, Scope},
    with_tx,
};

impl Engine {
    /// Build the report of one operator's desk.
    ///
    /// A single-day report stores the cash-in-hand of the whole site, not
    /// the operator's, as the day's closing balance. An unknown site yields
    /// an empty report.
    pub async fn build_clerk_report(
        &self,
        site_id: Uuid,
        operator_id: Uuid,
        range: DateRange,
    ) -> ResultEngine<ReportData> {
        range.validate()?;
        let scope = Scope {
            site_id,
            range,
            operator_id: Some(operator_id),
        };
        with_tx!(self, |db_tx| {
            let report = self
                .build_site_report(&db_tx, ReportKind::Clerk, scope)
                .await?;
            match report {
                Some(report) => {
                    self.store_closing_balance(&db_tx, scope, &report).await?;
                    Ok(report)
                }
                None => Ok(missing_site(ReportKind::Clerk, scope)),
            }
        })
    }

    /// Build the manager report of a site, or of every site when `site_id`
    /// is `None`.
    ///
    /// Only a single-day report of one site writes the ledger, always with
    /// the site-wide cash-in-hand; the all-sites view is read-only.
    pub async fn build_manager_report(
        &self,
        site_id: Option<Uuid>,
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<ReportData> {
        range.validate()?;
        with_tx!(self, |db_tx| match site_id {
            Some(site_id) => {
                let scope = Scope {
                    site_id,
                    range,
                    operator_id,
                };
                let report = self
                    .build_site_report(&db_tx, ReportKind::Manager, scope)
                    .await?;
                match report {
                    Some(report) => {
                        self.store_closing_balance(&db_tx, scope, &report).await?;
                        Ok(report)
                    }
                    None => Ok(missing_site(ReportKind::Manager, scope)),
                }
            }
            None => self.all_sites_report(&db_tx, range, operator_id).await,
        })
    }

    /// Build the report of one existing site, `None` if it does not exist.
    pub(super) async fn build_site_report(
        &self,
        db_tx: &DatabaseTransaction,
        kind: ReportKind,
        scope: Scope,
    ) -> ResultEngine<Option<ReportData>> {
        let range = scope.range;
        let (site, actual_opening, carry_forward, sales, manual, fuel, bankings, collected, prepaid) =
            tokio::try_join!(
                self.find_site(db_tx, scope.site_id),
                self.read_opening_balance(db_tx, scope.site_id, range.from()),
                self.read_opening_balance(db_tx, scope.site_id, range.to()),
                self.load_sales(db_tx, &scope),
                self.load_manual_expenses(db_tx, &scope),
                self.load_fuel_usages(db_tx, &scope),
                self.load_bankings(db_tx, &scope),
                self.load_collected_sales(db_tx, &scope),
                self.load_prepayments(db_tx, &scope),
            )?;
        let Some(site) = site else {
            return Ok(None);
        };

        let mut keys = NameKeys::default();
        keys.add_sales(&sales);
        keys.add_sales(&collected);
        keys.add_prepayments(&prepaid);
        keys.operators.extend(scope.operator_id);
        let names = self.load_names(db_tx, keys).await?;

        let mut report = ReportData::empty(kind, range);
        report.site_name = site.name;
        report.operator_name = scope
            .operator_id
            .map(|id| names.operator(id).to_string());
        report.land_rate_visible = site.fees.land_rate_visible();
        report.actual_opening_balance = actual_opening;
        report.cash_in_hand_carry_forward = carry_forward;

        report.total_quantity = sales.iter().map(|sale| sale.quantity).sum::<Quantity>();
        report.total_sales = sales.iter().map(Sale::gross_amount).sum::<Money>();
        report.unpaid = sales
            .iter()
            .filter(|sale| !sale.is_paid())
            .map(Sale::gross_amount)
            .sum::<Money>();

        let expenses = derive_expenses(&manual, &sales, &names, &site.fees, &self.rules);
        report.expenses = expenses.lines;
        report.expense_totals = expenses.totals;
        report.sales = sales.iter().map(|sale| sale_row(sale, &names)).collect();

        report.fuel_usages = fuel
            .into_iter()
            .map(|usage| FuelUsageRow {
                date: usage.date,
                old_stock: usage.old_stock,
                new_stock: usage.new_stock,
                machine_consumption: usage.machine_consumption,
                loader_consumption: usage.loader_consumption,
                balance: usage.balance,
            })
            .collect();

        report.total_banked = bankings.iter().map(|banking| banking.amount_banked).sum();
        report.bankings = bankings
            .into_iter()
            .map(|banking| BankingRow {
                date: banking.date,
                item: banking.item,
                amount_banked: banking.amount_banked,
                reference: banking.reference,
            })
            .collect();

        let collections = collection_rows(&collected, &names);
        report.collections = collections.rows;
        report.total_collections = collections.total;
        let prepayments = prepayment_rows(&prepaid, &names);
        report.prepayments = prepayments.rows;
        report.total_prepayments = prepayments.total;

        report.apply_formulas();
        if kind != ReportKind::Clerk {
            report.fill_breakdowns();
        }

        tracing::info!(
            site = %scope.site_id,
            from = %range.from(),
            to = %range.to(),
            kind = ?kind,
            cash_in_hand = %report.cash_in_hand,
            "report built"
        );

        Ok(Some(report))
    }

    /// Store the closing balance of a single-day report.
    ///
    /// The ledger holds site figures only: a report narrowed to one operator
    /// is rebuilt for the whole site before writing.
    async fn store_closing_balance(
        &self,
        db_tx: &DatabaseTransaction,
        scope: Scope,
        report: &ReportData,
    ) -> ResultEngine<()> {
        if !scope.range.is_single_day() {
            return Ok(());
        }
        let cash_in_hand = match scope.operator_id {
            None => report.cash_in_hand,
            Some(_) => {
                let site_scope = Scope {
                    operator_id: None,
                    ..scope
                };
                match self
                    .build_site_report(db_tx, ReportKind::Manager, site_scope)
                    .await?
                {
                    Some(site_report) => site_report.cash_in_hand,
                    None => return Ok(()),
                }
            }
        };
        self.write_closing_balance(db_tx, scope.site_id, scope.range.from(), cash_in_hand)
            .await
    }
}

fn missing_site(kind: ReportKind, scope: Scope) -> ReportData {
    tracing::warn!(site = %scope.site_id, "site not found, returning an empty report");
    ReportData::empty(kind, scope.range)
}

fn sale_row(sale: &Sale, names: &Names) -> SaleRow {
    SaleRow {
        sale_id: sale.id,
        date: sale.date,
        site_id: sale.site_id,
        operator_id: sale.operator_id,
        operator_name: names.operator(sale.operator_id).to_string(),
        vehicle_registration: sale.vehicle_registration.clone(),
        product_id: sale.product_id,
        product_name: names.product(sale.product_id).to_string(),
        quantity: sale.quantity,
        price_per_unit: sale.price_per_unit,
        gross_amount: sale.gross_amount(),
        broker_name: names.broker(sale.broker_id).map(ToString::to_string),
        client: sale.client.clone(),
        reference: sale.reference.clone(),
        payment_status: sale.payment_status,
    }
}
