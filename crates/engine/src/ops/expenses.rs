//! The four-source expense model.
//!
//! Besides the expenses clerks enter by hand, every sale of the period costs
//! its broker commission and, depending on the site's fee schedule and the
//! product, a loader fee and a land-rate (or rejects) fee.

use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    DateRange, Expense, ExpenseBreakdown, ExpenseLine, ExpenseTotals, LineType, ReportRules,
    ResultEngine, Sale, SiteFees, util::contains_ignore_case,
};

use super::{
    Engine,
    queries::{NameKeys, Names, Scope},
    with_tx,
};

impl Engine {
    /// Return the expense lines of a site over `range`, optionally restricted
    /// to one operator.
    pub async fn expense_items(
        &self,
        site_id: Uuid,
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<ExpenseBreakdown> {
        range.validate()?;
        let scope = Scope {
            site_id,
            range,
            operator_id,
        };
        with_tx!(self, |db_tx| {
            let (site, sales, manual) = tokio::try_join!(
                self.require_site(&db_tx, site_id),
                self.load_sales(&db_tx, &scope),
                self.load_manual_expenses(&db_tx, &scope),
            )?;
            let mut keys = NameKeys::default();
            keys.add_sales(&sales);
            let names = self.load_names(&db_tx, keys).await?;

            Ok(derive_expenses(&manual, &sales, &names, &site.fees, &self.rules))
        })
    }
}

/// Build the expense lines of a period from its manual expenses and sales.
///
/// Lines are generated source by source (user, commission, loader fee, land
/// rate) and then stably sorted by date.
pub(super) fn derive_expenses(
    manual: &[Expense],
    sales: &[Sale],
    names: &Names,
    fees: &SiteFees,
    rules: &ReportRules,
) -> ExpenseBreakdown {
    let mut lines: Vec<ExpenseLine> = manual
        .iter()
        .map(|expense| ExpenseLine {
            date: expense.date,
            line_type: LineType::UserExpense,
            description: expense.item.clone(),
            amount: expense.amount,
        })
        .collect();

    for sale in sales.iter().filter(|s| s.commission_per_unit.is_positive()) {
        let mut description = format!("Commission: {}", sale_label(sale, names));
        if let Some(broker) = names.broker(sale.broker_id) {
            description.push_str(&format!(" - Broker: {broker}"));
        }
        lines.push(ExpenseLine {
            date: sale.date,
            line_type: LineType::CommissionExpense,
            description,
            amount: sale.commission_amount(),
        });
    }

    if let Some(rate) = fees.loader_rate() {
        for sale in sales {
            let product = names.product(sale.product_id);
            let exempt = rules
                .loader_fee_exempt_keywords
                .iter()
                .any(|keyword| contains_ignore_case(product, keyword));
            if exempt {
                continue;
            }
            lines.push(ExpenseLine {
                date: sale.date,
                line_type: LineType::LoadersFeeExpense,
                description: format!("Loaders fee: {}", sale_label(sale, names)),
                amount: rate.times(sale.quantity),
            });
        }
    }

    for sale in sales.iter().filter(|s| s.include_land_rate) {
        let product = names.product(sale.product_id);
        let (rate, label) = if contains_ignore_case(product, &rules.rejects_keyword) {
            (fees.rejects_rate(), "Rejects fee")
        } else {
            (fees.land_rate(), "Land rate fee")
        };
        let Some(rate) = rate else {
            continue;
        };
        lines.push(ExpenseLine {
            date: sale.date,
            line_type: LineType::LandRateFeeExpense,
            description: format!("{label}: {}", sale_label(sale, names)),
            amount: rate.times(sale.quantity),
        });
    }

    lines.sort_by_key(|line| line.date);
    let totals = ExpenseTotals::from_lines(&lines);
    ExpenseBreakdown { lines, totals }
}

fn sale_label(sale: &Sale, names: &Names) -> String {
    format!(
        "{} - {} ({} units)",
        sale.vehicle_registration,
        names.product(sale.product_id),
        sale.quantity
    )
}
