//! Record keeping: the writes that feed the reports.
//!
//! Every operation validates its input before opening a transaction and
//! checks referenced rows inside it.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Banking, EngineError, Expense, FuelUsage, Money, PaymentStatus, Prepayment, Quantity,
    ResultEngine, Sale, Site, SiteFees, bankings, brokers, expenses, fuel_usages, operators,
    prepayments, products, sales, sites,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// Ceiling for any single recorded amount. Together with [`MAX_QUANTITY`] it
/// keeps every `price × quantity` and period total well inside `i64`.
const MAX_AMOUNT: Money = Money::major(10_000_000);

/// Ceiling for any single recorded quantity.
const MAX_QUANTITY: Quantity = Quantity::units(1_000_000);

/// A sale to record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSale {
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub vehicle_registration: String,
    pub product_id: Option<Uuid>,
    pub quantity: Quantity,
    pub price_per_unit: Money,
    pub commission_per_unit: Money,
    pub broker_id: Option<Uuid>,
    pub client: Option<String>,
    pub reference: Option<String>,
    pub payment_status: PaymentStatus,
    /// Defaults to the sale date for a sale recorded as paid.
    pub payment_received_on: Option<NaiveDate>,
    pub include_land_rate: bool,
}

impl NewSale {
    /// An unpaid sale without commission or broker, charged the land rate.
    pub fn new(
        date: NaiveDate,
        site_id: Uuid,
        operator_id: Uuid,
        vehicle_registration: &str,
        product_id: Option<Uuid>,
        quantity: Quantity,
        price_per_unit: Money,
    ) -> Self {
        Self {
            date,
            site_id,
            operator_id,
            vehicle_registration: vehicle_registration.to_string(),
            product_id,
            quantity,
            price_per_unit,
            commission_per_unit: Money::ZERO,
            broker_id: None,
            client: None,
            reference: None,
            payment_status: PaymentStatus::Unpaid,
            payment_received_on: None,
            include_land_rate: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFuelUsage {
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub old_stock: Quantity,
    pub new_stock: Quantity,
    pub machine_consumption: Quantity,
    pub loader_consumption: Quantity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBanking {
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount_banked: Money,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPrepayment {
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub client: String,
    pub vehicle_registration: Option<String>,
    pub product_id: Option<Uuid>,
    pub amount_paid: Money,
    pub reference: Option<String>,
}

impl Engine {
    /// Add a new site with its fee schedule.
    pub async fn new_site(&self, name: &str, fees: SiteFees) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "site")?;
        check_fees(&fees)?;
        with_tx!(self, |db_tx| {
            let site = Site {
                id: Uuid::new_v4(),
                name,
                fees,
            };
            let model: sites::ActiveModel = (&site).into();
            model.insert(&db_tx).await?;
            tracing::info!(site = %site.id, name = %site.name, "site created");
            Ok(site.id)
        })
    }

    /// Replace the fee schedule of a site. Past reports are not rewritten.
    pub async fn set_site_fees(&self, site_id: Uuid, fees: SiteFees) -> ResultEngine<()> {
        check_fees(&fees)?;
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, site_id).await?;
            let model = sites::ActiveModel {
                id: ActiveValue::Set(site_id),
                loader_fee_minor: ActiveValue::Set(fees.loader_fee.map(Money::minor)),
                land_rate_fee_minor: ActiveValue::Set(fees.land_rate_fee.map(Money::minor)),
                rejects_fee_minor: ActiveValue::Set(fees.rejects_fee.map(Money::minor)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn new_operator(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "operator")?;
        let id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            operators::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    pub async fn new_product(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "product")?;
        let id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            products::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    pub async fn new_broker(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "broker")?;
        let id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            brokers::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    /// Record a sale.
    ///
    /// A sale recorded as paid without a received date is taken as paid on
    /// the day it was made; an unpaid sale never carries a received date.
    pub async fn record_sale(&self, new: NewSale) -> ResultEngine<Uuid> {
        let vehicle_registration =
            normalize_required_name(&new.vehicle_registration, "vehicle registration")?;
        check_quantity(new.quantity, "quantity")?;
        check_non_negative(new.price_per_unit, "price per unit")?;
        check_non_negative(new.commission_per_unit, "commission per unit")?;
        let payment_received_on = match new.payment_status {
            PaymentStatus::Unpaid => None,
            PaymentStatus::Paid => {
                let received_on = new.payment_received_on.unwrap_or(new.date);
                check_received_on(new.date, received_on)?;
                Some(received_on)
            }
        };

        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, new.site_id).await?;
            self.require_operator(&db_tx, new.operator_id).await?;
            if let Some(product_id) = new.product_id {
                self.require_product(&db_tx, product_id).await?;
            }
            if let Some(broker_id) = new.broker_id {
                self.require_broker(&db_tx, broker_id).await?;
            }

            let sale = Sale {
                id: Uuid::new_v4(),
                date: new.date,
                site_id: new.site_id,
                operator_id: new.operator_id,
                vehicle_registration,
                product_id: new.product_id,
                quantity: new.quantity,
                price_per_unit: new.price_per_unit,
                commission_per_unit: new.commission_per_unit,
                broker_id: new.broker_id,
                client: normalize_optional_text(new.client.as_deref()),
                reference: normalize_optional_text(new.reference.as_deref()),
                payment_status: new.payment_status,
                payment_received_on,
                include_land_rate: new.include_land_rate,
                active: true,
            };
            let model: sales::ActiveModel = (&sale).into();
            model.insert(&db_tx).await?;
            tracing::debug!(sale = %sale.id, site = %sale.site_id, "sale recorded");
            Ok(sale.id)
        })
    }

    /// Settle a sale. The payment is attributed to the day it was received.
    pub async fn mark_sale_paid(&self, sale_id: Uuid, received_on: NaiveDate) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let sale = sales::Entity::find_by_id(sale_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;
            check_received_on(sale.date, received_on)?;

            let model = sales::ActiveModel {
                id: ActiveValue::Set(sale_id),
                payment_status: ActiveValue::Set(PaymentStatus::Paid.as_str().to_string()),
                payment_received_date: ActiveValue::Set(Some(received_on)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Soft-delete a sale: it disappears from every report.
    pub async fn deactivate_sale(&self, sale_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            sales::Entity::find_by_id(sale_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;
            let model = sales::ActiveModel {
                id: ActiveValue::Set(sale_id),
                active: ActiveValue::Set(false),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn record_expense(&self, new: NewExpense) -> ResultEngine<Uuid> {
        let item = normalize_required_name(&new.item, "expense item")?;
        check_positive(new.amount, "expense")?;
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, new.site_id).await?;
            self.require_operator(&db_tx, new.operator_id).await?;
            let expense = Expense {
                id: Uuid::new_v4(),
                date: new.date,
                site_id: new.site_id,
                operator_id: new.operator_id,
                item,
                amount: new.amount,
                active: true,
            };
            let model: expenses::ActiveModel = (&expense).into();
            model.insert(&db_tx).await?;
            Ok(expense.id)
        })
    }

    pub async fn deactivate_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            expenses::Entity::find_by_id(expense_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            let model = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id),
                active: ActiveValue::Set(false),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Record the day's fuel sheet. The balance is computed, never entered.
    pub async fn record_fuel_usage(&self, new: NewFuelUsage) -> ResultEngine<Uuid> {
        check_quantity(new.old_stock, "old stock")?;
        check_quantity(new.new_stock, "new stock")?;
        check_quantity(new.machine_consumption, "machine consumption")?;
        check_quantity(new.loader_consumption, "loader consumption")?;
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, new.site_id).await?;
            let usage = FuelUsage {
                id: Uuid::new_v4(),
                date: new.date,
                site_id: new.site_id,
                old_stock: new.old_stock,
                new_stock: new.new_stock,
                machine_consumption: new.machine_consumption,
                loader_consumption: new.loader_consumption,
                balance: FuelUsage::computed_balance(
                    new.new_stock,
                    new.machine_consumption,
                    new.loader_consumption,
                ),
                active: true,
            };
            let model: fuel_usages::ActiveModel = (&usage).into();
            model.insert(&db_tx).await?;
            Ok(usage.id)
        })
    }

    pub async fn record_banking(&self, new: NewBanking) -> ResultEngine<Uuid> {
        let item = normalize_required_name(&new.item, "banking item")?;
        check_positive(new.amount_banked, "amount banked")?;
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, new.site_id).await?;
            self.require_operator(&db_tx, new.operator_id).await?;
            let banking = Banking {
                id: Uuid::new_v4(),
                date: new.date,
                site_id: new.site_id,
                operator_id: new.operator_id,
                item,
                amount_banked: new.amount_banked,
                reference: normalize_optional_text(new.reference.as_deref()),
                active: true,
            };
            let model: bankings::ActiveModel = (&banking).into();
            model.insert(&db_tx).await?;
            Ok(banking.id)
        })
    }

    pub async fn record_prepayment(&self, new: NewPrepayment) -> ResultEngine<Uuid> {
        let client = normalize_required_name(&new.client, "client")?;
        check_positive(new.amount_paid, "amount paid")?;
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, new.site_id).await?;
            self.require_operator(&db_tx, new.operator_id).await?;
            if let Some(product_id) = new.product_id {
                self.require_product(&db_tx, product_id).await?;
            }
            let prepayment = Prepayment {
                id: Uuid::new_v4(),
                date: new.date,
                site_id: new.site_id,
                operator_id: new.operator_id,
                client,
                vehicle_registration: normalize_optional_text(
                    new.vehicle_registration.as_deref(),
                ),
                product_id: new.product_id,
                amount_paid: new.amount_paid,
                reference: normalize_optional_text(new.reference.as_deref()),
                active: true,
            };
            let model: prepayments::ActiveModel = (&prepayment).into();
            model.insert(&db_tx).await?;
            Ok(prepayment.id)
        })
    }

    async fn require_operator(
        &self,
        db_tx: &DatabaseTransaction,
        operator_id: Uuid,
    ) -> ResultEngine<()> {
        operators::Entity::find_by_id(operator_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("operator not exists".to_string()))?;
        Ok(())
    }

    async fn require_product(
        &self,
        db_tx: &DatabaseTransaction,
        product_id: Uuid,
    ) -> ResultEngine<()> {
        products::Entity::find_by_id(product_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        Ok(())
    }

    async fn require_broker(&self, db_tx: &DatabaseTransaction, broker_id: Uuid) -> ResultEngine<()> {
        brokers::Entity::find_by_id(broker_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("broker not exists".to_string()))?;
        Ok(())
    }
}

fn check_fees(fees: &SiteFees) -> ResultEngine<()> {
    let all = [
        (fees.loader_fee, "loader fee"),
        (fees.land_rate_fee, "land rate fee"),
        (fees.rejects_fee, "rejects fee"),
    ];
    for (fee, label) in all {
        if let Some(fee) = fee {
            check_non_negative(fee, label)?;
        }
    }
    Ok(())
}

fn check_non_negative(amount: Money, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be negative"
        )));
    }
    check_ceiling(amount, label)
}

fn check_positive(amount: Money, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be greater than zero"
        )));
    }
    check_ceiling(amount, label)
}

fn check_ceiling(amount: Money, label: &str) -> ResultEngine<()> {
    if amount > MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

fn check_quantity(quantity: Quantity, label: &str) -> ResultEngine<()> {
    if quantity.is_negative() {
        return Err(EngineError::InvalidQuantity(format!(
            "{label} must not be negative"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(EngineError::InvalidQuantity(format!(
            "{label} must not exceed {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

fn check_received_on(sale_date: NaiveDate, received_on: NaiveDate) -> ResultEngine<()> {
    if received_on < sale_date {
        return Err(EngineError::InvalidRange(format!(
            "payment received on {received_on} precedes the sale date {sale_date}"
        )));
    }
    Ok(())
}
