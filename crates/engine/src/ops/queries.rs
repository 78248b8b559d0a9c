//! Period queries shared by the report components.
//!
//! Every loader returns only active rows of one site, ordered by date, and
//! honours the optional operator filter except where noted.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, QueryTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Banking, DateRange, Expense, FuelUsage, Prepayment, ResultEngine, Sale, bankings, brokers,
    expenses, fuel_usages, operators, prepayments, products, sales,
    util::{NOT_SPECIFIED, UNKNOWN},
};

use super::Engine;

/// Site, period and operator a report is restricted to.
#[derive(Clone, Copy, Debug)]
pub(super) struct Scope {
    pub site_id: Uuid,
    pub range: DateRange,
    pub operator_id: Option<Uuid>,
}

/// Display names resolved for one report.
#[derive(Debug, Default)]
pub(super) struct Names {
    products: HashMap<Uuid, String>,
    brokers: HashMap<Uuid, String>,
    operators: HashMap<Uuid, String>,
}

impl Names {
    pub fn product(&self, product_id: Option<Uuid>) -> &str {
        product_id
            .and_then(|id| self.products.get(&id))
            .map_or(UNKNOWN, String::as_str)
    }

    /// Like [`Names::product`], but a prepayment may not name a product yet.
    pub fn intended_product(&self, product_id: Option<Uuid>) -> &str {
        match product_id {
            None => NOT_SPECIFIED,
            Some(_) => self.product(product_id),
        }
    }

    /// Missing brokers are left out of descriptions entirely.
    pub fn broker(&self, broker_id: Option<Uuid>) -> Option<&str> {
        broker_id
            .and_then(|id| self.brokers.get(&id))
            .map(String::as_str)
    }

    pub fn operator(&self, operator_id: Uuid) -> &str {
        self.operators
            .get(&operator_id)
            .map_or(UNKNOWN, String::as_str)
    }

    #[cfg(test)]
    pub fn insert_product(&mut self, id: Uuid, name: &str) {
        self.products.insert(id, name.to_string());
    }

    #[cfg(test)]
    pub fn insert_broker(&mut self, id: Uuid, name: &str) {
        self.brokers.insert(id, name.to_string());
    }
}

/// Identifiers to resolve into a [`Names`].
#[derive(Debug, Default)]
pub(super) struct NameKeys {
    pub products: BTreeSet<Uuid>,
    pub brokers: BTreeSet<Uuid>,
    pub operators: BTreeSet<Uuid>,
}

impl NameKeys {
    pub fn add_sales(&mut self, sales: &[Sale]) {
        for sale in sales {
            self.products.extend(sale.product_id);
            self.brokers.extend(sale.broker_id);
            self.operators.insert(sale.operator_id);
        }
    }

    pub fn add_prepayments(&mut self, prepayments: &[Prepayment]) {
        for prepayment in prepayments {
            self.products.extend(prepayment.product_id);
        }
    }
}

impl Engine {
    pub(super) async fn load_sales(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<Sale>> {
        let models = sales::Entity::find()
            .filter(sales::Column::SiteId.eq(scope.site_id))
            .filter(sales::Column::Active.eq(true))
            .filter(sales::Column::Date.between(scope.range.from(), scope.range.to()))
            .apply_if(scope.operator_id, |query, id| {
                query.filter(sales::Column::OperatorId.eq(id))
            })
            .order_by_asc(sales::Column::Date)
            .order_by_asc(sales::Column::Id)
            .all(db_tx)
            .await?;
        tracing::debug!(site = %scope.site_id, rows = models.len(), "loaded sales");

        models.into_iter().map(Sale::try_from).collect()
    }

    /// Sales made before the period and paid inside it.
    pub(super) async fn load_collected_sales(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<Sale>> {
        let models = sales::Entity::find()
            .filter(sales::Column::SiteId.eq(scope.site_id))
            .filter(sales::Column::Active.eq(true))
            .filter(sales::Column::PaymentStatus.eq(crate::PaymentStatus::Paid.as_str()))
            .filter(
                sales::Column::PaymentReceivedDate.between(scope.range.from(), scope.range.to()),
            )
            .filter(sales::Column::Date.lt(scope.range.from()))
            .apply_if(scope.operator_id, |query, id| {
                query.filter(sales::Column::OperatorId.eq(id))
            })
            .order_by_asc(sales::Column::PaymentReceivedDate)
            .order_by_asc(sales::Column::Date)
            .order_by_asc(sales::Column::Id)
            .all(db_tx)
            .await?;
        tracing::debug!(site = %scope.site_id, rows = models.len(), "loaded collections");

        models.into_iter().map(Sale::try_from).collect()
    }

    pub(super) async fn load_manual_expenses(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::SiteId.eq(scope.site_id))
            .filter(expenses::Column::Active.eq(true))
            .filter(expenses::Column::Date.between(scope.range.from(), scope.range.to()))
            .apply_if(scope.operator_id, |query, id| {
                query.filter(expenses::Column::OperatorId.eq(id))
            })
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::Id)
            .all(db_tx)
            .await?;

        Ok(models.into_iter().map(Expense::from).collect())
    }

    /// Fuel is a site-wide sheet: the operator filter does not apply.
    pub(super) async fn load_fuel_usages(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<FuelUsage>> {
        let models = fuel_usages::Entity::find()
            .filter(fuel_usages::Column::SiteId.eq(scope.site_id))
            .filter(fuel_usages::Column::Active.eq(true))
            .filter(fuel_usages::Column::Date.between(scope.range.from(), scope.range.to()))
            .order_by_asc(fuel_usages::Column::Date)
            .order_by_asc(fuel_usages::Column::Id)
            .all(db_tx)
            .await?;

        Ok(models.into_iter().map(FuelUsage::from).collect())
    }

    pub(super) async fn load_bankings(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<Banking>> {
        let models = bankings::Entity::find()
            .filter(bankings::Column::SiteId.eq(scope.site_id))
            .filter(bankings::Column::Active.eq(true))
            .filter(bankings::Column::Date.between(scope.range.from(), scope.range.to()))
            .apply_if(scope.operator_id, |query, id| {
                query.filter(bankings::Column::OperatorId.eq(id))
            })
            .order_by_asc(bankings::Column::Date)
            .order_by_asc(bankings::Column::Id)
            .all(db_tx)
            .await?;

        Ok(models.into_iter().map(Banking::from).collect())
    }

    pub(super) async fn load_prepayments(
        &self,
        db_tx: &DatabaseTransaction,
        scope: &Scope,
    ) -> ResultEngine<Vec<Prepayment>> {
        let models = prepayments::Entity::find()
            .filter(prepayments::Column::SiteId.eq(scope.site_id))
            .filter(prepayments::Column::Active.eq(true))
            .filter(prepayments::Column::Date.between(scope.range.from(), scope.range.to()))
            .apply_if(scope.operator_id, |query, id| {
                query.filter(prepayments::Column::OperatorId.eq(id))
            })
            .order_by_asc(prepayments::Column::Date)
            .order_by_asc(prepayments::Column::Id)
            .all(db_tx)
            .await?;

        Ok(models.into_iter().map(Prepayment::from).collect())
    }

    /// Resolve product, broker and operator names in three concurrent lookups.
    pub(super) async fn load_names(
        &self,
        db_tx: &DatabaseTransaction,
        keys: NameKeys,
    ) -> ResultEngine<Names> {
        let (products, brokers, operators) = tokio::try_join!(
            self.product_names(db_tx, keys.products),
            self.broker_names(db_tx, keys.brokers),
            self.operator_names(db_tx, keys.operators),
        )?;

        Ok(Names {
            products,
            brokers,
            operators,
        })
    }

    pub(super) async fn operator_name(
        &self,
        db_tx: &DatabaseTransaction,
        operator_id: Uuid,
    ) -> ResultEngine<String> {
        let model = operators::Entity::find_by_id(operator_id).one(db_tx).await?;
        Ok(model.map_or_else(|| UNKNOWN.to_string(), |m| m.name))
    }

    async fn product_names(
        &self,
        db_tx: &DatabaseTransaction,
        ids: BTreeSet<Uuid>,
    ) -> ResultEngine<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(db_tx)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }

    async fn broker_names(
        &self,
        db_tx: &DatabaseTransaction,
        ids: BTreeSet<Uuid>,
    ) -> ResultEngine<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = brokers::Entity::find()
            .filter(brokers::Column::Id.is_in(ids))
            .all(db_tx)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }

    async fn operator_names(
        &self,
        db_tx: &DatabaseTransaction,
        ids: BTreeSet<Uuid>,
    ) -> ResultEngine<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = operators::Entity::find()
            .filter(operators::Column::Id.is_in(ids))
            .all(db_tx)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }
}
