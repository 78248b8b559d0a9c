//! Daily fuel stock sheet of a site.
//!
//! Fuel is tracked per site, never per operator.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Quantity;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelUsage {
    pub id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub old_stock: Quantity,
    pub new_stock: Quantity,
    pub machine_consumption: Quantity,
    pub loader_consumption: Quantity,
    /// `new_stock − machine_consumption − loader_consumption`, fixed when the
    /// row is recorded.
    pub balance: Quantity,
    pub active: bool,
}

impl FuelUsage {
    pub fn computed_balance(
        new_stock: Quantity,
        machine_consumption: Quantity,
        loader_consumption: Quantity,
    ) -> Quantity {
        new_stock - machine_consumption - loader_consumption
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fuel_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub site_id: Uuid,
    pub old_stock_milli: i64,
    pub new_stock_milli: i64,
    pub machine_consumption_milli: i64,
    pub loader_consumption_milli: i64,
    pub balance_milli: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FuelUsage> for ActiveModel {
    fn from(usage: &FuelUsage) -> Self {
        Self {
            id: ActiveValue::Set(usage.id),
            date: ActiveValue::Set(usage.date),
            site_id: ActiveValue::Set(usage.site_id),
            old_stock_milli: ActiveValue::Set(usage.old_stock.milli()),
            new_stock_milli: ActiveValue::Set(usage.new_stock.milli()),
            machine_consumption_milli: ActiveValue::Set(usage.machine_consumption.milli()),
            loader_consumption_milli: ActiveValue::Set(usage.loader_consumption.milli()),
            balance_milli: ActiveValue::Set(usage.balance.milli()),
            active: ActiveValue::Set(usage.active),
        }
    }
}

impl From<Model> for FuelUsage {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            site_id: model.site_id,
            old_stock: Quantity::from_milli(model.old_stock_milli),
            new_stock: Quantity::from_milli(model.new_stock_milli),
            machine_consumption: Quantity::from_milli(model.machine_consumption_milli),
            loader_consumption: Quantity::from_milli(model.loader_consumption_milli),
            balance: Quantity::from_milli(model.balance_milli),
            active: model.active,
        }
    }
}
