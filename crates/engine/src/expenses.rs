//! Manual expenses entered by clerks (diesel top-ups, casual labour, ...).

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount: Money,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount_minor: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            date: ActiveValue::Set(expense.date),
            site_id: ActiveValue::Set(expense.site_id),
            operator_id: ActiveValue::Set(expense.operator_id),
            item: ActiveValue::Set(expense.item.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            active: ActiveValue::Set(expense.active),
        }
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            site_id: model.site_id,
            operator_id: model.operator_id,
            item: model.item,
            amount: Money::new(model.amount_minor),
            active: model.active,
        }
    }
}
