//! Cash taken from the desk to the bank.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banking {
    pub id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount_banked: Money,
    pub reference: Option<String>,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bankings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub item: String,
    pub amount_banked_minor: i64,
    pub reference: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Banking> for ActiveModel {
    fn from(banking: &Banking) -> Self {
        Self {
            id: ActiveValue::Set(banking.id),
            date: ActiveValue::Set(banking.date),
            site_id: ActiveValue::Set(banking.site_id),
            operator_id: ActiveValue::Set(banking.operator_id),
            item: ActiveValue::Set(banking.item.clone()),
            amount_banked_minor: ActiveValue::Set(banking.amount_banked.minor()),
            reference: ActiveValue::Set(banking.reference.clone()),
            active: ActiveValue::Set(banking.active),
        }
    }
}

impl From<Model> for Banking {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            site_id: model.site_id,
            operator_id: model.operator_id,
            item: model.item,
            amount_banked: Money::new(model.amount_banked_minor),
            reference: model.reference,
            active: model.active,
        }
    }
}
