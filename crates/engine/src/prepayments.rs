//! Customer deposits taken before the goods are collected.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prepayment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub client: String,
    pub vehicle_registration: Option<String>,
    /// Product the client intends to collect, if already known.
    pub product_id: Option<Uuid>,
    pub amount_paid: Money,
    pub reference: Option<String>,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "prepayments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub client: String,
    pub vehicle_registration: Option<String>,
    pub product_id: Option<Uuid>,
    pub amount_paid_minor: i64,
    pub reference: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Prepayment> for ActiveModel {
    fn from(prepayment: &Prepayment) -> Self {
        Self {
            id: ActiveValue::Set(prepayment.id),
            date: ActiveValue::Set(prepayment.date),
            site_id: ActiveValue::Set(prepayment.site_id),
            operator_id: ActiveValue::Set(prepayment.operator_id),
            client: ActiveValue::Set(prepayment.client.clone()),
            vehicle_registration: ActiveValue::Set(prepayment.vehicle_registration.clone()),
            product_id: ActiveValue::Set(prepayment.product_id),
            amount_paid_minor: ActiveValue::Set(prepayment.amount_paid.minor()),
            reference: ActiveValue::Set(prepayment.reference.clone()),
            active: ActiveValue::Set(prepayment.active),
        }
    }
}

impl From<Model> for Prepayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            site_id: model.site_id,
            operator_id: model.operator_id,
            client: model.client,
            vehicle_registration: model.vehicle_registration,
            product_id: model.product_id,
            amount_paid: Money::new(model.amount_paid_minor),
            reference: model.reference,
            active: model.active,
        }
    }
}
