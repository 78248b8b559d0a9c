//! Sales recorded at the desk.
//!
//! A sale is dated by when the goods left the site. Payment may arrive later:
//! the settlement is tracked by `payment_status` and `payment_received_on`, and
//! reports attribute it to the period in which it was received.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, Quantity};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidData(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
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
    pub payment_received_on: Option<NaiveDate>,
    pub include_land_rate: bool,
    pub active: bool,
}

impl Sale {
    /// `quantity × price_per_unit`.
    pub fn gross_amount(&self) -> Money {
        self.price_per_unit.times(self.quantity)
    }

    /// `quantity × commission_per_unit`.
    pub fn commission_amount(&self) -> Money {
        self.commission_per_unit.times(self.quantity)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub vehicle_registration: String,
    pub product_id: Option<Uuid>,
    pub quantity_milli: i64,
    pub price_per_unit_minor: i64,
    pub commission_per_unit_minor: i64,
    pub broker_id: Option<Uuid>,
    pub client: Option<String>,
    pub reference: Option<String>,
    pub payment_status: String,
    pub payment_received_date: Option<Date>,
    pub include_land_rate: bool,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sites::Entity",
        from = "Column::SiteId",
        to = "super::sites::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sites,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Sale> for ActiveModel {
    fn from(sale: &Sale) -> Self {
        Self {
            id: ActiveValue::Set(sale.id),
            date: ActiveValue::Set(sale.date),
            site_id: ActiveValue::Set(sale.site_id),
            operator_id: ActiveValue::Set(sale.operator_id),
            vehicle_registration: ActiveValue::Set(sale.vehicle_registration.clone()),
            product_id: ActiveValue::Set(sale.product_id),
            quantity_milli: ActiveValue::Set(sale.quantity.milli()),
            price_per_unit_minor: ActiveValue::Set(sale.price_per_unit.minor()),
            commission_per_unit_minor: ActiveValue::Set(sale.commission_per_unit.minor()),
            broker_id: ActiveValue::Set(sale.broker_id),
            client: ActiveValue::Set(sale.client.clone()),
            reference: ActiveValue::Set(sale.reference.clone()),
            payment_status: ActiveValue::Set(sale.payment_status.as_str().to_string()),
            payment_received_date: ActiveValue::Set(sale.payment_received_on),
            include_land_rate: ActiveValue::Set(sale.include_land_rate),
            active: ActiveValue::Set(sale.active),
        }
    }
}

impl TryFrom<Model> for Sale {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            date: model.date,
            site_id: model.site_id,
            operator_id: model.operator_id,
            vehicle_registration: model.vehicle_registration,
            product_id: model.product_id,
            quantity: Quantity::from_milli(model.quantity_milli),
            price_per_unit: Money::new(model.price_per_unit_minor),
            commission_per_unit: Money::new(model.commission_per_unit_minor),
            broker_id: model.broker_id,
            client: model.client,
            reference: model.reference,
            payment_status: PaymentStatus::try_from(model.payment_status.as_str())?,
            payment_received_on: model.payment_received_date,
            include_land_rate: model.include_land_rate,
            active: model.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(quantity: Quantity) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            site_id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            vehicle_registration: "KBX 123A".to_string(),
            product_id: None,
            quantity,
            price_per_unit: Money::major(20),
            commission_per_unit: Money::major(2),
            broker_id: None,
            client: None,
            reference: None,
            payment_status: PaymentStatus::Unpaid,
            payment_received_on: None,
            include_land_rate: true,
            active: true,
        }
    }

    #[test]
    fn gross_and_commission_amounts() {
        let sale = sale(Quantity::units(100));
        assert_eq!(sale.gross_amount(), Money::major(2_000));
        assert_eq!(sale.commission_amount(), Money::major(200));
        assert!(!sale.is_paid());
    }

    #[test]
    fn rejects_unknown_payment_status() {
        let err = PaymentStatus::try_from("partial").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidData("invalid payment status: partial".to_string())
        );
    }
}
