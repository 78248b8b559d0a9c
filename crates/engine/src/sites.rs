//! Quarry sites and their per-unit fee schedule.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// Per-unit fees charged against a site's sales.
///
/// A fee that is absent (or not strictly positive) is disabled: its expense
/// source contributes nothing to a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFees {
    pub loader_fee: Option<Money>,
    pub land_rate_fee: Option<Money>,
    pub rejects_fee: Option<Money>,
}

impl SiteFees {
    /// Loader fee per unit, if enabled.
    pub fn loader_rate(&self) -> Option<Money> {
        self.loader_fee.filter(|fee| fee.is_positive())
    }

    /// Land-rate fee per unit, if enabled.
    pub fn land_rate(&self) -> Option<Money> {
        self.land_rate_fee.filter(|fee| fee.is_positive())
    }

    /// Land-rate fee per unit charged on rejects, if enabled.
    pub fn rejects_rate(&self) -> Option<Money> {
        self.rejects_fee.filter(|fee| fee.is_positive())
    }

    /// Whether reports show the land-rate column for this site.
    pub fn land_rate_visible(&self) -> bool {
        self.land_rate().is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub fees: SiteFees,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub loader_fee_minor: Option<i64>,
    pub land_rate_fee_minor: Option<i64>,
    pub rejects_fee_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Site {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            fees: SiteFees {
                loader_fee: model.loader_fee_minor.map(Money::new),
                land_rate_fee: model.land_rate_fee_minor.map(Money::new),
                rejects_fee: model.rejects_fee_minor.map(Money::new),
            },
        }
    }
}

impl From<&Site> for ActiveModel {
    fn from(site: &Site) -> Self {
        Self {
            id: ActiveValue::Set(site.id),
            name: ActiveValue::Set(site.name.clone()),
            loader_fee_minor: ActiveValue::Set(site.fees.loader_fee.map(Money::minor)),
            land_rate_fee_minor: ActiveValue::Set(site.fees.land_rate_fee.map(Money::minor)),
            rejects_fee_minor: ActiveValue::Set(site.fees.rejects_fee.map(Money::minor)),
        }
    }
}
