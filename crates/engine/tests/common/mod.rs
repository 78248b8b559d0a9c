#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use migration::MigratorTrait;
use quarry_engine::{Engine, Money, NewSale, PaymentStatus, Quantity, SiteFees};
use uuid::Uuid;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

/// One site with loader fee 50 and land rate 30, two clerks and a few products.
pub struct Desk {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub site: Uuid,
    pub clerk: Uuid,
    pub other_clerk: Uuid,
    pub gravel: Uuid,
    pub hardcore: Uuid,
    pub broker: Uuid,
}

pub fn standard_fees() -> SiteFees {
    SiteFees {
        loader_fee: Some(Money::major(50)),
        land_rate_fee: Some(Money::major(30)),
        rejects_fee: None,
    }
}

pub async fn desk() -> Desk {
    let (engine, db) = engine_with_db().await;
    let site = engine.new_site("North Pit", standard_fees()).await.unwrap();
    let clerk = engine.new_operator("Wanjiku").await.unwrap();
    let other_clerk = engine.new_operator("Kamau").await.unwrap();
    let gravel = engine.new_product("Gravel").await.unwrap();
    let hardcore = engine.new_product("Hardcore Premium").await.unwrap();
    let broker = engine.new_broker("Otieno").await.unwrap();
    Desk {
        engine,
        db,
        site,
        clerk,
        other_clerk,
        gravel,
        hardcore,
        broker,
    }
}

impl Desk {
    /// A paid sale at 20 per unit with a commission of 2 per unit.
    pub fn paid_sale(&self, day: u32, units: i64) -> NewSale {
        NewSale {
            commission_per_unit: Money::major(2),
            payment_status: PaymentStatus::Paid,
            ..NewSale::new(
                date(day),
                self.site,
                self.clerk,
                "KBX 123A",
                Some(self.gravel),
                Quantity::units(units),
                Money::major(20),
            )
        }
    }
}
