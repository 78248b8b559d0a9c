//! Daily closing balances.
//!
//! A day's closing cash-in-hand is the next day's opening balance. Rows are
//! only written by single-day reports, one atomic upsert per report.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{Money, ResultEngine, daily_balances, util::previous_day};

use super::{Engine, with_tx};

impl Engine {
    /// Closing balance of the day before `date`, zero when never recorded.
    pub async fn opening_balance(&self, site_id: Uuid, date: NaiveDate) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| self
            .read_opening_balance(&db_tx, site_id, date)
            .await)
    }

    pub async fn closing_balance(
        &self,
        site_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Option<Money>> {
        with_tx!(self, |db_tx| self
            .read_closing_balance(&db_tx, site_id, date)
            .await)
    }

    /// Insert or overwrite the closing balance of `(site_id, date)`.
    ///
    /// Last write wins.
    pub async fn upsert_closing_balance(
        &self,
        site_id: Uuid,
        date: NaiveDate,
        value: Money,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, site_id).await?;
            self.write_closing_balance(&db_tx, site_id, date, value)
                .await
        })
    }

    pub(super) async fn read_closing_balance(
        &self,
        db_tx: &DatabaseTransaction,
        site_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Option<Money>> {
        let model = daily_balances::Entity::find_by_id((site_id, date))
            .one(db_tx)
            .await?;
        Ok(model.map(|m| Money::new(m.closing_balance_minor)))
    }

    pub(super) async fn read_opening_balance(
        &self,
        db_tx: &DatabaseTransaction,
        site_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Money> {
        let Some(day_before) = previous_day(date) else {
            return Ok(Money::ZERO);
        };
        let closing = self.read_closing_balance(db_tx, site_id, day_before).await?;
        Ok(closing.unwrap_or_default())
    }

    pub(super) async fn write_closing_balance(
        &self,
        db_tx: &DatabaseTransaction,
        site_id: Uuid,
        date: NaiveDate,
        value: Money,
    ) -> ResultEngine<()> {
        let model = daily_balances::ActiveModel {
            site_id: ActiveValue::Set(site_id),
            date: ActiveValue::Set(date),
            closing_balance_minor: ActiveValue::Set(value.minor()),
        };
        daily_balances::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    daily_balances::Column::SiteId,
                    daily_balances::Column::Date,
                ])
                .update_column(daily_balances::Column::ClosingBalanceMinor)
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        tracing::info!(site = %site_id, %date, closing = %value, "closing balance stored");

        Ok(())
    }
}
