use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    CollectionRow, Collections, DateRange, Prepayment, PrepaymentRow, Prepayments, ResultEngine,
    Sale, util::UNKNOWN,
};

use super::{
    Engine,
    queries::{NameKeys, Names, Scope},
    with_tx,
};

impl Engine {
    /// Payments received in `range` for sales made before it.
    pub async fn collections(
        &self,
        site_id: Uuid,
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<Collections> {
        range.validate()?;
        let scope = Scope {
            site_id,
            range,
            operator_id,
        };
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, site_id).await?;
            let sales = self.load_collected_sales(&db_tx, &scope).await?;
            let mut keys = NameKeys::default();
            keys.add_sales(&sales);
            let names = self.load_names(&db_tx, keys).await?;
            Ok(collection_rows(&sales, &names))
        })
    }

    /// Deposits taken in `range`.
    pub async fn prepayments(
        &self,
        site_id: Uuid,
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<Prepayments> {
        range.validate()?;
        let scope = Scope {
            site_id,
            range,
            operator_id,
        };
        with_tx!(self, |db_tx| {
            self.require_site(&db_tx, site_id).await?;
            let prepayments = self.load_prepayments(&db_tx, &scope).await?;
            let mut keys = NameKeys::default();
            keys.add_prepayments(&prepayments);
            let names = self.load_names(&db_tx, keys).await?;
            Ok(prepayment_rows(&prepayments, &names))
        })
    }
}

pub(super) fn collection_rows(sales: &[Sale], names: &Names) -> Collections {
    let rows: Vec<CollectionRow> = sales
        .iter()
        .filter_map(|sale| {
            let received_on = sale.payment_received_on?;
            Some(CollectionRow {
                sale_date: sale.date,
                payment_received_on: received_on,
                vehicle_registration: sale.vehicle_registration.clone(),
                product_name: names.product(sale.product_id).to_string(),
                quantity: sale.quantity,
                amount: sale.gross_amount(),
                client: sale.client.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                reference: sale.reference.clone(),
            })
        })
        .collect();
    let total = rows.iter().map(|row| row.amount).sum();
    Collections { rows, total }
}

pub(super) fn prepayment_rows(prepayments: &[Prepayment], names: &Names) -> Prepayments {
    let rows: Vec<PrepaymentRow> = prepayments
        .iter()
        .map(|prepayment| PrepaymentRow {
            date: prepayment.date,
            vehicle_registration: prepayment.vehicle_registration.clone(),
            client: prepayment.client.clone(),
            product_name: names.intended_product(prepayment.product_id).to_string(),
            amount_paid: prepayment.amount_paid,
            reference: prepayment.reference.clone(),
        })
        .collect();
    let total = rows.iter().map(|row| row.amount_paid).sum();
    Prepayments { rows, total }
}
