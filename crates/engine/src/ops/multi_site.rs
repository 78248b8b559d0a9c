use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{DateRange, ReportData, ReportKind, ResultEngine, sites, util::UNKNOWN};

use super::{Engine, queries::Scope, with_tx};

const ALL_SITES: &str = "All Sites";

impl Engine {
    /// Merge the reports of several sites over `range`.
    ///
    /// Read-only: the ledger is never written, whatever the range. Unknown
    /// or repeated ids add nothing.
    pub async fn build_multi_site_history(
        &self,
        site_ids: &[Uuid],
        range: DateRange,
    ) -> ResultEngine<ReportData> {
        range.validate()?;
        with_tx!(self, |db_tx| {
            let mut seen = HashSet::new();
            let site_ids: Vec<Uuid> = site_ids
                .iter()
                .copied()
                .filter(|id| seen.insert(*id))
                .collect();
            let parts = self
                .site_parts(&db_tx, ReportKind::MultiSite, &site_ids, range, None)
                .await?;

            let names: Vec<&str> = parts.iter().map(|part| part.site_name.as_str()).collect();
            let site_name = if names.is_empty() {
                UNKNOWN.to_string()
            } else {
                names.join(", ")
            };
            Ok(ReportData::merge(
                ReportKind::MultiSite,
                range,
                site_name,
                parts,
            ))
        })
    }

    /// Manager view over every site, optionally narrowed to one operator.
    pub(super) async fn all_sites_report(
        &self,
        db_tx: &DatabaseTransaction,
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<ReportData> {
        let site_ids: Vec<Uuid> = sites::Entity::find()
            .order_by_asc(sites::Column::Name)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();
        let parts = self
            .site_parts(db_tx, ReportKind::Manager, &site_ids, range, operator_id)
            .await?;

        let mut report =
            ReportData::merge(ReportKind::Manager, range, ALL_SITES.to_string(), parts);
        if let Some(operator_id) = operator_id {
            report.operator_name = Some(self.operator_name(db_tx, operator_id).await?);
        }
        Ok(report)
    }

    /// Per-site reports of the existing sites among `site_ids`, in order.
    async fn site_parts(
        &self,
        db_tx: &DatabaseTransaction,
        kind: ReportKind,
        site_ids: &[Uuid],
        range: DateRange,
        operator_id: Option<Uuid>,
    ) -> ResultEngine<Vec<ReportData>> {
        let mut parts = Vec::with_capacity(site_ids.len());
        for &site_id in site_ids {
            let scope = Scope {
                site_id,
                range,
                operator_id,
            };
            match self.build_site_report(db_tx, kind, scope).await? {
                Some(part) => parts.push(part),
                None => tracing::warn!(site = %site_id, "site not found, skipped"),
            }
        }
        Ok(parts)
    }
}
