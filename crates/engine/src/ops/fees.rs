use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Site, SiteFees, sites};

use super::{Engine, with_tx};

impl Engine {
    /// Return the fee schedule of a site.
    pub async fn site_fees(&self, site_id: Uuid) -> ResultEngine<SiteFees> {
        with_tx!(self, |db_tx| {
            let site = self.require_site(&db_tx, site_id).await?;
            Ok(site.fees)
        })
    }

    /// Return a site snapshot from DB.
    pub async fn site(&self, site_id: Uuid) -> ResultEngine<Site> {
        with_tx!(self, |db_tx| self.require_site(&db_tx, site_id).await)
    }

    pub(super) async fn find_site(
        &self,
        db_tx: &DatabaseTransaction,
        site_id: Uuid,
    ) -> ResultEngine<Option<Site>> {
        let model = sites::Entity::find_by_id(site_id).one(db_tx).await?;
        Ok(model.map(Site::from))
    }

    pub(super) async fn require_site(
        &self,
        db_tx: &DatabaseTransaction,
        site_id: Uuid,
    ) -> ResultEngine<Site> {
        self.find_site(db_tx, site_id)
            .await?
            .ok_or_else(|| EngineError::SiteNotFound(site_id.to_string()))
    }
}
