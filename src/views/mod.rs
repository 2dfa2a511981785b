//! On-demand recomputation of derived financial views.
//!
//! Resolved profit and commission figures are never persisted; they are a
//! function of the reference tables (products, shipping tiers, commission
//! schedules) and of wall-clock time. This module caches one computed view
//! per `(store, marketplace)` scope and recomputes it when either input
//! moved: the scope's reference revision, or the clock crossing a campaign
//! window boundary.

use crate::db::Repository;
use crate::domain::{CommissionSchedule, Marketplace, Product, StoreId, TimeMs};
use crate::engine::{resolve_product_financials, ProductFinancials, ShippingRateTable};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// One product paired with its resolved financials inside a computed view.
///
/// Both halves come from the same snapshot of the reference tables; a
/// concurrent edit never produces a product from one state and financials
/// from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub financials: ProductFinancials,
}

/// One computed financial view covering every product in a scope.
#[derive(Debug, Clone)]
pub struct FinancialView {
    /// Reference revision the view was computed from.
    pub revision: i64,
    /// Instant the view was computed at.
    pub computed_at: TimeMs,
    /// Earliest campaign window edge after `computed_at`, when one exists.
    /// The view must not be served once the clock passes it.
    pub next_boundary: Option<TimeMs>,
    /// Every product in the scope with its financials, in product id order.
    pub items: Vec<ResolvedProduct>,
}

impl FinancialView {
    fn is_fresh(&self, revision: i64, now: TimeMs) -> bool {
        if self.revision != revision {
            return false;
        }
        match self.next_boundary {
            Some(boundary) => now < boundary,
            None => true,
        }
    }
}

/// Earliest window edge strictly after `now` among live schedules.
///
/// Crossing a `valid_from` or `valid_until` can flip a campaign on or off,
/// so any view computed before such an edge is stale once the clock passes
/// it. Deactivated schedules have no edges; they never become active again.
pub fn next_window_boundary(schedules: &[CommissionSchedule], now: TimeMs) -> Option<TimeMs> {
    schedules
        .iter()
        .filter(|s| s.is_active)
        .flat_map(|s| [s.valid_from, s.valid_until])
        .filter(|edge| *edge > now)
        .min()
}

/// Serves fresh financial views, recomputing only when needed.
pub struct Refresher {
    repo: Arc<Repository>,
    views: RwLock<HashMap<(StoreId, Marketplace), Arc<FinancialView>>>,
}

impl Refresher {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Return the scope's financial view as of `now`.
    ///
    /// The cached view is reused only while the scope's reference revision
    /// is unchanged and `now` has not crossed the view's next campaign
    /// window boundary; otherwise the whole scope is recomputed from the
    /// reference tables.
    pub async fn ensure_fresh(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
        now: TimeMs,
    ) -> Result<Arc<FinancialView>, sqlx::Error> {
        let revision = self.repo.get_revision(store_id, marketplace).await?;
        let key = (store_id.clone(), marketplace.clone());

        {
            let views = self.views.read().await;
            if let Some(view) = views.get(&key) {
                if view.is_fresh(revision, now) {
                    return Ok(view.clone());
                }
            }
        }

        let view = Arc::new(self.compute(store_id, marketplace, revision, now).await?);
        self.views.write().await.insert(key, view.clone());
        Ok(view)
    }

    async fn compute(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
        revision: i64,
        now: TimeMs,
    ) -> Result<FinancialView, sqlx::Error> {
        let products = self.repo.list_products(store_id, marketplace).await?;
        let tiers = self.repo.list_visible_tiers(store_id, marketplace).await?;
        let schedules = self.repo.list_schedules(store_id, marketplace).await?;

        let table = ShippingRateTable::from_rows(tiers);
        let items = products
            .into_iter()
            .map(|product| {
                let financials = resolve_product_financials(&product, &table, &schedules, now);
                ResolvedProduct {
                    product,
                    financials,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            store_id = %store_id,
            marketplace = %marketplace,
            revision,
            products = items.len(),
            "Recomputed financial view"
        );

        Ok(FinancialView {
            revision,
            computed_at: now,
            next_boundary: next_window_boundary(&schedules, now),
            items,
        })
    }
}
