//! Commission schedule resolution with deterministic tie-breaking.

use crate::domain::{CommissionSchedule, Decimal, Marketplace, TimeMs};
use serde::{Deserialize, Serialize};

/// The single commission rate to apply at one instant. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResolution {
    /// Effective fraction to charge on the sales price.
    pub rate: Decimal,
    /// True when a campaign override won; false means the fallback applied.
    pub is_campaign_active: bool,
    /// The winning campaign's label, when one won.
    pub campaign_name: Option<String>,
    /// The winning schedule's row id, for attribution.
    pub schedule_id: Option<i64>,
}

impl CommissionResolution {
    /// The no-campaign resolution carrying the product's own rate.
    pub fn fallback(rate: Decimal) -> Self {
        CommissionResolution {
            rate,
            is_campaign_active: false,
            campaign_name: None,
            schedule_id: None,
        }
    }
}

/// Resolve the commission rate for a product at `now`.
///
/// A schedule competes only when its kill-switch is on, its marketplace
/// matches, and `now` lies inside its half-open window. Among competitors a
/// product-scoped schedule always beats a store-wide one, regardless of
/// which started later. Within one scope the latest `valid_from` wins, and
/// an exact start-time tie goes to the larger id (the later-created row).
/// With no competitor the product's own `fallback_rate` carries.
pub fn resolve_commission_rate(
    product_id: i64,
    marketplace: &Marketplace,
    schedules: &[CommissionSchedule],
    fallback_rate: Decimal,
    now: TimeMs,
) -> CommissionResolution {
    let active = schedules
        .iter()
        .filter(|s| s.marketplace == *marketplace && s.is_in_window(now));

    let mut product_winner: Option<&CommissionSchedule> = None;
    let mut store_winner: Option<&CommissionSchedule> = None;

    for schedule in active {
        match schedule.product_id {
            Some(pid) if pid == product_id => {
                product_winner = Some(newer(product_winner, schedule));
            }
            Some(_) => {}
            None => {
                store_winner = Some(newer(store_winner, schedule));
            }
        }
    }

    match product_winner.or(store_winner) {
        Some(winner) => CommissionResolution {
            rate: winner.campaign_rate,
            is_campaign_active: true,
            campaign_name: Some(winner.campaign_name.clone()),
            schedule_id: Some(winner.id),
        },
        None => CommissionResolution::fallback(fallback_rate),
    }
}

/// Pick the schedule with the later `valid_from`; ties go to the larger id.
fn newer<'a>(
    current: Option<&'a CommissionSchedule>,
    candidate: &'a CommissionSchedule,
) -> &'a CommissionSchedule {
    match current {
        None => candidate,
        Some(held) => {
            if (candidate.valid_from, candidate.id) > (held.valid_from, held.id) {
                candidate
            } else {
                held
            }
        }
    }
}
