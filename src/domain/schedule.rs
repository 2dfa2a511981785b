//! Commission schedule: a time-boxed override of the marketplace commission rate.

use crate::domain::{Decimal, Marketplace, StoreId, TimeMs};
use serde::{Deserialize, Serialize};

/// A commission campaign, store-wide or scoped to one product.
///
/// The window is half-open `[valid_from, valid_until)`: a schedule is no
/// longer active at exactly `valid_until`. Whether a schedule is active is
/// never stored; it is recomputed from the timestamps on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSchedule {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning seller store.
    pub store_id: StoreId,
    /// Marketplace channel the campaign applies to.
    pub marketplace: Marketplace,
    /// Scope: `None` means store-wide for this marketplace, `Some` pins one product.
    pub product_id: Option<i64>,
    /// The rate that applies outside the campaign window, a fraction in [0,1).
    pub normal_rate: Decimal,
    /// The override rate while the campaign is active, a fraction in [0,1).
    pub campaign_rate: Decimal,
    /// Free-text campaign label.
    pub campaign_name: String,
    /// Window start (inclusive).
    pub valid_from: TimeMs,
    /// Window end (exclusive).
    pub valid_until: TimeMs,
    /// Fraction of the rate cut funded by the seller. Informational,
    /// carried through to analytics, never consumed by rate resolution.
    pub seller_discount_share: Decimal,
    /// Fraction of the rate cut funded by the marketplace. Informational.
    pub marketplace_discount_share: Decimal,
    /// Manual kill-switch, independent of the time window. Clearing it is
    /// terminal; reactivation means creating a new schedule.
    pub is_active: bool,
}

/// Field set for creating a schedule row.
///
/// Identical to [`CommissionSchedule`] minus the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommissionSchedule {
    pub store_id: StoreId,
    pub marketplace: Marketplace,
    pub product_id: Option<i64>,
    pub normal_rate: Decimal,
    pub campaign_rate: Decimal,
    pub campaign_name: String,
    pub valid_from: TimeMs,
    pub valid_until: TimeMs,
    pub seller_discount_share: Decimal,
    pub marketplace_discount_share: Decimal,
    pub is_active: bool,
}

/// Lifecycle state of a schedule at a given instant. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleState {
    /// The window has not opened yet.
    Upcoming,
    /// In-window and not deactivated.
    Active,
    /// The window has closed.
    Expired,
    /// Manually killed, regardless of the window.
    Deactivated,
}

impl CommissionSchedule {
    /// Lifecycle state at `now`. Deactivation takes precedence over the window.
    pub fn state_at(&self, now: TimeMs) -> ScheduleState {
        if !self.is_active {
            return ScheduleState::Deactivated;
        }
        if now < self.valid_from {
            ScheduleState::Upcoming
        } else if now >= self.valid_until {
            ScheduleState::Expired
        } else {
            ScheduleState::Active
        }
    }

    /// True when the campaign rate applies at `now`.
    pub fn is_in_window(&self, now: TimeMs) -> bool {
        self.state_at(now) == ScheduleState::Active
    }
}

impl std::fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleState::Upcoming => write!(f, "upcoming"),
            ScheduleState::Active => write!(f, "active"),
            ScheduleState::Expired => write!(f, "expired"),
            ScheduleState::Deactivated => write!(f, "deactivated"),
        }
    }
}
