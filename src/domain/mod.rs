//! Domain types and determinism layer for the marjin financial engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, StoreId, Marketplace
//! - Product, shipping tier, commission schedule and order line records
//!   with canonical JSON serialization
//! - Stable order line key helper for idempotent recording

pub mod decimal;
pub mod order;
pub mod primitives;
pub mod product;
pub mod schedule;
pub mod shipping;

pub use decimal::Decimal;
pub use order::OrderLine;
pub use primitives::{Marketplace, StoreId, TimeMs};
pub use product::{NewProduct, Product};
pub use schedule::{CommissionSchedule, NewCommissionSchedule, ScheduleState};
pub use shipping::{NewShippingRateTier, RateType, ShippingRateTier, UNBOUNDED_MAX};
