pub mod api;
pub mod capture;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod views;

pub use capture::{CaptureSlot, ProductCapture};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    CommissionSchedule, Decimal, Marketplace, OrderLine, Product, RateType, ScheduleState,
    ShippingRateTier, StoreId, TimeMs,
};
pub use error::AppError;
pub use views::{FinancialView, Refresher, ResolvedProduct};
