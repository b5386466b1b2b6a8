pub mod analytics;
pub mod app;
pub mod assistant;
pub mod benchmarks;
pub mod challenges;
pub mod clock;
pub mod config;
pub mod context;
pub mod format;
pub mod goals;
pub mod ledger;
pub mod merchants;
pub mod models;
pub mod reflection;
pub mod seed;
pub mod storage;
pub mod tips;
