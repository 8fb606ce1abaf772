pub mod config;
pub mod decision;
pub mod error;
pub mod reports;
pub mod router;
pub mod service;
pub mod synthesis;
pub mod telemetry;
