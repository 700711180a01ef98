pub mod app_config;
pub mod carrier;
mod config;

pub use app_config::{AppConfig, Environment};
pub use carrier::{AcquisitionRequest, CarrierRecord, EntityType};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid entity type: {0} (expected carrier, broker, or shipper)")]
    InvalidEntityType(String),

    #[error("invalid identifier range: end {end} is below start {start}")]
    InvalidRange { start: u64, end: u64 },
}
