use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Use it when
/// the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a working
/// configuration aimed at the public lookup service.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let non_empty = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }
        Ok(trimmed.trim_end_matches('/').to_string())
    };

    let env = parse_environment(&or_default("MCSCOUT_ENV", "development"))?;
    let bind_addr = parse_addr("MCSCOUT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("MCSCOUT_LOG_LEVEL", "info");

    let snapshot_url = non_empty(
        "MCSCOUT_SNAPSHOT_URL",
        "https://safer.fmcsa.dot.gov/query.asp",
    )?;
    let snapshot_origin = non_empty("MCSCOUT_SNAPSHOT_ORIGIN", "https://safer.fmcsa.dot.gov")?;
    let sms_origin = non_empty("MCSCOUT_SMS_ORIGIN", "http://ai.fmcsa.dot.gov")?;

    let request_timeout_secs = parse_u64("MCSCOUT_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MCSCOUT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    let user_agent = or_default("MCSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let pacing_delay_ms = parse_u64("MCSCOUT_PACING_DELAY_MS", "1000")?;
    let politeness_delay_ms = parse_u64("MCSCOUT_POLITENESS_DELAY_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        snapshot_url,
        snapshot_origin,
        sms_origin,
        request_timeout_secs,
        user_agent,
        pacing_delay_ms,
        politeness_delay_ms,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MCSCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
