//! Environment-driven server configuration.

use std::time::Duration;

use interop_upstream::OpenEmrCredentials;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://telemetry.db?mode=rwc";
const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// SQLite URL for the execution table and raw telemetry log.
    pub database_url: String,
    /// Empty, or starts with `/` and has no trailing `/`.
    pub api_prefix: String,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
    /// Mirth PD endpoint; searches fail with a configuration error when unset.
    pub pd_endpoint_url: Option<String>,
    /// Password-grant credentials for the OpenEMR token endpoint.
    pub openemr: OpenEmrCredentials,
    /// Timeout applied to every upstream HTTP call.
    pub upstream_timeout: Duration,
    /// OTLP collector; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        // Blank values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let upstream_timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                AppError::Config(format!("UPSTREAM_TIMEOUT_SECS must be a whole number: {e}"))
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        let api_prefix = normalize_prefix(
            &lookup("API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_owned()),
        )?;
        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            api_prefix,
            allowed_origins,
            pd_endpoint_url: get("MIRTH_PD_ENDPOINT_URL"),
            openemr: OpenEmrCredentials {
                token_url: get("OPENEMR_TOKEN_URL"),
                client_id: get("OPENEMR_CLIENT_ID"),
                client_secret: get("OPENEMR_CLIENT_SECRET"),
                username: get("OPENEMR_USERNAME"),
                password: get("OPENEMR_PASSWORD"),
                scope: get("OPENEMR_SCOPE"),
                user_role: get("OPENEMR_USER_ROLE"),
            },
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn normalize_prefix(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(AppError::Config(format!(
            "API_PREFIX must start with '/', got {raw:?}"
        )));
    }
    Ok(trimmed.to_owned())
}
