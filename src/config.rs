use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// The three redirect destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrls {
    /// App Store product page.
    pub ios: String,
    /// Play Store package page.
    pub android: String,
    /// Marketing site for everything else.
    pub fallback: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub redirect_path: String,
    pub store_urls: StoreUrls,
    pub rules_path: Option<PathBuf>,
    pub error_report_url: Option<String>,
}

/// Load configuration from the process environment.
///
/// `.env` is not read here; the binary loads it once at startup, before
/// argument parsing, so clap's `env` fallbacks see it too.
///
/// # Errors
///
/// Returns an error if required variables are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation against an arbitrary lookup, so tests can feed a
/// plain map instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let bind_raw = or_default("ABRODY_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| Error::InvalidEnvVar {
            var: "ABRODY_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("ABRODY_LOG_LEVEL", "info");

    let redirect_path = or_default("ABRODY_REDIRECT_PATH", "/download");
    if !redirect_path.starts_with('/') || redirect_path == "/health" {
        return Err(Error::InvalidEnvVar {
            var: "ABRODY_REDIRECT_PATH".to_string(),
            reason: format!("{redirect_path:?} must start with '/' and not be /health"),
        });
    }

    let store_urls = StoreUrls {
        ios: validate_url("ABRODY_IOS_STORE_URL", require("ABRODY_IOS_STORE_URL")?)?,
        android: validate_url("ABRODY_ANDROID_STORE_URL", require("ABRODY_ANDROID_STORE_URL")?)?,
        fallback: validate_url("ABRODY_FALLBACK_URL", require("ABRODY_FALLBACK_URL")?)?,
    };

    let rules_path = optional("ABRODY_OS_RULES_PATH").map(PathBuf::from);
    let error_report_url = optional("ABRODY_ERROR_REPORT_URL")
        .map(|raw| validate_url("ABRODY_ERROR_REPORT_URL", raw))
        .transpose()?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        redirect_path,
        store_urls,
        rules_path,
        error_report_url,
    })
}

/// Absolute `http`/`https` URL that is also a valid `Location` value.
fn validate_url(var: &str, raw: String) -> Result<String> {
    let invalid = |reason: String| Error::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    Ok(raw.trim().to_string())
}
