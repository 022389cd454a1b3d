use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

/// Largest accepted magnitude for the stats reference offset (just under one day).
const MAX_UTC_OFFSET_MINUTES: i32 = 1439;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub frontend_url: String,
    /// Offset of the zone whose midnights delimit the stats day buckets.
    pub stats_utc_offset_minutes: i32,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("BACKEND_PORT", 5000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiry_secs: parse_or("JWT_EXPIRY_SECS", 86400),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            stats_utc_offset_minutes: parse_or("STATS_UTC_OFFSET_MINUTES", 0)
                .clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES),
            tls_cert_path: env::var("TLS_CERT_PATH").ok().filter(|s| !s.is_empty()),
            tls_key_path: env::var("TLS_KEY_PATH").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Reference zone for day bucketing in the report statistics.
    pub fn stats_timezone(&self) -> FixedOffset {
        offset_from_minutes(self.stats_utc_offset_minutes)
    }

    /// Both TLS paths, when TLS termination is configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Read an environment variable, falling back to `default` when unset or unparseable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn offset_from_minutes(minutes: i32) -> FixedOffset {
    let minutes = minutes.clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES);
    FixedOffset::east_opt(minutes * 60).unwrap_or(Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/crisisconnect".to_string(),
            database_max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: "secret".to_string(),
            jwt_expiry_secs: 86400,
            frontend_url: "http://localhost:5173".to_string(),
            stats_utc_offset_minutes: 0,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    #[test]
    fn default_stats_timezone_is_utc() {
        assert_eq!(config().stats_timezone().local_minus_utc(), 0);
    }

    #[test]
    fn stats_timezone_uses_configured_offset() {
        let cfg = AppConfig {
            stats_utc_offset_minutes: 330,
            ..config()
        };
        assert_eq!(cfg.stats_timezone().local_minus_utc(), 330 * 60);

        let cfg = AppConfig {
            stats_utc_offset_minutes: -300,
            ..config()
        };
        assert_eq!(cfg.stats_timezone().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn out_of_range_offset_is_clamped() {
        assert_eq!(offset_from_minutes(5000).local_minus_utc(), 1439 * 60);
        assert_eq!(offset_from_minutes(-5000).local_minus_utc(), -1439 * 60);
    }

    #[test]
    fn tls_requires_both_paths() {
        let cfg = AppConfig {
            tls_cert_path: Some("cert.pem".to_string()),
            ..config()
        };
        assert!(cfg.tls_paths().is_none());

        let cfg = AppConfig {
            tls_cert_path: Some("cert.pem".to_string()),
            tls_key_path: Some("key.pem".to_string()),
            ..config()
        };
        assert_eq!(cfg.tls_paths(), Some(("cert.pem", "key.pem")));
    }
}
