use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// When unset the roster lives in memory.
    pub database_url: Option<String>,
    /// JSON roster used to seed the in-memory roster.
    pub roster_file: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Payroll
    pub sendgrid_api_key: String,
    pub sendgrid_endpoint: String,
    pub sender_email: String,
    pub payslip_dir: String,
    pub payroll_time: NaiveTime,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = or_default(key, default);
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let payroll_time = or_default("PAYROLL_TIME", "18:00");
        let payroll_time = NaiveTime::parse_from_str(&payroll_time, "%H:%M")
            .with_context(|| format!("PAYROLL_TIME={payroll_time:?} must look like HH:MM"))?;

        Ok(Self {
            server_addr: or_default("SERVER_ADDR", "127.0.0.1:8080"),
            database_url: env::var("DATABASE_URL").ok(),
            roster_file: env::var("ROSTER_FILE").ok(),
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", "900")?, // default 15 min

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: or_default("API_PREFIX", "/api"),

            sendgrid_api_key: required("SENDGRID_API_KEY")?,
            sendgrid_endpoint: or_default(
                "SENDGRID_ENDPOINT",
                "https://api.sendgrid.com/v3/mail/send",
            ),
            sender_email: required("SENDER_EMAIL")?,
            payslip_dir: or_default("PAYSLIP_DIR", "desprendibles"),
            payroll_time,

            log_dir: or_default("LOG_DIR", "logs"),
            log_level: parsed("LOG_LEVEL", "info")?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            roster_file: None,
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 900,
            rate_login_per_min: 10_000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            sendgrid_api_key: "SG.test".to_string(),
            sendgrid_endpoint: "http://127.0.0.1:9/v3/mail/send".to_string(),
            sender_email: "nomina@empresa.co".to_string(),
            payslip_dir: "desprendibles".to_string(),
            payroll_time: NaiveTime::from_hms_opt(18, 0, 0).expect("valid time"),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::INFO,
        }
    }
}
