use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveTime};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::report::aggregator::{ReportPolicy, WeekendPolicy};
use crate::report::classifier::ClassifierRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DataSourceKind {
    Postgres,
    File,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub data_source: DataSourceKind,
    pub database_url: Option<String>,
    pub data_file: Option<String>,

    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_reports_per_min: u32,

    pub directory_cache_ttl: Duration,

    // Business rules
    pub report_policy: ReportPolicy,
    /// Pins "today" for dashboard reports (replays, demos).
    pub report_today: Option<NaiveDate>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_source = parse_or(&var, "DATA_SOURCE", DataSourceKind::Postgres)?;
        let database_url = var("DATABASE_URL");
        let data_file = var("DATA_FILE");

        match data_source {
            DataSourceKind::Postgres if database_url.is_none() => {
                return Err(anyhow!("DATABASE_URL must be set when DATA_SOURCE=postgres"));
            }
            DataSourceKind::File if data_file.is_none() => {
                return Err(anyhow!("DATA_FILE must be set when DATA_SOURCE=file"));
            }
            _ => {}
        }

        let rules = ClassifierRules {
            late_after: time_or(&var, "LATE_AFTER", ClassifierRules::default().late_after)?,
            early_leave_before: time_or(
                &var,
                "EARLY_LEAVE_BEFORE",
                ClassifierRules::default().early_leave_before,
            )?,
            overtime_hours: parse_or(&var, "OVERTIME_HOURS", 8.0)?,
        };

        let report_today = var("REPORT_TODAY")
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("REPORT_TODAY must be YYYY-MM-DD, got {raw}"))
            })
            .transpose()?;

        Ok(Self {
            server_addr: var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            data_source,
            database_url,
            data_file,
            api_prefix: var("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            rate_reports_per_min: parse_or(&var, "RATE_REPORTS_PER_MIN", 1000)?,
            directory_cache_ttl: Duration::from_secs(parse_or(&var, "DIRECTORY_CACHE_TTL_SECS", 300)?),
            report_policy: ReportPolicy {
                rules,
                weekend: parse_or(&var, "WEEKEND_POLICY", WeekendPolicy::Calendar)?,
                violation_threshold: parse_or(&var, "VIOLATION_THRESHOLD", 3)?,
            },
            report_today,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

fn time_or(var: &impl Fn(&str) -> Option<String>, key: &str, default: NaiveTime) -> Result<NaiveTime> {
    match var(key) {
        Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M"))
            .with_context(|| format!("{key} must be HH:MM[:SS], got {raw}")),
        None => Ok(default),
    }
}
