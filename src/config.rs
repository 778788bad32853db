use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::models::harvest::DateRange;

const CONFIG_HINT: &str =
    "Please refer to config.sample.json in the project for configuration options.";

/// Proxy settings for environments where Harvest is only reachable through an
/// HTTP proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

/// The config file as written on disk. Everything is optional here so that a
/// missing key can be reported with a specific remediation message instead of
/// a generic parse error.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    account: Option<String>,
    token: Option<String>,
    use_ssl: Option<bool>,
    proxy: Option<ProxyConfig>,
    timezone: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    users: Option<Vec<u64>>,
    email_from: Option<String>,
    email_to: Option<String>,
    cc: Option<Vec<String>>,
    cc_users: Option<bool>,
}

/// Validated runtime configuration. Every required key is checked once at
/// startup; the core logic never performs string-keyed lookups.
#[derive(Debug, Clone)]
pub struct Config {
    pub account: String,
    pub token: String,
    pub use_ssl: bool,
    pub proxy: Option<ProxyConfig>,
    /// Recognized for operators that pin the reporting timezone; log
    /// timestamps follow the system timezone.
    pub timezone: Option<String>,
    pub range: DateRange,
    pub users: Vec<u64>,
    pub email_from: String,
    pub email_to: String,
    pub cc: Vec<String>,
    pub cc_users: bool,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}.", path.display()))?;
        let raw: RawConfig = serde_json::from_str(&text)
            .with_context(|| format!("Unable to parse config file {}.", path.display()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let account = require(raw.account, "No Harvest API account has been set.")?;
        let token = require(
            raw.token,
            "No Harvest access token has been set to connect to the API with.",
        )?;
        let use_ssl = require(raw.use_ssl, "No Harvest API SSL configuration has been set.")?;
        let start = require(raw.start, "No start date has been set for the API to look at.")?;
        let end = require(raw.end, "No end date has been set for the API to look at.")?;
        let range = DateRange::new(start, end)?;
        let users = require(raw.users, "No users have been configured.")?;
        if users.is_empty() {
            bail!("No users have been configured. {CONFIG_HINT}");
        }
        let email_from = require(
            raw.email_from,
            "No address has been configured to send mail from.",
        )?;
        let email_to = require(
            raw.email_to,
            "No address has been configured to send mail to.",
        )?;
        let cc_users = require(
            raw.cc_users,
            "No configuration for whether to cc the users is set.",
        )?;

        Ok(Self {
            account,
            token,
            use_ssl,
            proxy: raw.proxy,
            timezone: raw.timezone,
            range,
            users,
            email_from,
            email_to,
            cc: raw.cc.unwrap_or_default(),
            cc_users,
        })
    }
}

fn require<T>(value: Option<T>, message: &str) -> anyhow::Result<T> {
    value.ok_or_else(|| anyhow!("{message} {CONFIG_HINT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config_json() -> &'static str {
        r#"{
            "account": "123456",
            "token": "secret-token",
            "use_ssl": true,
            "timezone": "Europe/London",
            "start": "2024-01-01",
            "end": "2024-01-07",
            "users": [111, 222],
            "email_from": "reports@example.com",
            "email_to": "boss@example.com",
            "cc": ["lead@example.com"],
            "cc_users": false
        }"#
    }

    #[test]
    fn parses_full_config() {
        let raw: RawConfig = serde_json::from_str(full_config_json()).unwrap();
        let config = Config::from_raw(raw).unwrap();

        assert_eq!(config.account, "123456");
        assert!(config.use_ssl);
        assert_eq!(config.users, vec![111, 222]);
        assert_eq!(config.range.days().count(), 7);
        assert_eq!(config.cc, vec!["lead@example.com".to_string()]);
        assert!(!config.cc_users);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn missing_token_names_the_key() {
        let raw: RawConfig = serde_json::from_str(r#"{ "account": "123456" }"#).unwrap();
        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("No Harvest access token"));
    }

    #[test]
    fn missing_cc_users_flag_is_fatal() {
        let mut value: serde_json::Value = serde_json::from_str(full_config_json()).unwrap();
        value.as_object_mut().unwrap().remove("cc_users");
        let raw: RawConfig = serde_json::from_value(value).unwrap();

        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("whether to cc the users"));
    }

    #[test]
    fn manual_cc_defaults_to_empty() {
        let mut value: serde_json::Value = serde_json::from_str(full_config_json()).unwrap();
        value.as_object_mut().unwrap().remove("cc");
        let raw: RawConfig = serde_json::from_value(value).unwrap();

        let config = Config::from_raw(raw).unwrap();
        assert!(config.cc.is_empty());
    }

    #[test]
    fn empty_user_list_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(full_config_json()).unwrap();
        value["users"] = serde_json::json!([]);
        let raw: RawConfig = serde_json::from_value(value).unwrap();

        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("No users have been configured"));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(full_config_json()).unwrap();
        value["start"] = serde_json::json!("2024-02-01");
        value["end"] = serde_json::json!("2024-01-01");
        let raw: RawConfig = serde_json::from_value(value).unwrap();

        assert!(Config::from_raw(raw).is_err());
    }
}
