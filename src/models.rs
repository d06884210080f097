//! Data models for payloads exchanged with the appliance.

use serde::{Deserialize, Deserializer, Serialize};

/// One line of the device's DNS query log.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryLogEntry {
    pub time: String,
    pub domain: String,
    pub client: String,
    #[serde(deserialize_with = "bool_or_int")]
    pub blocked: bool,
}

/// A single blocked domain, keyed by the literal string the device stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub domain: String,
}

impl BlacklistEntry {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

/// Device settings as served by `/settings.json`.
///
/// Every field is optional: older firmware omits some of them, and a
/// missing field keeps the matching form control disabled.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub ip: Option<String>,
    pub url: Option<String>,
    pub update_srv: Option<String>,
    pub dns_srv: Option<String>,
    pub version: Option<String>,
    pub blocking: Option<bool>,
    pub update_available: Option<bool>,
}

/// Form body accepted by the device's `POST /settings`.
///
/// Field names follow the firmware's form keys, not the JSON keys.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SettingsUpdate {
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub ip: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub dnssrv: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub updatesrv: Option<String>,
}

/// An access point found by the device's Wi-Fi scan.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WifiNetwork {
    pub ssid: String,
    pub rssi: i32,
}

/// Network the device joined during provisioning.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub ssid: String,
    pub ip: String,
}

/// Credentials posted to `/submitauth`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthData {
    pub ssid: String,
    pub pass: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Ok(Some(s)),
    }
}

/// Accepts `true`/`false` as well as the `0`/`1` the firmware prints.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
    }
}
