//! Payload decoding - turns raw device responses into typed data.
//!
//! Nothing here performs I/O; the client hands over the response text and
//! gets back models or tagged signals.

use itertools::Itertools;
use serde_json::Value;
use std::cmp::Reverse;

use crate::error::ConsoleError;
use crate::models::{BlacklistEntry, QueryLogEntry, WifiNetwork};
use crate::policy::{ApiPolicy, ListOrder, SentinelPosition};

/// Blocking state reported by `/toggleblock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingState {
    On,
    Off,
}

impl BlockingState {
    /// Parses the literal `true`/`false` body.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::UnknownResponse` for any other text.
    pub fn parse(body: &str) -> Result<Self, ConsoleError> {
        match body {
            "true" => Ok(Self::On),
            "false" => Ok(Self::Off),
            other => Err(ConsoleError::UnknownResponse(other.to_string())),
        }
    }
}

impl From<bool> for BlockingState {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Result of a `/submitauth` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Connected,
    CouldNotConnect,
}

impl AuthOutcome {
    /// Parses the literal status body.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::UnknownResponse` for any other text.
    pub fn parse(body: &str) -> Result<Self, ConsoleError> {
        match body {
            "connected" => Ok(Self::Connected),
            "could not connect" => Ok(Self::CouldNotConnect),
            other => Err(ConsoleError::UnknownResponse(other.to_string())),
        }
    }
}

/// Decodes `/querylog.json`.
///
/// The firmware always terminates the array with an empty placeholder
/// object, so the last element is dropped before decoding the rest.
///
/// # Errors
///
/// Returns `ConsoleError::JsonParse` if the body is not a JSON array of
/// log entries.
pub fn parse_query_log(body: &str) -> Result<Vec<QueryLogEntry>, ConsoleError> {
    let mut raw: Vec<Value> = serde_json::from_str(body)?;
    raw.pop();
    raw.into_iter()
        .map(|value| serde_json::from_value(value).map_err(ConsoleError::from))
        .collect()
}

/// Splits a newline-delimited blacklist according to the policy's order and
/// sentinel rules.
pub fn parse_blacklist(body: &str, policy: &ApiPolicy) -> Vec<BlacklistEntry> {
    let mut lines: Vec<&str> = body.split('\n').collect();
    if policy.order == ListOrder::Reversed {
        lines.reverse();
    }
    let skip = match policy.sentinel {
        SentinelPosition::First => 1,
        SentinelPosition::None => 0,
    };
    lines
        .into_iter()
        .skip(skip)
        .map(BlacklistEntry::new)
        .collect()
}

/// Orders scan results strongest signal first. Equal signals keep the
/// order the device reported them in.
pub fn sort_networks(networks: Vec<WifiNetwork>) -> Vec<WifiNetwork> {
    networks
        .into_iter()
        .sorted_by_key(|n| Reverse(n.rssi))
        .collect()
}
