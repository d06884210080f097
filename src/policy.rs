//! API policy - the per-firmware differences in how the device API is driven.
//!
//! Two firmware generations expose the same logical operations with
//! different verbs, list layouts and follow-up navigation. Instead of
//! forking controllers, every controller consults an [`ApiPolicy`].

use reqwest::Method;
use std::str::FromStr;

/// Logical blacklist mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistAction {
    Add,
    Delete,
}

impl BlacklistAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for BlacklistAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown blacklist action '{other}'")),
        }
    }
}

/// How a blacklist mutation reaches the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistUpdate {
    /// `{add, delete} /blacklist/{hostname}`.
    PathMethod { add: Method, delete: Method },
    /// `POST /blacklist?action=...` with the hostname as the body.
    ActionQuery,
}

/// Order in which blacklist lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Natural,
    Reversed,
}

/// Which line of the (ordered) blacklist is a sentinel to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelPosition {
    First,
    None,
}

/// What a page does after a successful blacklist mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterUpdate {
    Redirect,
    ReloadInPlace,
}

/// Which query log resource the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLogFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPolicy {
    pub blacklist_update: BlacklistUpdate,
    pub order: ListOrder,
    pub sentinel: SentinelPosition,
    pub after_update: AfterUpdate,
    pub query_log: QueryLogFormat,
}

impl ApiPolicy {
    /// Firmware that exposes the blacklist as a REST resource.
    pub fn rest() -> Self {
        Self {
            blacklist_update: BlacklistUpdate::PathMethod {
                add: Method::PUT,
                delete: Method::DELETE,
            },
            order: ListOrder::Reversed,
            sentinel: SentinelPosition::First,
            after_update: AfterUpdate::Redirect,
            query_log: QueryLogFormat::Json,
        }
    }

    /// Firmware that takes form-style `?action=` posts.
    pub fn form() -> Self {
        Self {
            blacklist_update: BlacklistUpdate::ActionQuery,
            order: ListOrder::Natural,
            sentinel: SentinelPosition::None,
            after_update: AfterUpdate::ReloadInPlace,
            query_log: QueryLogFormat::Csv,
        }
    }

    /// Looks up a preset by its configuration name.
    pub fn from_variant(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rest" => Some(Self::rest()),
            "form" => Some(Self::form()),
            _ => None,
        }
    }
}
