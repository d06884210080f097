//! View models - everything a page template needs, built by the controllers.
//!
//! Views are request-scoped. A controller receives one, fills it in and
//! hands it back to the handler that renders it; no page keeps state
//! between requests.

use serde::Serialize;
use std::ops::{Deref, DerefMut};

use crate::models::WifiNetwork;

/// Row colour for blocked queries.
pub const BLOCKED_MARKER: &str = "#FF0000";

/// Choices offered by the dashboard's row-count selector.
pub const QUERY_LOG_SIZES: [usize; 4] = [10, 25, 50, 100];

/// The page-level error region plus an optional navigation target.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PageStatus {
    pub error: Option<String>,
    pub navigate: Option<String>,
}

impl PageStatus {
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn hide_error(&mut self) {
        self.error = None;
    }

    pub fn navigate_to(&mut self, target: impl Into<String>) {
        self.navigate = Some(target.into());
    }
}

/// Scoped acquisition of a busy indicator or modal.
///
/// `release` runs when the guard is dropped, whichever way the operation
/// ends. The guard derefs to the view so the operation keeps working on it.
pub struct Busy<'a, V> {
    view: &'a mut V,
    release: fn(&mut V),
}

impl<'a, V> Busy<'a, V> {
    pub fn acquire(view: &'a mut V, acquire: fn(&mut V), release: fn(&mut V)) -> Self {
        acquire(view);
        Self { view, release }
    }

    /// Guard that only has a release step.
    pub fn finally(view: &'a mut V, release: fn(&mut V)) -> Self {
        Self { view, release }
    }
}

impl<V> Deref for Busy<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.view
    }
}

impl<V> DerefMut for Busy<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.view
    }
}

impl<V> Drop for Busy<'_, V> {
    fn drop(&mut self) {
        (self.release)(&mut *self.view);
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowAction {
    /// Inert confirm glyph on an already blocked query.
    Confirm,
    /// Control that asks for `domain` to be added to the blacklist.
    Block { domain: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRow {
    pub time: String,
    pub domain: String,
    pub client: String,
    pub color: Option<&'static str>,
    pub action: RowAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryLogView {
    pub rows: Vec<QueryRow>,
    pub size: usize,
    pub sizes: Vec<usize>,
    pub status: PageStatus,
}

impl QueryLogView {
    /// A size outside the standard choices is offered too, so the selector
    /// always shows the number of rows rendered.
    pub fn new(size: usize) -> Self {
        let mut sizes = QUERY_LOG_SIZES.to_vec();
        if let Err(pos) = sizes.binary_search(&size) {
            sizes.insert(pos, size);
        }
        Self {
            rows: Vec::new(),
            size,
            sizes,
            status: PageStatus::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Blacklist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlacklistRow {
    /// Literal string sent back on delete.
    pub domain: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BlacklistView {
    pub rows: Vec<BlacklistRow>,
    pub status: PageStatus,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// A text form control. Disabled until the device supplies a value.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Field {
    pub value: Option<String>,
    pub enabled: bool,
}

impl Field {
    pub fn populate(&mut self, value: Option<&String>) {
        if let Some(value) = value {
            self.value = Some(value.clone());
            self.enabled = true;
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DnsOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DnsSelect {
    pub options: Vec<DnsOption>,
    pub enabled: bool,
}

impl DnsSelect {
    pub fn new(options: &[String]) -> Self {
        Self {
            options: options
                .iter()
                .map(|value| DnsOption {
                    value: value.clone(),
                    selected: false,
                })
                .collect(),
            enabled: false,
        }
    }

    /// Selects and enables the option equal to `value`, if there is one.
    pub fn select(&mut self, value: &str) {
        if let Some(option) = self.options.iter_mut().find(|o| o.value == value) {
            option.selected = true;
            self.enabled = true;
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Default,
    Alternate,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlockButton {
    pub label: &'static str,
    pub style: ButtonStyle,
}

impl BlockButton {
    pub fn on() -> Self {
        Self {
            label: "Blocking On",
            style: ButtonStyle::Default,
        }
    }

    pub fn off() -> Self {
        Self {
            label: "Blocking Off",
            style: ButtonStyle::Alternate,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingsModal {
    Updating,
    Restarting,
}

/// A scheduled reachability check after a restart.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Probe {
    pub delay_secs: u64,
    pub attempt: u32,
}

impl Probe {
    pub fn first(delay_secs: u64) -> Self {
        Self {
            delay_secs,
            attempt: 1,
        }
    }

    pub fn next(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsView {
    pub ip: Field,
    pub url: Field,
    pub update_srv: Field,
    pub version: Field,
    pub dns_srv: DnsSelect,
    pub block_button: Option<BlockButton>,
    pub update_enabled: bool,
    pub modal: Option<SettingsModal>,
    pub probe: Option<Probe>,
    pub saved: bool,
    pub status: PageStatus,
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStage {
    #[default]
    Idle,
    Scanning,
    NetworkListShown,
    CredentialsSubmitted,
    Connected,
    Failed,
    Confirming,
    Finished,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisioningView {
    pub stage: ProvisioningStage,
    /// Spinner shown while the device scans or joins.
    pub busy: bool,
    /// Modal shown while credentials are being tried.
    pub connecting: bool,
    pub networks: Vec<WifiNetwork>,
    pub selected: Option<String>,
    pub network: Option<String>,
    pub ip: Option<String>,
    pub finish_enabled: bool,
    pub confirmation: bool,
    pub finished: bool,
    pub status: PageStatus,
}

impl ProvisioningView {
    pub fn show_spinner(&mut self) {
        self.busy = true;
    }

    pub fn hide_spinner(&mut self) {
        self.busy = false;
    }

    pub fn open_connecting(&mut self) {
        self.busy = true;
        self.connecting = true;
    }

    pub fn close_connecting(&mut self) {
        self.busy = false;
        self.connecting = false;
    }
}
