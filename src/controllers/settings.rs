//! Device settings, blocking toggle, firmware update and restart.

use tracing::{error, info, warn};

use crate::client::DeviceClient;
use crate::data::BlockingState;
use crate::models::{Settings, SettingsUpdate};
use crate::view::{BlockButton, DnsSelect, Probe, SettingsModal, SettingsView};

pub const SETTINGS_PAGE: &str = "/settings";
pub const SETTINGS_SAVED_PAGE: &str = "/settings?status=success";

/// Builds the settings form. Only controls whose value the device supplied
/// are populated and enabled.
pub fn populate(settings: &Settings, dns_options: &[String]) -> SettingsView {
    let mut view = SettingsView {
        dns_srv: DnsSelect::new(dns_options),
        ..Default::default()
    };
    view.ip.populate(settings.ip.as_ref());
    view.url.populate(settings.url.as_ref());
    view.update_srv.populate(settings.update_srv.as_ref());
    view.version.populate(settings.version.as_ref());
    if let Some(dns_srv) = &settings.dns_srv {
        view.dns_srv.select(dns_srv);
    }
    if let Some(blocking) = settings.blocking {
        view.block_button = Some(button_for(blocking.into()));
    }
    view.update_enabled = settings.update_available == Some(true);
    view
}

pub async fn load_settings(client: &DeviceClient, dns_options: &[String]) -> SettingsView {
    match client.settings().await {
        Ok(settings) => populate(&settings, dns_options),
        Err(e) => {
            error!("Error loading settings: {}", e);
            let mut view = SettingsView {
                dns_srv: DnsSelect::new(dns_options),
                ..Default::default()
            };
            view.status.show_error(e.to_string());
            view
        }
    }
}

/// Writes the settings form back to the device.
pub async fn save_settings(
    client: &DeviceClient,
    update: &SettingsUpdate,
    dns_options: &[String],
) -> SettingsView {
    match client.save_settings(update).await {
        Ok(()) => {
            let mut view = SettingsView::default();
            view.status.navigate_to(SETTINGS_SAVED_PAGE);
            view
        }
        Err(e) => {
            error!("Error saving settings: {}", e);
            let mut view = load_settings(client, dns_options).await;
            view.status.show_error(e.to_string());
            view
        }
    }
}

/// Fills the form in around the outcome of an action.
///
/// The action's button, modal, probe and status win over the reloaded
/// ones. A device that was just told to restart is not queried.
pub async fn reload_form(
    client: &DeviceClient,
    outcome: SettingsView,
    dns_options: &[String],
) -> SettingsView {
    if outcome.probe.is_some() {
        return outcome;
    }
    let mut view = load_settings(client, dns_options).await;
    if outcome.block_button.is_some() {
        view.block_button = outcome.block_button;
    }
    view.modal = outcome.modal;
    view.probe = outcome.probe;
    view.status = outcome.status;
    view
}

/// Flips blocking and shows the state the device reports back. An
/// unrecognised answer leaves the button as it was.
pub async fn toggle_block(client: &DeviceClient, view: &mut SettingsView) {
    match client.toggle_block().await {
        Ok(state) => {
            info!("Blocking is now {:?}", state);
            view.block_button = Some(button_for(state));
        }
        Err(e) => {
            error!("Error toggling blocking: {}", e);
            view.status.show_error(e.to_string());
        }
    }
}

/// Starts a firmware update behind the update modal, then restarts.
pub async fn update_firmware(
    client: &DeviceClient,
    view: &mut SettingsView,
    probe_delay_secs: u64,
) {
    view.modal = Some(SettingsModal::Updating);
    match client.update_firmware().await {
        Ok(()) => restart(client, view, probe_delay_secs).await,
        Err(e) => {
            error!("Firmware update failed: {}", e);
            view.modal = None;
            view.status.show_error(e.to_string());
        }
    }
}

/// Restarts the device and schedules the first reachability probe.
pub async fn restart(client: &DeviceClient, view: &mut SettingsView, probe_delay_secs: u64) {
    match client.restart().await {
        Ok(()) => {
            view.modal = Some(SettingsModal::Restarting);
            view.probe = Some(Probe::first(probe_delay_secs));
        }
        Err(e) => {
            error!("Restart failed: {}", e);
            view.modal = None;
            view.status.show_error(e.to_string());
        }
    }
}

/// Checks whether the device is back after a restart.
///
/// Reachable: navigate to the settings page. Unreachable: schedule the next
/// probe, or give up with the last error once `max_attempts` is spent.
pub async fn restart_finished(
    client: &DeviceClient,
    probe: Probe,
    max_attempts: u32,
) -> SettingsView {
    let mut view = SettingsView::default();
    match client.settings().await {
        Ok(_) => {
            info!("Device back after {} probe(s)", probe.attempt);
            view.status.navigate_to(SETTINGS_PAGE);
        }
        Err(e) if probe.attempt < max_attempts => {
            warn!("Device not reachable yet (attempt {}): {}", probe.attempt, e);
            view.modal = Some(SettingsModal::Restarting);
            view.probe = Some(probe.next());
        }
        Err(e) => {
            error!("Device did not come back after {} probes: {}", probe.attempt, e);
            view.status.show_error(e.to_string());
        }
    }
    view
}

fn button_for(state: BlockingState) -> BlockButton {
    match state {
        BlockingState::On => BlockButton::on(),
        BlockingState::Off => BlockButton::off(),
    }
}
