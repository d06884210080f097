//! Captive-portal Wi-Fi provisioning.
//!
//! The flow is linear and user driven: scan, pick a network, submit
//! credentials, look at the resulting connection, confirm, finish. Spinner
//! and modal cleanup go through [`Busy`] so every exit path releases them.

use tracing::{error, info, warn};

use crate::client::DeviceClient;
use crate::data::AuthOutcome;
use crate::error::ConsoleError;
use crate::models::AuthData;
use crate::view::{Busy, ProvisioningStage, ProvisioningView};

pub const CONNECTED_PAGE: &str = "/setup/connected";

/// Asks the device to scan and, on success, loads the results.
pub async fn scan(client: &DeviceClient, view: &mut ProvisioningView) {
    view.status.hide_error();
    let mut view = Busy::acquire(
        view,
        ProvisioningView::show_spinner,
        ProvisioningView::hide_spinner,
    );
    view.stage = ProvisioningStage::Scanning;

    match client.scan().await {
        Ok(()) => get_wifi_json(client, &mut view).await,
        Err(e) => {
            error!("Scan failed: {}", e);
            view.stage = ProvisioningStage::Idle;
            view.status.show_error(e.with_reason());
        }
    }
}

/// Replaces the network list with the device's scan results, strongest
/// first.
pub async fn get_wifi_json(client: &DeviceClient, view: &mut ProvisioningView) {
    let mut view = Busy::finally(view, ProvisioningView::hide_spinner);

    match client.wifi_networks().await {
        Ok(networks) => {
            info!("Found {} networks", networks.len());
            view.selected = networks.first().map(|n| n.ssid.clone());
            view.networks = networks;
            view.stage = ProvisioningStage::NetworkListShown;
        }
        Err(e) => {
            error!("Error loading networks: {}", e);
            view.status.show_error(e.with_reason());
        }
    }
}

/// Tries the credentials and interprets the device's literal answer.
pub async fn submit_auth_data(
    client: &DeviceClient,
    view: &mut ProvisioningView,
    ssid: &str,
    pass: &str,
) {
    view.status.hide_error();
    let mut view = Busy::acquire(
        view,
        ProvisioningView::open_connecting,
        ProvisioningView::close_connecting,
    );
    view.selected = Some(ssid.to_string());
    view.stage = ProvisioningStage::CredentialsSubmitted;

    let auth = AuthData {
        ssid: ssid.to_string(),
        pass: pass.to_string(),
    };
    match client.submit_auth(&auth).await {
        Ok(AuthOutcome::Connected) => {
            view.stage = ProvisioningStage::Connected;
            view.status.navigate_to(CONNECTED_PAGE);
        }
        Ok(AuthOutcome::CouldNotConnect) => {
            warn!("Could not connect to '{}'", ssid);
            view.stage = ProvisioningStage::Failed;
            view.status.show_error(format!("Could not connect to {ssid}"));
        }
        Err(e @ ConsoleError::UnknownResponse(_)) => {
            warn!("Unexpected answer to credentials: {}", e);
            view.stage = ProvisioningStage::Failed;
            view.status.show_error(e.to_string());
        }
        Err(e) => {
            error!("Submitting credentials failed: {}", e);
            view.stage = ProvisioningStage::Failed;
            view.status.show_error(e.with_reason());
        }
    }
}

/// Shows the network the device joined and unlocks the finish action.
pub async fn get_network_info(client: &DeviceClient, view: &mut ProvisioningView) {
    match client.connection().await {
        Ok(info) => {
            view.network = Some(format!("SSID: {}", info.ssid));
            view.ip = Some(format!("IP: {}", info.ip));
            view.finish_enabled = true;
            view.stage = ProvisioningStage::Connected;
        }
        Err(e) => {
            error!("Error loading connection info: {}", e);
            view.status.show_error(e.with_reason());
        }
    }
}

pub fn show_confirmation(view: &mut ProvisioningView) {
    view.confirmation = true;
    view.stage = ProvisioningStage::Confirming;
}

pub fn hide_confirmation(view: &mut ProvisioningView) {
    view.confirmation = false;
}

pub fn show_finished(view: &mut ProvisioningView) {
    view.finished = true;
    view.stage = ProvisioningStage::Finished;
}

/// Commits the setup. The confirmation dialog closes whatever the outcome.
pub async fn finish_setup(client: &DeviceClient, view: &mut ProvisioningView) {
    let mut view = Busy::finally(view, hide_confirmation);

    match client.finish().await {
        Ok(()) => show_finished(&mut view),
        Err(e) => {
            error!("Finishing setup failed: {}", e);
            view.status.show_error(e.to_string());
        }
    }
}
