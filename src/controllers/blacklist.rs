//! Blacklist manager.

use tracing::{error, info};

use crate::client::DeviceClient;
use crate::policy::{AfterUpdate, BlacklistAction};
use crate::view::{BlacklistRow, BlacklistView};

/// Canonical page the REST firmware returns to after a change.
pub const BLACKLIST_PAGE: &str = "/blacklist";

/// Fetches the blocklist and renders one deletable row per domain.
pub async fn load_blacklist(client: &DeviceClient) -> BlacklistView {
    let mut view = BlacklistView::default();
    match client.blacklist().await {
        Ok(entries) => {
            view.status.hide_error();
            view.rows = entries
                .into_iter()
                .map(|entry| BlacklistRow {
                    domain: entry.domain,
                })
                .collect();
        }
        Err(e) => {
            error!("Error loading blacklist: {}", e);
            view.status.show_error(e.to_string());
        }
    }
    view
}

/// Adds whatever the user typed, verbatim.
pub async fn add_to_blacklist(client: &DeviceClient, input: &str) -> BlacklistView {
    info!("Adding '{}'", input);
    update_blacklist(client, BlacklistAction::Add, input).await
}

/// Applies one add or delete and decides what the page shows next.
///
/// On success the page either navigates to the canonical blacklist view or
/// reloads the list in place, depending on the firmware policy. On failure
/// the current list is shown with the device's response as the error.
pub async fn update_blacklist(
    client: &DeviceClient,
    action: BlacklistAction,
    hostname: &str,
) -> BlacklistView {
    match client.update_blacklist(action, hostname).await {
        Ok(()) => match client.policy().after_update {
            AfterUpdate::Redirect => {
                let mut view = BlacklistView::default();
                view.status.navigate_to(BLACKLIST_PAGE);
                view
            }
            AfterUpdate::ReloadInPlace => load_blacklist(client).await,
        },
        Err(e) => {
            error!("Blacklist {} '{}' failed: {}", action.as_str(), hostname, e);
            let mut view = load_blacklist(client).await;
            view.status.show_error(e.to_string());
            view
        }
    }
}
