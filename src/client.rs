//! HTTP client for the appliance's embedded web server.
//!
//! Each method issues exactly one request and either returns the decoded
//! payload or a [`ConsoleError`]. Only `200 OK` counts as success, except
//! for the settings form which the device answers with a redirect.

use reqwest::{redirect, Client, Method, RequestBuilder, Response, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, info};

use crate::data::{self, AuthOutcome, BlockingState};
use crate::error::ConsoleError;
use crate::models::{
    AuthData, BlacklistEntry, ConnectionInfo, QueryLogEntry, Settings, SettingsUpdate, WifiNetwork,
};
use crate::policy::{ApiPolicy, BlacklistAction, BlacklistUpdate};

#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: Client,
    base: Url,
    policy: ApiPolicy,
}

impl DeviceClient {
    /// Builds a client for the device at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::InvalidUrl` if `base_url` does not parse and
    /// `ConsoleError::HttpRequest` if the HTTP client cannot be built.
    pub fn new(base_url: &str, policy: ApiPolicy, timeout: Duration) -> Result<Self, ConsoleError> {
        let http = Client::builder()
            .user_agent("sinkhole-console/1.0.0")
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base: Url::parse(base_url)?,
            policy,
        })
    }

    pub fn policy(&self) -> &ApiPolicy {
        &self.policy
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConsoleError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ConsoleError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    /// Sends a request and returns the body of a `200 OK` response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ConsoleError> {
        expect_status(builder.send().await?, &[StatusCode::OK]).await
    }

    /// GET `/querylog.json`, sentinel removed.
    pub async fn query_log(&self) -> Result<Vec<QueryLogEntry>, ConsoleError> {
        let body = self.send(self.request(Method::GET, "/querylog.json")?).await?;
        data::parse_query_log(&body)
    }

    /// GET `/querylog.csv` as raw text.
    pub async fn query_log_csv(&self) -> Result<String, ConsoleError> {
        self.send(self.request(Method::GET, "/querylog.csv")?).await
    }

    /// GET `/blacklist.txt`, ordered and trimmed per policy.
    pub async fn blacklist(&self) -> Result<Vec<BlacklistEntry>, ConsoleError> {
        let body = self.send(self.request(Method::GET, "/blacklist.txt")?).await?;
        Ok(data::parse_blacklist(&body, &self.policy))
    }

    /// Adds or removes one hostname, mapping the action through the policy.
    pub async fn update_blacklist(
        &self,
        action: BlacklistAction,
        hostname: &str,
    ) -> Result<(), ConsoleError> {
        info!("Blacklist {} '{}'", action.as_str(), hostname);
        let builder = match &self.policy.blacklist_update {
            BlacklistUpdate::PathMethod { add, delete } => {
                let method = match action {
                    BlacklistAction::Add => add.clone(),
                    BlacklistAction::Delete => delete.clone(),
                };
                let mut target = self.endpoint("/blacklist/")?;
                target
                    .path_segments_mut()
                    .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .push(hostname);
                debug!("{} {}", method, target);
                self.http.request(method, target)
            }
            BlacklistUpdate::ActionQuery => {
                let path = format!("/blacklist?action={}", action.as_str());
                self.request(Method::POST, &path)?
                    .body(hostname.to_string())
            }
        };
        self.send(builder).await.map(drop)
    }

    /// GET `/settings.json`.
    pub async fn settings(&self) -> Result<Settings, ConsoleError> {
        let body = self.send(self.request(Method::GET, "/settings.json")?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST `/settings` as a form. The device answers `302 Found`.
    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<(), ConsoleError> {
        info!("Saving device settings");
        let resp = self
            .request(Method::POST, "/settings")?
            .form(update)
            .send()
            .await?;
        expect_status(resp, &[StatusCode::OK, StatusCode::FOUND])
            .await
            .map(drop)
    }

    /// POST `/toggleblock`; the device answers with the new state.
    pub async fn toggle_block(&self) -> Result<BlockingState, ConsoleError> {
        let body = self.send(self.request(Method::POST, "/toggleblock")?).await?;
        BlockingState::parse(&body)
    }

    pub async fn update_firmware(&self) -> Result<(), ConsoleError> {
        info!("Triggering firmware update");
        self.send(self.request(Method::POST, "/updatefirmware")?)
            .await
            .map(drop)
    }

    pub async fn restart(&self) -> Result<(), ConsoleError> {
        info!("Triggering device restart");
        self.send(self.request(Method::POST, "/restart")?)
            .await
            .map(drop)
    }

    pub async fn scan(&self) -> Result<(), ConsoleError> {
        self.send(self.request(Method::POST, "/scan")?)
            .await
            .map(drop)
    }

    /// GET `/wifi.json`, strongest network first.
    pub async fn wifi_networks(&self) -> Result<Vec<WifiNetwork>, ConsoleError> {
        let body = self.send(self.request(Method::GET, "/wifi.json")?).await?;
        let networks: Vec<WifiNetwork> = serde_json::from_str(&body)?;
        Ok(data::sort_networks(networks))
    }

    /// POST `/submitauth` with the credentials as JSON.
    pub async fn submit_auth(&self, auth: &AuthData) -> Result<AuthOutcome, ConsoleError> {
        info!("Submitting credentials for '{}'", auth.ssid);
        let body = self
            .send(self.request(Method::POST, "/submitauth")?.json(auth))
            .await?;
        AuthOutcome::parse(&body)
    }

    pub async fn connection(&self) -> Result<ConnectionInfo, ConsoleError> {
        let body = self.send(self.request(Method::GET, "/connection.json")?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn finish(&self) -> Result<(), ConsoleError> {
        info!("Finishing provisioning");
        self.send(self.request(Method::POST, "/finish")?)
            .await
            .map(drop)
    }
}

/// Reads the body and turns any status outside `accepted` into
/// `ConsoleError::Device`.
async fn expect_status(resp: Response, accepted: &[StatusCode]) -> Result<String, ConsoleError> {
    let status = resp.status();
    let body = resp.text().await?;
    if accepted.contains(&status) {
        return Ok(body);
    }
    Err(ConsoleError::Device { status, body })
}
