//! In-process stand-in for the appliance's web server, used by tests.
//!
//! Binds an axum app to an ephemeral localhost port, records every request
//! as `"METHOD /path?query body"` and answers with canned firmware
//! responses unless a test overrides a route.

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::DeviceClient;
use crate::policy::ApiPolicy;

pub const QUERY_LOG: &str = r#"[{ "time":"10:00:00", "domain":"example.org", "client":"192.168.1.20", "blocked":0},
{ "time":"10:00:02", "domain":"ads.example", "client":"192.168.1.20", "blocked":1},
{ "time":"10:00:05", "domain":"cdn.example", "client":"192.168.1.31", "blocked":0},
{}]"#;

pub const BLACKLIST: &str = "ads.example\ntracker.example\n";

pub const SETTINGS: &str = r#"{"ip":"192.168.1.2","url":"sinkhole.local","update_srv":"https://updates.example","dns_srv":"1.1.1.1","version":"0.3.1","blocking":true,"update_available":false}"#;

struct Shared {
    overrides: HashMap<String, (StatusCode, String)>,
    requests: Mutex<Vec<String>>,
}

#[derive(Default)]
pub struct FakeDeviceBuilder {
    overrides: HashMap<String, (StatusCode, String)>,
}

impl FakeDeviceBuilder {
    /// Replaces the canned answer for `route` (`"METHOD /path"`).
    pub fn respond(mut self, route: &str, status: StatusCode, body: &str) -> Self {
        self.overrides
            .insert(route.to_string(), (status, body.to_string()));
        self
    }

    pub async fn start(self) -> FakeDevice {
        let shared = Arc::new(Shared {
            overrides: self.overrides,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeDevice {
            base_url: format!("http://{addr}"),
            shared,
        }
    }
}

pub struct FakeDevice {
    base_url: String,
    shared: Arc<Shared>,
}

impl FakeDevice {
    pub fn builder() -> FakeDeviceBuilder {
        FakeDeviceBuilder::default()
    }

    pub async fn start() -> Self {
        Self::builder().start().await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self, policy: ApiPolicy) -> DeviceClient {
        DeviceClient::new(&self.base_url, policy, Duration::from_secs(5)).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.shared.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    let record = if body.is_empty() {
        format!("{method} {target}")
    } else {
        format!("{method} {target} {body}")
    };
    shared.requests.lock().unwrap().push(record);

    let route = format!("{method} {}", uri.path());
    if let Some((status, text)) = shared.overrides.get(&route) {
        return (*status, text.clone()).into_response();
    }

    match (method.as_str(), uri.path()) {
        ("GET", "/querylog.json") => (StatusCode::OK, QUERY_LOG).into_response(),
        ("GET", "/querylog.csv") => (
            StatusCode::OK,
            "time,domain,client,blocked\n10:00:00,example.org,192.168.1.20,0\n",
        )
            .into_response(),
        ("GET", "/blacklist.txt") => (StatusCode::OK, BLACKLIST).into_response(),
        ("PUT" | "DELETE", path) if path.starts_with("/blacklist/") => {
            hostname_answer(&path["/blacklist/".len()..])
        }
        ("POST", "/blacklist") => hostname_answer(&body),
        ("GET", "/settings.json") => (StatusCode::OK, SETTINGS).into_response(),
        ("POST", "/settings") => (
            StatusCode::FOUND,
            [(header::LOCATION, "/settings?status=success")],
            "",
        )
            .into_response(),
        ("POST", "/toggleblock") => (StatusCode::OK, "true").into_response(),
        ("POST", "/updatefirmware" | "/restart" | "/scan" | "/finish") => {
            StatusCode::OK.into_response()
        }
        ("GET", "/wifi.json") => (
            StatusCode::OK,
            r#"[{"ssid":"A","rssi":-80},{"ssid":"B","rssi":-40}]"#,
        )
            .into_response(),
        ("POST", "/submitauth") => (StatusCode::OK, "connected").into_response(),
        ("GET", "/connection.json") => (
            StatusCode::OK,
            r#"{"ssid":"B","ip":"192.168.1.50"}"#,
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// The firmware rejects hostnames without a dot and echoes accepted ones.
fn hostname_answer(hostname: &str) -> Response {
    if hostname.contains('.') {
        (StatusCode::OK, hostname.to_string()).into_response()
    } else {
        (StatusCode::BAD_REQUEST, "Invalid hostname").into_response()
    }
}
