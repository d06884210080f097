use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tera::Context;
use tracing::error;

use crate::controllers::{blacklist, dashboard, provisioning, settings};
use crate::models::SettingsUpdate;
use crate::policy::BlacklistAction;
use crate::state::AppState;
use crate::view::{PageStatus, Probe, ProvisioningView, SettingsView};

/// Query parameters for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub size: Option<usize>,
}

/// Blacklist mutation posted by the dashboard and blacklist pages.
#[derive(Debug, Deserialize)]
pub struct BlacklistForm {
    pub action: String,
    pub hostname: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeQuery {
    pub attempt: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AuthForm {
    pub ssid: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Debug, Deserialize)]
pub struct ConnectedQuery {
    #[serde(default)]
    pub confirm: bool,
}

fn render_template(
    tera: &tera::Tera,
    template: &str,
    context: &Context,
) -> Result<Html<String>, (StatusCode, &'static str)> {
    tera.render(template, context).map(Html).map_err(|e| {
        error!("Template render error for '{}': {}", template, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Render error")
    })
}

/// Follows the view's navigation target, or renders it into `template`.
fn page<V: Serialize>(state: &AppState, template: &str, view: &V, status: &PageStatus) -> Response {
    if let Some(target) = &status.navigate {
        return Redirect::to(target).into_response();
    }
    let mut context = Context::new();
    context.insert("view", view);
    context.insert("page", template.trim_end_matches(".html"));
    render_template(&state.tera, template, &context).into_response()
}

/// GET / - Query log dashboard.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let size = query.size.unwrap_or(state.config.query_log_size);
    let view = dashboard::load_queries(&state.device, size).await;
    page(&state, "dashboard.html", &view, &view.status)
}

/// GET /blacklist - Blocklist with delete controls.
pub async fn blacklist_page(State(state): State<Arc<AppState>>) -> Response {
    let view = blacklist::load_blacklist(&state.device).await;
    page(&state, "blacklist.html", &view, &view.status)
}

/// POST /blacklist - Add or delete one hostname.
pub async fn blacklist_update(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BlacklistForm>,
) -> Response {
    let view = match form.action.parse::<BlacklistAction>() {
        Ok(BlacklistAction::Add) => {
            blacklist::add_to_blacklist(&state.device, &form.hostname).await
        }
        Ok(action) => blacklist::update_blacklist(&state.device, action, &form.hostname).await,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    page(&state, "blacklist.html", &view, &view.status)
}

/// GET /settings - Device settings form.
pub async fn settings_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettingsQuery>,
) -> Response {
    let mut view = settings::load_settings(&state.device, &state.config.dns_servers).await;
    view.saved = query.status.as_deref() == Some("success");
    page(&state, "settings.html", &view, &view.status)
}

/// POST /settings - Save the settings form to the device.
pub async fn settings_save(
    State(state): State<Arc<AppState>>,
    Form(update): Form<SettingsUpdate>,
) -> Response {
    let view = settings::save_settings(&state.device, &update, &state.config.dns_servers).await;
    page(&state, "settings.html", &view, &view.status)
}

/// POST /settings/toggleblock
pub async fn settings_toggle_block(State(state): State<Arc<AppState>>) -> Response {
    let mut outcome = SettingsView::default();
    settings::toggle_block(&state.device, &mut outcome).await;
    let view = settings::reload_form(&state.device, outcome, &state.config.dns_servers).await;
    page(&state, "settings.html", &view, &view.status)
}

/// POST /settings/updatefirmware
pub async fn settings_update_firmware(State(state): State<Arc<AppState>>) -> Response {
    let delay = state.config.restart_probe_delay_secs;
    let mut outcome = SettingsView::default();
    settings::update_firmware(&state.device, &mut outcome, delay).await;
    let view = settings::reload_form(&state.device, outcome, &state.config.dns_servers).await;
    page(&state, "settings.html", &view, &view.status)
}

/// POST /settings/restart
pub async fn settings_restart(State(state): State<Arc<AppState>>) -> Response {
    let delay = state.config.restart_probe_delay_secs;
    let mut outcome = SettingsView::default();
    settings::restart(&state.device, &mut outcome, delay).await;
    let view = settings::reload_form(&state.device, outcome, &state.config.dns_servers).await;
    page(&state, "settings.html", &view, &view.status)
}

/// GET /settings/restart-status - One reachability probe after a restart.
pub async fn restart_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProbeQuery>,
) -> Response {
    let probe = Probe {
        delay_secs: state.config.restart_probe_delay_secs,
        attempt: query.attempt.unwrap_or(1).max(1),
    };
    let view =
        settings::restart_finished(&state.device, probe, state.config.restart_probe_attempts).await;
    page(&state, "settings.html", &view, &view.status)
}

/// GET /setup - Provisioning start page.
pub async fn setup_page(State(state): State<Arc<AppState>>) -> Response {
    let view = ProvisioningView::default();
    page(&state, "setup.html", &view, &view.status)
}

/// POST /setup/scan
pub async fn setup_scan(State(state): State<Arc<AppState>>) -> Response {
    let mut view = ProvisioningView::default();
    provisioning::scan(&state.device, &mut view).await;
    page(&state, "setup.html", &view, &view.status)
}

/// POST /setup/connect
pub async fn setup_connect(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AuthForm>,
) -> Response {
    let mut view = ProvisioningView::default();
    provisioning::submit_auth_data(&state.device, &mut view, &form.ssid, &form.pass).await;
    page(&state, "setup.html", &view, &view.status)
}

/// GET /setup/connected - Joined network and the finish action.
pub async fn setup_connected(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectedQuery>,
) -> Response {
    let mut view = ProvisioningView::default();
    provisioning::get_network_info(&state.device, &mut view).await;
    if query.confirm && view.finish_enabled {
        provisioning::show_confirmation(&mut view);
    }
    page(&state, "connected.html", &view, &view.status)
}

/// POST /setup/finish - Confirmed from the dialog on the connected page.
pub async fn setup_finish(State(state): State<Arc<AppState>>) -> Response {
    let mut view = ProvisioningView::default();
    provisioning::show_confirmation(&mut view);
    provisioning::finish_setup(&state.device, &mut view).await;
    page(&state, "connected.html", &view, &view.status)
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Config;
    use crate::testing::FakeDevice;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tera::Tera;
    use tower::ServiceExt;

    fn app(device: &FakeDevice, variant: &str) -> axum::Router {
        let config = Config {
            device_url: device.base_url().to_string(),
            api_variant: variant.into(),
            dns_servers: vec!["1.1.1.1".into(), "8.8.8.8".into()],
            restart_probe_delay_secs: 3,
            restart_probe_attempts: 2,
            ..Config::from_env()
        };
        let tera = Tera::new("templates/**/*.html").unwrap();
        crate::app(Arc::new(AppState::new(tera, config).unwrap()))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_renders_selected_number_of_rows() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest").oneshot(get("/?size=2")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("example.org"));
        assert!(body.contains("ads.example"));
        assert!(!body.contains("cdn.example"));
    }

    #[tokio::test]
    async fn test_dashboard_shows_device_error() {
        let device = FakeDevice::builder()
            .respond(
                "GET /querylog.json",
                StatusCode::INTERNAL_SERVER_ERROR,
                "log unavailable",
            )
            .start()
            .await;
        let resp = app(&device, "rest").oneshot(get("/")).await.unwrap();
        assert!(body_text(resp).await.contains("log unavailable"));
    }

    #[tokio::test]
    async fn test_rest_delete_redirects_to_blacklist() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/blacklist", "action=delete&hostname=ads.example"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/blacklist");
        assert_eq!(device.requests(), ["DELETE /blacklist/ads.example"]);
    }

    #[tokio::test]
    async fn test_form_add_reloads_blacklist_in_place() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "form")
            .oneshot(post_form("/blacklist", "action=add&hostname=new.example"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("tracker.example"));
    }

    #[tokio::test]
    async fn test_unknown_blacklist_action_is_rejected() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/blacklist", "action=PUT&hostname=ads.example"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(device.requests().is_empty());
    }

    #[tokio::test]
    async fn test_settings_page_renders_device_values() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest").oneshot(get("/settings")).await.unwrap();

        let body = body_text(resp).await;
        assert!(body.contains("sinkhole.local"));
        assert!(body.contains("Blocking On"));
    }

    #[tokio::test]
    async fn test_restart_schedules_probe() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/settings/restart", ""))
            .await
            .unwrap();

        let body = body_text(resp).await;
        assert!(body.contains("3;url=/settings/restart-status?attempt=1"));
    }

    #[tokio::test]
    async fn test_toggle_success_hides_settings_load_error() {
        let device = FakeDevice::builder()
            .respond("GET /settings.json", StatusCode::SERVICE_UNAVAILABLE, "settings busy")
            .start()
            .await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/settings/toggleblock", ""))
            .await
            .unwrap();

        let body = body_text(resp).await;
        assert!(body.contains("Blocking On"));
        assert!(!body.contains("settings busy"));
        assert_eq!(device.requests(), ["POST /toggleblock", "GET /settings.json"]);
    }

    #[tokio::test]
    async fn test_restart_only_posts_restart() {
        let device = FakeDevice::start().await;
        app(&device, "rest")
            .oneshot(post_form("/settings/restart", ""))
            .await
            .unwrap();
        assert_eq!(device.requests(), ["POST /restart"]);
    }

    #[tokio::test]
    async fn test_settings_page_carries_hidden_update_modal() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest").oneshot(get("/settings")).await.unwrap();

        let body = body_text(resp).await;
        assert!(body.contains(r#"<div id="modal" class="modal" hidden>"#));
        assert!(body.contains(r#"onsubmit="show('modal')""#));
    }

    #[tokio::test]
    async fn test_setup_page_carries_hidden_busy_indicators() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/setup/scan", ""))
            .await
            .unwrap();

        let body = body_text(resp).await;
        assert!(body.contains(r#"<span id="scanning" class="spinner" hidden>"#));
        assert!(body.contains(r#"<div id="modal" class="modal" hidden>"#));
        assert!(body.contains(r#"onsubmit="show('scanning')""#));
        assert!(body.contains(r#"onsubmit="show('modal')""#));
    }

    #[tokio::test]
    async fn test_restart_status_redirects_when_device_is_back() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(get("/settings/restart-status?attempt=1"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/settings");
    }

    #[tokio::test]
    async fn test_connected_submission_redirects() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/setup/connect", "ssid=B&pass=hunter2"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/setup/connected");
    }

    #[tokio::test]
    async fn test_finish_shows_finished_dialog() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest")
            .oneshot(post_form("/setup/finish", ""))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("id=\"finished\""));
    }

    #[tokio::test]
    async fn test_health_check() {
        let device = FakeDevice::start().await;
        let resp = app(&device, "rest").oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
