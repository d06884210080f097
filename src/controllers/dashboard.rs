//! Query log viewer.

use tracing::{debug, error};

use crate::client::DeviceClient;
use crate::models::QueryLogEntry;
use crate::policy::QueryLogFormat;
use crate::view::{QueryLogView, QueryRow, RowAction, BLOCKED_MARKER};

/// Loads the query log and renders at most `size` rows in device order.
pub async fn load_queries(client: &DeviceClient, size: usize) -> QueryLogView {
    let mut view = QueryLogView::new(size);

    match client.policy().query_log {
        QueryLogFormat::Json => match client.query_log().await {
            Ok(entries) => view.rows = entries.into_iter().take(size).map(to_row).collect(),
            Err(e) => {
                error!("Error loading queries: {}", e);
                view.status.show_error(e.to_string());
            }
        },
        QueryLogFormat::Csv => match client.query_log_csv().await {
            Ok(csv) => debug!("Query log:\n{}", csv),
            Err(e) => {
                error!("Error loading queries: {}", e);
                view.status.show_error(e.to_string());
            }
        },
    }

    view
}

fn to_row(entry: QueryLogEntry) -> QueryRow {
    let (color, action) = if entry.blocked {
        (Some(BLOCKED_MARKER), RowAction::Confirm)
    } else {
        (
            None,
            RowAction::Block {
                domain: entry.domain.clone(),
            },
        )
    };
    QueryRow {
        time: entry.time,
        domain: entry.domain,
        client: entry.client,
        color,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ApiPolicy;
    use crate::testing::FakeDevice;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_rows_capped_at_selected_size() {
        let device = FakeDevice::start().await;
        let view = load_queries(&device.client(ApiPolicy::rest()), 2).await;
        let domains: Vec<_> = view.rows.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, ["example.org", "ads.example"]);
        assert!(view.status.error.is_none());
    }

    #[tokio::test]
    async fn test_rows_limited_by_available_entries() {
        let device = FakeDevice::start().await;
        let view = load_queries(&device.client(ApiPolicy::rest()), 100).await;
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.size, 100);
    }

    #[tokio::test]
    async fn test_blocked_row_is_marked_and_inert() {
        let device = FakeDevice::start().await;
        let view = load_queries(&device.client(ApiPolicy::rest()), 25).await;

        let blocked = &view.rows[1];
        assert_eq!(blocked.color, Some(BLOCKED_MARKER));
        assert_eq!(blocked.action, RowAction::Confirm);

        let allowed = &view.rows[0];
        assert_eq!(allowed.color, None);
        assert_eq!(
            allowed.action,
            RowAction::Block {
                domain: "example.org".into()
            }
        );
    }

    #[tokio::test]
    async fn test_failure_shows_raw_body() {
        let device = FakeDevice::builder()
            .respond("GET /querylog.json", StatusCode::INTERNAL_SERVER_ERROR, "log unavailable")
            .start()
            .await;
        let view = load_queries(&device.client(ApiPolicy::rest()), 25).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.status.error.as_deref(), Some("log unavailable"));
    }

    #[tokio::test]
    async fn test_csv_log_is_read_but_not_rendered() {
        let device = FakeDevice::start().await;
        let view = load_queries(&device.client(ApiPolicy::form()), 25).await;
        assert!(view.rows.is_empty());
        assert!(view.status.error.is_none());
        assert_eq!(device.requests(), ["GET /querylog.csv"]);
    }
}
