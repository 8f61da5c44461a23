use std::future::Future;

use buildboard_core::{BuildSnapshotRecord, FetchError, RequestDescriptor};
use reqwest::Client;
use tracing::debug;

use crate::config::{ClientConfig, RouteStyle};

/// Something that can answer a page request.
///
/// The production implementation is [`HttpSource`]; tests substitute
/// in-memory sources with controllable latency.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch_page(
        &self,
        descriptor: RequestDescriptor,
    ) -> impl Future<Output = Result<Vec<BuildSnapshotRecord>, FetchError>> + Send;
}

/// Request URL for `descriptor` under `base_url`.
pub fn page_url(base_url: &str, style: RouteStyle, descriptor: RequestDescriptor) -> String {
    let base = base_url.trim_end_matches('/');
    match style {
        RouteStyle::PathSegments => format!(
            "{base}/builders/number={}/offset={}",
            descriptor.limit, descriptor.offset
        ),
        RouteStyle::Query => format!(
            "{base}/data?limit={}&offset={}",
            descriptor.limit, descriptor.offset
        ),
    }
}

/// GETs pages from the builders-listing endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    route_style: RouteStyle,
}

impl HttpSource {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            route_style: config.route_style,
        }
    }

    pub fn url_for(&self, descriptor: RequestDescriptor) -> String {
        page_url(&self.base_url, self.route_style, descriptor)
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch_page(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<Vec<BuildSnapshotRecord>, FetchError> {
        let url = self.url_for(descriptor);
        debug!(%url, "fetching page");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkFailure(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::NetworkFailure(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
    }
}
