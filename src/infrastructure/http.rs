use crate::domain::ports::{BeaconResponse, BeaconTransport};
use async_trait::async_trait;

/// Sends beacons with `reqwest`, one GET per hit.
///
/// The client keeps its defaults: no timeout override and no retries.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BeaconTransport for ReqwestTransport {
    async fn send(&self, url: &str) -> BeaconResponse {
        match self.client.get(url).send().await {
            Ok(response) => BeaconResponse::ok(response.status().as_u16()),
            Err(e) => {
                let status = e.status().map(|s| s.as_u16());
                BeaconResponse::failed(e.to_string(), status)
            }
        }
    }
}
