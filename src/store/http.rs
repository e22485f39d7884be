//! Port store backed by a remote portstream server.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Port, Ports};
use crate::error::{Error, Result};
use crate::server::REQUEST_ID_HEADER;
use crate::store::PortStore;

const PORTS_PATH: &str = "/ports";
const BULK_UPSERT_PATH: &str = "/ports/bulk-upsert";

/// Client for the `/ports` HTTP API of a remote portstream server.
///
/// Every request carries an `x-request-id` header so the two processes can
/// be correlated in the logs.
pub struct HttpPortClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPortClient {
    /// Create a new client against `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn request_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl PortStore for HttpPortClient {
    async fn get(&self, id: &str) -> Result<Port> {
        let url = format!("{}{}/{}", self.base_url, PORTS_PATH, id);
        debug!(%url, "fetching port");

        let res = self
            .client
            .get(&url)
            .header(REQUEST_ID_HEADER, Self::request_id())
            .send()
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(Error::PortNotFound),
            status if status.is_success() => Ok(res.json::<Port>().await?),
            status => Err(Error::Lookup(format!("GET {url} returned {status}"))),
        }
    }

    async fn bulk_upsert(&self, ports: Ports) -> Result<()> {
        let url = format!("{}{}", self.base_url, BULK_UPSERT_PATH);
        debug!(%url, count = ports.len(), "posting bulk upsert");

        let res = self
            .client
            .post(&url)
            .header(REQUEST_ID_HEADER, Self::request_id())
            .json(&ports)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Sink(format!("bulk upsert returned {status}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod http_client_spec {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::HttpPortClient;
    use crate::domain::{Port, Ports};
    use crate::error::{Error, Result};
    use crate::server;
    use crate::store::PortStore;
    use crate::store::memory::MemoryStore;

    /// Backend whose every operation fails, to drive the server's 500 path.
    struct BrokenStore;

    #[async_trait]
    impl PortStore for BrokenStore {
        async fn get(&self, _id: &str) -> Result<Port> {
            Err(Error::Server("backend down".into()))
        }

        async fn bulk_upsert(&self, _ports: Ports) -> Result<()> {
            Err(Error::Server("backend down".into()))
        }
    }

    async fn spawn_server_with(store: Arc<dyn PortStore>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, server::router(store)).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn spawn_server() -> String {
        spawn_server_with(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let client = HttpPortClient::new(spawn_server().await);

        let port = Port {
            id: "AEAJM".into(),
            name: "Ajman".into(),
            ..Port::default()
        };
        client.bulk_upsert(vec![port.clone()]).await.unwrap();

        let fetched = client.get("AEAJM").await.unwrap();
        assert_eq!(port, fetched);
    }

    #[tokio::test]
    async fn get_on_unknown_id_is_not_found() {
        let client = HttpPortClient::new(spawn_server().await);
        assert!(matches!(client.get("NOPE").await, Err(Error::PortNotFound)));
    }

    #[tokio::test]
    async fn failed_lookup_is_reported_as_a_lookup_error() {
        let client = HttpPortClient::new(spawn_server_with(Arc::new(BrokenStore)).await);

        let err = client.get("AEAJM").await.unwrap_err();
        match &err {
            Error::Lookup(msg) => assert!(msg.contains("500"), "got {msg}"),
            other => panic!("expected lookup error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("failed to get port"));
    }

    #[tokio::test]
    async fn failed_upsert_is_reported_as_a_sink_error() {
        let client = HttpPortClient::new(spawn_server_with(Arc::new(BrokenStore)).await);

        let err = client.bulk_upsert(vec![]).await.unwrap_err();
        match &err {
            Error::Sink(msg) => assert!(msg.contains("500"), "got {msg}"),
            other => panic!("expected sink error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        // nothing listens on this port
        let client = HttpPortClient::new("http://127.0.0.1:9");
        assert!(matches!(
            client.bulk_upsert(vec![]).await,
            Err(Error::Http(_))
        ));
    }
}
