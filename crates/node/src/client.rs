//! Outbound calls: registry API and peer probes.
//!
//! Both sit behind traits so the agent can be driven by in-memory fakes.
//! The HTTP implementations put a hard timeout on every request; a timeout
//! surfaces as `CoordinetError::Timeout` and the caller skips the round.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

use coordinet_common::constants::paths;
use coordinet_common::{CoordinateState, CoordinetError, PeerRecord, Position, wire};

use crate::identity::NodeIdentity;
use crate::simulation::NetworkDelay;

type Result<T> = std::result::Result<T, CoordinetError>;

/// Registry operations used by the agent
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn register(&self, identity: &NodeIdentity, position: Position) -> Result<()>;

    async fn heartbeat(&self, id: &str, position: Position) -> Result<()>;

    async fn list_active(&self) -> Result<Vec<PeerRecord>>;
}

/// One RTT measurement against a peer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    /// Send-to-receive wall-clock time
    pub rtt: Duration,
    /// Peer's coordinate state as it reported it
    pub peer: CoordinateState,
}

impl ProbeSample {
    pub fn rtt_ms(&self) -> f64 {
        self.rtt.as_nanos() as f64 / 1_000_000.0
    }
}

/// Measures round trips to peers
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, peer: &PeerRecord) -> Result<ProbeSample>;
}

fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder()
        .user_agent(concat!("coordinet-node/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

fn base_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", addr.trim_end_matches('/'))
    }
}

fn transport_error(target: &str, e: reqwest::Error) -> CoordinetError {
    if e.is_timeout() {
        CoordinetError::Timeout(format!("{target}: {e}"))
    } else {
        CoordinetError::Unreachable(format!("{target}: {e}"))
    }
}

fn status_error(target: &str, status: StatusCode, body: &str) -> CoordinetError {
    let detail = format!("{target} returned {status}: {}", body.trim());
    match status {
        StatusCode::NOT_FOUND => CoordinetError::NotFound(detail),
        StatusCode::BAD_REQUEST => CoordinetError::InvalidRequest(detail),
        _ => CoordinetError::Unreachable(detail),
    }
}

/// Send a prepared request and return the body of a 2xx response
async fn fetch_text(target: &str, request: reqwest::RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(|e| transport_error(target, e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(target, e))?;

    if !status.is_success() {
        return Err(status_error(target, status, &body));
    }
    Ok(body)
}

/// Registry client over HTTP
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
    delay: NetworkDelay,
}

impl HttpRegistryClient {
    pub fn new(registry_addr: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url(registry_addr),
            delay: NetworkDelay::default(),
        })
    }

    pub fn with_delay(mut self, delay: NetworkDelay) -> Self {
        self.delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn position_query(position: Position) -> [(&'static str, String); 3] {
    [
        ("x", position.x.to_string()),
        ("y", position.y.to_string()),
        ("h", position.h.to_string()),
    ]
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn register(&self, identity: &NodeIdentity, position: Position) -> Result<()> {
        self.delay.wait().await;

        let request = self
            .client
            .get(self.url(paths::REGISTER))
            .query(&[
                ("id", identity.id.clone()),
                ("address", identity.address.clone()),
                ("ip", identity.ip.to_string()),
            ])
            .query(&position_query(position));

        fetch_text("registry register", request).await.map(|_| ())
    }

    async fn heartbeat(&self, id: &str, position: Position) -> Result<()> {
        self.delay.wait().await;

        let request = self
            .client
            .get(self.url(paths::PING))
            .query(&[("id", id)])
            .query(&position_query(position));

        fetch_text("registry ping", request).await.map(|_| ())
    }

    async fn list_active(&self) -> Result<Vec<PeerRecord>> {
        self.delay.wait().await;

        let body = fetch_text("registry nodes", self.client.get(self.url(paths::NODES))).await?;
        wire::parse_node_list(&body)
    }
}

/// Probes peers over HTTP
pub struct HttpProber {
    client: Client,
    delay: NetworkDelay,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            delay: NetworkDelay::default(),
        })
    }

    pub fn with_delay(mut self, delay: NetworkDelay) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, peer: &PeerRecord) -> Result<ProbeSample> {
        let target = format!("peer {}", peer.id);

        // Simulated delay is part of the measured path
        let start = Instant::now();
        self.delay.wait().await;
        let body = fetch_text(&target, self.client.get(peer.probe_url())).await?;
        let rtt = start.elapsed();

        let state = wire::parse_probe(&body)?;
        Ok(ProbeSample { rtt, peer: state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("registry:2020"), "http://registry:2020");
        assert_eq!(base_url("http://127.0.0.1:2020/"), "http://127.0.0.1:2020");
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error("registry", StatusCode::NOT_FOUND, "Node not found"),
            CoordinetError::NotFound(_)
        ));
        assert!(matches!(
            status_error("registry", StatusCode::BAD_REQUEST, "missing id"),
            CoordinetError::InvalidRequest(_)
        ));
        assert!(matches!(
            status_error("registry", StatusCode::INTERNAL_SERVER_ERROR, ""),
            CoordinetError::Unreachable(_)
        ));
    }

    #[test]
    fn test_rtt_ms() {
        let sample = ProbeSample {
            rtt: Duration::from_micros(50_500),
            peer: CoordinateState::default(),
        };
        assert!((sample.rtt_ms() - 50.5).abs() < 1e-9);
    }

    /// Accepts connections and never writes a byte
    async fn silent_listener() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_hung_peer_times_out() {
        let addr = silent_listener().await;
        let peer = PeerRecord::new("n9", addr.to_string(), "127.0.0.1", Position::ORIGIN);
        let prober = HttpProber::new(Duration::from_millis(300)).unwrap();

        let start = Instant::now();
        let err = prober.probe(&peer).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, CoordinetError::Timeout(_)), "{err:?}");
        assert!(err.is_retryable());
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_hung_registry_times_out() {
        let addr = silent_listener().await;
        let timeout = Duration::from_millis(300);
        let client = HttpRegistryClient::new(&addr.to_string(), timeout).unwrap();

        let err = client.heartbeat("n1", Position::ORIGIN).await.unwrap_err();
        assert!(matches!(err, CoordinetError::Timeout(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_registry() {
        // Nothing listens on port 1
        let client = HttpRegistryClient::new("127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.list_active().await.unwrap_err();
        assert!(err.is_retryable(), "{err:?}");
    }
}
