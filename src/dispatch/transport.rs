use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::TransportError;

/// Raw response of one management exchange. Any HTTP status is a transport
/// success — classification happens in the dispatcher.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Network seam of the dispatcher: one request, one response, single
/// in-flight assumption per call.
#[async_trait]
pub trait ManagementTransport: Send + Sync {
    async fn send(&self, payload: Vec<u8>) -> Result<WireResponse, TransportError>;
}

/// Process-wide session state attached to every dispatch. The bearer token is
/// shared so a re-authentication flow can swap it without rebuilding clients.
#[derive(Debug, Default, Clone)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

/// HTTP transport posting management requests to a single endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    session: Session,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, session: Session) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, session, Duration::from_secs(30))
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl ManagementTransport for HttpTransport {
    async fn send(&self, payload: Vec<u8>) -> Result<WireResponse, TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.session.token().await {
            request = request.bearer_auth(token);
        }
        let response = request.body(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "management exchange completed");
        Ok(WireResponse { status, body })
    }
}
