//! Session client for the controller REST API
//!
//! Every request goes through the same pipeline:
//! - wait for the rate limiter
//! - log in if the session is not authenticated
//! - attach cookies and CSRF token from the session, send, merge response headers
//! - on 401, log in again and resend exactly once

use super::rate_limit::RateLimiter;
use crate::auth::{Authenticator, Credentials, SessionState};
use crate::config::UnifiConfig;
use crate::error::{Error, Result};
use crate::types::join_url;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Verb-level access to the controller, as if already logged in
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// GET a resource
    async fn get(&self, path: &str) -> Result<Value>;
    /// POST a JSON body
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
    /// PUT a JSON body
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;
    /// DELETE a resource
    async fn delete(&self, path: &str) -> Result<Value>;
}

/// Authenticated, rate-limited client for one controller
pub struct UnifiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    authenticator: Authenticator,
    session: RwLock<SessionState>,
    rate_limiter: RateLimiter,
}

impl UnifiClient {
    /// Create a client for the configured controller. No request is sent.
    pub fn new(config: &UnifiConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?.to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("unifi-mcp/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let authenticator = Authenticator::with_client(
            Credentials::new(&config.username, &config.password),
            client.clone(),
            base_url.clone(),
            config.timeout,
        );

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            authenticator,
            session: RwLock::new(SessionState::new()),
            rate_limiter: RateLimiter::new(&config.rate_limit),
        })
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    /// Make a generic request and parse the JSON response
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        self.rate_limiter.wait_if_needed().await;
        self.ensure_authenticated().await?;

        let response = self.send(&method, path, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return into_json(response).await;
        }

        warn!("{method} {path} returned 401, re-authenticating");
        self.session.write().await.mark_unauthenticated();
        self.ensure_authenticated().await?;

        let response = self.send(&method, path, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.write().await.mark_unauthenticated();
        }
        into_json(response).await
    }

    /// Log in unless the session already is
    async fn ensure_authenticated(&self) -> Result<()> {
        if self.session.read().await.is_authenticated() {
            return Ok(());
        }

        let mut session = self.session.write().await;

        // Another task may have logged in while we waited for the lock
        if session.is_authenticated() {
            return Ok(());
        }

        self.authenticator.login(&mut session).await?;
        Ok(())
    }

    /// Send one request with the current session headers
    async fn send(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = join_url(&self.base_url, path);

        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }
        let req = self.session.read().await.apply(req);

        debug!("{method} {url}");
        let response = req
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;

        self.session.write().await.absorb_headers(response.headers());
        Ok(response)
    }

    /// Best-effort logout. Never fails; the session always ends unauthenticated.
    pub async fn close(&self) {
        let mut session = self.session.write().await;
        if session.is_authenticated() {
            match self.authenticator.logout(&session).await {
                Ok(()) => info!("Logged out of controller"),
                Err(e) => warn!("Error during logout: {e}"),
            }
        }
        session.mark_unauthenticated();
    }

    /// True while the session is logged in
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Snapshot of the session state
    pub async fn session(&self) -> SessionState {
        self.session.read().await.clone()
    }

    /// Controller root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The request rate limiter
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl ControllerApi for UnifiClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }
}

impl std::fmt::Debug for UnifiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("authenticator", &self.authenticator)
            .field("rate_limiter", &self.rate_limiter.config())
            .finish_non_exhaustive()
    }
}

/// Turn a response into JSON, surfacing non-2xx statuses as errors
async fn into_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(Error::http_status(status.as_u16(), text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
