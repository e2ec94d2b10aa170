//! Authenticator implementation
//!
//! Runs the two-step login protocol: UniFi OS first, legacy controller second.

use super::session::SessionState;
use super::types::{Credentials, LoginScheme};
use crate::error::{Error, Result};
use crate::types::join_url;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Authenticator logs a session in and out of the controller
pub struct Authenticator {
    /// Login credentials
    credentials: Credentials,
    /// HTTP client shared with the session client
    http_client: Client,
    /// Controller root URL
    base_url: String,
    /// Transport timeout, reported on timeouts
    timeout: Duration,
}

impl Authenticator {
    /// Create an authenticator that reuses an existing HTTP client
    pub fn with_client(
        credentials: Credentials,
        http_client: Client,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            http_client,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Log in, trying each scheme in order.
    ///
    /// On success the session is marked authenticated and has absorbed the
    /// login response's cookies and CSRF token.
    pub async fn login(&self, session: &mut SessionState) -> Result<LoginScheme> {
        let mut failures = Vec::with_capacity(LoginScheme::ATTEMPT_ORDER.len());

        for scheme in LoginScheme::ATTEMPT_ORDER {
            match self.attempt(scheme, session).await {
                Ok(()) => return Ok(scheme),
                Err(e) if failures.is_empty() => {
                    warn!("{scheme} login failed ({e}), trying the next scheme");
                    failures.push(e.to_string());
                }
                Err(e) => {
                    debug!("{scheme} login failed: {e}");
                    failures.push(e.to_string());
                }
            }
        }

        let mut failures = failures.into_iter();
        let primary = failures.next().unwrap_or_default();
        Err(Error::Authentication {
            primary,
            fallback: failures.collect::<Vec<_>>().join("; "),
        })
    }

    /// Run a single login scheme
    async fn attempt(&self, scheme: LoginScheme, session: &mut SessionState) -> Result<()> {
        let url = join_url(&self.base_url, scheme.login_path());
        debug!("Attempting {scheme} login at {url}");

        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&scheme.login_body(&self.credentials))
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        session.absorb_headers(response.headers());
        session.mark_authenticated(scheme);
        info!(
            "Authenticated as '{}' using {scheme} login",
            self.credentials.username
        );
        Ok(())
    }

    /// Send the logout request for the session's login scheme
    pub async fn logout(&self, session: &SessionState) -> Result<()> {
        let scheme = session.scheme().unwrap_or(LoginScheme::UnifiOs);
        let url = join_url(&self.base_url, scheme.logout_path());

        let response = session
            .apply(self.http_client.post(&url).header(ACCEPT, "application/json"))
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
