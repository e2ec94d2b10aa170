//! Session state: authentication flag, CSRF token and cookie jar

use super::types::LoginScheme;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::RequestBuilder;

/// Header carrying the anti-forgery token, in both directions
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Ordered cookie store, unique by cookie name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cookie, replacing the value of an existing entry in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Store the `name=value` pair of a `Set-Cookie` header value.
    ///
    /// Attributes (`Path`, `Expires`, ...) are dropped. Returns the cookie
    /// name, or `None` if the header had no usable pair.
    pub fn store_set_cookie(&mut self, header: &str) -> Option<String> {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.set(name, value.trim());
        Some(name.to_string())
    }

    /// Look up a cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of stored cookies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no cookie is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the jar as a single `Cookie` header value
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Mutable state of one controller session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    authenticated: bool,
    scheme: Option<LoginScheme>,
    csrf_token: Option<String>,
    cookies: CookieJar,
}

impl SessionState {
    /// Fresh, unauthenticated state
    pub fn new() -> Self {
        Self::default()
    }

    /// True after a successful login and until a 401 or logout
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Scheme of the current (or most recent) login
    pub fn scheme(&self) -> Option<LoginScheme> {
        self.scheme
    }

    /// Latest CSRF token seen from the controller
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Stored cookies
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Record a successful login
    pub fn mark_authenticated(&mut self, scheme: LoginScheme) {
        self.authenticated = true;
        self.scheme = Some(scheme);
    }

    /// Forget the login; cookies and token stay until replaced
    pub fn mark_unauthenticated(&mut self) {
        self.authenticated = false;
    }

    /// Merge `Set-Cookie` and `X-CSRF-Token` headers from a response
    pub fn absorb_headers(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                self.cookies.store_set_cookie(raw);
            }
        }

        if let Some(token) = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            self.csrf_token = Some(token.to_string());
        }
    }

    /// Attach the cookie and CSRF headers to an outgoing request
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        let mut req = req;
        if let Some(cookie) = self.cookies.header_value() {
            req = req.header(COOKIE, cookie);
        }
        if let Some(token) = &self.csrf_token {
            req = req.header(CSRF_HEADER, token.as_str());
        }
        req
    }
}
