//! Login scheme and credential types

use serde_json::{json, Value};

/// Login endpoint family understood by UniFi controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScheme {
    /// UniFi OS consoles (UDM, UDR, Cloud Key Gen2+)
    UnifiOs,
    /// Standalone Network Application controllers
    Legacy,
}

impl LoginScheme {
    /// Schemes in the order they are attempted
    pub const ATTEMPT_ORDER: [LoginScheme; 2] = [LoginScheme::UnifiOs, LoginScheme::Legacy];

    /// Login endpoint path
    pub fn login_path(self) -> &'static str {
        match self {
            LoginScheme::UnifiOs => "/api/auth/login",
            LoginScheme::Legacy => "/api/login",
        }
    }

    /// Logout endpoint path
    pub fn logout_path(self) -> &'static str {
        match self {
            LoginScheme::UnifiOs => "/api/auth/logout",
            LoginScheme::Legacy => "/api/logout",
        }
    }

    /// JSON body for the login request
    pub fn login_body(self, credentials: &Credentials) -> Value {
        match self {
            LoginScheme::UnifiOs => json!({
                "username": credentials.username,
                "password": credentials.password,
                "remember": false,
                "strict": true
            }),
            LoginScheme::Legacy => json!({
                "username": credentials.username,
                "password": credentials.password
            }),
        }
    }

    /// Short name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            LoginScheme::UnifiOs => "unifi_os",
            LoginScheme::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for LoginScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
