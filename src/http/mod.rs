//! HTTP client module
//!
//! Provides the authenticated session client for the controller API.
//!
//! # Features
//!
//! - **Session Management**: cookie jar and CSRF token carried across requests
//! - **Login Fallback**: UniFi OS login first, legacy controller login second
//! - **Re-authentication**: a 401 triggers one fresh login and one resend
//! - **Rate Limiting**: sliding-window request budget

mod client;
mod rate_limit;
mod shared;

pub use client::{ControllerApi, UnifiClient};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use shared::SharedClient;

#[cfg(test)]
mod tests;
