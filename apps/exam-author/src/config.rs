//! # Configuration
//!
//! Settings come from the environment. Each missing variable falls back to a
//! default, and the fallback is logged.

use crate::error::AppError;
use crate::token::SessionToken;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

pub const API_URL_VAR: &str = "EXAM_API_URL";
pub const AUTH_TOKEN_VAR: &str = "EXAM_AUTH_TOKEN";
pub const AUTH_COOKIE_VAR: &str = "EXAM_AUTH_COOKIE";
pub const TIMEOUT_VAR: &str = "EXAM_HTTP_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub auth_cookie: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            auth_cookie: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_url = lookup(API_URL_VAR).unwrap_or_else(|| {
            info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                warn!("Invalid {TIMEOUT_VAR} value: {e}");
                AppError::Config(format!("{TIMEOUT_VAR} must be a number of seconds, got {raw:?}"))
            })?,
            None => {
                info!("{TIMEOUT_VAR} not set, using default: {DEFAULT_TIMEOUT_SECS}");
                DEFAULT_TIMEOUT_SECS
            }
        };
        if timeout_secs == 0 {
            return Err(AppError::Config(format!("{TIMEOUT_VAR} must be positive")));
        }

        let auth_token = lookup(AUTH_TOKEN_VAR);
        let auth_cookie = lookup(AUTH_COOKIE_VAR);
        if auth_token.is_none() && auth_cookie.is_none() {
            warn!("Neither {AUTH_TOKEN_VAR} nor {AUTH_COOKIE_VAR} set, requests will be anonymous");
        }

        Ok(Self {
            api_url,
            auth_token,
            auth_cookie,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if token.is_some() {
            self.auth_token = token;
        }
        self
    }

    pub fn tokens(&self) -> SessionToken {
        SessionToken::new(self.auth_token.clone(), self.auth_cookie.as_deref())
    }
}

// =============================================================================
// TESTS
// =============================================================================
