//! Runtime configuration, read from the environment once at startup.

use crate::todoist::{ServiceError, TODOIST_API_URL};

const DEFAULT_ADDR: &str = "0.0.0.0:8355";

/// Runtime configuration for the quadrantd binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the Todoist REST API. Obtaining and
    /// refreshing it is the job of an external auth flow; we only
    /// carry it.
    pub todoist_api_token: String,
    /// API root, overridable for tests and proxies.
    pub todoist_api_url: String,
    /// Address the HTTP server binds to.
    pub addr: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `TODOIST_API_TOKEN` is required; a missing token is an
    /// authentication failure, distinct from generic startup errors.
    /// `TODOIST_API_URL` and `QUADRANTD_ADDR` are optional overrides.
    pub fn from_env() -> Result<Self, ServiceError> {
        let todoist_api_token = std::env::var("TODOIST_API_TOKEN").map_err(|_| {
            ServiceError::Unauthorized(
                "TODOIST_API_TOKEN environment variable not set".to_string(),
            )
        })?;
        Ok(Self {
            todoist_api_token,
            todoist_api_url: std::env::var("TODOIST_API_URL")
                .unwrap_or_else(|_| TODOIST_API_URL.to_string()),
            addr: std::env::var("QUADRANTD_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
        })
    }
}
