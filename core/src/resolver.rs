//! Default host lookup for a deployed gemserver.
//!
//! When no host is given, the client asks the App Engine deployment for its
//! `defaultHostname`. The lookup sits behind `HostResolver` so tests can
//! count or stub calls instead of shelling out.

use std::process::Command;

use serde::Deserialize;

use crate::error::ApiError;

pub trait HostResolver {
    fn resolve_default_host(&self) -> Result<String, ApiError>;
}

impl<F> HostResolver for F
where
    F: Fn() -> Result<String, ApiError>,
{
    fn resolve_default_host(&self) -> Result<String, ApiError> {
        self()
    }
}

/// Runs `gcloud app describe --format=json` and reads `defaultHostname`.
#[derive(Debug, Clone)]
pub struct GcloudResolver {
    program: String,
}

impl GcloudResolver {
    pub fn new() -> Self {
        Self::with_program("gcloud")
    }

    /// Use a different executable, e.g. a pinned SDK path.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn command_line(&self) -> String {
        format!("{} app describe --format=json", self.program)
    }
}

impl Default for GcloudResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HostResolver for GcloudResolver {
    fn resolve_default_host(&self) -> Result<String, ApiError> {
        tracing::debug!(command = %self.command_line(), "resolving default host");

        let output = Command::new(&self.program)
            .args(["app", "describe", "--format=json"])
            .output()
            .map_err(|source| ApiError::ResolverSpawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(ApiError::ResolverFailed {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let host = parse_app_description(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(host = %host, "resolved default host");
        Ok(host)
    }
}

#[derive(Deserialize)]
struct AppDescription {
    #[serde(rename = "defaultHostname")]
    default_hostname: Option<String>,
}

/// Pull `defaultHostname` out of `gcloud app describe` JSON output.
pub fn parse_app_description(text: &str) -> Result<String, ApiError> {
    let description: AppDescription = serde_json::from_str(text)?;
    match description.default_hostname {
        Some(host) if !host.trim().is_empty() => Ok(host.trim().to_string()),
        _ => Err(ApiError::MissingHostname),
    }
}
