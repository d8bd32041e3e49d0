//! Error types for the gemserver admin client.
//!
//! # Design
//! Host resolution gets one variant per failure step (spawn, exit status,
//! parse, missing field) so callers can tell a missing `gcloud` binary from
//! an app that has no default hostname. Network failures collapse into
//! `Transport`. `HttpError` is only produced under `StatusPolicy::Strict`;
//! the default policy hands back the raw body whatever the status.

use thiserror::Error;

/// Errors returned by `Backend` and its collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The host resolver command could not be started.
    #[error("failed to run `{command}`: {source}")]
    ResolverSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The host resolver command ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    ResolverFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The resolver output could not be parsed as an app description.
    #[error("malformed app description: {0}")]
    MalformedDescription(#[from] serde_json::Error),

    /// The app description has no usable `defaultHostname` field.
    #[error("app description has no defaultHostname")]
    MissingHostname,

    /// The request never produced a response (refused, unreachable, DNS...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not valid UTF-8. It is never decoded lossily.
    #[error("response body is not valid UTF-8: {0}")]
    InvalidBody(#[from] std::string::FromUtf8Error),

    /// The dispatch routine was handed a verb outside POST/PUT/GET.
    #[error("unsupported HTTP verb: {0:?}")]
    UnsupportedVerb(String),

    /// Non-2xx status, only under `StatusPolicy::Strict`.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
