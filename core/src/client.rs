//! Blocking client for the gemserver admin API.
//!
//! # Design
//! `Backend` owns one transport and the base URL it was bound to at
//! construction. All three operations go through `dispatch`, which builds an
//! `HttpRequest` for a typed verb, sends it, and returns the raw body text.
//! Nothing about a request outlives the call.

use crate::error::ApiError;
use crate::http::{
    FormParams, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport, FORM_CONTENT_TYPE,
};
use crate::resolver::{GcloudResolver, HostResolver};

pub const KEY_ENDPOINT: &str = "/api/v1/key";
pub const STATS_ENDPOINT: &str = "/api/v1/stats";

/// What to do with a non-2xx response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Return the body whatever the status; callers inspect it themselves.
    #[default]
    Lenient,
    /// Turn non-2xx responses into `ApiError::HttpError`.
    Strict,
}

/// Client for key management and stats on a private gemserver.
///
/// Owns its transport exclusively, so it is not `Clone`; callers that need
/// several clients construct several.
///
/// ```compile_fail
/// fn shares_handle<T: Clone>() {}
/// shares_handle::<gemserver_core::Backend>();
/// ```
#[derive(Debug)]
pub struct Backend<T = UreqTransport> {
    base_url: String,
    transport: T,
    status_policy: StatusPolicy,
}

impl Backend<UreqTransport> {
    /// Bind to `host`, or to the deployment's default hostname when `None`.
    pub fn new(host: Option<&str>) -> Result<Self, ApiError> {
        Self::with_transport(host, &GcloudResolver::new(), UreqTransport::new())
    }
}

impl<T: Transport> Backend<T> {
    /// Bind `transport` to `host`. `resolver` is consulted exactly once, and
    /// only when `host` is `None`.
    pub fn with_transport<R>(host: Option<&str>, resolver: &R, transport: T) -> Result<Self, ApiError>
    where
        R: HostResolver + ?Sized,
    {
        match host {
            Some(host) => Ok(Self::from_host(host, transport)),
            None => {
                let host = resolver.resolve_default_host()?;
                Ok(Self::from_host(&host, transport))
            }
        }
    }

    pub fn from_host(host: &str, transport: T) -> Self {
        Self {
            base_url: base_url(host),
            transport,
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a key. `permissions` is passed through unvalidated; when
    /// `None` the field is left out and the server picks its default.
    pub fn create_key(&self, permissions: Option<&str>) -> Result<String, ApiError> {
        let params = FormParams::new().with("permissions", permissions);
        self.dispatch(HttpMethod::Post, KEY_ENDPOINT, Some(&params))
    }

    /// Revoke `key`. The API does this with a PUT on the key endpoint.
    pub fn delete_key(&self, key: &str) -> Result<String, ApiError> {
        let params = FormParams::new().with("key", Some(key));
        self.dispatch(HttpMethod::Put, KEY_ENDPOINT, Some(&params))
    }

    /// Fetch the server's summary of private gems and cached dependencies.
    pub fn stats(&self) -> Result<String, ApiError> {
        self.dispatch(HttpMethod::Get, STATS_ENDPOINT, None)
    }

    pub fn build_create_key(&self, permissions: Option<&str>) -> HttpRequest {
        let params = FormParams::new().with("permissions", permissions);
        self.build_request(HttpMethod::Post, KEY_ENDPOINT, Some(&params))
    }

    pub fn build_delete_key(&self, key: &str) -> HttpRequest {
        let params = FormParams::new().with("key", Some(key));
        self.build_request(HttpMethod::Put, KEY_ENDPOINT, Some(&params))
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.build_request(HttpMethod::Get, STATS_ENDPOINT, None)
    }

    /// Send an arbitrary request by verb name. Verbs other than POST, PUT
    /// and GET are rejected before anything is sent.
    pub fn request(&self, verb: &str, endpoint: &str, params: Option<&FormParams>) -> Result<String, ApiError> {
        let method: HttpMethod = verb.parse()?;
        self.dispatch(method, endpoint, params)
    }

    fn dispatch(&self, method: HttpMethod, endpoint: &str, params: Option<&FormParams>) -> Result<String, ApiError> {
        self.send(self.build_request(method, endpoint, params))
    }

    fn build_request(&self, method: HttpMethod, endpoint: &str, params: Option<&FormParams>) -> HttpRequest {
        let url = format!("{}{endpoint}", self.base_url);

        match params {
            Some(params) if method.carries_body() => HttpRequest {
                method,
                url,
                headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
                body: Some(params.encode()),
            },
            _ => {
                if params.is_some_and(|p| !p.is_empty()) {
                    tracing::debug!(%method, %url, "dropping form params on bodiless request");
                }
                HttpRequest {
                    method,
                    url,
                    headers: Vec::new(),
                    body: None,
                }
            }
        }
    }

    fn send(&self, request: HttpRequest) -> Result<String, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        self.check_status(&request, response)
    }

    fn check_status(&self, request: &HttpRequest, response: HttpResponse) -> Result<String, ApiError> {
        if response.is_success() {
            return Ok(response.body);
        }
        match self.status_policy {
            StatusPolicy::Strict => Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            }),
            StatusPolicy::Lenient => {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "server returned non-success status"
                );
                Ok(response.body)
            }
        }
    }
}

/// Bare hosts are spoken to over plain HTTP; an explicit scheme is kept.
fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| host.get(..scheme.len()).is_some_and(|p| p.eq_ignore_ascii_case(scheme)));
    if has_scheme {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
