//! HTTP request model and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `Backend` builds an `HttpRequest`,
//! hands it to a `Transport`, and reads the body out of the `HttpResponse`.
//! `UreqTransport` is the blocking production implementation; tests swap in
//! a recording transport without touching the network.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The verbs the admin API understands. Anything else is rejected when
/// parsed from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }

    /// Whether form parameters are encoded into a request body.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(ApiError::UnsupportedVerb(s.to_string())),
        }
    }
}

/// Ordered form parameters. A `None` value means the field is left out of
/// the encoded body; `Some("")` is sent as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, Option<String>)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Option<&str>) -> Self {
        self.pairs.push((key.to_string(), value.map(str::to_string)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Encode as `application/x-www-form-urlencoded`, skipping absent values.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref()
                    .map(|v| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// An HTTP request described as plain data. `url` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request synchronously.
///
/// Implementations must return non-2xx responses (3xx included) as `Ok`;
/// status handling belongs to `Backend`. Redirects are not followed, so the
/// response always answers the request that was sent.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// No connection is opened until the first request goes out. Not `Clone`:
/// each transport owns its agent and connection pool.
///
/// ```compile_fail
/// fn shares_handle<T: Clone>() {}
/// shares_handle::<gemserver_core::UreqTransport>();
/// ```
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let body = request.body.as_deref().map(str::as_bytes);

        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if request.method == HttpMethod::Post {
                    self.agent.post(&request.url)
                } else {
                    self.agent.put(&request.url)
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response.body_mut().read_to_vec()?;
        let body = String::from_utf8(bytes)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("PUT".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
        assert_eq!("Get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
    }

    #[test]
    fn unknown_verb_is_a_typed_error() {
        let err = "delete".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedVerb(ref v) if v == "delete"));
    }

    #[test]
    fn only_post_and_put_carry_a_body() {
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Put.carries_body());
        assert!(!HttpMethod::Get.carries_body());
    }

    #[test]
    fn absent_values_are_left_out_of_the_form() {
        let params = FormParams::new().with("permissions", None);
        assert_eq!(params.encode(), "");

        let params = FormParams::new()
            .with("a", None)
            .with("key", Some("abc123"));
        assert_eq!(params.encode(), "key=abc123");
    }

    #[test]
    fn empty_string_is_kept_distinct_from_absent() {
        let params = FormParams::new().with("permissions", Some(""));
        assert_eq!(params.encode(), "permissions=");
        assert_eq!(params.get("permissions"), Some(Some("")));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn form_values_are_percent_encoded_in_order() {
        let params = FormParams::new()
            .with("b", Some("read write"))
            .with("a", Some("x&y=z"));
        assert_eq!(params.encode(), "b=read%20write&a=x%26y%3Dz");
    }

    #[test]
    fn success_covers_2xx_only() {
        let mut response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 301;
        assert!(!response.is_success());
        response.status = 500;
        assert!(!response.is_success());
    }
}
