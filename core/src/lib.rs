//! Blocking admin client for a private gemserver.
//!
//! # Overview
//! `Backend` creates and revokes access keys and fetches server stats over
//! plain HTTP. Each call blocks until the whole response is read and hands
//! back the raw body text.
//!
//! # Design
//! - The network sits behind `Transport`; `UreqTransport` is the default.
//! - When no host is given, `HostResolver` supplies the deployment's default
//!   hostname (`GcloudResolver` shells out to `gcloud app describe`).
//! - Verbs are a closed enum; string verbs outside POST/PUT/GET fail with
//!   `ApiError::UnsupportedVerb` instead of sending anything.

pub mod client;
pub mod error;
pub mod http;
pub mod resolver;

pub use client::{Backend, StatusPolicy, KEY_ENDPOINT, STATS_ENDPOINT};
pub use error::ApiError;
pub use http::{FormParams, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use resolver::{parse_app_description, GcloudResolver, HostResolver};
