//! Command transport to the automation server.
//!
//! [`Transport`] is the seam between the session API and the wire: it sends
//! one command (method, path relative to the endpoint, optional JSON body)
//! and returns the decoded [`Reply`]. [`HttpTransport`] is the production
//! implementation over reqwest; tests substitute scripted transports.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use droid_protocol::Reply;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

/// Boxed future returned by [`Transport`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP method of a WebDriver command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Delete,
}

impl std::fmt::Display for Method {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Method::Get => write!(f, "GET"),
			Method::Post => write!(f, "POST"),
			Method::Delete => write!(f, "DELETE"),
		}
	}
}

/// Sends commands to an automation server.
pub trait Transport: Send + Sync {
	/// Executes one command. `path` is relative to the endpoint, e.g. `session/abc/element`.
	fn execute(&self, method: Method, path: String, body: Option<Value>) -> BoxFuture<'_, Result<Reply>>;

	/// Endpoint URL used in diagnostics.
	fn endpoint(&self) -> &str;
}

/// Default per-request timeout. Long enough for a cold new-session on a slow emulator.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base: Url,
	endpoint: String,
}

impl HttpTransport {
	/// Creates a transport for `endpoint` (e.g. `http://0.0.0.0:4723/wd/hub`).
	pub fn new(endpoint: &str) -> Result<Self> {
		Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
	}

	pub fn with_timeout(endpoint: &str, request_timeout: Duration) -> Result<Self> {
		let mut base = Url::parse(endpoint)?;
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}

		let client = reqwest::Client::builder().timeout(request_timeout).build()?;

		Ok(Self {
			client,
			base,
			endpoint: endpoint.to_string(),
		})
	}

	/// Resolves a command path against the endpoint.
	pub fn url(&self, path: &str) -> Result<Url> {
		Ok(self.base.join(path.trim_start_matches('/'))?)
	}

	async fn send(&self, method: Method, path: String, body: Option<Value>) -> Result<Reply> {
		let url = self.url(&path)?;
		debug!(target = "droid", %method, %url, "command");

		let request = match method {
			Method::Get => self.client.get(url),
			Method::Post => self.client.post(url).json(&body.unwrap_or_else(|| Value::Object(Default::default()))),
			Method::Delete => self.client.delete(url),
		};

		let response = request.send().await.map_err(|err| {
			if err.is_connect() {
				Error::ConnectionFailed {
					endpoint: self.endpoint.clone(),
					reason: err.to_string(),
				}
			} else {
				Error::Http(err)
			}
		})?;

		let status = response.status();
		let text = response.text().await?;
		trace!(target = "droid", %status, body = %text, "reply");

		if text.trim().is_empty() {
			if status.is_success() {
				return Ok(Reply::Ok {
					session_id: None,
					value: Value::Null,
				});
			}
			return Err(Error::ProtocolError(format!("HTTP {status} with empty body for {method} {path}")));
		}

		match serde_json::from_str::<Value>(&text) {
			// An error status must never read as success, whatever the body says.
			Ok(body) => match Reply::decode(body) {
				Reply::Ok { .. } if !status.is_success() => {
					Err(Error::ProtocolError(format!("HTTP {status} for {method} {path}: {text}")))
				}
				reply => Ok(reply),
			},
			Err(_) if !status.is_success() => Err(Error::ProtocolError(format!("HTTP {status} for {method} {path}: {text}"))),
			Err(err) => Err(Error::Json(err)),
		}
	}
}

impl Transport for HttpTransport {
	fn execute(&self, method: Method, path: String, body: Option<Value>) -> BoxFuture<'_, Result<Reply>> {
		Box::pin(self.send(method, path, body))
	}

	fn endpoint(&self) -> &str {
		&self.endpoint
	}
}
