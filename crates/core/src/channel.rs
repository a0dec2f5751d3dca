//! Channel - command proxy for one session.
//!
//! A [`Channel`] prefixes every command path with `session/{id}/`, sends it
//! through the shared [`Transport`], and turns server-reported errors into
//! [`Error`]s. Once the session is deleted the channel refuses further
//! commands instead of letting the server answer "invalid session id".

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use droid_protocol::Reply;
use droid_runtime::{Error, Method, Result, Transport};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Clone)]
pub struct Channel {
	session_id: Arc<str>,
	transport: Arc<dyn Transport>,
	closed: Arc<AtomicBool>,
}

impl Channel {
	pub fn new(session_id: Arc<str>, transport: Arc<dyn Transport>) -> Self {
		Self {
			session_id,
			transport,
			closed: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Sends a session-scoped command and decodes its `value`.
	///
	/// `context` names the operation in errors (usually the locator).
	pub async fn send<P: Serialize, R: DeserializeOwned>(
		&self,
		method: Method,
		path: &str,
		params: Option<P>,
		context: &str,
	) -> Result<R> {
		let value = self.send_raw(method, path, params, context).await?;
		serde_json::from_value(value).map_err(Into::into)
	}

	/// Sends a command with no body.
	pub async fn send_no_params<R: DeserializeOwned>(&self, method: Method, path: &str, context: &str) -> Result<R> {
		self.send(method, path, None::<Value>, context).await
	}

	/// Sends a command whose result is ignored.
	pub async fn send_no_result<P: Serialize>(&self, method: Method, path: &str, params: Option<P>, context: &str) -> Result<()> {
		self.send_raw(method, path, params, context).await?;
		Ok(())
	}

	async fn send_raw<P: Serialize>(&self, method: Method, path: &str, params: Option<P>, context: &str) -> Result<Value> {
		if self.is_closed() {
			return Err(Error::SessionClosed("send commands"));
		}

		let body = params.map(serde_json::to_value).transpose()?;
		let full_path = if path.is_empty() {
			format!("session/{}", self.session_id)
		} else {
			format!("session/{}/{}", self.session_id, path)
		};

		match self.transport.execute(method, full_path, body).await? {
			Reply::Ok { value, .. } => Ok(value),
			Reply::Err(err) => Err(Error::from_wire(err, context)),
		}
	}

	/// Marks the channel closed. Returns false if it already was.
	pub(crate) fn mark_closed(&self) -> bool {
		!self.closed.swap(true, Ordering::SeqCst)
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub fn transport(&self) -> &Arc<dyn Transport> {
		&self.transport
	}
}

impl std::fmt::Debug for Channel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Channel")
			.field("session_id", &self.session_id)
			.field("endpoint", &self.transport.endpoint())
			.field("closed", &self.is_closed())
			.finish()
	}
}
