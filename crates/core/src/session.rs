//! [`Session`] - one live automation session on a device.

use std::sync::Arc;
use std::time::Duration;

use droid_protocol::{Capabilities, ElementId, Locator, Reply, TimeoutsBody};
use droid_runtime::{Error, Method, Result, Transport};
use serde_json::Value;
use tracing::{debug, info};

use crate::channel::Channel;
use crate::element::Element;
use crate::wait::Wait;

/// Explicit-wait timeout used when none is configured.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between polls of an explicit wait.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// An active session with the automation server.
///
/// Created by [`Session::start`], ended by [`Session::quit`]. Cloning yields
/// another handle to the same server-side session.
#[derive(Debug, Clone)]
pub struct Session {
	channel: Channel,
	capabilities: Value,
	default_timeout: Duration,
	poll_interval: Duration,
}

impl Session {
	/// Opens a new session with the given capabilities.
	///
	/// # Errors
	///
	/// Returns [`Error::ConnectionFailed`] if the server is unreachable or
	/// refuses to create the session.
	pub async fn start(transport: Arc<dyn Transport>, capabilities: &Capabilities) -> Result<Self> {
		let endpoint = transport.endpoint().to_string();
		info!(target = "droid", %endpoint, package = ?capabilities.get_str(droid_protocol::keys::APP_PACKAGE), "starting session");

		let reply = transport
			.execute(Method::Post, "session".into(), Some(capabilities.new_session_body()))
			.await?;

		let (session_id, value) = match reply {
			Reply::Ok {
				session_id: Some(id),
				value,
			} => (id, value),
			Reply::Ok { session_id: None, .. } => {
				return Err(Error::ProtocolError("new session reply carried no session id".into()));
			}
			Reply::Err(err) => {
				return Err(Error::ConnectionFailed {
					endpoint,
					reason: format!("{}: {}", err.error, err.message),
				});
			}
		};

		// W3C nests the capabilities next to the id; JSONWP returns them bare.
		let capabilities = value.get("capabilities").cloned().unwrap_or(value);
		debug!(target = "droid", session = %session_id, "session started");

		Ok(Self {
			channel: Channel::new(Arc::from(session_id.as_str()), transport),
			capabilities,
			default_timeout: DEFAULT_WAIT_TIMEOUT,
			poll_interval: DEFAULT_POLL_INTERVAL,
		})
	}

	/// Sets the timeout used by [`Session::wait`].
	pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;
		self
	}

	/// Sets the polling interval of explicit waits.
	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	pub fn id(&self) -> &str {
		self.channel.session_id()
	}

	/// Capabilities the server reported for this session.
	pub fn capabilities(&self) -> &Value {
		&self.capabilities
	}

	pub fn default_timeout(&self) -> Duration {
		self.default_timeout
	}

	pub fn poll_interval(&self) -> Duration {
		self.poll_interval
	}

	pub fn is_closed(&self) -> bool {
		self.channel.is_closed()
	}

	/// Explicit wait with the session's default timeout.
	pub fn wait(&self) -> Wait<'_> {
		Wait::new(self, self.default_timeout, self.poll_interval)
	}

	/// Explicit wait with a custom timeout.
	pub fn wait_for(&self, timeout: Duration) -> Wait<'_> {
		Wait::new(self, timeout, self.poll_interval)
	}

	/// Sets the server-side implicit wait applied to every element lookup.
	pub async fn set_implicit_wait(&self, timeout: Duration) -> Result<()> {
		let body = TimeoutsBody {
			implicit: timeout.as_millis() as u64,
		};
		self.channel.send_no_result(Method::Post, "timeouts", Some(body), "set timeouts").await
	}

	/// Finds the first element matching `locator`.
	///
	/// # Errors
	///
	/// Returns [`Error::NoSuchElement`] if nothing matches right now.
	pub async fn find_element(&self, locator: &Locator) -> Result<Element> {
		let context = locator.to_string();
		let value: Value = self
			.channel
			.send(Method::Post, "element", Some(locator.to_find_body()), &context)
			.await?;
		let id = ElementId::from_value(&value)
			.ok_or_else(|| Error::ProtocolError(format!("find element reply has no element reference: {value}")))?;

		Ok(Element::new(self.channel.clone(), id, locator.clone()))
	}

	/// Launches the app named by the session's `appPackage`/`appActivity`.
	pub async fn launch_app(&self) -> Result<()> {
		info!(target = "droid", session = %self.id(), "launching app");
		self.channel
			.send_no_result(Method::Post, "appium/app/launch", None::<Value>, "launch app")
			.await
	}

	/// XML dump of the current view hierarchy.
	pub async fn page_source(&self) -> Result<String> {
		self.channel.send_no_params(Method::Get, "source", "page source").await
	}

	/// Deletes the session on the server.
	///
	/// # Errors
	///
	/// Returns [`Error::SessionClosed`] if this session was already quit. The
	/// session counts as closed even when the delete command itself fails.
	pub async fn quit(&self) -> Result<()> {
		if !self.channel.mark_closed() {
			return Err(Error::SessionClosed("quit"));
		}
		info!(target = "droid", session = %self.id(), "quitting session");

		let path = format!("session/{}", self.id());
		match self.channel.transport().execute(Method::Delete, path, None).await? {
			Reply::Ok { .. } => Ok(()),
			Reply::Err(err) => Err(Error::from_wire(err, "quit")),
		}
	}
}
