//! [`Element`] - a server-side reference to a UI element.

use droid_protocol::{ElementId, Locator, SendKeysBody};
use droid_runtime::{Method, Result};
use serde_json::Value;
use tracing::debug;

use crate::channel::Channel;

/// A located UI element.
///
/// The reference can go stale when the screen changes; commands on a stale
/// element fail with a "stale element reference" remote error.
#[derive(Debug, Clone)]
pub struct Element {
	channel: Channel,
	id: ElementId,
	locator: Locator,
}

impl Element {
	pub(crate) fn new(channel: Channel, id: ElementId, locator: Locator) -> Self {
		Self { channel, id, locator }
	}

	pub fn id(&self) -> &ElementId {
		&self.id
	}

	/// The locator this element was found with.
	pub fn locator(&self) -> &Locator {
		&self.locator
	}

	pub async fn click(&self) -> Result<()> {
		debug!(target = "droid", locator = %self.locator, "click");
		self.channel
			.send_no_result(Method::Post, &self.path("click"), None::<Value>, &self.context())
			.await
	}

	/// Types `text` into the element.
	pub async fn send_keys(&self, text: &str) -> Result<()> {
		debug!(target = "droid", locator = %self.locator, text, "send keys");
		self.channel
			.send_no_result(Method::Post, &self.path("value"), Some(SendKeysBody::new(text)), &self.context())
			.await
	}

	/// Visible text of the element.
	pub async fn text(&self) -> Result<String> {
		self.channel.send_no_params(Method::Get, &self.path("text"), &self.context()).await
	}

	pub async fn is_displayed(&self) -> Result<bool> {
		self.channel
			.send_no_params(Method::Get, &self.path("displayed"), &self.context())
			.await
	}

	fn path(&self, command: &str) -> String {
		format!("element/{}/{command}", self.id)
	}

	fn context(&self) -> String {
		self.locator.to_string()
	}
}
