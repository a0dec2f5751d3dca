//! Response envelopes and command bodies.
//!
//! Appium 1.x servers answer in the legacy JSON Wire Protocol shape
//! (`{"sessionId", "status", "value"}`), newer ones in the W3C shape
//! (`{"value": ...}` with errors as `{"value": {"error", "message"}}`).
//! [`Reply::decode`] normalizes both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4a5c1f0ed7d8";

/// JSON Wire Protocol element identifier key.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Server-assigned element reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
	/// Extracts an element reference from a find-element `value`.
	pub fn from_value(value: &Value) -> Option<Self> {
		value
			.get(ELEMENT_KEY)
			.or_else(|| value.get(LEGACY_ELEMENT_KEY))
			.and_then(Value::as_str)
			.map(|id| ElementId(id.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for ElementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Error reported by the automation server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
	/// W3C error code (e.g. `"no such element"`).
	pub error: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stacktrace: Option<String>,
}

impl WireError {
	pub fn is_no_such_element(&self) -> bool {
		self.error == "no such element"
	}

	pub fn is_invalid_session(&self) -> bool {
		self.error == "invalid session id"
	}
}

/// Normalized command reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
	Ok {
		/// Top-level `sessionId` (JSONWP) or `value.sessionId` (W3C), if any.
		session_id: Option<String>,
		value: Value,
	},
	Err(WireError),
}

impl Reply {
	/// Decodes a response body in either dialect.
	pub fn decode(body: Value) -> Self {
		let status = body.get("status").and_then(Value::as_i64);
		let top_session = body.get("sessionId").and_then(Value::as_str).map(str::to_string);
		let value = body.get("value").cloned().unwrap_or(Value::Null);

		if let Some(status) = status {
			if status != 0 {
				return Reply::Err(WireError {
					error: legacy_status_name(status).to_string(),
					message: value
						.get("message")
						.and_then(Value::as_str)
						.map(str::to_string)
						.unwrap_or_else(|| format!("status {status}")),
					stacktrace: None,
				});
			}
		}

		if let Some(error) = value.get("error").and_then(Value::as_str) {
			return Reply::Err(WireError {
				error: error.to_string(),
				message: value.get("message").and_then(Value::as_str).unwrap_or_default().to_string(),
				stacktrace: value.get("stacktrace").and_then(Value::as_str).map(str::to_string),
			});
		}

		let session_id = top_session.or_else(|| value.get("sessionId").and_then(Value::as_str).map(str::to_string));
		Reply::Ok { session_id, value }
	}
}

/// Maps a JSON Wire Protocol status code to its W3C error name.
pub fn legacy_status_name(status: i64) -> &'static str {
	match status {
		6 => "invalid session id",
		7 => "no such element",
		8 => "no such frame",
		9 => "unknown command",
		10 => "stale element reference",
		11 => "element not interactable",
		12 => "invalid element state",
		17 => "javascript error",
		21 => "timeout",
		23 => "no such window",
		26 => "unexpected alert open",
		28 => "script timeout",
		32 => "invalid selector",
		33 => "session not created",
		_ => "unknown error",
	}
}

/// Body for `POST /session/{id}/element/{eid}/value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendKeysBody {
	pub text: String,
	/// Legacy per-character form.
	pub value: Vec<String>,
}

impl SendKeysBody {
	pub fn new(text: &str) -> Self {
		Self {
			text: text.to_string(),
			value: text.chars().map(String::from).collect(),
		}
	}
}

/// Body for `POST /session/{id}/timeouts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutsBody {
	pub implicit: u64,
}
