//! Error types for the automation runtime.

use droid_protocol::WireError;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the automation server.
#[derive(Debug, Error)]
pub enum Error {
	/// The server could not be reached or refused the new session.
	#[error("Failed to connect to automation server at {endpoint}: {reason}")]
	ConnectionFailed { endpoint: String, reason: String },

	/// Transport-level HTTP failure.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Endpoint or command path is not a valid URL.
	#[error("Invalid endpoint URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	/// Response did not have the expected shape.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// Error reported by the automation server.
	#[error("{error}: {message}")]
	Remote {
		/// W3C error code (e.g. "invalid session id", "stale element reference")
		error: String,
		/// Human-readable error message
		message: String,
		/// Server-side stack trace (if available)
		stacktrace: Option<String>,
	},

	/// Element lookup matched nothing.
	#[error("Element not found: {0}")]
	NoSuchElement(String),

	/// Polling wait expired.
	#[error("Timeout after {timeout_ms}ms waiting for {condition}")]
	Timeout { condition: String, timeout_ms: u64 },

	/// Operation attempted on a session that was already deleted.
	#[error("Session closed: cannot {0} on a closed session")]
	SessionClosed(&'static str),

	/// Invalid argument provided to method.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Lifts a server-reported error into the runtime taxonomy.
	pub fn from_wire(err: WireError, context: &str) -> Self {
		if err.is_no_such_element() {
			return Error::NoSuchElement(context.to_string());
		}
		Error::Remote {
			error: err.error,
			message: err.message,
			stacktrace: err.stacktrace,
		}
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		match self {
			Error::Timeout { .. } => true,
			Error::Remote { error, .. } => error == "timeout",
			Error::Http(err) => err.is_timeout(),
			_ => false,
		}
	}

	/// Returns true if the element simply was not there (yet).
	pub fn is_not_found(&self) -> bool {
		match self {
			Error::NoSuchElement(_) => true,
			Error::Remote { error, .. } => error == "stale element reference",
			_ => false,
		}
	}

	/// Returns true if the server no longer knows the session.
	pub fn is_session_gone(&self) -> bool {
		match self {
			Error::SessionClosed(_) => true,
			Error::Remote { error, .. } => error == "invalid session id",
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn wire(error: &str) -> WireError {
		WireError {
			error: error.to_string(),
			message: "msg".to_string(),
			stacktrace: None,
		}
	}

	#[test]
	fn no_such_element_maps_to_not_found() {
		let err = Error::from_wire(wire("no such element"), "id=android:id/alertTitle");
		assert!(matches!(err, Error::NoSuchElement(ref ctx) if ctx == "id=android:id/alertTitle"));
		assert!(err.is_not_found());
	}

	#[test]
	fn invalid_session_is_session_gone() {
		let err = Error::from_wire(wire("invalid session id"), "quit");
		assert!(err.is_session_gone());
		assert!(!err.is_timeout());
	}

	#[test]
	fn stale_reference_counts_as_not_found() {
		assert!(Error::from_wire(wire("stale element reference"), "click").is_not_found());
	}
}
