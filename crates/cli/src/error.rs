use thiserror::Error;

use crate::output::{CommandError, ErrorCode};
use crate::workflow::WorkflowState;

pub type Result<T> = std::result::Result<T, DroidError>;

#[derive(Debug, Error)]
pub enum DroidError {
	/// Command failed but output has already been printed.
	/// Used to signal exit code 1 without additional output.
	#[error("")]
	OutputAlreadyPrinted,

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("cannot connect to automation server at {endpoint}: {reason}")]
	Connection { endpoint: String, reason: String },

	#[error("timed out after {timeout_ms}ms in state {state} waiting for {condition}")]
	LocateTimeout {
		state: WorkflowState,
		condition: String,
		timeout_ms: u64,
	},

	#[error("shell command `{command}` failed: {reason}")]
	Shell { command: String, reason: String },

	#[error("expected alert title {expected:?}, found {actual:?}")]
	Assertion {
		state: WorkflowState,
		expected: String,
		actual: String,
	},

	#[error("invalid workflow transition {from} -> {to}")]
	InvalidTransition { from: WorkflowState, to: WorkflowState },

	#[error("session error: {0}")]
	Session(String),

	#[error("step failed in state {state}: {source}")]
	Step {
		state: WorkflowState,
		#[source]
		source: droid::Error,
	},

	#[error("teardown failed: {0}")]
	Teardown(#[source] droid::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Automation(#[from] droid::Error),
}

impl DroidError {
	/// Check if this error indicates output has already been printed.
	pub fn is_output_already_printed(&self) -> bool {
		matches!(self, DroidError::OutputAlreadyPrinted)
	}

	/// Classifies an automation error raised while `state` was active.
	pub fn at_state(state: WorkflowState, err: droid::Error) -> Self {
		match err {
			droid::Error::Timeout { condition, timeout_ms } => DroidError::LocateTimeout {
				state,
				condition,
				timeout_ms,
			},
			droid::Error::ConnectionFailed { endpoint, reason } => DroidError::Connection { endpoint, reason },
			source => DroidError::Step { state, source },
		}
	}

	/// Workflow state that was active when this error occurred, if known.
	pub fn state(&self) -> Option<WorkflowState> {
		match self {
			DroidError::LocateTimeout { state, .. }
			| DroidError::Assertion { state, .. }
			| DroidError::Step { state, .. } => Some(*state),
			DroidError::InvalidTransition { from, .. } => Some(*from),
			_ => None,
		}
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			DroidError::OutputAlreadyPrinted => (ErrorCode::InternalError, None),
			DroidError::Config(_) => (ErrorCode::InvalidInput, None),
			DroidError::Connection { endpoint, .. } => (
				ErrorCode::ConnectionFailed,
				Some(serde_json::json!({ "endpoint": endpoint })),
			),
			DroidError::LocateTimeout {
				state,
				condition,
				timeout_ms,
			} => (
				ErrorCode::Timeout,
				Some(serde_json::json!({ "state": state, "condition": condition, "timeoutMs": timeout_ms })),
			),
			DroidError::Shell { command, .. } => (ErrorCode::ShellFailed, Some(serde_json::json!({ "command": command }))),
			DroidError::Assertion { state, expected, actual } => (
				ErrorCode::AssertionFailed,
				Some(serde_json::json!({ "state": state, "expected": expected, "actual": actual })),
			),
			DroidError::InvalidTransition { from, to } => (
				ErrorCode::InternalError,
				Some(serde_json::json!({ "from": from, "to": to })),
			),
			DroidError::Session(_) | DroidError::Teardown(_) => (ErrorCode::SessionError, None),
			DroidError::Step { state, source } => (
				classify_automation_error(source),
				Some(serde_json::json!({ "state": state })),
			),
			DroidError::Io(_) => (ErrorCode::IoError, None),
			DroidError::Json(_) => (ErrorCode::InternalError, None),
			DroidError::Automation(err) => (classify_automation_error(err), None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

fn classify_automation_error(err: &droid::Error) -> ErrorCode {
	if err.is_timeout() {
		ErrorCode::Timeout
	} else if err.is_not_found() {
		ErrorCode::ElementNotFound
	} else if err.is_session_gone() {
		ErrorCode::SessionError
	} else {
		match err {
			droid::Error::ConnectionFailed { .. } => ErrorCode::ConnectionFailed,
			_ => ErrorCode::InternalError,
		}
	}
}
