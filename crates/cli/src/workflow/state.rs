//! Explicit state machine for the install workflow.
//!
//! States only move forward one step at a time. Any failure parks the machine
//! in [`WorkflowState::Failed`], remembering which state was active.

use std::time::Instant;

use serde::Serialize;

/// Progress of an install run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowState {
	Uninitialized,
	StoreSessionOpen,
	Searching,
	AppTileVisible,
	OverflowOpen,
	InstallRequested,
	PermissionAccepted,
	Installing,
	Installed,
	AppSessionOpen,
	AppLaunched,
	Verified,
	Failed,
}

impl WorkflowState {
	/// Forward order of the non-failure states.
	pub const SEQUENCE: [WorkflowState; 12] = [
		WorkflowState::Uninitialized,
		WorkflowState::StoreSessionOpen,
		WorkflowState::Searching,
		WorkflowState::AppTileVisible,
		WorkflowState::OverflowOpen,
		WorkflowState::InstallRequested,
		WorkflowState::PermissionAccepted,
		WorkflowState::Installing,
		WorkflowState::Installed,
		WorkflowState::AppSessionOpen,
		WorkflowState::AppLaunched,
		WorkflowState::Verified,
	];

	/// Position in [`Self::SEQUENCE`]; `None` for `Failed`.
	pub fn ordinal(self) -> Option<usize> {
		Self::SEQUENCE.iter().position(|s| *s == self)
	}

	/// The only state this one may advance to.
	pub fn next(self) -> Option<WorkflowState> {
		self.ordinal().and_then(|i| Self::SEQUENCE.get(i + 1).copied())
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, WorkflowState::Verified | WorkflowState::Failed)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			WorkflowState::Uninitialized => "uninitialized",
			WorkflowState::StoreSessionOpen => "storeSessionOpen",
			WorkflowState::Searching => "searching",
			WorkflowState::AppTileVisible => "appTileVisible",
			WorkflowState::OverflowOpen => "overflowOpen",
			WorkflowState::InstallRequested => "installRequested",
			WorkflowState::PermissionAccepted => "permissionAccepted",
			WorkflowState::Installing => "installing",
			WorkflowState::Installed => "installed",
			WorkflowState::AppSessionOpen => "appSessionOpen",
			WorkflowState::AppLaunched => "appLaunched",
			WorkflowState::Verified => "verified",
			WorkflowState::Failed => "failed",
		}
	}
}

impl std::fmt::Display for WorkflowState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Rejected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
	pub from: WorkflowState,
	pub to: WorkflowState,
}

/// One entered state with its offset from the start of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
	pub state: WorkflowState,
	pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct StateMachine {
	current: WorkflowState,
	failed_at: Option<WorkflowState>,
	visits: Vec<Visit>,
	started: Instant,
}

impl Default for StateMachine {
	fn default() -> Self {
		Self::new()
	}
}

impl StateMachine {
	pub fn new() -> Self {
		Self {
			current: WorkflowState::Uninitialized,
			failed_at: None,
			visits: vec![Visit {
				state: WorkflowState::Uninitialized,
				elapsed_ms: 0,
			}],
			started: Instant::now(),
		}
	}

	pub fn current(&self) -> WorkflowState {
		self.current
	}

	/// State that was active when the run failed.
	pub fn failed_at(&self) -> Option<WorkflowState> {
		self.failed_at
	}

	pub fn visits(&self) -> &[Visit] {
		&self.visits
	}

	/// Moves to `to`, which must be the immediate successor of the current state.
	pub fn advance(&mut self, to: WorkflowState) -> Result<(), InvalidTransition> {
		if self.current.next() != Some(to) {
			return Err(InvalidTransition { from: self.current, to });
		}
		self.current = to;
		self.visits.push(Visit {
			state: to,
			elapsed_ms: self.started.elapsed().as_millis() as u64,
		});
		Ok(())
	}

	/// Parks the machine in `Failed` and returns the state active at failure.
	///
	/// Failing twice keeps the first failure point.
	pub fn fail(&mut self) -> WorkflowState {
		if let Some(at) = self.failed_at {
			return at;
		}
		let at = self.current;
		self.failed_at = Some(at);
		self.current = WorkflowState::Failed;
		self.visits.push(Visit {
			state: WorkflowState::Failed,
			elapsed_ms: self.started.elapsed().as_millis() as u64,
		});
		at
	}
}
