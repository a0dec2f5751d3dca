//! The install-and-verify run: uninstall, install from the store, launch,
//! check the first screen.
//!
//! [`InstallWorkflow`] owns at most one [`Session`] at a time. Every step is
//! gated by an explicit wait and moves the [`StateMachine`] forward; the first
//! error parks it in [`WorkflowState::Failed`] and is returned with the state
//! that was active.

mod locators;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use droid::{Session, Transport};
use serde::Serialize;
use tracing::{debug, info, warn};

pub use self::locators::{StoreLocators, alert_title};
pub use self::state::{InvalidTransition, StateMachine, Visit, WorkflowState};
use crate::config::WorkflowConfig;
use crate::error::{DroidError, Result};
use crate::output::{Artifact, ArtifactType};
use crate::shell::{DeviceShell, ShellOutcome};

/// Serializable outcome of a run, complete or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
	pub app: String,
	pub package: String,
	pub state: WorkflowState,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failed_at: Option<WorkflowState>,
	pub visited: Vec<Visit>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub uninstall: Option<ShellOutcome>,
	pub expected_text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub verified_text: Option<String>,
	/// Set when teardown found the session already gone on the server.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub teardown_warning: Option<String>,
}

pub struct InstallWorkflow {
	config: WorkflowConfig,
	transport: Arc<dyn Transport>,
	shell: Arc<dyn DeviceShell>,
	locators: StoreLocators,
	session: Option<Session>,
	machine: StateMachine,
	uninstall: Option<ShellOutcome>,
	verified_text: Option<String>,
	teardown_warning: Option<String>,
	artifacts_dir: Option<PathBuf>,
	artifacts: Vec<Artifact>,
}

impl InstallWorkflow {
	pub fn new(config: WorkflowConfig, transport: Arc<dyn Transport>, shell: Arc<dyn DeviceShell>) -> Self {
		let locators = StoreLocators::new(&config.store.package, &config.app.name);
		Self {
			config,
			transport,
			shell,
			locators,
			session: None,
			machine: StateMachine::new(),
			uninstall: None,
			verified_text: None,
			teardown_warning: None,
			artifacts_dir: None,
			artifacts: Vec::new(),
		}
	}

	/// Saves the page source into `dir` when a step fails.
	pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.artifacts_dir = Some(dir.into());
		self
	}

	pub fn state(&self) -> WorkflowState {
		self.machine.current()
	}

	pub fn failed_at(&self) -> Option<WorkflowState> {
		self.machine.failed_at()
	}

	/// Whether a session is currently held open.
	pub fn has_session(&self) -> bool {
		self.session.as_ref().is_some_and(|s| !s.is_closed())
	}

	pub fn uninstall_outcome(&self) -> Option<&ShellOutcome> {
		self.uninstall.as_ref()
	}

	pub fn artifacts(&self) -> &[Artifact] {
		&self.artifacts
	}

	pub fn report(&self) -> WorkflowReport {
		WorkflowReport {
			app: self.config.app.name.clone(),
			package: self.config.app.package.clone(),
			state: self.machine.current(),
			failed_at: self.machine.failed_at(),
			visited: self.machine.visits().to_vec(),
			uninstall: self.uninstall.clone(),
			expected_text: self.config.verify.expected_text.clone(),
			verified_text: self.verified_text.clone(),
			teardown_warning: self.teardown_warning.clone(),
		}
	}

	/// Opens the store session and removes any existing copy of the app.
	///
	/// # Errors
	///
	/// Fails if the session cannot be opened or the uninstall command cannot
	/// be run. A non-zero uninstall exit status is only recorded.
	pub async fn setup(&mut self) -> Result<()> {
		let result = self.setup_steps().await;
		self.settle(result).await
	}

	async fn setup_steps(&mut self) -> Result<()> {
		let caps = self.config.store_capabilities();
		self.open_session(&caps).await?;
		self.advance(WorkflowState::StoreSessionOpen)?;

		let outcome = self.shell.uninstall(&self.config.app.package).await?;
		info!(
			target = "droid",
			package = %self.config.app.package,
			success = outcome.success,
			exit_code = ?outcome.exit_code,
			"uninstall finished"
		);
		self.uninstall = Some(outcome);
		Ok(())
	}

	/// Installs the app from the store, launches it and checks the alert title.
	///
	/// # Errors
	///
	/// Returns the first failing step's error; nothing after it runs.
	pub async fn run(&mut self) -> Result<()> {
		let result = self.run_steps().await;
		self.settle(result).await
	}

	async fn run_steps(&mut self) -> Result<()> {
		self.advance(WorkflowState::Searching)?;
		let store = self.active_session()?;
		let locators = self.locators.clone();
		let name = self.config.app.name.clone();

		let search_box = self.visible(&store, &locators.search_box()).await?;
		search_box.click().await.map_err(|e| self.at(e))?;

		let input = self.visible(&store, &locators.search_input()).await?;
		input.send_keys(&name).await.map_err(|e| self.at(e))?;

		let suggestion = self.visible(&store, &locators.suggestion()).await?;
		suggestion.click().await.map_err(|e| self.at(e))?;

		self.visible(&store, &locators.tile_title()).await?;
		self.advance(WorkflowState::AppTileVisible)?;

		let overflow = self.visible(&store, &locators.overflow()).await?;
		overflow.click().await.map_err(|e| self.at(e))?;
		self.advance(WorkflowState::OverflowOpen)?;

		let install = self.visible(&store, &locators.install_entry()).await?;
		install.click().await.map_err(|e| self.at(e))?;
		self.advance(WorkflowState::InstallRequested)?;

		let accept = self.visible(&store, &locators.continue_button()).await?;
		accept.click().await.map_err(|e| self.at(e))?;
		self.advance(WorkflowState::PermissionAccepted)?;

		self.advance(WorkflowState::Installing)?;
		info!(target = "droid", app = %name, timeout_secs = self.config.timeouts.install_secs, "waiting for install to finish");
		store
			.wait_for(self.config.timeouts.install())
			.until_present(&locators.installed_label())
			.await
			.map_err(|e| self.at(e))?;
		self.advance(WorkflowState::Installed)?;

		self.close_session().await?;

		let caps = self.config.app_capabilities();
		self.open_session(&caps).await?;
		self.advance(WorkflowState::AppSessionOpen)?;
		let app = self.active_session()?;

		app.launch_app().await.map_err(|e| self.at(e))?;
		self.advance(WorkflowState::AppLaunched)?;

		let title = self.visible(&app, &alert_title(&self.config.verify.alert_title_id)).await?;
		let text = title.text().await.map_err(|e| self.at(e))?;
		self.verified_text = Some(text.clone());

		let expected = &self.config.verify.expected_text;
		if &text != expected {
			return Err(DroidError::Assertion {
				state: self.machine.current(),
				expected: expected.clone(),
				actual: text,
			});
		}
		self.advance(WorkflowState::Verified)?;
		info!(target = "droid", app = %name, text = %text, "alert title verified");
		Ok(())
	}

	/// Closes whatever session is open.
	///
	/// A session that is already gone on the server is not an error; it is
	/// logged and kept as the report's `teardown_warning`.
	///
	/// # Errors
	///
	/// Returns [`DroidError::Teardown`] if the server rejects the close.
	pub async fn teardown(&mut self) -> Result<()> {
		let Some(session) = self.session.take() else {
			return Ok(());
		};
		match session.quit().await {
			Ok(()) => Ok(()),
			Err(err) if err.is_session_gone() => {
				warn!(target = "droid", session = %session.id(), error = %err, "session already closed on the server");
				self.teardown_warning = Some(format!("session {} already closed: {err}", session.id()));
				Ok(())
			}
			Err(err) => {
				warn!(target = "droid", session = %session.id(), error = %err, "failed to close session");
				Err(DroidError::Teardown(err))
			}
		}
	}

	/// Runs setup, run and teardown. Teardown happens on every path.
	///
	/// # Errors
	///
	/// The setup or run error when there is one, else a teardown error.
	pub async fn execute(&mut self) -> Result<WorkflowReport> {
		let primary = match self.setup().await {
			Ok(()) => self.run().await,
			Err(err) => Err(err),
		};
		let closed = self.teardown().await;

		match (primary, closed) {
			(Err(err), Err(teardown)) => {
				warn!(target = "droid", error = %teardown, "teardown also failed");
				Err(err)
			}
			(Err(err), Ok(())) => Err(err),
			(Ok(()), Err(teardown)) => Err(teardown),
			(Ok(()), Ok(())) => Ok(self.report()),
		}
	}

	async fn open_session(&mut self, caps: &droid::Capabilities) -> Result<()> {
		if self.has_session() {
			return Err(DroidError::Session(format!(
				"cannot open a session in state {} while another is open",
				self.machine.current()
			)));
		}
		let session = Session::start(Arc::clone(&self.transport), caps)
			.await
			.map_err(|e| self.at(e))?
			.with_default_timeout(self.config.timeouts.explicit_wait())
			.with_poll_interval(self.config.timeouts.poll_interval());
		// Held before configuring it, so teardown still closes it on failure.
		self.session = Some(session.clone());
		session
			.set_implicit_wait(self.config.timeouts.implicit_wait())
			.await
			.map_err(|e| self.at(e))
	}

	async fn close_session(&mut self) -> Result<()> {
		let state = self.machine.current();
		match self.session.take() {
			Some(session) => session.quit().await.map_err(|e| DroidError::at_state(state, e)),
			None => Ok(()),
		}
	}

	fn active_session(&self) -> Result<Session> {
		match &self.session {
			Some(session) if !session.is_closed() => Ok(session.clone()),
			_ => Err(DroidError::Session(format!("no open session in state {}", self.machine.current()))),
		}
	}

	async fn visible(&self, session: &Session, locator: &droid::Locator) -> Result<droid::Element> {
		session.wait().until_visible(locator).await.map_err(|e| self.at(e))
	}

	fn advance(&mut self, to: WorkflowState) -> Result<()> {
		self.machine
			.advance(to)
			.map_err(|InvalidTransition { from, to }| DroidError::InvalidTransition { from, to })?;
		debug!(target = "droid", state = %to, "entered state");
		Ok(())
	}

	fn at(&self, err: droid::Error) -> DroidError {
		DroidError::at_state(self.machine.current(), err)
	}

	/// Moves to `Failed` on error and captures diagnostics.
	async fn settle(&mut self, result: Result<()>) -> Result<()> {
		let Err(err) = result else {
			return Ok(());
		};
		let at = self.machine.fail();
		warn!(target = "droid", state = %at, error = %err, "workflow failed");
		self.capture_page_source(at).await;
		Err(err)
	}

	async fn capture_page_source(&mut self, at: WorkflowState) {
		let Some(dir) = self.artifacts_dir.clone() else {
			return;
		};
		let Some(session) = self.session.as_ref().filter(|s| !s.is_closed()) else {
			return;
		};

		let source = match session.page_source().await {
			Ok(source) => source,
			Err(err) => {
				warn!(target = "droid", error = %err, "could not capture page source");
				return;
			}
		};

		let path = dir.join(format!("droid-failure-{at}.xml"));
		let written = async {
			tokio::fs::create_dir_all(&dir).await?;
			tokio::fs::write(&path, source.as_bytes()).await
		};
		match written.await {
			Ok(()) => {
				info!(target = "droid", path = %path.display(), "saved page source");
				self.artifacts.push(Artifact {
					artifact_type: ArtifactType::PageSource,
					path,
					size_bytes: Some(source.len() as u64),
				});
			}
			Err(err) => warn!(target = "droid", path = %path.display(), error = %err, "could not save page source"),
		}
	}
}

impl std::fmt::Debug for InstallWorkflow {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InstallWorkflow")
			.field("app", &self.config.app.name)
			.field("state", &self.machine.current())
			.field("session", &self.session)
			.finish_non_exhaustive()
	}
}
