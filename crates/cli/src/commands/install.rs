//! Full install-and-verify run.

use std::sync::Arc;
use std::time::Duration;

use droid::HttpTransport;
use tracing::info;

use crate::cli::InstallArgs;
use crate::config::WorkflowConfig;
use crate::error::{DroidError, Result};
use crate::output::{CommandResult, DiagnosticLevel, OutputFormat, ResultBuilder, print_error_stderr, print_result};
use crate::shell::AdbShell;
use crate::workflow::{InstallWorkflow, WorkflowReport};

pub async fn execute(config: WorkflowConfig, args: &InstallArgs, format: OutputFormat) -> Result<()> {
	info!(
		target = "droid",
		app = %config.app.name,
		package = %config.app.package,
		endpoint = %config.server.endpoint,
		"install"
	);

	let transport = HttpTransport::with_timeout(
		&config.server.endpoint,
		Duration::from_secs(config.server.request_timeout_secs),
	)?;
	let shell = AdbShell::new(
		config.shell.adb.clone(),
		config.device.serial.clone(),
		Duration::from_secs(config.shell.timeout_secs),
	);

	let mut workflow = InstallWorkflow::new(config, Arc::new(transport), Arc::new(shell));
	if let Some(dir) = &args.artifacts_dir {
		workflow = workflow.with_artifacts_dir(dir.clone());
	}

	let result = install_result(&mut workflow).await;
	print_result(&result, format);

	match result.error {
		None => Ok(()),
		Some(ref error) => {
			print_error_stderr(error);
			Err(DroidError::OutputAlreadyPrinted)
		}
	}
}

/// Runs the workflow and wraps its report in a result envelope.
///
/// The report is attached on failure too, so the visited states and the
/// uninstall outcome stay visible.
pub async fn install_result(workflow: &mut InstallWorkflow) -> CommandResult<WorkflowReport> {
	let outcome = workflow.execute().await;
	let report = workflow.report();

	let mut builder = ResultBuilder::new("install").artifacts(workflow.artifacts().iter().cloned());

	if let Some(uninstall) = workflow.uninstall_outcome().filter(|u| !u.success) {
		let status = uninstall
			.exit_code
			.map_or_else(|| "a signal".to_string(), |code| format!("code {code}"));
		builder = builder.diagnostic_with_source(
			DiagnosticLevel::Warning,
			format!("uninstall exited with {status}; the app was probably not installed"),
			"adb",
		);
	}

	if let Some(warning) = &report.teardown_warning {
		builder = builder.diagnostic(DiagnosticLevel::Warning, warning.clone());
	}

	builder = builder.data(report);
	match outcome {
		Ok(_) => builder.build(),
		Err(err) => builder.command_error(err.to_command_error()).build(),
	}
}
