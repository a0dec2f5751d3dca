//! Standalone uninstall.

use std::time::Duration;

use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::output::{DiagnosticLevel, OutputFormat, ResultBuilder, print_result};
use crate::shell::{AdbShell, DeviceShell, ShellOutcome};

pub async fn execute(config: &WorkflowConfig, format: OutputFormat) -> Result<()> {
	let shell = AdbShell::new(
		config.shell.adb.clone(),
		config.device.serial.clone(),
		Duration::from_secs(config.shell.timeout_secs),
	);
	let outcome = shell.uninstall(&config.app.package).await?;

	let mut builder = ResultBuilder::<ShellOutcome>::new("uninstall");
	if !outcome.success {
		builder = builder.diagnostic_with_source(
			DiagnosticLevel::Warning,
			format!("{} was not removed", config.app.package),
			"adb",
		);
	}
	print_result(&builder.data(outcome).build(), format);
	Ok(())
}
