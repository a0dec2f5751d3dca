//! Host-side device shell (`adb`).
//!
//! The uninstall step is best-effort: the exit status is recorded and logged
//! but never checked. Only a failure to run the command at all, or a command
//! that outlives its timeout, is an error.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{DroidError, Result};

/// Boxed future returned by [`DeviceShell`] methods.
pub type ShellFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Device management commands run from the host.
pub trait DeviceShell: Send + Sync {
	/// Removes `package` from the device. Succeeds whether or not it was installed.
	fn uninstall<'a>(&'a self, package: &'a str) -> ShellFuture<'a, Result<ShellOutcome>>;
}

/// Result of one finished shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellOutcome {
	pub command: String,
	/// Exit code; `None` when terminated by a signal.
	pub exit_code: Option<i32>,
	pub success: bool,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub stdout: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub stderr: Vec<String>,
	pub duration_ms: u64,
}

/// [`DeviceShell`] backed by the `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbShell {
	adb: PathBuf,
	serial: Option<String>,
	timeout: Duration,
}

impl AdbShell {
	pub fn new(adb: impl Into<PathBuf>, serial: Option<String>, timeout: Duration) -> Self {
		Self {
			adb: adb.into(),
			serial,
			timeout,
		}
	}

	/// Arguments for `adb uninstall`, with the device selector when set.
	pub fn uninstall_args(&self, package: &str) -> Vec<String> {
		let mut args = Vec::with_capacity(4);
		if let Some(serial) = &self.serial {
			args.push("-s".to_string());
			args.push(serial.clone());
		}
		args.push("uninstall".to_string());
		args.push(package.to_string());
		args
	}

	async fn run(&self, args: Vec<String>) -> Result<ShellOutcome> {
		let command = format!("{} {}", self.adb.display(), args.join(" "));
		info!(target = "droid", %command, "running shell command");
		let started = Instant::now();

		// stdout and stderr are drained concurrently by `wait_with_output`;
		// on timeout the future is dropped and `kill_on_drop` reaps the child.
		let child = Command::new(&self.adb)
			.args(&args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|err| DroidError::Shell {
				command: command.clone(),
				reason: format!("failed to spawn: {err}"),
			})?;

		let output = tokio::time::timeout(self.timeout, child.wait_with_output())
			.await
			.map_err(|_| DroidError::Shell {
				command: command.clone(),
				reason: format!("did not exit within {}s", self.timeout.as_secs()),
			})?
			.map_err(|err| DroidError::Shell {
				command: command.clone(),
				reason: err.to_string(),
			})?;

		let stdout = lines(&output.stdout);
		let stderr = lines(&output.stderr);
		for line in &stdout {
			info!(target = "droid", stream = "stdout", "{line}");
		}
		for line in &stderr {
			info!(target = "droid", stream = "stderr", "{line}");
		}

		let outcome = ShellOutcome {
			command,
			exit_code: output.status.code(),
			success: output.status.success(),
			stdout,
			stderr,
			duration_ms: started.elapsed().as_millis() as u64,
		};

		if !outcome.success {
			warn!(target = "droid", command = %outcome.command, exit_code = ?outcome.exit_code, "shell command exited unsuccessfully; continuing");
		}

		Ok(outcome)
	}
}

impl DeviceShell for AdbShell {
	fn uninstall<'a>(&'a self, package: &'a str) -> ShellFuture<'a, Result<ShellOutcome>> {
		Box::pin(self.run(self.uninstall_args(package)))
	}
}

fn lines(bytes: &[u8]) -> Vec<String> {
	String::from_utf8_lossy(bytes)
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect()
}
