//! Workflow descriptor: which app, which device, which server.
//!
//! Every field has a built-in default, so an empty `{}` file (or no file at
//! all) reproduces the stock Chromecast-on-Galaxy-S4 run. Values resolve as
//! CLI flag > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use droid::{Capabilities, Orientation};
use serde::{Deserialize, Serialize};

use crate::error::{DroidError, Result};

/// Upper bound for every timeout given in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Upper bound for the poll interval and implicit wait, in milliseconds.
pub const MAX_INTERVAL_MS: u64 = 60 * 1000;

/// Display name, package id and launch activity of the app to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppIdentity {
	pub name: String,
	pub package: String,
	pub activity: String,
}

impl Default for AppIdentity {
	fn default() -> Self {
		Self {
			name: "Chromecast".into(),
			package: "com.google.android.apps.chromecast.app".into(),
			activity: ".DiscoveryActivity".into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
	/// Appium endpoint, including the `/wd/hub` base path for 1.x servers.
	pub endpoint: String,
	pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			endpoint: "http://0.0.0.0:4723/wd/hub".into(),
			request_timeout_secs: 300,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceProfile {
	pub name: String,
	pub platform_name: String,
	pub platform_version: String,
	pub orientation: Orientation,
	pub device_ready_timeout_secs: u64,
	pub new_command_timeout_secs: u64,
	pub appium_version: String,
	/// adb serial; `None` lets adb pick the only attached device.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub serial: Option<String>,
}

impl Default for DeviceProfile {
	fn default() -> Self {
		Self {
			name: "Samsung Galaxy s4".into(),
			platform_name: "Android".into(),
			platform_version: "5.0.1".into(),
			orientation: Orientation::Portrait,
			device_ready_timeout_secs: 40,
			new_command_timeout_secs: 180,
			appium_version: "1.4.16".into(),
			serial: None,
		}
	}
}

/// The store app driven during the install phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
	pub package: String,
	pub activity: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			package: "com.android.vending".into(),
			activity: ".AssetBrowserActivity".into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timeouts {
	pub explicit_wait_secs: u64,
	pub install_secs: u64,
	pub poll_interval_ms: u64,
	/// Server-side implicit wait set on every session. Zero leaves lookups to the explicit waits.
	pub implicit_wait_ms: u64,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			explicit_wait_secs: 10,
			install_secs: 60,
			poll_interval_ms: 500,
			implicit_wait_ms: 0,
		}
	}
}

impl Timeouts {
	pub fn explicit_wait(&self) -> Duration {
		Duration::from_secs(self.explicit_wait_secs)
	}

	pub fn install(&self) -> Duration {
		Duration::from_secs(self.install_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn implicit_wait(&self) -> Duration {
		Duration::from_millis(self.implicit_wait_ms)
	}
}

/// What the launched app must show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyConfig {
	pub alert_title_id: String,
	pub expected_text: String,
}

impl Default for VerifyConfig {
	fn default() -> Self {
		Self {
			alert_title_id: "android:id/alertTitle".into(),
			expected_text: "Privacy and terms".into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
	pub adb: PathBuf,
	pub timeout_secs: u64,
}

impl Default for ShellConfig {
	fn default() -> Self {
		Self {
			adb: PathBuf::from("adb"),
			timeout_secs: 60,
		}
	}
}

/// Complete workflow descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowConfig {
	pub server: ServerConfig,
	pub app: AppIdentity,
	pub device: DeviceProfile,
	pub store: StoreConfig,
	pub timeouts: Timeouts,
	pub verify: VerifyConfig,
	pub shell: ShellConfig,
}

impl WorkflowConfig {
	/// Loads the descriptor from `path`, or defaults when `path` is `None`.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};

		let raw = std::fs::read_to_string(path)
			.map_err(|err| DroidError::Config(format!("cannot read {}: {err}", path.display())))?;
		serde_json::from_str(&raw).map_err(|err| DroidError::Config(format!("invalid config {}: {err}", path.display())))
	}

	/// Loads, applies overrides, and validates.
	pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
		let mut config = Self::load(path)?;
		config.apply(overrides);
		config.validate()?;
		Ok(config)
	}

	pub fn apply(&mut self, overrides: &ConfigOverrides) {
		if let Some(endpoint) = &overrides.endpoint {
			self.server.endpoint = endpoint.clone();
		}
		if let Some(name) = &overrides.app_name {
			self.app.name = name.clone();
		}
		if let Some(package) = &overrides.package {
			self.app.package = package.clone();
		}
		if let Some(activity) = &overrides.activity {
			self.app.activity = activity.clone();
		}
		if let Some(serial) = &overrides.serial {
			self.device.serial = Some(serial.clone());
		}
		if let Some(adb) = &overrides.adb {
			self.shell.adb = adb.clone();
		}
		if let Some(secs) = overrides.timeout {
			self.timeouts.explicit_wait_secs = secs;
		}
		if let Some(secs) = overrides.install_timeout {
			self.timeouts.install_secs = secs;
		}
	}

	pub fn validate(&self) -> Result<()> {
		let required = [
			("app.name", &self.app.name),
			("app.package", &self.app.package),
			("app.activity", &self.app.activity),
			("store.package", &self.store.package),
			("server.endpoint", &self.server.endpoint),
		];
		for (field, value) in required {
			if value.trim().is_empty() {
				return Err(DroidError::Config(format!("{field} must not be empty")));
			}
		}

		url::Url::parse(&self.server.endpoint)
			.map_err(|err| DroidError::Config(format!("server.endpoint {:?} is not a URL: {err}", self.server.endpoint)))?;

		let timeouts = [
			("timeouts.explicitWaitSecs", self.timeouts.explicit_wait_secs, MAX_TIMEOUT_SECS),
			("timeouts.installSecs", self.timeouts.install_secs, MAX_TIMEOUT_SECS),
			("timeouts.pollIntervalMs", self.timeouts.poll_interval_ms, MAX_INTERVAL_MS),
			("shell.timeoutSecs", self.shell.timeout_secs, MAX_TIMEOUT_SECS),
			("server.requestTimeoutSecs", self.server.request_timeout_secs, MAX_TIMEOUT_SECS),
		];
		for (field, value, max) in timeouts {
			if value == 0 {
				return Err(DroidError::Config(format!("{field} must be greater than zero")));
			}
			if value > max {
				return Err(DroidError::Config(format!("{field} must be at most {max}, got {value}")));
			}
		}
		if self.timeouts.implicit_wait_ms > MAX_INTERVAL_MS {
			return Err(DroidError::Config(format!(
				"timeouts.implicitWaitMs must be at most {MAX_INTERVAL_MS}, got {}",
				self.timeouts.implicit_wait_ms
			)));
		}

		Ok(())
	}

	/// Capabilities shared by both sessions.
	fn base_capabilities(&self) -> droid::CapabilitiesBuilder {
		Capabilities::builder()
			.device_name(&self.device.name)
			.platform_version(&self.device.platform_version)
			.platform_name(&self.device.platform_name)
			.browser_name("")
			.device_ready_timeout(self.device.device_ready_timeout_secs)
			.new_command_timeout(self.device.new_command_timeout_secs)
			.appium_version(&self.device.appium_version)
			.orientation(self.device.orientation)
	}

	/// Capabilities that open the store app.
	pub fn store_capabilities(&self) -> Capabilities {
		let mut caps = self
			.base_capabilities()
			.app_package(&self.store.package)
			.app_activity(&self.store.activity);
		if let Some(serial) = &self.device.serial {
			caps = caps.set("udid", serial.as_str());
		}
		caps.build()
	}

	/// Capabilities for the installed app; launching is left to the caller.
	pub fn app_capabilities(&self) -> Capabilities {
		let mut caps = self
			.base_capabilities()
			.app_package(&self.app.package)
			.app_activity(&self.app.activity)
			.auto_launch(false);
		if let Some(serial) = &self.device.serial {
			caps = caps.set("udid", serial.as_str());
		}
		caps.build()
	}
}

/// Command-line overrides for [`WorkflowConfig`].
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
	/// Appium server endpoint
	#[arg(long, global = true, value_name = "URL", env = "DROID_ENDPOINT")]
	pub endpoint: Option<String>,

	/// Display name of the app as shown in the store
	#[arg(long, global = true, value_name = "NAME")]
	pub app_name: Option<String>,

	/// Package id of the app
	#[arg(long, global = true, value_name = "PACKAGE")]
	pub package: Option<String>,

	/// Launch activity of the app
	#[arg(long, global = true, value_name = "ACTIVITY")]
	pub activity: Option<String>,

	/// adb device serial
	#[arg(long, global = true, value_name = "SERIAL", env = "ANDROID_SERIAL")]
	pub serial: Option<String>,

	/// Path to the adb executable
	#[arg(long, global = true, value_name = "PATH", env = "ADB")]
	pub adb: Option<PathBuf>,

	/// Explicit wait timeout in seconds
	#[arg(long, global = true, value_name = "SECS")]
	pub timeout: Option<u64>,

	/// Install completion timeout in seconds
	#[arg(long, global = true, value_name = "SECS")]
	pub install_timeout: Option<u64>,
}
