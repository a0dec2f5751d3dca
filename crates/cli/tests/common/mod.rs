//! In-memory device and shell for driving the install workflow.
//!
//! [`FakeDevice`] answers the WebDriver commands the workflow sends and keeps
//! a cursor on the current store screen. Clicks and typing move the cursor;
//! lookups only resolve elements shown on the current screen, so a skipped or
//! reordered step surfaces as a lookup that never succeeds. Both fakes append
//! to one shared log so tests can assert on the order of shell and server
//! interactions.

#![allow(dead_code)]

use std::sync::Arc;

use droid::protocol::Reply;
use droid::runtime::BoxFuture;
use droid::{Method, Result, Transport};
use droid_cli::config::WorkflowConfig;
use droid_cli::shell::{DeviceShell, ShellFuture, ShellOutcome};
use droid_cli::workflow::InstallWorkflow;
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4a5c1f0ed7d8";

pub type Log = Arc<Mutex<Vec<String>>>;

/// What the simulated device does.
#[derive(Debug, Clone)]
pub struct Scenario {
	pub suggestion_appears: bool,
	pub install_finishes: bool,
	pub alert_text: String,
	pub refuse_sessions: bool,
	pub quit_fails: bool,
	/// Delete-session answers `invalid session id`.
	pub quit_session_gone: bool,
	/// Element whose clicks are accepted but change nothing on screen.
	pub ignored_click: Option<&'static str>,
	/// Uninstall exit code reported by the fake shell.
	pub uninstall_exit: i32,
}

impl Default for Scenario {
	fn default() -> Self {
		Self {
			suggestion_appears: true,
			install_finishes: true,
			alert_text: "Privacy and terms".into(),
			refuse_sessions: false,
			quit_fails: false,
			quit_session_gone: false,
			ignored_click: None,
			uninstall_exit: 0,
		}
	}
}

/// What the device is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
	#[default]
	Off,
	StoreHome,
	SearchOpen,
	SearchTyped,
	Results,
	OverflowMenu,
	Permissions,
	Downloading,
	AppIdle,
	AppLaunched,
}

#[derive(Default)]
struct DeviceState {
	sessions: u32,
	/// `appPackage` of each opened session, in order.
	packages: Vec<String>,
	/// Implicit wait set on each session, in ms.
	implicit_waits: Vec<u64>,
	screen: Screen,
}

pub struct FakeDevice {
	scenario: Scenario,
	log: Log,
	state: Mutex<DeviceState>,
}

impl FakeDevice {
	pub fn new(scenario: Scenario, log: Log) -> Arc<Self> {
		Arc::new(Self {
			scenario,
			log,
			state: Mutex::new(DeviceState::default()),
		})
	}

	pub fn packages(&self) -> Vec<String> {
		self.state.lock().packages.clone()
	}

	pub fn implicit_waits(&self) -> Vec<u64> {
		self.state.lock().implicit_waits.clone()
	}

	pub fn screen(&self) -> Screen {
		self.state.lock().screen
	}

	/// Elements shown on `screen`.
	fn shown(&self, screen: Screen) -> Vec<&'static str> {
		let scenario = &self.scenario;
		match screen {
			Screen::Off | Screen::AppIdle => vec![],
			Screen::StoreHome => vec!["search"],
			Screen::SearchOpen => vec!["input"],
			Screen::SearchTyped if scenario.suggestion_appears => vec!["input", "suggestion"],
			Screen::SearchTyped => vec!["input"],
			Screen::Results => vec!["tile", "overflow"],
			Screen::OverflowMenu => vec!["install"],
			Screen::Permissions => vec!["continue"],
			Screen::Downloading if scenario.install_finishes => vec!["tile", "installed"],
			Screen::Downloading => vec!["tile"],
			Screen::AppLaunched => vec!["alert"],
		}
	}

	/// Screen reached by clicking `element` on `screen`.
	fn after_click(screen: Screen, element: &str) -> Screen {
		match (screen, element) {
			(Screen::StoreHome, "search") => Screen::SearchOpen,
			(Screen::SearchTyped, "suggestion") => Screen::Results,
			(Screen::Results, "overflow") => Screen::OverflowMenu,
			(Screen::OverflowMenu, "install") => Screen::Permissions,
			(Screen::Permissions, "continue") => Screen::Downloading,
			_ => screen,
		}
	}

	/// W3C stale reference for elements no longer on screen.
	fn stale(id: &str) -> Value {
		json!({ "value": { "error": "stale element reference", "message": format!("{id} is not on screen") } })
	}

	fn record(&self, entry: String) {
		self.log.lock().push(entry);
	}

	fn handle(&self, method: Method, path: &str, body: Option<Value>) -> Value {
		let parts: Vec<&str> = path.split('/').collect();
		match (method, parts.as_slice()) {
			(Method::Post, ["session"]) => self.new_session(body.unwrap_or(Value::Null)),
			(Method::Delete, ["session", id]) => {
				self.record(format!("quit {id}"));
				if self.scenario.quit_session_gone {
					json!({ "value": { "error": "invalid session id", "message": "session timed out" } })
				} else if self.scenario.quit_fails {
					json!({ "value": { "error": "unknown error", "message": "adb went away" } })
				} else {
					self.state.lock().screen = Screen::Off;
					json!({ "value": null })
				}
			}
			(Method::Post, ["session", _, "timeouts"]) => {
				let implicit = body.as_ref().and_then(|b| b["implicit"].as_u64()).unwrap_or_default();
				self.state.lock().implicit_waits.push(implicit);
				json!({ "value": null })
			}
			(Method::Post, ["session", _, "element"]) => self.find(body.unwrap_or(Value::Null)),
			(Method::Get, ["session", _, "element", _, "displayed"]) => json!({ "value": true }),
			(Method::Post, ["session", _, "element", id, "click"]) => self.click(id),
			(Method::Post, ["session", _, "element", id, "value"]) => {
				let text = body
					.as_ref()
					.and_then(|b| b.get("text"))
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string();
				self.record(format!("type {id} {text}"));
				let mut state = self.state.lock();
				if !self.shown(state.screen).contains(id) {
					return Self::stale(id);
				}
				if *id == "input" {
					state.screen = Screen::SearchTyped;
				}
				json!({ "value": null })
			}
			(Method::Get, ["session", _, "element", "alert", "text"]) => json!({ "value": self.scenario.alert_text }),
			(Method::Post, ["session", id, "appium", "app", "launch"]) => {
				self.record(format!("launch {id}"));
				self.state.lock().screen = Screen::AppLaunched;
				json!({ "value": null })
			}
			(Method::Get, ["session", _, "source"]) => json!({ "value": "<hierarchy rotation=\"0\"/>" }),
			_ => json!({ "value": { "error": "unknown command", "message": format!("{method} {path}") } }),
		}
	}

	fn new_session(&self, body: Value) -> Value {
		if self.scenario.refuse_sessions {
			return json!({ "value": { "error": "session not created", "message": "no devices" } });
		}
		let package = body["desiredCapabilities"]["appPackage"].as_str().unwrap_or_default().to_string();
		let mut state = self.state.lock();
		state.sessions += 1;
		state.packages.push(package.clone());
		state.screen = if package == "com.android.vending" {
			Screen::StoreHome
		} else {
			Screen::AppIdle
		};
		let id = format!("s{}", state.sessions);
		drop(state);

		self.record(format!("session {id} {package}"));
		// Legacy JSONWP shape, as Appium 1.4 answers.
		json!({ "sessionId": id, "status": 0, "value": body["desiredCapabilities"] })
	}

	fn find(&self, body: Value) -> Value {
		let using = body["using"].as_str().unwrap_or_default();
		let value = body["value"].as_str().unwrap_or_default();

		let element = if using == "class name" && value == "android.widget.EditText" {
			Some("input")
		} else if value.contains("search_box_idle_text") {
			Some("search")
		} else if value.contains("suggest_text") {
			Some("suggestion")
		} else if value.contains("li_overflow") {
			Some("overflow")
		} else if value.contains("li_label") {
			Some("installed")
		} else if value.contains("li_title") {
			Some("tile")
		} else if value.contains(r#".text("Install")"#) {
			Some("install")
		} else if value.contains("continue_button") {
			Some("continue")
		} else if value.contains("alertTitle") {
			Some("alert")
		} else {
			None
		};
		let screen = self.state.lock().screen;
		let found = element.filter(|id| self.shown(screen).contains(id));

		match found {
			Some(id) => json!({ "value": { ELEMENT_KEY: id } }),
			// JSONWP status 7: no such element.
			None => json!({ "status": 7, "value": { "message": "An element could not be located" } }),
		}
	}
}

impl FakeDevice {
	fn click(&self, id: &str) -> Value {
		self.record(format!("click {id}"));
		let mut state = self.state.lock();
		if !self.shown(state.screen).contains(&id) {
			return Self::stale(id);
		}
		if self.scenario.ignored_click != Some(id) {
			state.screen = Self::after_click(state.screen, id);
		}
		json!({ "value": null })
	}
}

impl Transport for FakeDevice {
	fn execute(&self, method: Method, path: String, body: Option<Value>) -> BoxFuture<'_, Result<Reply>> {
		let reply = Reply::decode(self.handle(method, &path, body));
		Box::pin(async move { Ok(reply) })
	}

	fn endpoint(&self) -> &str {
		"fake://device"
	}
}

pub struct FakeShell {
	exit_code: i32,
	log: Log,
}

impl FakeShell {
	pub fn new(exit_code: i32, log: Log) -> Arc<Self> {
		Arc::new(Self { exit_code, log })
	}
}

impl DeviceShell for FakeShell {
	fn uninstall<'a>(&'a self, package: &'a str) -> ShellFuture<'a, droid_cli::error::Result<ShellOutcome>> {
		Box::pin(async move {
			self.log.lock().push(format!("uninstall {package}"));
			Ok(ShellOutcome {
				command: format!("adb uninstall {package}"),
				exit_code: Some(self.exit_code),
				success: self.exit_code == 0,
				stdout: vec![if self.exit_code == 0 { "Success".into() } else { "Failure".into() }],
				stderr: Vec::new(),
				duration_ms: 1,
			})
		})
	}
}

/// Defaults with short waits so failing scenarios finish quickly.
pub fn fast_config() -> WorkflowConfig {
	let mut config = WorkflowConfig::default();
	config.timeouts.explicit_wait_secs = 1;
	config.timeouts.install_secs = 1;
	config.timeouts.poll_interval_ms = 20;
	config
}

pub struct Harness {
	pub workflow: InstallWorkflow,
	pub device: Arc<FakeDevice>,
	pub log: Log,
}

impl Harness {
	pub fn new(scenario: Scenario) -> Self {
		Self::with_config(scenario, fast_config())
	}

	pub fn with_config(scenario: Scenario, config: WorkflowConfig) -> Self {
		let log: Log = Arc::default();
		let shell = FakeShell::new(scenario.uninstall_exit, Arc::clone(&log));
		let device = FakeDevice::new(scenario, Arc::clone(&log));
		let workflow = InstallWorkflow::new(config, Arc::clone(&device) as Arc<dyn Transport>, shell);
		Self { workflow, device, log }
	}

	pub fn log(&self) -> Vec<String> {
		self.log.lock().clone()
	}

	pub fn position(&self, entry: &str) -> Option<usize> {
		self.log().iter().position(|e| e == entry)
	}
}
