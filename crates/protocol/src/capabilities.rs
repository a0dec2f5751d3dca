//! Session capabilities.
//!
//! A [`Capabilities`] value is an immutable map of automation options sent
//! with the new-session command. Build one with [`CapabilitiesBuilder`];
//! once built it cannot be changed, only inspected or serialized.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Capability key names understood by the Appium server.
pub mod keys {
	pub const DEVICE_NAME: &str = "deviceName";
	pub const PLATFORM_NAME: &str = "platformName";
	pub const PLATFORM_VERSION: &str = "platformVersion";
	pub const BROWSER_NAME: &str = "browserName";
	pub const APP_PACKAGE: &str = "appPackage";
	pub const APP_ACTIVITY: &str = "appActivity";
	pub const APP_WAIT_ACTIVITY: &str = "appWaitActivity";
	pub const DEVICE_READY_TIMEOUT: &str = "deviceReadyTimeout";
	pub const NEW_COMMAND_TIMEOUT: &str = "newCommandTimeout";
	pub const APPIUM_VERSION: &str = "appiumVersion";
	pub const DEVICE_ORIENTATION: &str = "deviceOrientation";
	pub const AUTO_LAUNCH: &str = "autoLaunch";
}

/// Prefix W3C servers require on capabilities outside the standard set.
pub const VENDOR_PREFIX: &str = "appium:";

/// Capability names defined by W3C WebDriver itself.
const W3C_STANDARD: [&str; 11] = [
	"browserName",
	"browserVersion",
	"platformName",
	"acceptInsecureCerts",
	"pageLoadStrategy",
	"proxy",
	"setWindowRect",
	"timeouts",
	"strictFileInteractability",
	"unhandledPromptBehavior",
	"webSocketUrl",
];

/// Immutable set of desired capabilities for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
	/// Starts a new builder.
	pub fn builder() -> CapabilitiesBuilder {
		CapabilitiesBuilder::default()
	}

	/// Returns the raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the value under `key` if it is a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates entries in insertion-independent (sorted) key order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	/// Returns the capability map as a JSON object.
	pub fn as_value(&self) -> Value {
		Value::Object(self.0.clone())
	}

	/// The capability map with vendor keys under [`VENDOR_PREFIX`].
	///
	/// Standard W3C names and keys that already carry a prefix are kept as is.
	pub fn as_w3c_value(&self) -> Value {
		let entries = self.0.iter().map(|(key, value)| {
			let key = if key.contains(':') || W3C_STANDARD.contains(&key.as_str()) {
				key.clone()
			} else {
				format!("{VENDOR_PREFIX}{key}")
			};
			(key, value.clone())
		});
		Value::Object(entries.collect())
	}

	/// Body of the new-session command.
	///
	/// Both the legacy `desiredCapabilities` and the W3C `capabilities`
	/// shapes are sent so that JSONWP-era and W3C-era servers accept it.
	pub fn new_session_body(&self) -> Value {
		json!({
			"desiredCapabilities": self.as_value(),
			"capabilities": {
				"alwaysMatch": self.as_w3c_value(),
				"firstMatch": [{}],
			},
		})
	}
}

/// Builder for [`Capabilities`].
#[derive(Debug, Clone, Default)]
pub struct CapabilitiesBuilder {
	entries: Map<String, Value>,
}

impl CapabilitiesBuilder {
	/// Sets an arbitrary capability, replacing any previous value.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.entries.insert(key.into(), value.into());
		self
	}

	pub fn device_name(self, name: impl Into<String>) -> Self {
		self.set(keys::DEVICE_NAME, name.into())
	}

	pub fn platform_name(self, name: impl Into<String>) -> Self {
		self.set(keys::PLATFORM_NAME, name.into())
	}

	pub fn platform_version(self, version: impl Into<String>) -> Self {
		self.set(keys::PLATFORM_VERSION, version.into())
	}

	pub fn browser_name(self, name: impl Into<String>) -> Self {
		self.set(keys::BROWSER_NAME, name.into())
	}

	/// Sets `appPackage`.
	pub fn app_package(self, package: impl Into<String>) -> Self {
		self.set(keys::APP_PACKAGE, package.into())
	}

	/// Sets both `appActivity` and `appWaitActivity` to `activity`.
	pub fn app_activity(self, activity: impl Into<String>) -> Self {
		let activity = activity.into();
		self.set(keys::APP_ACTIVITY, activity.clone())
			.set(keys::APP_WAIT_ACTIVITY, activity)
	}

	/// Seconds the server waits for the device to become ready.
	pub fn device_ready_timeout(self, secs: u64) -> Self {
		self.set(keys::DEVICE_READY_TIMEOUT, secs)
	}

	/// Seconds of client inactivity before the server ends the session.
	pub fn new_command_timeout(self, secs: u64) -> Self {
		self.set(keys::NEW_COMMAND_TIMEOUT, secs)
	}

	pub fn appium_version(self, version: impl Into<String>) -> Self {
		self.set(keys::APPIUM_VERSION, version.into())
	}

	pub fn orientation(self, orientation: Orientation) -> Self {
		self.set(keys::DEVICE_ORIENTATION, orientation.as_str())
	}

	/// Sets `autoLaunch`. Appium 1.x reads it as a string.
	pub fn auto_launch(self, enabled: bool) -> Self {
		self.set(keys::AUTO_LAUNCH, if enabled { "true" } else { "false" })
	}

	pub fn build(self) -> Capabilities {
		Capabilities(self.entries)
	}
}

/// Screen orientation hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
	#[default]
	Portrait,
	Landscape,
}

impl Orientation {
	pub fn as_str(self) -> &'static str {
		match self {
			Orientation::Portrait => "portrait",
			Orientation::Landscape => "landscape",
		}
	}
}

impl std::fmt::Display for Orientation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn app_activity_sets_wait_activity() {
		let caps = Capabilities::builder().app_activity(".AssetBrowserActivity").build();
		assert_eq!(caps.get_str(keys::APP_ACTIVITY), Some(".AssetBrowserActivity"));
		assert_eq!(caps.get_str(keys::APP_WAIT_ACTIVITY), Some(".AssetBrowserActivity"));
	}

	#[test]
	fn auto_launch_is_stringly_typed() {
		let caps = Capabilities::builder().auto_launch(false).build();
		assert_eq!(caps.get(keys::AUTO_LAUNCH), Some(&json!("false")));
	}

	#[test]
	fn new_session_body_carries_both_dialects() {
		let caps = Capabilities::builder()
			.platform_name("Android")
			.device_ready_timeout(40)
			.orientation(Orientation::Portrait)
			.build();
		let body = caps.new_session_body();

		assert_eq!(body["desiredCapabilities"]["platformName"], "Android");
		assert_eq!(body["desiredCapabilities"]["deviceReadyTimeout"], 40);
		assert_eq!(body["capabilities"]["alwaysMatch"]["appium:deviceOrientation"], "portrait");
		assert_eq!(body["capabilities"]["firstMatch"], json!([{}]));
	}

	#[test]
	fn always_match_prefixes_vendor_keys_only() {
		let caps = Capabilities::builder()
			.platform_name("Android")
			.browser_name("")
			.device_name("Samsung Galaxy s4")
			.app_package("com.android.vending")
			.auto_launch(false)
			.set("appium:udid", "emulator-5554")
			.build();
		let body = caps.new_session_body();

		assert_eq!(
			body["capabilities"]["alwaysMatch"],
			json!({
				"platformName": "Android",
				"browserName": "",
				"appium:deviceName": "Samsung Galaxy s4",
				"appium:appPackage": "com.android.vending",
				"appium:autoLaunch": "false",
				"appium:udid": "emulator-5554",
			})
		);
		assert_eq!(body["desiredCapabilities"]["appPackage"], "com.android.vending");
		assert!(body["desiredCapabilities"].get("appium:appPackage").is_none());
	}

	#[test]
	fn later_set_overrides_earlier() {
		let caps = Capabilities::builder().device_name("a").device_name("b").build();
		assert_eq!(caps.get_str(keys::DEVICE_NAME), Some("b"));
		assert_eq!(caps.len(), 1);
	}
}
