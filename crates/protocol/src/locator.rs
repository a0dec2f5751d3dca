//! Element locators and the query dialects the server understands.
//!
//! A [`Locator`] pairs a lookup strategy with its query string. The Android
//! UiAutomator dialect is produced by [`UiSelector`], structural queries over
//! the view hierarchy by [`xpath_literal`]-quoted XPath expressions.

use serde::{Deserialize, Serialize};

/// How an element is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "query", rename_all = "camelCase")]
pub enum Locator {
	/// Resource id (`com.example:id/name`).
	Id(String),
	/// Widget class name (`android.widget.EditText`).
	ClassName(String),
	/// XPath over the view hierarchy.
	XPath(String),
	/// Raw UiAutomator expression (`new UiSelector()...`).
	UiAutomator(String),
}

impl Locator {
	pub fn id(id: impl Into<String>) -> Self {
		Locator::Id(id.into())
	}

	pub fn class_name(class: impl Into<String>) -> Self {
		Locator::ClassName(class.into())
	}

	pub fn xpath(xpath: impl Into<String>) -> Self {
		Locator::XPath(xpath.into())
	}

	/// Strategy name as sent in the `using` field.
	pub fn using(&self) -> &'static str {
		match self {
			Locator::Id(_) => "id",
			Locator::ClassName(_) => "class name",
			Locator::XPath(_) => "xpath",
			Locator::UiAutomator(_) => "-android uiautomator",
		}
	}

	/// Query string as sent in the `value` field.
	pub fn value(&self) -> &str {
		match self {
			Locator::Id(v)
			| Locator::ClassName(v)
			| Locator::XPath(v)
			| Locator::UiAutomator(v) => v,
		}
	}

	/// Body of the find-element command.
	pub fn to_find_body(&self) -> FindElementBody<'_> {
		FindElementBody {
			using: self.using(),
			value: self.value(),
		}
	}
}

impl std::fmt::Display for Locator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}={}", self.using(), self.value())
	}
}

/// Wire body for `POST /session/{id}/element`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FindElementBody<'a> {
	pub using: &'a str,
	pub value: &'a str,
}

/// Builder for UiAutomator `UiSelector` expressions.
///
/// Criteria are rendered in the order they were added:
///
/// ```text
/// new UiSelector().resourceId("com.android.vending:id/title").text("Install")
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSelector {
	criteria: Vec<(&'static str, String)>,
}

impl UiSelector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn resource_id(self, id: impl Into<String>) -> Self {
		self.with("resourceId", id)
	}

	pub fn class_name(self, class: impl Into<String>) -> Self {
		self.with("className", class)
	}

	/// Exact text match.
	pub fn text(self, text: impl Into<String>) -> Self {
		self.with("text", text)
	}

	fn with(mut self, method: &'static str, arg: impl Into<String>) -> Self {
		self.criteria.push((method, arg.into()));
		self
	}

	pub fn into_locator(self) -> Locator {
		Locator::UiAutomator(self.to_string())
	}
}

impl std::fmt::Display for UiSelector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("new UiSelector()")?;
		for (method, arg) in &self.criteria {
			write!(f, ".{method}(\"{}\")", escape_java_string(arg))?;
		}
		Ok(())
	}
}

impl From<UiSelector> for Locator {
	fn from(selector: UiSelector) -> Self {
		selector.into_locator()
	}
}

fn escape_java_string(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'"' => out.push_str("\\\""),
			_ => out.push(c),
		}
	}
	out
}

/// Quotes `s` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so values containing both quote kinds are
/// split and joined with `concat()`.
pub fn xpath_literal(s: &str) -> String {
	if !s.contains('"') {
		return format!("\"{s}\"");
	}
	if !s.contains('\'') {
		return format!("'{s}'");
	}

	let parts: Vec<String> = s
		.split('"')
		.map(|part| format!("\"{part}\""))
		.collect();
	format!("concat({})", parts.join(", '\"', "))
}
