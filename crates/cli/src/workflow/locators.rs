//! Locators for the store screens and the launched app.
//!
//! Store resource ids are namespaced by the store package, so a different
//! store build only needs a different `store.package`.

use droid::{Locator, UiSelector, xpath_literal};

/// Builds the locators one install run needs.
#[derive(Debug, Clone)]
pub struct StoreLocators {
	store_package: String,
	app_name: String,
}

impl StoreLocators {
	pub fn new(store_package: impl Into<String>, app_name: impl Into<String>) -> Self {
		Self {
			store_package: store_package.into(),
			app_name: app_name.into(),
		}
	}

	fn id(&self, name: &str) -> String {
		format!("{}:id/{name}", self.store_package)
	}

	/// Content description of the app's result tile.
	fn tile_label(&self) -> String {
		format!("App: {}", self.app_name)
	}

	/// Idle search box on the store home screen.
	pub fn search_box(&self) -> Locator {
		UiSelector::new().resource_id(self.id("search_box_idle_text")).into_locator()
	}

	/// Text input that takes focus once search opens.
	pub fn search_input(&self) -> Locator {
		Locator::class_name("android.widget.EditText")
	}

	/// Suggestion entry. The store lists suggestions lower-cased.
	pub fn suggestion(&self) -> Locator {
		UiSelector::new()
			.resource_id(self.id("suggest_text"))
			.text(self.app_name.to_lowercase())
			.into_locator()
	}

	pub fn tile_title(&self) -> Locator {
		UiSelector::new()
			.resource_id(self.id("li_title"))
			.text(self.app_name.as_str())
			.into_locator()
	}

	/// "More options" control next to the app's tile.
	pub fn overflow(&self) -> Locator {
		Locator::xpath(format!(
			"//android.widget.TextView[@content-desc={}]/following-sibling::android.widget.ImageView[@resource-id={}]",
			xpath_literal(&self.tile_label()),
			xpath_literal(&self.id("li_overflow")),
		))
	}

	pub fn install_entry(&self) -> Locator {
		UiSelector::new()
			.class_name("android.widget.TextView")
			.resource_id(self.id("title"))
			.text("Install")
			.into_locator()
	}

	/// Permissions "Accept"/"Continue" button.
	pub fn continue_button(&self) -> Locator {
		UiSelector::new().resource_id(self.id("continue_button")).into_locator()
	}

	/// Tile label that reads "Installed" once the download finishes.
	pub fn installed_label(&self) -> Locator {
		Locator::xpath(format!(
			"//android.widget.TextView[@content-desc={}]/following-sibling::android.view.View[@resource-id={}][@content-desc=\"Installed\"]",
			xpath_literal(&self.tile_label()),
			xpath_literal(&self.id("li_label")),
		))
	}
}

/// Alert title shown by the freshly launched app.
pub fn alert_title(resource_id: &str) -> Locator {
	UiSelector::new().resource_id(resource_id).into_locator()
}
