//! Read-only commands: effective capabilities and configuration.

use droid::Capabilities;
use serde::Serialize;

use crate::cli::CapsTarget;
use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsData {
	pub target: &'static str,
	pub capabilities: Capabilities,
}

pub fn caps(config: &WorkflowConfig, target: CapsTarget, format: OutputFormat) -> Result<()> {
	let data = match target {
		CapsTarget::Store => CapsData {
			target: "store",
			capabilities: config.store_capabilities(),
		},
		CapsTarget::App => CapsData {
			target: "app",
			capabilities: config.app_capabilities(),
		},
	};
	print_result(&ResultBuilder::new("caps").data(data).build(), format);
	Ok(())
}

pub fn config(config: &WorkflowConfig, format: OutputFormat) -> Result<()> {
	print_result(&ResultBuilder::new("config").data(config).build(), format);
	Ok(())
}
