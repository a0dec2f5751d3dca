mod inspect;
mod install;
mod uninstall;

pub use install::install_result;

use crate::cli::{Cli, Commands};
use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::output::OutputFormat;

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let config = WorkflowConfig::resolve(cli.config.as_deref(), &cli.overrides)?;

	match cli.command {
		Commands::Install(args) => install::execute(config, &args, format).await,
		Commands::Uninstall => uninstall::execute(&config, format).await,
		Commands::Caps(args) => inspect::caps(&config, args.target, format),
		Commands::Config => inspect::config(&config, format),
	}
}
