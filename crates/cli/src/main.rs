use clap::Parser;
use droid_cli::cli::Cli;
use droid_cli::error::DroidError;
use droid_cli::output::{self, OutputFormat, ResultBuilder};
use droid_cli::{commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = command_name(&cli);

	if let Err(err) = commands::dispatch(cli, format).await {
		if !err.is_output_already_printed() {
			handle_error(err, command, format);
		}
		std::process::exit(1);
	}
}

fn command_name(cli: &Cli) -> &'static str {
	use droid_cli::cli::Commands;
	match cli.command {
		Commands::Install(_) => "install",
		Commands::Uninstall => "uninstall",
		Commands::Caps(_) => "caps",
		Commands::Config => "config",
	}
}

fn handle_error(err: DroidError, command: &str, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	// Humans read stderr; agents read the envelope.
	output::print_error_stderr(&cmd_error);

	if format != OutputFormat::Text {
		let result: output::CommandResult<()> = ResultBuilder::new(command).command_error(cmd_error).build();
		output::print_result(&result, format);
	}
}
