use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init_logging(verbosity: u8) {
	// 0 = warnings only (uninstall failures, teardown problems)
	// 1 (-v) = workflow progress and shell output
	// 2+ (-vv) = every wire request and wait poll
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

fn filter_for(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn,reqwest=off,hyper=off",
		1 => "warn,droid=info",
		2 => "info,droid=debug",
		_ => "trace",
	}
}
