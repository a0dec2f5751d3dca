use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_install_defaults() {
	let cli = Cli::try_parse_from(["droid", "install"]).unwrap();

	assert_eq!(cli.verbose, 0);
	assert_eq!(cli.format, OutputFormat::Toon);
	match cli.command {
		Commands::Install(args) => assert_eq!(args.artifacts_dir, None),
		_ => panic!("Expected Install command"),
	}
}

#[test]
fn parse_install_with_artifacts_dir() {
	let cli = Cli::try_parse_from(["droid", "install", "--artifacts-dir", "/tmp/droid"]).unwrap();

	match cli.command {
		Commands::Install(args) => assert_eq!(args.artifacts_dir, Some(PathBuf::from("/tmp/droid"))),
		_ => panic!("Expected Install command"),
	}
}

#[test]
fn global_overrides_after_subcommand() {
	let cli = Cli::try_parse_from([
		"droid",
		"install",
		"--app-name",
		"Google Home",
		"--package",
		"com.google.android.apps.chromecast.app",
		"--timeout",
		"15",
		"--install-timeout",
		"120",
		"-vv",
		"-f",
		"json",
	])
	.unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.overrides.app_name.as_deref(), Some("Google Home"));
	assert_eq!(cli.overrides.package.as_deref(), Some("com.google.android.apps.chromecast.app"));
	assert_eq!(cli.overrides.timeout, Some(15));
	assert_eq!(cli.overrides.install_timeout, Some(120));
}

#[test]
fn parse_caps_target() {
	let cli = Cli::try_parse_from(["droid", "caps"]).unwrap();
	match cli.command {
		Commands::Caps(args) => assert_eq!(args.target, CapsTarget::Store),
		_ => panic!("Expected Caps command"),
	}

	let cli = Cli::try_parse_from(["droid", "caps", "--target", "app"]).unwrap();
	match cli.command {
		Commands::Caps(args) => assert_eq!(args.target, CapsTarget::App),
		_ => panic!("Expected Caps command"),
	}
}

#[test]
fn parse_config_file_and_endpoint() {
	let cli = Cli::try_parse_from([
		"droid",
		"--config",
		"run.json",
		"--endpoint",
		"http://127.0.0.1:4723/wd/hub",
		"config",
	])
	.unwrap();

	assert!(matches!(cli.command, Commands::Config));
	assert_eq!(cli.config, Some(PathBuf::from("run.json")));
	assert_eq!(cli.overrides.endpoint.as_deref(), Some("http://127.0.0.1:4723/wd/hub"));
}

#[test]
fn rejects_unknown_format_and_timeout() {
	assert!(Cli::try_parse_from(["droid", "-f", "yaml", "install"]).is_err());
	assert!(Cli::try_parse_from(["droid", "install", "--timeout", "soon"]).is_err());
	assert!(Cli::try_parse_from(["droid"]).is_err());
}
