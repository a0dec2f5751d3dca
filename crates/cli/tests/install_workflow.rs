//! End-to-end runs of the install workflow against an in-memory device.

mod common;

use std::sync::Arc;

use common::{Harness, Scenario, Screen, fast_config};
use droid::{Session, Transport};
use droid_cli::commands::install_result;
use droid_cli::error::DroidError;
use droid_cli::output::{ArtifactType, DiagnosticLevel, ErrorCode};
use droid_cli::workflow::{StoreLocators, WorkflowState};

#[tokio::test]
async fn happy_path_reaches_verified() {
	let mut h = Harness::new(Scenario::default());

	let report = h.workflow.execute().await.unwrap();

	assert_eq!(report.state, WorkflowState::Verified);
	assert_eq!(report.failed_at, None);
	assert_eq!(report.verified_text.as_deref(), Some("Privacy and terms"));
	let visited: Vec<_> = report.visited.iter().map(|v| v.state).collect();
	assert_eq!(visited, WorkflowState::SEQUENCE);

	assert_eq!(
		h.device.packages(),
		vec!["com.android.vending", "com.google.android.apps.chromecast.app"]
	);
	assert!(!h.workflow.has_session());
	assert_eq!(h.device.implicit_waits(), vec![0, 0]);
	assert_eq!(report.teardown_warning, None);

	let log = h.log();
	assert_eq!(
		log,
		vec![
			"session s1 com.android.vending",
			"uninstall com.google.android.apps.chromecast.app",
			"click search",
			"type input Chromecast",
			"click suggestion",
			"click overflow",
			"click install",
			"click continue",
			"quit s1",
			"session s2 com.google.android.apps.chromecast.app",
			"launch s2",
			"quit s2",
		]
	);
}

#[tokio::test]
async fn uninstall_precedes_run_with_configured_package() {
	let mut config = fast_config();
	config.app.package = "com.example.weather".into();
	let mut h = Harness::with_config(Scenario::default(), config);

	h.workflow.setup().await.unwrap();

	assert_eq!(h.workflow.state(), WorkflowState::StoreSessionOpen);
	assert_eq!(h.log().last().map(String::as_str), Some("uninstall com.example.weather"));
	assert!(h.log().iter().all(|e| !e.starts_with("click")));

	h.workflow.run().await.unwrap();
	assert_eq!(h.workflow.state(), WorkflowState::Verified);
	h.workflow.teardown().await.unwrap();
}

#[tokio::test]
async fn missing_suggestion_fails_at_searching() {
	let mut h = Harness::new(Scenario {
		suggestion_appears: false,
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	match &err {
		DroidError::LocateTimeout { state, condition, timeout_ms } => {
			assert_eq!(*state, WorkflowState::Searching);
			assert!(condition.contains("suggest_text"), "{condition}");
			assert_eq!(*timeout_ms, 1000);
		}
		other => panic!("expected LocateTimeout, got {other:?}"),
	}
	assert_eq!(h.workflow.state(), WorkflowState::Failed);
	assert_eq!(h.workflow.failed_at(), Some(WorkflowState::Searching));
	assert_eq!(h.position("click install"), None);
	assert!(h.position("quit s1").is_some(), "store session left open");
}

#[tokio::test]
async fn install_timeout_never_opens_app_session() {
	let mut h = Harness::new(Scenario {
		install_finishes: false,
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	assert!(matches!(err, DroidError::LocateTimeout { state: WorkflowState::Installing, .. }), "{err:?}");
	assert_eq!(err.state(), Some(WorkflowState::Installing));
	assert_eq!(h.device.packages(), vec!["com.android.vending"]);
	assert!(h.position("click continue").is_some());
	assert!(h.position("quit s1").is_some());
}

#[tokio::test]
async fn wrong_alert_title_is_an_assertion_failure() {
	let mut h = Harness::new(Scenario {
		alert_text: "Welcome".into(),
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	match &err {
		DroidError::Assertion { state, expected, actual } => {
			assert_eq!(*state, WorkflowState::AppLaunched);
			assert_eq!(expected, "Privacy and terms");
			assert_eq!(actual, "Welcome");
		}
		other => panic!("expected Assertion, got {other:?}"),
	}
	assert_eq!(h.workflow.report().verified_text.as_deref(), Some("Welcome"));
	assert!(h.position("quit s2").is_some(), "app session left open");
}

#[tokio::test]
async fn teardown_failure_does_not_mask_run_failure() {
	let mut h = Harness::new(Scenario {
		suggestion_appears: false,
		quit_fails: true,
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	assert!(matches!(err, DroidError::LocateTimeout { .. }), "{err:?}");
	assert!(h.position("quit s1").is_some());
	assert!(!h.workflow.has_session());
}

#[tokio::test]
async fn teardown_failure_surfaces_after_clean_run() {
	let mut h = Harness::new(Scenario {
		quit_fails: true,
		..Scenario::default()
	});

	h.workflow.setup().await.unwrap();
	let err = h.workflow.teardown().await.unwrap_err();
	assert!(matches!(err, DroidError::Teardown(_)), "{err:?}");

	// Nothing left to close the second time.
	h.workflow.teardown().await.unwrap();
}

#[tokio::test]
async fn refused_session_is_a_connection_error_before_uninstall() {
	let mut h = Harness::new(Scenario {
		refuse_sessions: true,
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	assert!(matches!(err, DroidError::Connection { .. }), "{err:?}");
	assert_eq!(err.to_command_error().code, ErrorCode::ConnectionFailed);
	assert_eq!(h.workflow.failed_at(), Some(WorkflowState::Uninitialized));
	assert!(h.log().is_empty());
}

#[tokio::test]
async fn only_one_session_at_a_time() {
	let mut h = Harness::new(Scenario::default());
	h.workflow.setup().await.unwrap();

	let err = h.workflow.setup().await.unwrap_err();

	assert!(matches!(err, DroidError::Session(_)), "{err:?}");
	assert_eq!(h.device.packages().len(), 1);
	h.workflow.teardown().await.unwrap();
}

#[tokio::test]
async fn run_before_setup_is_rejected() {
	let mut h = Harness::new(Scenario::default());

	let err = h.workflow.run().await.unwrap_err();

	assert!(
		matches!(
			err,
			DroidError::InvalidTransition {
				from: WorkflowState::Uninitialized,
				to: WorkflowState::Searching
			}
		),
		"{err:?}"
	);
	assert!(h.log().is_empty());
}

#[tokio::test]
async fn failed_install_envelope_keeps_report_and_page_source() {
	let dir = tempfile::tempdir().unwrap();
	let mut h = Harness::new(Scenario {
		suggestion_appears: false,
		uninstall_exit: 1,
		..Scenario::default()
	});
	h.workflow = h.workflow.with_artifacts_dir(dir.path());

	let result = install_result(&mut h.workflow).await;

	assert!(!result.ok);
	let error = result.error.as_ref().unwrap();
	assert_eq!(error.code, ErrorCode::Timeout);
	assert_eq!(error.details.as_ref().unwrap()["state"], "searching");

	let report = result.data.as_ref().unwrap();
	assert_eq!(report.failed_at, Some(WorkflowState::Searching));
	assert_eq!(report.uninstall.as_ref().unwrap().exit_code, Some(1));

	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Warning);

	assert_eq!(result.artifacts.len(), 1);
	let artifact = &result.artifacts[0];
	assert_eq!(artifact.artifact_type, ArtifactType::PageSource);
	assert!(artifact.path.ends_with("droid-failure-searching.xml"));
	let saved = std::fs::read_to_string(&artifact.path).unwrap();
	assert!(saved.starts_with("<hierarchy"));
}

#[tokio::test]
async fn successful_install_envelope() {
	let mut h = Harness::new(Scenario::default());

	let result = install_result(&mut h.workflow).await;
	let json = serde_json::to_value(&result).unwrap();

	assert_eq!(json["ok"], true);
	assert_eq!(json["command"], "install");
	assert_eq!(json["data"]["state"], "verified");
	assert_eq!(json["data"]["verifiedText"], "Privacy and terms");
	assert_eq!(json["data"]["uninstall"]["exitCode"], 0);
	assert!(json.get("error").is_none());
	assert!(json.get("artifacts").is_none());
}

#[tokio::test]
async fn store_resolves_only_the_current_screen() {
	let h = Harness::new(Scenario::default());
	let config = fast_config();
	let locators = StoreLocators::new(&config.store.package, &config.app.name);
	let store = Session::start(Arc::clone(&h.device) as Arc<dyn Transport>, &config.store_capabilities())
		.await
		.unwrap();

	// The install entry sits behind the overflow menu.
	let err = store.find_element(&locators.install_entry()).await.unwrap_err();
	assert!(err.is_not_found(), "{err:?}");

	let search = store.find_element(&locators.search_box()).await.unwrap();
	search.click().await.unwrap();
	assert_eq!(h.device.screen(), Screen::SearchOpen);

	let err = search.click().await.unwrap_err();
	assert!(err.is_not_found(), "{err:?}");
	assert!(store.find_element(&locators.search_box()).await.unwrap_err().is_not_found());

	store.quit().await.unwrap();
}

#[tokio::test]
async fn dropped_overflow_click_times_out_at_overflow_open() {
	let mut h = Harness::new(Scenario {
		ignored_click: Some("overflow"),
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	match &err {
		DroidError::LocateTimeout { state, condition, .. } => {
			assert_eq!(*state, WorkflowState::OverflowOpen);
			assert!(condition.contains(r#"text("Install")"#), "{condition}");
		}
		other => panic!("expected LocateTimeout, got {other:?}"),
	}
	assert_eq!(h.device.screen(), Screen::Off);
	assert!(h.position("click overflow").is_some());
	assert_eq!(h.position("click install"), None);
}

#[tokio::test]
async fn dropped_permission_click_times_out_while_installing() {
	let mut h = Harness::new(Scenario {
		ignored_click: Some("continue"),
		..Scenario::default()
	});

	let err = h.workflow.execute().await.unwrap_err();

	assert!(matches!(err, DroidError::LocateTimeout { state: WorkflowState::Installing, .. }), "{err:?}");
	assert_eq!(h.device.packages(), vec!["com.android.vending"]);
}

#[tokio::test]
async fn oversized_waits_do_not_overflow_the_deadline() {
	let mut config = fast_config();
	config.timeouts.explicit_wait_secs = u64::MAX;
	config.timeouts.install_secs = u64::MAX;
	let mut h = Harness::with_config(Scenario::default(), config);

	let report = h.workflow.execute().await.unwrap();

	assert_eq!(report.state, WorkflowState::Verified);
	assert!(!h.workflow.has_session());
}

#[tokio::test]
async fn implicit_wait_is_set_on_every_session() {
	let mut config = fast_config();
	config.timeouts.implicit_wait_ms = 250;
	let mut h = Harness::with_config(Scenario::default(), config);

	h.workflow.execute().await.unwrap();

	assert_eq!(h.device.implicit_waits(), vec![250, 250]);
}

#[tokio::test]
async fn session_gone_on_teardown_is_reported() {
	let mut h = Harness::new(Scenario {
		quit_session_gone: true,
		..Scenario::default()
	});

	h.workflow.setup().await.unwrap();
	h.workflow.teardown().await.unwrap();

	assert!(!h.workflow.has_session());
	let warning = h.workflow.report().teardown_warning.unwrap();
	assert!(warning.contains("s1") && warning.contains("invalid session id"), "{warning}");
}

#[tokio::test]
async fn session_gone_on_teardown_is_an_envelope_warning() {
	let mut h = Harness::new(Scenario {
		suggestion_appears: false,
		quit_session_gone: true,
		..Scenario::default()
	});

	let result = install_result(&mut h.workflow).await;

	assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::Timeout);
	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Warning);
	assert!(result.diagnostics[0].message.contains("already closed"));
	assert!(result.data.as_ref().unwrap().teardown_warning.is_some());
}
