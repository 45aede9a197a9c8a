//! Integration tests for the `run` command.
use firefleet::cli::{RunOpts, handle_run_command};
use firefleet::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/wildfire")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("FIREFLEET_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
        debug_model: true,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "fleet_configuration.csv",
        "multi_year_plan.csv",
        "demand_series.csv",
        "relay_deployment.csv",
        "relay_summary.csv",
        "budget_report.csv",
        "debug_fire_events.csv",
        "metadata.toml",
        "firefleet_info.log",
        "firefleet_error.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
    }

    // Base year plus ten planned years
    let plan = fs::read_to_string(output_dir.join("multi_year_plan.csv")).unwrap();
    assert_eq!(plan.lines().count(), 12);

    // A single relay connects every team in the demo
    let relays = fs::read_to_string(output_dir.join("relay_deployment.csv")).unwrap();
    assert_eq!(relays.lines().count(), 2);

    // Second time will fail because the output folder is not empty
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        format!("Failed to create output directory: {}", output_dir.display())
    );
}
