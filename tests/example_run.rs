//! Integration tests for the `example run` command.
use firefleet::cli::RunOpts;
use firefleet::cli::example::handle_example_run_command;
use firefleet::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("FIREFLEET_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
        debug_model: false,
    };
    handle_example_run_command("wildfire", &opts, Some(Settings::default())).unwrap();
    assert!(tempdir.path().join("fleet_configuration.csv").is_file());
    assert!(!tempdir.path().join("debug_fire_events.csv").exists());
}
