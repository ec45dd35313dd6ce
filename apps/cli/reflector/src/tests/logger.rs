// Unit tests for logger module initialization logic
// Tests focus on thread-safety, settings and error handling

use crate::error::CliError;
use crate::logger::{LoggerSettings, build_dispatch, initialize};

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Commands and tests may both reach initialization. If the
/// second call errors, the CLI would exit before doing any work.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when setting a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable log directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), LoggerSettings::default());
    let result2 = initialize(temp_dir.path(), LoggerSettings::from_flags(true, true));

    // THEN: Both return Ok (second one logs a warning)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

/// **VALUE**: Verifies an unwritable log directory yields an error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped.
#[test]
fn given_invalid_log_dir_when_building_then_returns_reflector_error() {
    // GIVEN: A path beneath a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch for it
    let result = build_dispatch(&invalid_dir, LoggerSettings::default());

    // THEN: The log file failure is reported
    match result {
        Err(CliError::Reflector { message, .. }) => {
            assert!(message.contains("reflector.log"), "got: {message}");
        }
        Err(other) => panic!("Expected CliError::Reflector, got {other:?}"),
        Ok(_) => panic!("Expected an error for an unwritable directory"),
    }
}

/// **VALUE**: Verifies `--quiet` still produces the log file.
///
/// **WHY THIS MATTERS**: Quiet runs are the ones scripted, and the file is then
/// the only record of why a command failed.
///
/// **BUG THIS CATCHES**: Would catch the quiet flag dropping the file chain
/// along with the console chain.
#[test]
fn given_quiet_settings_when_building_then_log_file_is_created() {
    let temp_dir = TempDir::new().unwrap();

    let result = build_dispatch(temp_dir.path(), LoggerSettings::from_flags(false, true));

    assert!(result.is_ok());
    assert!(temp_dir.path().join("reflector.log").exists());
}

#[test]
fn given_flags_when_mapping_then_verbose_raises_level_and_quiet_drops_console() {
    let verbose = LoggerSettings::from_flags(true, false);
    let quiet = LoggerSettings::from_flags(false, true);

    assert_eq!(verbose.level, LevelFilter::Debug);
    assert!(verbose.console);
    assert_eq!(quiet.level, LoggerSettings::default().level);
    assert!(!quiet.console);
}
