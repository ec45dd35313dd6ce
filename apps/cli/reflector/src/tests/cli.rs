use crate::cli::{Cli, Command};

use daemon_client::config::ClientConfig;
use models::EPHEMERAL_LOCAL_ADDR;

use std::path::PathBuf;

use clap::Parser;

#[test]
fn given_add_without_local_when_parsing_then_defaults_to_ephemeral() {
    let cli = Cli::try_parse_from(["reflector", "add", "--remote", "wss://ctf.example.org/a"])
        .unwrap();

    assert_eq!(
        cli.command,
        Command::Add {
            remote: String::from("wss://ctf.example.org/a"),
            local: String::from(EPHEMERAL_LOCAL_ADDR),
            label: None,
        }
    );
}

#[test]
fn given_delete_without_local_when_parsing_then_rejected() {
    let result = Cli::try_parse_from(["reflector", "delete"]);

    assert!(result.is_err());
}

/// **VALUE**: Verifies global flags are accepted after the subcommand.
///
/// **BUG THIS CATCHES**: Would catch dropping `global = true`, which makes
/// `reflector list --api ...` fail to parse.
#[test]
fn given_global_flags_after_subcommand_when_parsing_then_applied() {
    let cli = Cli::try_parse_from([
        "reflector",
        "list",
        "--config-dir",
        "/tmp/reflector-test",
        "--api",
        "http://127.0.0.1:4000",
    ])
    .unwrap();

    assert_eq!(cli.command, Command::List);
    assert_eq!(
        cli.config_dir().unwrap(),
        PathBuf::from("/tmp/reflector-test")
    );
    assert_eq!(
        cli.log_dir().unwrap(),
        PathBuf::from("/tmp/reflector-test/logs")
    );
}

#[test]
fn given_overrides_when_applied_then_replace_config_values() {
    let cli = Cli::try_parse_from([
        "reflector",
        "--api",
        "http://127.0.0.1:4000",
        "--name",
        "ctf.example.org",
        "watch",
    ])
    .unwrap();
    let mut config = ClientConfig::default();

    cli.apply_overrides(&mut config);

    assert_eq!(config.api, "http://127.0.0.1:4000");
    assert_eq!(config.name, "ctf.example.org");
    assert_eq!(config.poll, ClientConfig::default().poll);
}

#[test]
fn given_quiet_flag_after_subcommand_when_parsing_then_console_logging_off() {
    let cli = Cli::try_parse_from(["reflector", "list", "-q"]).unwrap();

    let settings = cli.logger_settings();

    assert!(!settings.console);
    assert!(!cli.verbose);
}
