// tests/cli_args.rs

use clap::Parser;

use tracing::level_filters::LevelFilter;

use scriptchain::cli::{CliArgs, LogLevel, NotifierKind};
use scriptchain::logging::build_filter;

#[test]
fn defaults_run_chain_01_with_desktop_notifications() {
    let args = CliArgs::try_parse_from(["scriptchain"]).unwrap();

    assert_eq!(args.chain, "01");
    assert!(!args.close);
    assert!(!args.shutdown);
    assert!(!args.dry_run);
    assert!(!args.list);
    assert_eq!(args.notifier, NotifierKind::Desktop);
    assert!(args.config_dir.is_none());
    assert!(args.log_level.is_none());
}

#[test]
fn end_of_chain_overrides_parse() {
    let args = CliArgs::try_parse_from([
        "scriptchain",
        "--chain",
        "weekly",
        "--close",
        "--shutdown",
        "--notifier",
        "none",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.chain, "weekly");
    assert!(args.close);
    assert!(args.shutdown);
    assert_eq!(args.notifier, NotifierKind::None);
    assert!(args.log_level.is_some());
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(CliArgs::try_parse_from(["scriptchain", "--reboot"]).is_err());
}

#[test]
fn log_filter_defaults_to_info() {
    assert_eq!(build_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
    assert_eq!(
        build_filter(None, Some("   ")).max_level_hint(),
        Some(LevelFilter::INFO)
    );
}

#[test]
fn log_env_accepts_levels_and_directives() {
    assert_eq!(
        build_filter(None, Some("debug")).max_level_hint(),
        Some(LevelFilter::DEBUG)
    );
    assert_eq!(
        build_filter(None, Some("scriptchain::engine=trace,warn")).max_level_hint(),
        Some(LevelFilter::TRACE)
    );
}

#[test]
fn cli_log_level_wins_over_env() {
    assert_eq!(
        build_filter(Some(LogLevel::Warn), Some("trace")).max_level_hint(),
        Some(LevelFilter::WARN)
    );
}
