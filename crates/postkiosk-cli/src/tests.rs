use clap::Parser;

use super::{Cli, Commands};

#[test]
fn parses_fetch_defaults() {
    let cli = Cli::try_parse_from(["postkiosk", "fetch"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Fetch {
            handle: None,
            max_posts: None,
            dry_run: false
        }
    ));
}

#[test]
fn parses_fetch_with_handle_and_cap() {
    let cli = Cli::try_parse_from(["postkiosk", "fetch", "--handle", "jack", "--max-posts", "10"])
        .expect("expected valid cli args");
    match cli.command {
        Commands::Fetch {
            handle, max_posts, ..
        } => {
            assert_eq!(handle.as_deref(), Some("jack"));
            assert_eq!(max_posts, Some(10));
        }
        other => panic!("expected fetch, got {other:?}"),
    }
}

#[test]
fn parses_fetch_dry_run() {
    let cli =
        Cli::try_parse_from(["postkiosk", "fetch", "--dry-run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Fetch { dry_run: true, .. }));
}

#[test]
fn parses_show_with_handle() {
    let cli = Cli::try_parse_from(["postkiosk", "show", "jack"]).expect("expected valid cli args");
    match cli.command {
        Commands::Show { handle } => assert_eq!(handle, "jack"),
        other => panic!("expected show, got {other:?}"),
    }
}

#[test]
fn show_requires_a_handle() {
    assert!(Cli::try_parse_from(["postkiosk", "show"]).is_err());
}

#[test]
fn parses_kiosk() {
    let cli = Cli::try_parse_from(["postkiosk", "kiosk"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Kiosk));
}

#[test]
fn parses_runs_with_default_limit() {
    let cli = Cli::try_parse_from(["postkiosk", "runs"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Runs { limit: 20 }));
}

#[test]
fn parses_runs_with_custom_limit() {
    let cli = Cli::try_parse_from(["postkiosk", "runs", "--limit", "5"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Runs { limit: 5 }));
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["postkiosk", "frobnicate"]).is_err());
}
