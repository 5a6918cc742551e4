//! CLI parse tests, split by command group.

use super::{ApiCommand, Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

pub(super) fn parse_api(args: &[&str]) -> ApiCommand {
    match parse(args) {
        CliCommand::Api(command) => command,
        other => panic!("expected an API command, got {other:?}"),
    }
}

pub(super) fn parse_err(args: &[&str]) -> clap::error::ErrorKind {
    Cli::try_parse_from(args).unwrap_err().kind()
}
