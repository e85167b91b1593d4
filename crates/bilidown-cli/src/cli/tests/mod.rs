//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

mod fetch;

#[test]
fn cli_parse_verbosity_anywhere() {
    let cli = Cli::try_parse_from(["bilidown", "-vv", "plan", "--size", "10"]).unwrap();
    assert_eq!(cli.verbose, 2);
    let cli = Cli::try_parse_from(["bilidown", "plan", "--size", "10", "-v"]).unwrap();
    assert_eq!(cli.verbose, 1);
    let cli = Cli::try_parse_from(["bilidown", "plan", "--size", "10"]).unwrap();
    assert_eq!(cli.verbose, 0);
}
