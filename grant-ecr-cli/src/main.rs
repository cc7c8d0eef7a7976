//! `grant-ecr` binary entry point.
//!
//! Parses flags, enforces the usage rules that do not need the network, then
//! hands over to [`grant_ecr_policy::grant_access`] with AWS-backed clients.

mod output;
mod prompt;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use grant_ecr_policy::{
    grant_access, Arn, AwsRegistryBackend, GrantConfig, GrantMode, GrantOutcome,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_REGION,
};
use log::debug;

use crate::prompt::TerminalOperator;

const EXAMPLES: &str = "\
Examples:
  Add user:
    $ grant-ecr -u arn:aws:iam::9999999999999:role/admin-role -d 'Sandbox account'
  Remove user:
    $ grant-ecr -u arn:aws:iam::9999999999999:role/admin-role --remove";

/// Grant or revoke cross-account pull access on all ECR repositories of the
/// current account
#[derive(Parser, Debug)]
#[command(name = "grant-ecr", version, after_help = EXAMPLES)]
struct Cli {
    /// User ARN whose account gains (or loses) pull access
    #[arg(short = 'u', long = "user", value_name = "ARN")]
    user: Option<String>,

    /// Policy description (required unless --remove)
    #[arg(short = 'd', long = "description")]
    description: Option<String>,

    /// Remove the user instead of adding it
    #[arg(long = "remove")]
    remove: bool,

    /// Region whose ECR repositories are edited
    #[arg(short = 'r', long = "region", default_value = DEFAULT_REGION)]
    region: String,

    /// Maximum number of repository calls in flight
    #[arg(
        short = 'c',
        long = "concurrency",
        env = "GRANT_ECR_CONCURRENCY",
        default_value_t = DEFAULT_MAX_CONCURRENCY
    )]
    concurrency: usize,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn print_usage() {
    let _ = Cli::command().print_help();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let Some(user) = cli.user.as_deref() else {
        output::missing_flag("User not provided");
        print_usage();
        return Ok(ExitCode::SUCCESS);
    };

    let mode = GrantMode::from_remove_flag(cli.remove);
    if mode == GrantMode::Grant && cli.description.as_deref().is_none_or(str::is_empty) {
        output::missing_flag("Description not provided");
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let principal = Arn::parse(user).context("Failed to parse --user")?;
    let config = GrantConfig {
        principal,
        mode,
        description: cli.description,
        region: cli.region,
        max_concurrency: cli.concurrency,
    };
    config.validate().context("Invalid options")?;
    debug!("Running with {config:?}");

    let backend = AwsRegistryBackend::new(config.region.clone())
        .await
        .context("Failed to configure AWS clients")?;

    match grant_access(&backend, &config, &TerminalOperator)
        .await
        .context("Failed to update repository policies")?
    {
        GrantOutcome::Aborted => {
            output::note("no confirmation received, nothing was changed");
            Ok(ExitCode::SUCCESS)
        }
        GrantOutcome::Completed(report) => {
            output::print_report(&report);
            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
