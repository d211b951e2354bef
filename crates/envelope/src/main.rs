mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ProfileArg};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "envelope", version, about = "Inspect and convert envelope containers")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Maximum container nesting accepted on decode.
    #[arg(
        long,
        value_name = "N",
        env = "ENVELOPE_MAX_DEPTH",
        default_value_t = envelope::DEFAULT_MAX_DEPTH,
        global = true
    )]
    max_depth: usize,

    /// Native value set of the decoding side.
    #[arg(long, value_name = "PROFILE", default_value = "full", global = true)]
    profile: ProfileArg,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let mut config = envelope::AdapterConfig::default().with_max_depth(cli.max_depth);
    config.json.profile = cli.profile.into();
    let result = cmd::run(cli.command, format, &config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
