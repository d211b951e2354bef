use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use envelope::{AdapterConfig, Format, JsonShape, NativeProfile};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod convert;
pub mod detect;
pub mod inspect;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Re-encode a container in another wire format.
    Convert(ConvertArgs),
    /// Print the header and values of a container.
    Inspect(InspectArgs),
    /// Print the detected wire format.
    Detect(DetectArgs),
    /// Check a container against the unified v2.0 JSON schema.
    Validate(ValidateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: &AdapterConfig) -> CliResult<i32> {
    match command {
        Command::Convert(args) => convert::run(args, config),
        Command::Inspect(args) => inspect::run(args, format, config),
        Command::Detect(args) => detect::run(args, format),
        Command::Validate(args) => validate::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ProfileArg {
    Full,
    Minimal,
}

impl From<ProfileArg> for NativeProfile {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Full => NativeProfile::Full,
            ProfileArg::Minimal => NativeProfile::Minimal,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TargetFormat {
    Text,
    Unified,
    LegacyNested,
    LegacyFlat,
}

impl From<TargetFormat> for Format {
    fn from(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Text => Format::Text,
            TargetFormat::Unified => Format::Json(JsonShape::Unified),
            TargetFormat::LegacyNested => Format::Json(JsonShape::LegacyNested),
            TargetFormat::LegacyFlat => Format::Json(JsonShape::LegacyFlat),
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
    /// Output wire format.
    #[arg(long, value_name = "FORMAT", default_value = "unified")]
    pub to: TargetFormat,
    /// Indent JSON output.
    #[arg(long)]
    pub pretty: bool,
    /// Write to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
    /// Reject members the schema does not declare.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read the whole input from `file`, or stdin for `None` and `-`.
pub fn read_input(file: Option<&PathBuf>) -> CliResult<Vec<u8>> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}
