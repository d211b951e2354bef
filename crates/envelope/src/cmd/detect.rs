use envelope::detect_format;
use serde::Serialize;

use crate::cmd::{read_input, DetectArgs};
use crate::exit::{envelope_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct DetectOutput {
    format: &'static str,
}

pub fn run(args: DetectArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(args.file.as_ref())?;
    let detected =
        detect_format(&input).map_err(|err| envelope_error("detection failed", err))?;

    match format {
        OutputFormat::Json => print_json(&DetectOutput {
            format: detected.name(),
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("{detected}"),
    }
    Ok(SUCCESS)
}
