use envelope::schema::{SchemaConfig, UnifiedSchema};
use envelope::{from_any_with, AdapterConfig};
use serde::Serialize;

use crate::cmd::{read_input, ValidateArgs};
use crate::exit::{envelope_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ValidateOutput {
    valid: bool,
    strict: bool,
    values: usize,
}

pub fn run(args: ValidateArgs, format: OutputFormat, config: &AdapterConfig) -> CliResult<i32> {
    let input = read_input(args.file.as_ref())?;
    let container =
        from_any_with(&input, config).map_err(|err| envelope_error("decode failed", err))?;

    let schema = UnifiedSchema::new(SchemaConfig {
        strict_mode: args.strict,
    })
    .map_err(|err| CliError::new(INTERNAL, format!("schema unavailable: {err}")))?;
    schema
        .validate_container(&container)
        .map_err(|err| envelope_error("validation failed", err))?;

    match format {
        OutputFormat::Json => print_json(&ValidateOutput {
            valid: true,
            strict: args.strict,
            values: container.len(),
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("valid"),
    }
    Ok(SUCCESS)
}
