use envelope::json::encode;
use envelope::{from_any_with, AdapterConfig, Format};
use tracing::debug;

use crate::cmd::{read_input, ConvertArgs};
use crate::exit::{envelope_error, io_error, CliResult, SUCCESS};
use crate::output::print_raw;

pub fn run(args: ConvertArgs, config: &AdapterConfig) -> CliResult<i32> {
    let input = read_input(args.file.as_ref())?;
    let container =
        from_any_with(&input, config).map_err(|err| envelope_error("decode failed", err))?;

    let target = Format::from(args.to);
    let mut out = encode(&container, target, args.pretty)
        .map_err(|err| envelope_error("encode failed", err))?;
    out.push('\n');
    debug!(target_format = %target, values = container.len(), "converted container");

    match &args.output {
        Some(path) => std::fs::write(path, out)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?,
        None => print_raw(out.as_bytes()),
    }
    Ok(SUCCESS)
}
