use envelope::json::detect_format_with;
use envelope::{from_any_with, AdapterConfig, Container};
use serde::Serialize;

use crate::cmd::{read_input, InspectArgs};
use crate::exit::{envelope_error, CliResult, SUCCESS};
use crate::output::{
    print_header_table, print_json, print_value_table, value_rows, HeaderOutput, OutputFormat,
    ValueRow,
};

#[derive(Serialize)]
struct InspectOutput<'a> {
    format: &'static str,
    header: HeaderOutput<'a>,
    depth: usize,
    values: Vec<ValueRow>,
}

pub fn run(args: InspectArgs, format: OutputFormat, config: &AdapterConfig) -> CliResult<i32> {
    let input = read_input(args.file.as_ref())?;
    let container =
        from_any_with(&input, config).map_err(|err| envelope_error("decode failed", err))?;
    let detected =
        detect_format_with(&input, config).map_err(|err| envelope_error("decode failed", err))?;

    let out = InspectOutput {
        format: detected.name(),
        header: HeaderOutput::from(&container.header),
        depth: container.depth(),
        values: value_rows(&container),
    };
    print_inspect(&out, &container, format);
    Ok(SUCCESS)
}

fn print_inspect(out: &InspectOutput<'_>, container: &Container, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            print_header_table(&container.header);
            print_value_table(&out.values);
        }
        OutputFormat::Pretty => {
            let header = &out.header;
            println!("Container ({}):", out.format);
            println!("  Message type: {}", header.message_type);
            println!("  Version:      {}", header.version);
            println!("  Source:       {}/{}", header.source_id, header.source_sub_id);
            println!("  Target:       {}/{}", header.target_id, header.target_sub_id);
            println!("  Depth:        {}", out.depth);
            println!("Values:");
            for row in &out.values {
                match row.provenance {
                    Some(original) => println!(
                        "  {} {} (from {}) = {}",
                        row.path, row.type_name, original, row.data
                    ),
                    None => println!("  {} {} = {}", row.path, row.type_name, row.data),
                }
            }
        }
    }
}
