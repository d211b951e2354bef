use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("envelope {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: envelope");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("ENVELOPE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("unified_version: {}", envelope::json::UNIFIED_VERSION);
    println!("max_depth_default: {}", envelope::DEFAULT_MAX_DEPTH);
    println!(
        "features: schema={}, cli=true",
        cfg!(feature = "schema")
    );

    Ok(SUCCESS)
}
