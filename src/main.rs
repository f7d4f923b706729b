use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use log::{error, info, LevelFilter};

use pcrange::platform::{detect_architecture, OBJDUMP_ENV};
use pcrange::{Resolution, Resolver, ResolverConfig, VariableQuery};

/// Exit status when nothing is declared at the requested location
const EXIT_NOT_FOUND: i32 = 2;

/// Command line options
#[derive(Debug, Default)]
struct Options {
    name: Option<String>,
    line: Option<u64>,
    source: Option<PathBuf>,
    object: Option<PathBuf>,
    arch: Option<String>,
    objdump: Option<PathBuf>,
    dumps: Option<PathBuf>,
    verbose: bool,
}

/// PCRANGE - print the PC ranges over which a variable's location is valid
fn main() {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("pcrange", String::as_str).to_string();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", program_name, e);
            eprintln!("Try '{} --help' for more information.", program_name);
            process::exit(1);
        }
    };

    pcrange::init_logging(if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    match run(options) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

/// Resolve the requested variable and print its ranges
fn run(options: Options) -> Result<i32> {
    let query = build_query(&options)?;

    let mut config = ResolverConfig::default();
    if let Some(objdump) = options.objdump {
        config.objdump = objdump;
    }
    config.recorded_dumps = options.dumps;

    let resolver = Resolver::from_config(&config);
    let resolution = resolver.resolve(&query)?;

    match &resolution {
        Resolution::Ranges { ranges, .. } => {
            for range in ranges {
                println!("{}", range);
            }
            Ok(0)
        }
        Resolution::NoRanges { location, .. } => {
            eprintln!("{}: location list {} has no ranges", query.name, location);
            Ok(0)
        }
        Resolution::NoLocationList { declaration } => {
            eprintln!(
                "{}: declared at {}:{} without a location list",
                query.name,
                declaration.path.display(),
                declaration.line
            );
            Ok(0)
        }
        Resolution::DeclarationNotFound => {
            eprintln!(
                "{}: no declaration at {}:{}",
                query.name,
                query.source_file.display(),
                query.decl_line
            );
            Ok(EXIT_NOT_FOUND)
        }
    }
}

/// Turn the options into a query, detecting the architecture if needed
fn build_query(options: &Options) -> Result<VariableQuery> {
    let object = options
        .object
        .clone()
        .ok_or_else(|| anyhow!("no object file given"))?;
    let decl_line = options.line.ok_or_else(|| anyhow!("no declaration line given (--line)"))?;
    let source_file = options
        .source
        .clone()
        .ok_or_else(|| anyhow!("no source file given (--source)"))?;

    if options.dumps.is_none() && !Path::new(&object).exists() {
        return Err(anyhow!("Object file not found: {}", object.display()));
    }

    let architecture = match &options.arch {
        Some(arch) => arch.clone(),
        None => {
            let arch = detect_architecture(&object)
                .context("cannot detect the architecture, pass --arch")?;
            info!("Detected architecture {}", arch);
            arch
        }
    };

    Ok(VariableQuery {
        name: options
            .name
            .clone()
            .unwrap_or_else(|| format!("{}:{}", source_file.display(), decl_line)),
        decl_line,
        source_file,
        object_file: object,
        architecture,
    })
}

/// Parse command line arguments
fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            // Version
            "-v" | "--version" => {
                println!("{} v{}", pcrange::PKG_NAME, pcrange::VERSION);
                println!("{}", pcrange::PKG_DESCRIPTION);
                process::exit(0);
            }
            // Help
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            "--verbose" => options.verbose = true,
            "-n" | "--name" => options.name = Some(value(args, &mut i)?.to_string()),
            "-l" | "--line" => {
                let line = value(args, &mut i)?;
                options.line = Some(
                    line.parse()
                        .with_context(|| format!("invalid line number: {}", line))?,
                );
            }
            "-s" | "--source" => options.source = Some(PathBuf::from(value(args, &mut i)?)),
            "-a" | "--arch" => options.arch = Some(value(args, &mut i)?.to_string()),
            "--objdump" => options.objdump = Some(PathBuf::from(value(args, &mut i)?)),
            "--dumps" => options.dumps = Some(PathBuf::from(value(args, &mut i)?)),
            arg if arg.starts_with('-') => return Err(anyhow!("unknown option: {}", arg)),
            // Object file
            arg => {
                if options.object.is_some() {
                    return Err(anyhow!("unexpected argument: {}", arg));
                }
                options.object = Some(PathBuf::from(arg));
            }
        }

        i += 1;
    }

    Ok(options)
}

/// Take the value following an option
fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let option = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("option {} needs a value", option))
}

/// Print usage information
fn print_usage(program_name: &str) {
    println!("PCRANGE - PC ranges over which a variable's location is valid");
    println!(
        "Usage: {} [options] --line LINE --source FILE OBJECT",
        program_name
    );
    println!();
    println!("Options:");
    println!("  -l, --line LINE     Line the variable is declared at");
    println!("  -s, --source FILE   Source file the variable is declared in");
    println!("  -n, --name NAME     Variable name, used in messages");
    println!("  -a, --arch ARCH     Architecture reported by the debugger (default: read from OBJECT)");
    println!("      --objdump PATH  objdump to run (default: ${} or arm-none-eabi-objdump)", OBJDUMP_ENV);
    println!("      --dumps DIR     Read rawline.txt, info.txt and loc.txt from DIR instead of running objdump");
    println!("      --verbose       Log each step");
    println!("  -h, --help          Display this help message");
    println!("  -v, --version       Display version information");
    println!();
    println!("Ranges are printed one per line as 'start -- end' in hexadecimal.");
    println!("Exit status is 2 when nothing is declared at LINE of FILE.");
}
