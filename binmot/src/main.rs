//! MOT command-line tool for checking, dumping, and transcoding MOT profiles.
//!
//! Usage: mot [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (tree, tokens, yaml) [default: tree]
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   --max-size <BYTES>     Refuse files larger than this [default: 10 MiB]
//!   -v, --verbose          Log debug output to stderr
//!   -h, --help             Print help
//!   -V, --version          Print version

use libmot::{parse_file, tokenize, FileContent, LoadOptions};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;
use tracing::debug;

mod transcode;

/// Output produced for each parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Indented syntax tree.
    Tree,
    /// One line per token with its position.
    Tokens,
    /// The properties as a YAML sequence.
    Yaml,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "tree" => Some(Format::Tree),
        "tokens" => Some(Format::Tokens),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}

/// Command-line options.
#[derive(Debug)]
struct Options {
    input_path: Option<String>,
    format: Format,
    output_file: Option<String>,
    check_only: bool,
    load: LoadOptions,
    verbose: bool,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);
    init_tracing(options.verbose);
    debug!(?options, "starting");

    if let Some(path) = &options.input_path {
        if Path::new(path).is_dir() {
            // Directory mode: process all .mot files
            if options.output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process_directory(path, &options);
        }
    }

    let content = match &options.input_path {
        Some(path) => match FileContent::load(path, options.load) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => read_stdin(options.load),
    };

    let exit_code = process_input(&content, &options, options.input_path.as_deref());
    process::exit(exit_code);
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        input_path: None,
        format: Format::Tree,
        output_file: None,
        check_only: false,
        load: LoadOptions::default(),
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("mot {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                options.format = match parse_format(&args[i]) {
                    Some(format) => format,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                options.output_file = Some(args[i].clone());
            }
            "--check" => {
                options.check_only = true;
            }
            "--max-size" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --max-size requires a byte count");
                    process::exit(1);
                }
                options.load.max_size = match args[i].parse() {
                    Ok(bytes) => bytes,
                    Err(_) => {
                        eprintln!("Error: Invalid byte count: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-v" | "--verbose" => {
                options.verbose = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if options.input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                options.input_path = Some(args[i].clone());
            }
        }
        i += 1;
    }

    options
}

/// Logs go to stderr. `--verbose` forces debug level; otherwise the filter
/// comes from `MOT_LOG`, then `RUST_LOG`, defaulting to warnings only.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MOT_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_stdin(options: LoadOptions) -> FileContent {
    let mut buffer = Vec::new();
    if let Err(e) = io::stdin().take(options.max_size + 1).read_to_end(&mut buffer) {
        eprintln!("Error reading stdin: {}", e);
        process::exit(1);
    }
    if buffer.len() as u64 > options.max_size {
        eprintln!("Error: stdin is larger than {} bytes", options.max_size);
        process::exit(1);
    }
    FileContent::new("<stdin>", buffer)
}

fn process_directory(dir_path: &str, options: &Options) -> ! {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            process::exit(1);
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "mot").unwrap_or(false))
        .collect();
    paths.sort();

    let mut had_errors = false;

    for path in paths {
        let path_str = path.to_string_lossy();
        let content = match FileContent::load(&path, options.load) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{}", e);
                had_errors = true;
                continue;
            }
        };

        if process_input(&content, options, Some(&path_str)) != 0 {
            had_errors = true;
        }
    }

    process::exit(if had_errors { 1 } else { 0 });
}

fn process_input(content: &FileContent, options: &Options, input_file: Option<&str>) -> i32 {
    if options.format == Format::Tokens && !options.check_only {
        return match tokenize(content) {
            Ok(tokens) => {
                let mut output = String::new();
                for token in &tokens {
                    output.push_str(&token.to_string());
                    output.push('\n');
                }
                write_output(&output, options.output_file.as_deref())
            }
            Err(e) => {
                eprintln!("{}", e);
                1
            }
        };
    }

    let file = match parse_file(content) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    if options.check_only {
        match input_file {
            Some(path) => println!("{}: ok", path),
            None => println!("ok"),
        }
        return 0;
    }

    let output = match options.format {
        Format::Tree | Format::Tokens => file.dump(),
        Format::Yaml => match transcode::yaml::encode(&file) {
            Ok(yaml) => yaml,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
    };

    write_output(&output, options.output_file.as_deref())
}

fn write_output(output: &str, output_file: Option<&str>) -> i32 {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            return 1;
        }
    } else {
        print!("{}", output);
        // Ensure output ends with newline
        if !output.ends_with('\n') {
            println!();
        }
    }
    0
}

fn print_help() {
    println!(
        "mot - MOT profile command-line tool

USAGE:
    mot [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .mot files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: tree]
                           tree    indented syntax tree
                           tokens  one token per line with line:column
                           yaml    properties as a YAML sequence

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    --max-size <BYTES>     Refuse input larger than this many bytes [default: 10485760]

    -v, --verbose          Log debug output to stderr
                           Without it, MOT_LOG or RUST_LOG set the log filter

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Print the syntax tree of a profile
    mot profile.mot

    # Validate every profile in a directory
    mot --check ./profiles/

    # Convert a profile to YAML
    mot -t yaml profile.mot

    # Show the token stream
    mot -t tokens profile.mot"
    );
}
