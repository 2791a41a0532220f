// morfo-cli: shared utilities for CLI tools.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process;

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise logging is off, or at `debug` for
/// the morfo crates when `verbose` is true.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "morfo_fsa=debug,morfo_dict=debug,morfo_cli=debug"
    } else {
        "off"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

/// Options shared by every tool, pulled out of the argument list.
#[derive(Debug, Default)]
pub struct CommonArgs {
    pub input: Option<String>,
    pub output: Option<String>,
    pub verbose: bool,
}

/// Parse `-i/--input PATH`, `-o/--output PATH` and `-v/--verbose`.
///
/// Returns `(common, remaining_args)`.
pub fn parse_common(args: &[String]) -> (CommonArgs, Vec<String>) {
    let mut common = CommonArgs::default();
    let mut remaining = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some(val) = arg.strip_prefix("--input=") {
            common.input = Some(val.to_string());
        } else if let Some(val) = arg.strip_prefix("--output=") {
            common.output = Some(val.to_string());
        } else if arg == "-i" || arg == "--input" {
            common.input = Some(required_value(arg, iter.next()));
        } else if arg == "-o" || arg == "--output" {
            common.output = Some(required_value(arg, iter.next()));
        } else if arg == "-v" || arg == "--verbose" {
            common.verbose = true;
        } else {
            remaining.push(arg.clone());
        }
    }

    (common, remaining)
}

/// Take the value of `--name VALUE` or `--name=VALUE` out of `args`.
pub fn take_value(args: &mut Vec<String>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    if let Some(pos) = args.iter().position(|a| a.starts_with(&prefix)) {
        let arg = args.remove(pos);
        return Some(arg[prefix.len()..].to_string());
    }
    let pos = args.iter().position(|a| a == name)?;
    args.remove(pos);
    if pos < args.len() {
        Some(args.remove(pos))
    } else {
        fatal(&format!("{name} requires a value"))
    }
}

/// Remove `name` from `args`, returning whether it was present.
pub fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != name);
    args.len() != before
}

fn required_value(arg: &str, value: Option<&String>) -> String {
    match value {
        Some(v) => v.clone(),
        None => fatal(&format!("{arg} requires a value")),
    }
}

/// Line reader over a file, or stdin when `path` is `None` or `-`.
pub fn open_input(path: Option<&str>) -> Box<dyn BufRead> {
    match path {
        None | Some("-") => Box::new(BufReader::new(io::stdin())),
        Some(p) => match File::open(p) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => fatal(&format!("failed to open {p}: {e}")),
        },
    }
}

/// Buffered writer to a file, or stdout when `path` is `None` or `-`.
pub fn open_output(path: Option<&str>) -> Box<dyn Write> {
    match path {
        None | Some("-") => Box::new(BufWriter::new(io::stdout())),
        Some(p) => match File::create(p) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => fatal(&format!("failed to create {p}: {e}")),
        },
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

/// Reject anything that still looks like an option.
pub fn reject_unknown_options(args: &[String]) {
    if let Some(arg) = args.iter().find(|a| a.starts_with('-') && a.len() > 1) {
        fatal(&format!("unknown option: {arg} (see --help)"));
    }
}
