// dict-compile: Compile a tab-separated word list into a dictionary.
//
// Input lines are `inflected<TAB>stem<TAB>tag`; the tag column may be
// omitted. Writes OUTPUT.dict (the automaton) and OUTPUT.info (its
// metadata).
//
// Usage:
//   dict-compile -o OUTPUT [-i INPUT] [--info FILE | --separator C
//                [--encoding NAME] [--encoder NAME]] [--format NAME] [--numbers]
//
// Options:
//   -i, --input PATH      Input word list (default: stdin)
//   -o, --output PATH     Output path; extension is replaced by .dict/.info
//   --info FILE           Read metadata from an existing .info file
//   --separator C         Field separator inside the automaton (default: +)
//   --encoding NAME       UTF-8, ISO-8859-1 or US-ASCII (default: UTF-8)
//   --encoder NAME        NONE, SUFFIX, PREFIX or INFIX (default: SUFFIX)
//   --format NAME         plain or compact (default: compact)
//   --numbers             Store right-language counts
//   -v, --verbose         Log progress to stderr
//   -h, --help            Print help

use std::io::BufRead;
use std::path::{Path, PathBuf};

use morfo_dict::compile::{AutomatonFormat, DictionaryCompiler};
use morfo_dict::metadata::DICT_EXTENSION;
use morfo_dict::{Charset, DictionaryMetadata, SequenceEncoder};

fn print_help() {
    println!("dict-compile: Compile a tab-separated word list into a dictionary.");
    println!();
    println!("Usage: dict-compile -o OUTPUT [-i INPUT] [options]");
    println!();
    println!("Input lines are inflected<TAB>stem<TAB>tag. Writes OUTPUT.dict and OUTPUT.info.");
    println!();
    println!("Options:");
    println!("  -i, --input PATH      Input word list (default: stdin)");
    println!("  -o, --output PATH     Output path; extension is replaced by .dict/.info");
    println!("  --info FILE           Read metadata from an existing .info file");
    println!("  --separator C         Field separator inside the automaton (default: +)");
    println!("  --encoding NAME       UTF-8, ISO-8859-1 or US-ASCII (default: UTF-8)");
    println!("  --encoder NAME        NONE, SUFFIX, PREFIX or INFIX (default: SUFFIX)");
    println!("  --format NAME         plain or compact (default: compact)");
    println!("  --numbers             Store right-language counts");
    println!("  -v, --verbose         Log progress to stderr");
    println!("  -h, --help            Print this help");
}

fn metadata_from_args(args: &mut Vec<String>) -> DictionaryMetadata {
    if let Some(info) = morfo_cli::take_value(args, "--info") {
        return DictionaryMetadata::read(Path::new(&info))
            .unwrap_or_else(|e| morfo_cli::fatal(&format!("{info}: {e}")));
    }

    let mut builder = DictionaryMetadata::builder();
    if let Some(value) = morfo_cli::take_value(args, "--separator") {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => builder = builder.separator(c),
            _ => morfo_cli::fatal(&format!("separator must be one character: {value:?}")),
        }
    }
    if let Some(value) = morfo_cli::take_value(args, "--encoding") {
        let charset = value
            .parse::<Charset>()
            .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));
        builder = builder.charset(charset);
    }
    if let Some(value) = morfo_cli::take_value(args, "--encoder") {
        let encoder = value
            .parse::<SequenceEncoder>()
            .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));
        builder = builder.encoder(encoder);
    }
    builder
        .build()
        .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (common, mut args) = morfo_cli::parse_common(&args);

    if morfo_cli::wants_help(&args) {
        print_help();
        return;
    }

    let Some(output) = common.output.as_deref() else {
        morfo_cli::fatal("missing -o OUTPUT (see --help)");
    };
    let format = match morfo_cli::take_value(&mut args, "--format") {
        Some(name) => name
            .parse::<AutomatonFormat>()
            .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string())),
        None => AutomatonFormat::default(),
    };
    let numbers = morfo_cli::take_flag(&mut args, "--numbers");
    let metadata = metadata_from_args(&mut args);
    morfo_cli::reject_unknown_options(&args);
    morfo_cli::init_tracing(common.verbose);

    let mut compiler = DictionaryCompiler::new(&metadata)
        .with_format(format)
        .with_numbers(numbers);
    let input = morfo_cli::open_input(common.input.as_deref());
    for (number, line) in input.lines().enumerate() {
        let line =
            line.unwrap_or_else(|e| morfo_cli::fatal(&format!("error reading input: {e}")));
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(inflected), Some(stem)) = (fields.next(), fields.next()) else {
            morfo_cli::fatal(&format!(
                "line {}: expected at least two tab-separated fields",
                number + 1
            ));
        };
        let tag = fields.next().unwrap_or("");
        if let Err(e) = compiler.add(inflected, stem, tag) {
            morfo_cli::fatal(&format!("line {}: {e}", number + 1));
        }
    }

    let entries = compiler.len();
    let bytes = compiler
        .compile()
        .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));

    let dict_path = PathBuf::from(output).with_extension(DICT_EXTENSION);
    let info_path = DictionaryMetadata::path_for(&dict_path);
    std::fs::write(&dict_path, &bytes).unwrap_or_else(|e| {
        morfo_cli::fatal(&format!("failed to write {}: {e}", dict_path.display()))
    });
    std::fs::write(&info_path, metadata.to_info()).unwrap_or_else(|e| {
        morfo_cli::fatal(&format!("failed to write {}: {e}", info_path.display()))
    });

    tracing::info!(
        entries,
        bytes = bytes.len(),
        dict = %dict_path.display(),
        info = %info_path.display(),
        "dictionary written"
    );
}
