// fsa-build: Build an automaton from a list of sequences.
//
// Reads one sequence per line (UTF-8 bytes, trailing CR stripped), sorts
// and deduplicates them, and writes the minimal automaton accepting
// exactly that set.
//
// Usage:
//   fsa-build [-i INPUT] [-o OUTPUT] [--format plain|compact] [--numbers]
//
// Options:
//   -i, --input PATH    Input file (default: stdin)
//   -o, --output PATH   Output file (default: stdout)
//   --format NAME       plain or compact (default: compact)
//   --numbers           Store right-language counts (perfect hashing)
//   -v, --verbose       Log build statistics to stderr
//   -h, --help          Print help

use std::io::{BufRead, Write};

use morfo_dict::compile::AutomatonFormat;
use morfo_fsa::builder::FsaBuilder;
use morfo_fsa::serialize::{
    CompactSerializer, CompactSerializerOptions, FsaSerializer, PlainSerializer,
    PlainSerializerOptions,
};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (common, mut args) = morfo_cli::parse_common(&args);

    if morfo_cli::wants_help(&args) {
        println!("fsa-build: Build a minimal automaton from a list of sequences.");
        println!();
        println!("Usage: fsa-build [-i INPUT] [-o OUTPUT] [--format plain|compact] [--numbers]");
        println!();
        println!("Reads one sequence per line. Input need not be sorted.");
        println!();
        println!("Options:");
        println!("  -i, --input PATH    Input file (default: stdin)");
        println!("  -o, --output PATH   Output file (default: stdout)");
        println!("  --format NAME       plain or compact (default: compact)");
        println!("  --numbers           Store right-language counts (perfect hashing)");
        println!("  -v, --verbose       Log build statistics to stderr");
        println!("  -h, --help          Print this help");
        return;
    }

    let format = match morfo_cli::take_value(&mut args, "--format") {
        Some(name) => name
            .parse::<AutomatonFormat>()
            .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string())),
        None => AutomatonFormat::default(),
    };
    let numbers = morfo_cli::take_flag(&mut args, "--numbers");
    morfo_cli::reject_unknown_options(&args);
    morfo_cli::init_tracing(common.verbose);

    let mut sequences: Vec<Vec<u8>> = Vec::new();
    for line in morfo_cli::open_input(common.input.as_deref()).split(b'\n') {
        let mut line =
            line.unwrap_or_else(|e| morfo_cli::fatal(&format!("error reading input: {e}")));
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if !line.is_empty() {
            sequences.push(line);
        }
    }
    sequences.sort_unstable();
    sequences.dedup();

    let mut builder = FsaBuilder::new();
    for sequence in &sequences {
        builder
            .add(sequence)
            .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));
    }
    let info = builder.info();
    tracing::info!(
        sequences = info.sequences,
        states = info.states,
        shared_states = info.shared_states,
        buffer_bytes = info.buffer_bytes,
        "built automaton"
    );
    let fsa = builder
        .complete()
        .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));

    let bytes = match format {
        AutomatonFormat::Plain => PlainSerializer::new(PlainSerializerOptions {
            numbers,
            ..Default::default()
        })
        .to_bytes(&fsa),
        AutomatonFormat::Compact => CompactSerializer::new(CompactSerializerOptions {
            numbers,
            ..Default::default()
        })
        .to_bytes(&fsa),
    }
    .unwrap_or_else(|e| morfo_cli::fatal(&e.to_string()));

    let mut out = morfo_cli::open_output(common.output.as_deref());
    if let Err(e) = out.write_all(&bytes).and_then(|()| out.flush()) {
        morfo_cli::fatal(&format!("failed to write output: {e}"));
    }
    tracing::info!(%format, numbers, bytes = bytes.len(), "wrote automaton");
}
