// fsa-dump: Inspect a serialized automaton.
//
// Prints the format, flags and shape statistics of an automaton file.
// Optionally lists every accepted sequence or computes perfect hashes.
//
// Usage:
//   fsa-dump [--sequences] [--hash WORD]... FILE
//
// Options:
//   --sequences     Print every accepted sequence, one per line
//   --hash WORD     Print the perfect hash of WORD (needs NUMBERS)
//   -v, --verbose   Log loading details to stderr
//   -h, --help      Print help

use std::io::Write;

use morfo_fsa::traversal::Matcher;
use morfo_fsa::visit::FsaInfo;
use morfo_fsa::{Automaton, Fsa};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (common, mut args) = morfo_cli::parse_common(&args);

    if morfo_cli::wants_help(&args) {
        println!("fsa-dump: Inspect a serialized automaton.");
        println!();
        println!("Usage: fsa-dump [--sequences] [--hash WORD]... FILE");
        println!();
        println!("Options:");
        println!("  --sequences     Print every accepted sequence, one per line");
        println!("  --hash WORD     Print the perfect hash of WORD (needs NUMBERS)");
        println!("  -v, --verbose   Log loading details to stderr");
        println!("  -h, --help      Print this help");
        return;
    }

    let list = morfo_cli::take_flag(&mut args, "--sequences");
    let mut hashes = Vec::new();
    while let Some(word) = morfo_cli::take_value(&mut args, "--hash") {
        hashes.push(word);
    }
    morfo_cli::reject_unknown_options(&args);
    morfo_cli::init_tracing(common.verbose);

    let path = match (common.input.as_deref(), args.as_slice()) {
        (Some(p), []) => p.to_string(),
        (None, [p]) => p.clone(),
        _ => morfo_cli::fatal("expected exactly one automaton file (see --help)"),
    };
    let data = std::fs::read(&path)
        .unwrap_or_else(|e| morfo_cli::fatal(&format!("failed to read {path}: {e}")));
    let fsa = Fsa::from_bytes(&data).unwrap_or_else(|e| morfo_cli::fatal(&format!("{path}: {e}")));

    let mut out = morfo_cli::open_output(common.output.as_deref());
    let info = FsaInfo::compute(&fsa);
    let _ = writeln!(out, "file:        {path}");
    let _ = writeln!(out, "size:        {} bytes", data.len());
    let _ = match &fsa {
        Fsa::Plain(plain) => writeln!(
            out,
            "format:      plain (goto length {}, node data length {})",
            plain.goto_length(),
            plain.node_data_length()
        ),
        Fsa::Compact(compact) => writeln!(
            out,
            "format:      compact ({} labels in table)",
            compact.label_mapping().len().saturating_sub(1)
        ),
    };
    let _ = writeln!(out, "flags:       {}", fsa.flags());
    let _ = writeln!(out, "states:      {}", info.states);
    let _ = writeln!(out, "arcs:        {}", info.arcs);
    let _ = writeln!(out, "final arcs:  {}", info.final_arcs);
    let _ = writeln!(out, "sequences:   {}", info.sequences);

    if !hashes.is_empty() {
        let matcher = Matcher::new(&fsa);
        for word in &hashes {
            match matcher.perfect_hash(word.as_bytes()) {
                Ok(Some(hash)) => {
                    let _ = writeln!(out, "hash {word}: {hash}");
                }
                Ok(None) => {
                    let _ = writeln!(out, "hash {word}: (not accepted)");
                }
                Err(e) => morfo_cli::fatal(&e.to_string()),
            }
        }
    }

    if list {
        let mut iter = fsa.sequences();
        while let Some(sequence) = iter.next_sequence() {
            let _ = out.write_all(sequence);
            let _ = out.write_all(b"\n");
        }
    }
    let _ = out.flush();
}
