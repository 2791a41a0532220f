// dict-lookup: Look up words in a compiled dictionary.
//
// Prints every record of each word as `word<TAB>stem<TAB>tag`, or one JSON
// object per word with --json. Words with no records print `word<TAB>-`.
//
// Usage:
//   dict-lookup -d DICT [--json] [WORD...]
//
// Options:
//   -d, --dict PATH   Dictionary automaton; PATH.info must sit next to it
//   --json            Emit JSON lines
//   -v, --verbose     Log lookups to stderr
//   -h, --help        Print help

use std::io::{BufRead, Write};
use std::path::PathBuf;

use morfo_dict::{Dictionary, DictionaryLookup, WordRecord};

#[derive(serde::Serialize)]
struct JsonLine<'a> {
    word: &'a str,
    records: Vec<WordRecord>,
}

fn write_records(
    lookup: &mut DictionaryLookup<'_>,
    word: &str,
    json: bool,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let records = match lookup.lookup(word) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{word}: {e}");
            return Ok(());
        }
    };

    if json {
        let line = JsonLine {
            word,
            records: records.iter().map(|r| r.to_owned_record()).collect(),
        };
        let text = serde_json::to_string(&line).map_err(std::io::Error::other)?;
        return writeln!(out, "{text}");
    }

    if records.is_empty() {
        return writeln!(out, "{word}\t-");
    }
    for record in records {
        let stem = record.stem_str().unwrap_or_else(|| "-".to_string());
        match record.tag_str() {
            Some(tag) => writeln!(out, "{word}\t{stem}\t{tag}")?,
            None => writeln!(out, "{word}\t{stem}")?,
        }
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (common, mut args) = morfo_cli::parse_common(&args);

    if morfo_cli::wants_help(&args) {
        println!("dict-lookup: Look up words in a compiled dictionary.");
        println!();
        println!("Usage: dict-lookup -d DICT [--json] [WORD...]");
        println!();
        println!("If WORD arguments are given, looks up each word.");
        println!("Otherwise reads words from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -d, --dict PATH   Dictionary automaton; PATH.info must sit next to it");
        println!("  --json            Emit JSON lines");
        println!("  -v, --verbose     Log lookups to stderr");
        println!("  -h, --help        Print this help");
        return;
    }

    let dict = morfo_cli::take_value(&mut args, "--dict")
        .or_else(|| morfo_cli::take_value(&mut args, "-d"))
        .unwrap_or_else(|| morfo_cli::fatal("missing -d DICT (see --help)"));
    let json = morfo_cli::take_flag(&mut args, "--json");
    morfo_cli::reject_unknown_options(&args);
    morfo_cli::init_tracing(common.verbose);

    let dictionary = Dictionary::open(&PathBuf::from(&dict))
        .unwrap_or_else(|e| morfo_cli::fatal(&format!("{dict}: {e}")));
    let mut lookup = dictionary.lookup_context();
    let mut out = morfo_cli::open_output(common.output.as_deref());

    let result = if args.is_empty() {
        morfo_cli::open_input(common.input.as_deref())
            .lines()
            .try_for_each(|line| {
                let line = line?;
                let word = line.trim();
                if word.is_empty() {
                    return Ok(());
                }
                write_records(&mut lookup, word, json, &mut out)
            })
    } else {
        args.iter()
            .try_for_each(|word| write_records(&mut lookup, word, json, &mut out))
    };
    if let Err(e) = result.and_then(|()| out.flush()) {
        morfo_cli::fatal(&e.to_string());
    }
}
