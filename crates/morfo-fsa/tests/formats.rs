//! Cross-format tests: build, serialize in every layout, load back through
//! the version-dispatching loader, and compare behaviour.
//!
//! Run: cargo test -p morfo-fsa --test formats

use morfo_fsa::builder::FsaBuilder;
use morfo_fsa::format::FsaVersion;
use morfo_fsa::serialize::{
    CompactSerializer, CompactSerializerOptions, FsaSerializer, LabelTable, PlainSerializer,
    PlainSerializerOptions,
};
use morfo_fsa::traversal::{MatchKind, Matcher};
use morfo_fsa::visit::FsaInfo;
use morfo_fsa::{Automaton, Fsa, FsaError, FsaFlag};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A word list with shared prefixes, shared suffixes, and words that are
/// prefixes of other words.
fn word_list() -> Vec<String> {
    let stems = ["walk", "talk", "jump", "run", "re", "rework", "a", "ab", "abc"];
    let endings = ["", "ed", "er", "ing", "s"];
    let mut words: Vec<String> = stems
        .iter()
        .flat_map(|stem| endings.iter().map(move |end| format!("{stem}{end}")))
        .collect();
    words.sort();
    words.dedup();
    words
}

/// Every layout the crate can write, with and without right-language counts.
fn all_layouts(words: &[String]) -> Vec<(String, Fsa)> {
    let built = FsaBuilder::build(words).unwrap();
    let mut layouts = Vec::new();
    for numbers in [false, true] {
        let plain = PlainSerializer::new(PlainSerializerOptions {
            numbers,
            ..Default::default()
        })
        .to_bytes(&built)
        .unwrap();
        layouts.push((format!("plain numbers={numbers}"), Fsa::from_bytes(&plain).unwrap()));

        for table in [LabelTable::MostFrequent, LabelTable::Explicit(Vec::new())] {
            let compact = CompactSerializer::new(CompactSerializerOptions {
                numbers,
                label_table: table.clone(),
            })
            .to_bytes(&built)
            .unwrap();
            layouts.push((
                format!("compact numbers={numbers} table={table:?}"),
                Fsa::from_bytes(&compact).unwrap(),
            ));
        }
    }
    layouts
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn every_layout_accepts_the_input_set() {
    let words = word_list();
    let expected: Vec<Vec<u8>> = words.iter().map(|w| w.as_bytes().to_vec()).collect();
    for (name, fsa) in all_layouts(&words) {
        let all: Vec<Vec<u8>> = fsa.sequences().collect();
        assert_eq!(all, expected, "{name}");

        let matcher = Matcher::new(&fsa);
        for word in &words {
            assert_eq!(
                matcher.match_sequence(word.as_bytes()).kind,
                MatchKind::ExactMatch,
                "{name}: {word}"
            );
        }
    }
}

#[test]
fn version_byte_selects_variant() {
    let built = FsaBuilder::build(["x"]).unwrap();
    let plain = PlainSerializer::default().to_bytes(&built).unwrap();
    let compact = CompactSerializer::default().to_bytes(&built).unwrap();
    assert_eq!(Fsa::from_bytes(&plain).unwrap().version(), FsaVersion::Plain);
    assert_eq!(Fsa::from_bytes(&compact).unwrap().version(), FsaVersion::Compact);
    assert!(compact.len() <= plain.len());
}

#[test]
fn loader_rejects_root_outside_arc_block() {
    use morfo_fsa::compact::BIT_LAST_ARC;
    use morfo_fsa::format::{COMPACT_VERSION, MAGIC};

    let mut data = MAGIC.to_vec();
    data.push(COMPACT_VERSION);
    data.extend_from_slice(&morfo_fsa::FsaFlags::standard().bits().to_be_bytes());
    data.push(0);
    data.extend_from_slice(&[BIT_LAST_ARC, b'^', 0x03]);
    assert!(matches!(
        Fsa::from_bytes(&data),
        Err(FsaError::Truncated { offset: 3 })
    ));

    // Once a state sits at offset 3 the same stream loads and answers queries.
    data.extend_from_slice(&[BIT_LAST_ARC | morfo_fsa::compact::BIT_FINAL_ARC, b'q', 0x00]);
    let fsa = Fsa::from_bytes(&data).unwrap();
    let matcher = Matcher::new(&fsa);
    assert_eq!(matcher.match_sequence(b"q").kind, MatchKind::ExactMatch);
}

#[test]
fn statistics_agree_across_layouts() {
    let words = word_list();
    let built = FsaBuilder::build(&words).unwrap();
    let reference = FsaInfo::compute(&built);
    assert_eq!(reference.sequences, words.len() as u64);
    for (name, fsa) in all_layouts(&words) {
        assert_eq!(FsaInfo::compute(&fsa), reference, "{name}");
    }
}

#[test]
fn reserialize_loaded_automaton() {
    let words = word_list();
    let built = FsaBuilder::build(&words).unwrap();
    let plain = PlainSerializer::default().to_bytes(&built).unwrap();
    let loaded = Fsa::from_bytes(&plain).unwrap();
    let compact = CompactSerializer::default().to_bytes(&loaded).unwrap();
    let again = Fsa::from_bytes(&compact).unwrap();
    assert_eq!(again.sequences().count(), words.len());
}

// ---------------------------------------------------------------------------
// Traversal over serialized layouts
// ---------------------------------------------------------------------------

#[test]
fn four_way_classification_in_every_layout() {
    let words = vec!["car".to_string(), "cat".to_string()];
    for (name, fsa) in all_layouts(&words) {
        let matcher = Matcher::new(&fsa);
        assert_eq!(matcher.match_sequence(b"ca").kind, MatchKind::SequenceIsAPrefix, "{name}");
        let longer = matcher.match_sequence(b"cats");
        assert_eq!(longer.kind, MatchKind::AutomatonHasPrefix, "{name}");
        assert_eq!(longer.index, 3, "{name}");
        let none = matcher.match_sequence(b"dog");
        assert_eq!((none.kind, none.index), (MatchKind::NoMatch, 0), "{name}");
        assert_eq!(matcher.match_sequence(b"cat").kind, MatchKind::ExactMatch, "{name}");
    }
}

#[test]
fn perfect_hash_is_rank() {
    let words = word_list();
    for (name, fsa) in all_layouts(&words) {
        let matcher = Matcher::new(&fsa);
        if !fsa.flags().contains(FsaFlag::Numbers) {
            assert!(
                matches!(matcher.perfect_hash(b"a"), Err(FsaError::NumbersUnsupported)),
                "{name}"
            );
            continue;
        }
        for (rank, word) in words.iter().enumerate() {
            assert_eq!(
                matcher.perfect_hash(word.as_bytes()).unwrap(),
                Some(rank as u32),
                "{name}: {word}"
            );
        }
        assert_eq!(matcher.perfect_hash(b"zzz").unwrap(), None, "{name}");
        assert_eq!(matcher.perfect_hash(b"wal").unwrap(), None, "{name}");
        assert_eq!(matcher.perfect_hash(b"").unwrap(), None, "{name}");
    }
}

#[test]
fn iterator_restart_from_other_node() {
    let words = word_list();
    for (name, fsa) in all_layouts(&words) {
        let matcher = Matcher::new(&fsa);
        let walk = matcher.match_sequence(b"wal").node;
        let talk = matcher.match_sequence(b"tal").node;
        assert_ne!(walk, 0, "{name}");
        assert_ne!(talk, 0, "{name}");

        let mut iter = fsa.sequences_from(walk);
        assert!(iter.next().is_some());
        iter.restart_from(talk);
        let rest: Vec<Vec<u8>> = iter.collect();
        let expected: Vec<Vec<u8>> = ["k", "ked", "ker", "king", "ks"]
            .iter()
            .map(|s| s.as_bytes().to_vec())
            .collect();
        assert_eq!(rest, expected, "{name}");
    }
}

#[test]
fn large_sorted_set() {
    let words: Vec<String> = (0..5000u32)
        .map(|i| format!("{:x}", i.wrapping_mul(2_654_435_761)))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    for (name, fsa) in all_layouts(&words) {
        assert_eq!(fsa.sequences().count(), words.len(), "{name}");
        if fsa.flags().contains(FsaFlag::Numbers) {
            let matcher = Matcher::new(&fsa);
            for rank in [0, 1, words.len() / 2, words.len() - 1] {
                assert_eq!(
                    matcher.perfect_hash(words[rank].as_bytes()).unwrap(),
                    Some(rank as u32),
                    "{name}"
                );
            }
        }
    }
}
