// Loaded dictionaries and the reusable lookup.

use std::io::Read;
use std::path::Path;

use morfo_fsa::traversal::{MatchKind, Matcher};
use morfo_fsa::{Automaton, Fsa, SequenceIter};

use crate::metadata::DictionaryMetadata;
use crate::word::{WordData, WordRecord};
use crate::{DictionaryError, LookupError};

/// An automaton together with the metadata needed to read its records.
#[derive(Debug)]
pub struct Dictionary {
    fsa: Fsa,
    metadata: DictionaryMetadata,
}

impl Dictionary {
    pub fn new(fsa: Fsa, metadata: DictionaryMetadata) -> Self {
        tracing::debug!(
            format = ?fsa.version(),
            charset = %metadata.charset(),
            encoder = %metadata.encoder(),
            "opened dictionary"
        );
        Self { fsa, metadata }
    }

    /// Load from serialized automaton bytes.
    pub fn from_bytes(fsa: &[u8], metadata: DictionaryMetadata) -> Result<Self, DictionaryError> {
        Ok(Self::new(Fsa::from_bytes(fsa)?, metadata))
    }

    /// Load from an automaton stream and a `.info` stream.
    pub fn read<F: Read, I: Read>(fsa: F, mut info: I) -> Result<Self, DictionaryError> {
        let mut text = String::new();
        info.read_to_string(&mut text)?;
        let metadata = DictionaryMetadata::parse(&text)?;
        Ok(Self::new(Fsa::read(fsa)?, metadata))
    }

    /// Open `path` and the `.info` file next to it.
    pub fn open(path: &Path) -> Result<Self, DictionaryError> {
        let metadata = DictionaryMetadata::read(&DictionaryMetadata::path_for(path))?;
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, metadata)
    }

    pub fn fsa(&self) -> &Fsa {
        &self.fsa
    }

    pub fn metadata(&self) -> &DictionaryMetadata {
        &self.metadata
    }

    /// A lookup with its own scratch buffers. Keep one per thread.
    pub fn lookup_context(&self) -> DictionaryLookup<'_> {
        DictionaryLookup::new(self)
    }

    /// One-off lookup returning owned records.
    pub fn lookup(&self, word: &str) -> Result<Vec<WordRecord>, LookupError> {
        let mut lookup = self.lookup_context();
        let records = lookup.lookup(word)?;
        Ok(records.iter().map(WordData::to_owned_record).collect())
    }
}

/// Reusable lookup over one [`Dictionary`].
///
/// Holds the query buffer, the sequence iterator and the result records, so
/// repeated lookups do not allocate once the buffers have grown. Results
/// borrow these buffers and are replaced by the next lookup.
pub struct DictionaryLookup<'a> {
    dictionary: &'a Dictionary,
    matcher: Matcher<'a, Fsa>,
    iter: SequenceIter<'a, Fsa>,
    converted: String,
    query: Vec<u8>,
    forms: Vec<WordData<'a>>,
    count: usize,
}

impl<'a> DictionaryLookup<'a> {
    pub fn new(dictionary: &'a Dictionary) -> Self {
        Self {
            dictionary,
            matcher: Matcher::new(&dictionary.fsa),
            iter: SequenceIter::new(&dictionary.fsa, 0),
            converted: String::new(),
            query: Vec::new(),
            forms: Vec::new(),
            count: 0,
        }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    /// All records of `word`. An unknown word yields an empty slice.
    pub fn lookup(&mut self, word: &str) -> Result<&[WordData<'a>], LookupError> {
        let dictionary = self.dictionary;
        let metadata = &dictionary.metadata;
        let fsa = &dictionary.fsa;
        self.count = 0;

        self.converted.clear();
        metadata.input_conversion().apply(word, &mut self.converted);
        if self.converted.contains(metadata.separator()) {
            return Err(LookupError::SeparatorInInput(metadata.separator()));
        }
        self.query.clear();
        if !metadata.charset().encode(&self.converted, &mut self.query) {
            return Ok(&[]);
        }

        let separator = metadata.separator_byte();
        let encoder = metadata.encoder();
        let result = self.matcher.match_sequence(&self.query);
        match result.kind {
            MatchKind::SequenceIsAPrefix => {
                let arc = fsa.arc(result.node, separator);
                if arc == 0 {
                    return Ok(&[]);
                }
                if fsa.is_arc_final(arc) || fsa.is_arc_terminal(arc) {
                    return Err(LookupError::Corrupted("separator arc ends a sequence"));
                }

                self.iter.restart_from(fsa.end_node(arc));
                while let Some(suffix) = self.iter.next_sequence() {
                    let from = encoder.prefix_bytes().min(suffix.len());
                    let Some(split) = suffix[from..]
                        .iter()
                        .position(|&b| b == separator)
                        .map(|p| p + from)
                    else {
                        return Err(LookupError::Corrupted("record has no tag separator"));
                    };

                    let form = next_form(&mut self.forms, &mut self.count, metadata, &self.query);
                    encoder.decode(&self.query, &suffix[..split], &mut form.stem)?;
                    form.tag.extend_from_slice(&suffix[split + 1..]);
                    form.annotated = true;
                }
            }
            MatchKind::ExactMatch => {
                next_form(&mut self.forms, &mut self.count, metadata, &self.query);
            }
            MatchKind::NoMatch | MatchKind::AutomatonHasPrefix => {}
        }

        tracing::trace!(word, records = self.count, "lookup");
        Ok(&self.forms[..self.count])
    }
}

/// Reuse the next slot of `forms` (growing it when full), reset to `query`.
fn next_form<'a, 'f>(
    forms: &'f mut Vec<WordData<'a>>,
    count: &mut usize,
    metadata: &'a DictionaryMetadata,
    query: &[u8],
) -> &'f mut WordData<'a> {
    if *count == forms.len() {
        forms.push(WordData::new(metadata));
    }
    let form = &mut forms[*count];
    *count += 1;
    form.reset(query);
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::DictionaryCompiler;
    use crate::encoder::SequenceEncoder;

    fn dictionary(entries: &[(&str, &str, &str)], metadata: DictionaryMetadata) -> Dictionary {
        let mut compiler = DictionaryCompiler::new(&metadata);
        for (inflected, stem, tag) in entries {
            compiler.add(inflected, stem, tag).unwrap();
        }
        let bytes = compiler.compile().unwrap();
        Dictionary::from_bytes(&bytes, metadata).unwrap()
    }

    fn english() -> Dictionary {
        let metadata = DictionaryMetadata::builder().build().unwrap();
        dictionary(
            &[
                ("mice", "mouse", "NNS"),
                ("walked", "walk", "VBD"),
                ("walked", "walk", "VBN"),
                ("walking", "walk", "VBG"),
                ("walks", "walk", "VBZ"),
            ],
            metadata,
        )
    }

    #[test]
    fn multiple_records_per_form() {
        let dict = english();
        let mut lookup = dict.lookup_context();
        let records = lookup.lookup("walked").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stem(), Some(&b"walk"[..]));
        assert_eq!(records[0].tag(), Some(&b"VBD"[..]));
        assert_eq!(records[1].tag(), Some(&b"VBN"[..]));
        assert_eq!(records[1].word(), b"walked");
    }

    #[test]
    fn irregular_stem() {
        let records = english().lookup("mice").unwrap();
        assert_eq!(
            records,
            vec![WordRecord {
                word: "mice".into(),
                stem: Some("mouse".into()),
                tag: Some("NNS".into()),
            }]
        );
    }

    #[test]
    fn unknown_words_are_empty() {
        let dict = english();
        let mut lookup = dict.lookup_context();
        assert!(lookup.lookup("walk").unwrap().is_empty());
        assert!(lookup.lookup("walkeds").unwrap().is_empty());
        assert!(lookup.lookup("run").unwrap().is_empty());
        assert!(lookup.lookup("").unwrap().is_empty());
    }

    #[test]
    fn separator_in_query_is_rejected() {
        let dict = english();
        assert!(matches!(
            dict.lookup("walk+ed"),
            Err(LookupError::SeparatorInInput('+'))
        ));
    }

    #[test]
    fn buffers_are_reused_between_lookups() {
        let dict = english();
        let mut lookup = dict.lookup_context();
        assert_eq!(lookup.lookup("walked").unwrap().len(), 2);
        let records = lookup.lookup("walks").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag(), Some(&b"VBZ"[..]));
        assert_eq!(lookup.lookup("nothing").unwrap().len(), 0);
    }

    #[test]
    fn input_conversion_normalizes_queries() {
        let metadata = DictionaryMetadata::builder()
            .input_conversion("’", "'")
            .build()
            .unwrap();
        let dict = dictionary(&[("it's", "it", "PRP_VBZ")], metadata);
        let records = dict.lookup("it’s").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].word, "it's");
        assert_eq!(records[0].tag.as_deref(), Some("PRP_VBZ"));
    }

    #[test]
    fn plain_word_list_matches_exactly() {
        use morfo_fsa::builder::FsaBuilder;
        use morfo_fsa::serialize::{CompactSerializer, FsaSerializer};

        let built = FsaBuilder::build(["cat", "cats"]).unwrap();
        let bytes = CompactSerializer::default().to_bytes(&built).unwrap();
        let metadata = DictionaryMetadata::builder().build().unwrap();
        let dict = Dictionary::from_bytes(&bytes, metadata).unwrap();

        let records = dict.lookup("cat").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stem, None);
        assert!(dict.lookup("ca").unwrap().is_empty());
    }

    #[test]
    fn exact_match_reuses_annotated_slot() {
        use morfo_fsa::builder::FsaBuilder;
        use morfo_fsa::serialize::{CompactSerializer, FsaSerializer};

        let built = FsaBuilder::build(["cat+cat+NN", "dog"]).unwrap();
        let bytes = CompactSerializer::default().to_bytes(&built).unwrap();
        let metadata = DictionaryMetadata::builder()
            .encoder(SequenceEncoder::None)
            .build()
            .unwrap();
        let dict = Dictionary::from_bytes(&bytes, metadata).unwrap();
        let mut lookup = dict.lookup_context();

        let records = lookup.lookup("cat").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stem(), Some(&b"cat"[..]));
        assert_eq!(records[0].tag(), Some(&b"NN"[..]));

        let records = lookup.lookup("dog").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].word(), b"dog");
        assert_eq!(records[0].stem(), None);
        assert_eq!(records[0].tag(), None);
    }

    #[test]
    fn unencodable_query_is_empty() {
        let metadata = DictionaryMetadata::builder()
            .charset(crate::charset::Charset::UsAscii)
            .build()
            .unwrap();
        let dict = dictionary(&[("cafe", "cafe", "NN")], metadata);
        assert!(dict.lookup("café").unwrap().is_empty());
    }

    #[test]
    fn every_encoder_reads_back() {
        for encoder in SequenceEncoder::ALL {
            let metadata = DictionaryMetadata::builder().encoder(encoder).build().unwrap();
            let dict = dictionary(
                &[("gemacht", "machen", "VVPP"), ("went", "go", "VBD")],
                metadata,
            );
            let records = dict.lookup("gemacht").unwrap();
            assert_eq!(records[0].stem.as_deref(), Some("machen"), "{encoder}");
            let records = dict.lookup("went").unwrap();
            assert_eq!(records[0].stem.as_deref(), Some("go"), "{encoder}");
        }
    }
}
