// Dictionary compilation from (inflected, stem, tag) triples.

use std::fmt;
use std::str::FromStr;

use morfo_fsa::builder::FsaBuilder;
use morfo_fsa::serialize::{
    CompactSerializer, CompactSerializerOptions, FsaSerializer, PlainSerializer,
    PlainSerializerOptions,
};

use crate::DictionaryError;
use crate::metadata::DictionaryMetadata;

/// Serialized layout of a compiled dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutomatonFormat {
    Plain,
    #[default]
    Compact,
}

impl FromStr for AutomatonFormat {
    type Err = DictionaryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" | "fsa5" => Ok(AutomatonFormat::Plain),
            "compact" | "cfsa2" => Ok(AutomatonFormat::Compact),
            _ => Err(DictionaryError::InvalidValue {
                key: "format".to_string(),
                value: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for AutomatonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AutomatonFormat::Plain => "plain",
            AutomatonFormat::Compact => "compact",
        })
    }
}

/// Collects dictionary entries and compiles them into automaton bytes.
///
/// Entries may be added in any order; they are encoded as
/// `inflected SEP encoded-stem SEP tag`, sorted and deduplicated before
/// the automaton is built.
pub struct DictionaryCompiler<'a> {
    metadata: &'a DictionaryMetadata,
    format: AutomatonFormat,
    numbers: bool,
    entries: Vec<Vec<u8>>,
    scratch: Vec<u8>,
}

impl<'a> DictionaryCompiler<'a> {
    pub fn new(metadata: &'a DictionaryMetadata) -> Self {
        Self {
            metadata,
            format: AutomatonFormat::default(),
            numbers: false,
            entries: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: AutomatonFormat) -> Self {
        self.format = format;
        self
    }

    /// Store right-language counts, enabling perfect hashing of entries.
    pub fn with_numbers(mut self, numbers: bool) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode and queue one entry.
    pub fn add(&mut self, inflected: &str, stem: &str, tag: &str) -> Result<(), DictionaryError> {
        let metadata = self.metadata;
        let separator = metadata.separator();
        for (field, text) in [("inflected form", inflected), ("stem", stem), ("tag", tag)] {
            if text.contains(separator) {
                return Err(DictionaryError::SeparatorInEntry {
                    field,
                    text: text.to_string(),
                });
            }
        }

        let charset = metadata.charset();
        let inflected = charset.encode_to_vec(inflected)?;
        let stem = charset.encode_to_vec(stem)?;
        let tag = charset.encode_to_vec(tag)?;

        self.scratch.clear();
        metadata.encoder().encode(&inflected, &stem, &mut self.scratch);

        let sep = metadata.separator_byte();
        let mut entry = Vec::with_capacity(inflected.len() + self.scratch.len() + tag.len() + 2);
        entry.extend_from_slice(&inflected);
        entry.push(sep);
        entry.extend_from_slice(&self.scratch);
        entry.push(sep);
        entry.extend_from_slice(&tag);
        tracing::trace!(entry = ?String::from_utf8_lossy(&entry), "dictionary entry");
        self.entries.push(entry);
        Ok(())
    }

    /// Build and serialize the automaton.
    pub fn compile(mut self) -> Result<Vec<u8>, DictionaryError> {
        self.entries.sort_unstable();
        self.entries.dedup();

        let fsa = FsaBuilder::build(&self.entries)?;
        let bytes = match self.format {
            AutomatonFormat::Plain => PlainSerializer::new(PlainSerializerOptions {
                numbers: self.numbers,
                annotation: self.metadata.separator_byte(),
                ..Default::default()
            })
            .to_bytes(&fsa)?,
            AutomatonFormat::Compact => CompactSerializer::new(CompactSerializerOptions {
                numbers: self.numbers,
                ..Default::default()
            })
            .to_bytes(&fsa)?,
        };
        tracing::debug!(
            entries = self.entries.len(),
            format = %self.format,
            numbers = self.numbers,
            bytes = bytes.len(),
            "compiled dictionary"
        );
        Ok(bytes)
    }
}
