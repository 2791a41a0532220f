//! Morphological dictionary lookup over `morfo-fsa` automata.
//!
//! A dictionary is an automaton whose sequences have the shape
//! `inflected SEP encoded-stem SEP tag`, plus a small `.info` metadata file
//! naming the separator, the charset and the stem encoder. Looking up an
//! inflected form walks to its separator arc and enumerates every record
//! below it.
//!
//! # Architecture
//!
//! - [`charset`] -- Text to byte conversion for the supported charsets
//! - [`encoder`] -- Stem compression relative to the inflected form
//! - [`replace`] -- Longest-match character substitution tables
//! - [`metadata`] -- `.info` metadata parsing, building and writing
//! - [`word`] -- Lookup records, borrowed and owned
//! - [`dictionary`] -- Loaded dictionaries and the reusable lookup
//! - [`compile`] -- Building dictionaries from `(inflected, stem, tag)` triples
//!
//! # Example
//!
//! ```
//! use morfo_dict::compile::DictionaryCompiler;
//! use morfo_dict::dictionary::Dictionary;
//! use morfo_dict::metadata::DictionaryMetadata;
//!
//! let metadata = DictionaryMetadata::builder().separator('+').build().unwrap();
//! let mut compiler = DictionaryCompiler::new(&metadata);
//! compiler.add("walked", "walk", "VBD").unwrap();
//! let bytes = compiler.compile().unwrap();
//!
//! let dictionary = Dictionary::from_bytes(&bytes, metadata).unwrap();
//! let records = dictionary.lookup("walked").unwrap();
//! assert_eq!(records[0].stem.as_deref(), Some("walk"));
//! ```

pub mod charset;
pub mod compile;
pub mod dictionary;
pub mod encoder;
pub mod metadata;
pub mod replace;
pub mod word;

pub use charset::Charset;
pub use dictionary::{Dictionary, DictionaryLookup};
pub use encoder::SequenceEncoder;
pub use metadata::DictionaryMetadata;
pub use word::{WordData, WordRecord};

use morfo_fsa::FsaError;

/// Error type for loading, configuring and compiling dictionaries.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// The automaton could not be loaded or built.
    #[error("automaton error: {0}")]
    Fsa(#[from] FsaError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing required metadata key: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("malformed metadata at line {line}: {content:?}")]
    MalformedInfo { line: usize, content: String },

    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    #[error("separator {0:?} does not encode to a single byte")]
    InvalidSeparator(char),

    #[error("{text:?} is not representable in {charset}")]
    Unencodable { text: String, charset: &'static str },

    /// An inflected form, stem or tag contains the separator.
    #[error("entry {field} contains the separator: {text:?}")]
    SeparatorInEntry { field: &'static str, text: String },
}

/// Error type for dictionary queries.
///
/// A word that is not in the dictionary is not an error; it yields an empty
/// result.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("query contains the separator {0:?}")]
    SeparatorInInput(char),

    #[error("corrupted dictionary: {0}")]
    Corrupted(&'static str),
}
