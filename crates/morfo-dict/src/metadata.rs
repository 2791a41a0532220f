// Dictionary metadata: the `.info` file next to each automaton.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::DictionaryError;
use crate::charset::Charset;
use crate::encoder::SequenceEncoder;
use crate::replace::ConversionTable;

pub const KEY_SEPARATOR: &str = "fsa.dict.separator";
pub const KEY_ENCODING: &str = "fsa.dict.encoding";
pub const KEY_ENCODER: &str = "fsa.dict.encoder";
pub const KEY_INPUT_CONVERSION: &str = "fsa.dict.input-conversion";
pub const KEY_OUTPUT_CONVERSION: &str = "fsa.dict.output-conversion";

/// File extension of dictionary automata.
pub const DICT_EXTENSION: &str = "dict";

/// File extension of dictionary metadata.
pub const INFO_EXTENSION: &str = "info";

pub const DEFAULT_SEPARATOR: char = '+';

/// Everything needed to interpret a dictionary automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryMetadata {
    separator: char,
    /// `separator` in the dictionary charset.
    separator_byte: u8,
    charset: Charset,
    encoder: SequenceEncoder,
    input_conversion: ConversionTable,
    output_conversion: ConversionTable,
    /// Keys this crate does not interpret (author, license, ...).
    attributes: BTreeMap<String, String>,
}

impl DictionaryMetadata {
    pub fn builder() -> DictionaryMetadataBuilder {
        DictionaryMetadataBuilder::default()
    }

    /// Parse `.info` text: `key=value` lines, `#` and `!` comments.
    pub fn parse(text: &str) -> Result<Self, DictionaryError> {
        let mut builder = Self::builder();
        let mut encoding = None;

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(DictionaryError::MalformedInfo {
                    line: number + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                KEY_SEPARATOR => {
                    let mut chars = value.chars();
                    let (Some(separator), None) = (chars.next(), chars.next()) else {
                        return Err(DictionaryError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    };
                    builder = builder.separator(separator);
                }
                KEY_ENCODING => encoding = Some(value.parse::<Charset>()?),
                KEY_ENCODER => builder = builder.encoder(value.parse()?),
                KEY_INPUT_CONVERSION => {
                    builder.input_conversion = ConversionTable::parse(key, value)?;
                }
                KEY_OUTPUT_CONVERSION => {
                    builder.output_conversion = ConversionTable::parse(key, value)?;
                }
                _ => builder = builder.attribute(key, value),
            }
        }

        let Some(charset) = encoding else {
            return Err(DictionaryError::MissingKey(KEY_ENCODING));
        };
        builder.charset(charset).build()
    }

    /// Read and parse a `.info` file.
    pub fn read(path: &Path) -> Result<Self, DictionaryError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The metadata file belonging to a dictionary automaton file.
    pub fn path_for(dict_path: &Path) -> PathBuf {
        dict_path.with_extension(INFO_EXTENSION)
    }

    /// `.info` text describing this metadata.
    pub fn to_info(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{KEY_SEPARATOR}={}\n", self.separator));
        out.push_str(&format!("{KEY_ENCODING}={}\n", self.charset));
        out.push_str(&format!("{KEY_ENCODER}={}\n", self.encoder));
        if !self.input_conversion.is_empty() {
            out.push_str(&format!(
                "{KEY_INPUT_CONVERSION}={}\n",
                self.input_conversion.to_info_value()
            ));
        }
        if !self.output_conversion.is_empty() {
            out.push_str(&format!(
                "{KEY_OUTPUT_CONVERSION}={}\n",
                self.output_conversion.to_info_value()
            ));
        }
        for (key, value) in &self.attributes {
            out.push_str(&format!("{key}={value}\n"));
        }
        out
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn separator_byte(&self) -> u8 {
        self.separator_byte
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn encoder(&self) -> SequenceEncoder {
        self.encoder
    }

    pub fn input_conversion(&self) -> &ConversionTable {
        &self.input_conversion
    }

    pub fn output_conversion(&self) -> &ConversionTable {
        &self.output_conversion
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Programmatic construction of [`DictionaryMetadata`].
#[derive(Debug, Clone)]
pub struct DictionaryMetadataBuilder {
    separator: char,
    charset: Charset,
    encoder: SequenceEncoder,
    input_conversion: ConversionTable,
    output_conversion: ConversionTable,
    attributes: BTreeMap<String, String>,
}

impl Default for DictionaryMetadataBuilder {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            charset: Charset::default(),
            encoder: SequenceEncoder::default(),
            input_conversion: ConversionTable::new(),
            output_conversion: ConversionTable::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl DictionaryMetadataBuilder {
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn encoder(mut self, encoder: SequenceEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn input_conversion(mut self, from: &str, to: &str) -> Self {
        self.input_conversion.insert(from, to);
        self
    }

    pub fn output_conversion(mut self, from: &str, to: &str) -> Self {
        self.output_conversion.insert(from, to);
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Validate and finish. The separator must encode to a single byte in
    /// the chosen charset.
    pub fn build(self) -> Result<DictionaryMetadata, DictionaryError> {
        let Some(separator_byte) = self.charset.single_byte(self.separator) else {
            return Err(DictionaryError::InvalidSeparator(self.separator));
        };
        Ok(DictionaryMetadata {
            separator: self.separator,
            separator_byte,
            charset: self.charset,
            encoder: self.encoder,
            input_conversion: self.input_conversion,
            output_conversion: self.output_conversion,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Sample dictionary
fsa.dict.separator=+
fsa.dict.encoding=iso-8859-1
fsa.dict.encoder=prefix
fsa.dict.input-conversion=ﬁ fi
fsa.dict.author=Jane Doe
fsa.dict.license = CC-BY
";

    #[test]
    fn parse_sample() {
        let meta = DictionaryMetadata::parse(SAMPLE).unwrap();
        assert_eq!(meta.separator(), '+');
        assert_eq!(meta.separator_byte(), b'+');
        assert_eq!(meta.charset(), Charset::Iso8859_1);
        assert_eq!(meta.encoder(), SequenceEncoder::TrimPrefixAndSuffix);
        assert!(!meta.input_conversion().is_empty());
        assert!(meta.output_conversion().is_empty());
        assert_eq!(meta.attribute("fsa.dict.author"), Some("Jane Doe"));
        assert_eq!(meta.attribute("fsa.dict.license"), Some("CC-BY"));
    }

    #[test]
    fn defaults() {
        let meta = DictionaryMetadata::parse("fsa.dict.encoding=UTF-8\n").unwrap();
        assert_eq!(meta.separator(), DEFAULT_SEPARATOR);
        assert_eq!(meta.encoder(), SequenceEncoder::TrimSuffix);
    }

    #[test]
    fn encoding_is_required() {
        assert!(matches!(
            DictionaryMetadata::parse("fsa.dict.separator=+\n"),
            Err(DictionaryError::MissingKey(KEY_ENCODING))
        ));
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(
            DictionaryMetadata::parse("fsa.dict.encoding=UTF-8\nnot a pair\n"),
            Err(DictionaryError::MalformedInfo { line: 2, .. })
        ));
        let two_char_separator = "fsa.dict.encoding=UTF-8\nfsa.dict.separator=++\n";
        assert!(DictionaryMetadata::parse(two_char_separator).is_err());
        assert!(DictionaryMetadata::parse("fsa.dict.encoding=EBCDIC\n").is_err());
    }

    #[test]
    fn separator_must_be_single_byte() {
        assert!(matches!(
            DictionaryMetadata::builder().separator('€').build(),
            Err(DictionaryError::InvalidSeparator('€'))
        ));
        let meta = DictionaryMetadata::builder()
            .separator('§')
            .charset(Charset::Iso8859_1)
            .build()
            .unwrap();
        assert_eq!(meta.separator_byte(), 0xA7);
    }

    #[test]
    fn info_round_trip() {
        let meta = DictionaryMetadata::builder()
            .separator('|')
            .charset(Charset::UsAscii)
            .encoder(SequenceEncoder::TrimInfixAndSuffix)
            .input_conversion("’", "'")
            .output_conversion("ae", "æ")
            .attribute("fsa.dict.locale", "en_US")
            .build()
            .unwrap();
        let parsed = DictionaryMetadata::parse(&meta.to_info()).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn info_path_next_to_dictionary() {
        assert_eq!(
            DictionaryMetadata::path_for(Path::new("/data/en.dict")),
            PathBuf::from("/data/en.info")
        );
    }
}
