// Lookup records, borrowed and owned.

use crate::metadata::DictionaryMetadata;

/// One record produced by a dictionary lookup.
///
/// Records live in buffers owned by the [`DictionaryLookup`] that produced
/// them and are overwritten by its next lookup. Call
/// [`to_owned_record`](Self::to_owned_record) to keep one.
///
/// [`DictionaryLookup`]: crate::dictionary::DictionaryLookup
#[derive(Debug, Clone)]
pub struct WordData<'a> {
    metadata: &'a DictionaryMetadata,
    pub(crate) word: Vec<u8>,
    pub(crate) stem: Vec<u8>,
    pub(crate) tag: Vec<u8>,
    /// False for records of plain word lists, which carry no stem or tag.
    pub(crate) annotated: bool,
}

impl<'a> WordData<'a> {
    pub(crate) fn new(metadata: &'a DictionaryMetadata) -> Self {
        Self {
            metadata,
            word: Vec::new(),
            stem: Vec::new(),
            tag: Vec::new(),
            annotated: false,
        }
    }

    pub(crate) fn reset(&mut self, word: &[u8]) {
        self.word.clear();
        self.word.extend_from_slice(word);
        self.stem.clear();
        self.tag.clear();
        self.annotated = false;
    }

    /// The inflected form, as matched (after input conversion).
    pub fn word(&self) -> &[u8] {
        &self.word
    }

    pub fn stem(&self) -> Option<&[u8]> {
        self.annotated.then_some(self.stem.as_slice())
    }

    pub fn tag(&self) -> Option<&[u8]> {
        self.annotated.then_some(self.tag.as_slice())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let mut raw = String::with_capacity(bytes.len());
        self.metadata.charset().decode(bytes, &mut raw);
        let conversion = self.metadata.output_conversion();
        if conversion.is_empty() {
            return raw;
        }
        let mut out = String::with_capacity(raw.len());
        conversion.apply(&raw, &mut out);
        out
    }

    /// The inflected form decoded with the dictionary charset and output
    /// conversion.
    pub fn word_str(&self) -> String {
        self.decode(&self.word)
    }

    pub fn stem_str(&self) -> Option<String> {
        self.stem().map(|stem| self.decode(stem))
    }

    pub fn tag_str(&self) -> Option<String> {
        self.tag().map(|tag| self.decode(tag))
    }

    /// Detach this record from the lookup buffers.
    pub fn to_owned_record(&self) -> WordRecord {
        WordRecord {
            word: self.word_str(),
            stem: self.stem_str(),
            tag: self.tag_str(),
        }
    }
}

/// Owned, decoded lookup record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordRecord {
    pub word: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub stem: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;

    #[test]
    fn unannotated_record_has_no_stem() {
        let meta = DictionaryMetadata::builder().build().unwrap();
        let mut record = WordData::new(&meta);
        record.reset(b"cat");
        assert_eq!(record.word(), b"cat");
        assert_eq!(record.stem(), None);
        assert_eq!(
            record.to_owned_record(),
            WordRecord {
                word: "cat".into(),
                stem: None,
                tag: None,
            }
        );
    }

    #[test]
    fn decoding_applies_charset_and_output_conversion() {
        let meta = DictionaryMetadata::builder()
            .charset(Charset::Iso8859_1)
            .output_conversion("ae", "æ")
            .build()
            .unwrap();
        let mut record = WordData::new(&meta);
        record.reset(b"caesar");
        record.stem.extend_from_slice(b"p\xe4iv\xe4");
        record.tag.extend_from_slice(b"NN");
        record.annotated = true;
        assert_eq!(record.word_str(), "cæsar");
        assert_eq!(record.stem_str().as_deref(), Some("päivä"));
        assert_eq!(record.tag_str().as_deref(), Some("NN"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_omits_missing_fields() {
        let record = WordRecord {
            word: "cat".into(),
            stem: None,
            tag: None,
        };
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"word":"cat"}"#);
        let back: WordRecord = serde_json::from_str(r#"{"word":"cat"}"#).unwrap();
        assert_eq!(back, record);
    }
}
