// Longest-match character substitution tables.

use hashbrown::HashMap;

use crate::DictionaryError;

/// A set of `from -> to` string replacements applied left to right, always
/// preferring the longest `from` that matches at the current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionTable {
    /// Pairs in insertion order, kept for writing metadata back.
    pairs: Vec<(String, String)>,
    /// Indices into `pairs` keyed by the first character of `from`,
    /// longest `from` first.
    by_first: HashMap<char, Vec<usize>>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a replacement. A later pair with the same `from` replaces the
    /// earlier one. Empty `from` strings are ignored.
    pub fn insert(&mut self, from: &str, to: &str) {
        let Some(first) = from.chars().next() else {
            return;
        };
        if let Some(existing) = self.pairs.iter_mut().find(|(f, _)| f == from) {
            existing.1 = to.to_string();
            return;
        }
        self.pairs.push((from.to_string(), to.to_string()));
        let index = self.pairs.len() - 1;
        let pairs = &self.pairs;
        let bucket = self.by_first.entry(first).or_default();
        bucket.push(index);
        bucket.sort_by_key(|&i| std::cmp::Reverse(pairs[i].0.len()));
    }

    /// Parse the `.info` form: comma separated pairs, each `from to`
    /// separated by whitespace.
    pub fn parse(key: &str, value: &str) -> Result<Self, DictionaryError> {
        let mut table = Self::new();
        for pair in value.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let mut parts = pair.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(from), Some(to), None) => table.insert(from, to),
                _ => {
                    return Err(DictionaryError::InvalidValue {
                        key: key.to_string(),
                        value: pair.to_string(),
                    });
                }
            }
        }
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    /// Append `input` with all replacements applied to `out`.
    pub fn apply(&self, input: &str, out: &mut String) {
        if self.is_empty() {
            out.push_str(input);
            return;
        }
        let mut rest = input;
        while let Some(c) = rest.chars().next() {
            let matched = self.by_first.get(&c).and_then(|bucket| {
                bucket
                    .iter()
                    .map(|&i| &self.pairs[i])
                    .find(|(from, _)| rest.starts_with(from.as_str()))
            });
            match matched {
                Some((from, to)) => {
                    out.push_str(to);
                    rest = &rest[from.len()..];
                }
                None => {
                    out.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
    }

    /// `.info` form of the table.
    pub fn to_info_value(&self) -> String {
        self.pairs
            .iter()
            .map(|(from, to)| format!("{from} {to}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(table: &ConversionTable, input: &str) -> String {
        let mut out = String::new();
        table.apply(input, &mut out);
        out
    }

    #[test]
    fn longest_match_wins() {
        let mut table = ConversionTable::new();
        table.insert("a", "1");
        table.insert("ab", "2");
        table.insert("abc", "3");
        assert_eq!(convert(&table, "abcaba"), "321");
        assert_eq!(convert(&table, "xax"), "x1x");
    }

    #[test]
    fn ligatures_and_apostrophes() {
        let table = ConversionTable::parse("fsa.dict.input-conversion", "ﬁ fi, ’ '").unwrap();
        assert_eq!(convert(&table, "ﬁle’s"), "file's");
        assert_eq!(table.to_info_value(), "ﬁ fi, ’ '");
    }

    #[test]
    fn replacement_output_is_not_rescanned() {
        let table = ConversionTable::parse("k", "a b, b c").unwrap();
        assert_eq!(convert(&table, "ab"), "bc");
    }

    #[test]
    fn reinsert_overrides() {
        let mut table = ConversionTable::new();
        table.insert("x", "y");
        table.insert("x", "z");
        assert_eq!(table.pairs().count(), 1);
        assert_eq!(convert(&table, "x"), "z");
    }

    #[test]
    fn malformed_pairs() {
        assert!(matches!(
            ConversionTable::parse("fsa.dict.input-conversion", "a b c"),
            Err(DictionaryError::InvalidValue { .. })
        ));
        assert!(ConversionTable::parse("k", "lonely").is_err());
        assert!(ConversionTable::parse("k", " , ").unwrap().is_empty());
    }

    #[test]
    fn empty_table_copies_input() {
        assert_eq!(convert(&ConversionTable::new(), "päivä"), "päivä");
    }
}
