//! Word tokenization that detokenizes back to the exact input.
//!
//! Words are runs of word characters (underscores included, so `_die_` stays
//! one word) or single punctuation characters. Whatever lies between words is
//! kept as a gap, which makes `detokenize(tokenize(s)) == s` hold for any `s`.

use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").expect("word pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Words {
    words: Vec<String>,
    /// `gaps[i]` precedes `words[i]`; the last gap trails the final word.
    gaps: Vec<String>,
}

impl Words {
    pub fn tokenize(sentence: &str) -> Self {
        let mut words = Vec::new();
        let mut gaps = Vec::new();
        let mut cursor = 0;
        for m in WORD.find_iter(sentence) {
            gaps.push(sentence[cursor..m.start()].to_string());
            words.push(m.as_str().to_string());
            cursor = m.end();
        }
        gaps.push(sentence[cursor..].to_string());
        Self { words, gaps }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Copy with the word at `index` replaced.
    pub fn with_word(&self, index: usize, replacement: &str) -> Self {
        let mut out = self.clone();
        if let Some(word) = out.words.get_mut(index) {
            *word = replacement.to_string();
        }
        out
    }

    pub fn detokenize(&self) -> String {
        let mut out = String::new();
        for (gap, word) in self.gaps.iter().zip(&self.words) {
            out.push_str(gap);
            out.push_str(word);
        }
        if let Some(trailing) = self.gaps.last() {
            out.push_str(trailing);
        }
        out
    }
}
