//! Lemmatizing token filter.
//!
//! Maps inflected English word forms onto their dictionary base form: plural
//! nouns onto the singular and `-ing`/`-ed` verb forms onto the bare verb.
//! Irregular forms come from a fixed exception table; everything else goes
//! through the inflectional suffix rules.
//!
//! # Examples
//!
//! ```
//! use tocsin::analysis::token_filter::lemma::{EnglishLemmatizer, Lemmatizer};
//!
//! let lemmatizer = EnglishLemmatizer::new();
//!
//! assert_eq!(lemmatizer.lemmatize("running"), "run");
//! assert_eq!(lemmatizer.lemmatize("supplies"), "supply");
//! assert_eq!(lemmatizer.lemmatize("children"), "child");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Irregular inflections and their base forms.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("ran", "run"),
    ("came", "come"),
    ("gave", "give"),
    ("given", "give"),
    ("took", "take"),
    ("taken", "take"),
    ("brought", "bring"),
    ("bought", "buy"),
    ("sent", "send"),
    ("got", "get"),
    ("gotten", "get"),
    ("made", "make"),
    ("said", "say"),
    ("told", "tell"),
    ("found", "find"),
    ("felt", "feel"),
    ("heard", "hear"),
    ("held", "hold"),
    ("kept", "keep"),
    ("lost", "lose"),
    ("built", "build"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("died", "die"),
    ("dying", "die"),
    ("lying", "lie"),
    ("seen", "see"),
    ("knew", "know"),
    ("known", "know"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("fled", "flee"),
    ("broke", "break"),
    ("broken", "break"),
];

/// Words whose endings look inflectional but are not.
const INVARIANT_WORDS: &[&str] = &[
    // -s
    "this", "thus", "always", "perhaps", "towards", "afterwards", "besides", "news", "series",
    "species", "means", "whereas", "sometimes", "less", "unless", "across", "plus", "minus",
    "virus", "status", "bonus", "census", "campus", "chaos", "diabetes", "measles", "politics",
    "physics", "economics", "mathematics", "clothes", "hers", "ours", "yours", "theirs", "lens",
    "christmas", "does", "was", "has", "its", "his", "yes", "gas", "bus",
    // -ing
    "thing", "nothing", "something", "anything", "everything", "morning", "evening", "during",
    "ceiling", "building", "clothing", "spring", "string", "bring", "king", "ring", "sing",
    "wing", "swing", "sting", "darling", "pudding", "wedding", "bedding", "sibling", "being",
    // -ed
    "hundred", "sacred", "naked", "wicked", "kindred", "bred", "shed", "bed", "red",
];

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR_FORMS.iter().copied().collect());

static INVARIANT: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INVARIANT_WORDS.iter().copied().collect());

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its dictionary base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// English lemmatizer backed by an exception table and suffix rules.
///
/// Words it cannot analyse (mixed alphanumerics, clitics, very short words)
/// come back unchanged.
#[derive(Debug, Clone, Default)]
pub struct EnglishLemmatizer;

impl EnglishLemmatizer {
    /// Create a new English lemmatizer.
    pub fn new() -> Self {
        EnglishLemmatizer
    }

    fn is_vowel(chars: &[char], pos: usize) -> bool {
        match chars[pos] {
            'a' | 'e' | 'i' | 'o' | 'u' => true,
            'y' => pos > 0 && !Self::is_vowel(chars, pos - 1),
            _ => false,
        }
    }

    fn has_vowel(stem: &str) -> bool {
        let chars: Vec<char> = stem.chars().collect();
        (0..chars.len()).any(|i| Self::is_vowel(&chars, i))
    }

    /// Number of vowel-consonant sequences in the stem.
    fn measure(chars: &[char]) -> usize {
        let n = chars.len();
        let mut m = 0;
        let mut i = 0;

        while i < n && !Self::is_vowel(chars, i) {
            i += 1;
        }

        while i < n {
            while i < n && Self::is_vowel(chars, i) {
                i += 1;
            }
            if i >= n {
                break;
            }
            m += 1;
            while i < n && !Self::is_vowel(chars, i) {
                i += 1;
            }
        }

        m
    }

    /// Undo consonant doubling or restore a dropped silent `e`.
    fn restore(stem: &str) -> String {
        let chars: Vec<char> = stem.chars().collect();
        let n = chars.len();
        let last = chars[n - 1];

        if chars[n - 2] == last && !Self::is_vowel(&chars, n - 1) && !matches!(last, 'l' | 's' | 'z')
        {
            return chars[..n - 1].iter().collect();
        }

        if stem.ends_with("at") || stem.ends_with("bl") || stem.ends_with("iz") || last == 'u' {
            return format!("{stem}e");
        }

        let short_cvc = n >= 3
            && !Self::is_vowel(&chars, n - 3)
            && Self::is_vowel(&chars, n - 2)
            && !Self::is_vowel(&chars, n - 1)
            && !matches!(last, 'w' | 'x' | 'y');
        if short_cvc && Self::measure(&chars) == 1 {
            return format!("{stem}e");
        }

        stem.to_string()
    }

    fn verbal(word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ied") {
            return (stem.len() >= 2).then(|| format!("{stem}y"));
        }
        if word.ends_with("eed") {
            return None;
        }

        let stem = word
            .strip_suffix("ing")
            .or_else(|| word.strip_suffix("ed"))?;
        if stem.len() < 3 || !Self::has_vowel(stem) {
            return None;
        }

        Some(Self::restore(stem))
    }

    fn plural(word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ies") {
            return (stem.len() >= 2).then(|| format!("{stem}y"));
        }
        if word.ends_with("sses")
            || word.ends_with("xes")
            || word.ends_with("zzes")
            || word.ends_with("ches")
            || word.ends_with("shes")
        {
            return Some(word[..word.len() - 2].to_string());
        }
        if word.ends_with('s')
            && !word.ends_with("ss")
            && !word.ends_with("us")
            && !word.ends_with("is")
        {
            return Some(word[..word.len() - 1].to_string());
        }
        None
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }

        let lower = word.to_ascii_lowercase();
        if let Some(lemma) = IRREGULAR.get(lower.as_str()) {
            return lemma.to_string();
        }
        if lower.len() <= 3 || INVARIANT.contains(lower.as_str()) {
            return word.to_string();
        }

        Self::verbal(&lower)
            .or_else(|| Self::plural(&lower))
            .unwrap_or_else(|| word.to_string())
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

/// Filter that replaces each token's text with its lemma.
pub struct LemmaFilter {
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a new lemma filter with the English lemmatizer.
    pub fn new() -> Self {
        LemmaFilter {
            lemmatizer: Box::new(EnglishLemmatizer::new()),
        }
    }

    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmaFilter { lemmatizer }
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        // The lemmatizer is borrowed, so the stream is materialized here.
        let lemmatized: Vec<_> = tokens
            .map(|token| match self.lemmatizer.lemmatize(&token.text) {
                lemma if lemma == token.text => token,
                lemma => token.rewrite(lemma),
            })
            .collect();

        Ok(Box::new(lemmatized.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
