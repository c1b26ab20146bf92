//! Part-of-speech tagging.
//!
//! [`LexiconTagger`] assigns Penn Treebank tags to already-normalized
//! (lowercased, lemmatized) tokens. Closed-class words come from a fixed
//! lexicon; base-form verbs are disambiguated from their noun readings by the
//! tag of the preceding token; remaining words fall back to suffix rules.
//!
//! All lexicons are built once per process and shared read-only.
//!
//! # Examples
//!
//! ```
//! use tocsin::analysis::tagger::{LexiconTagger, PosTag, PosTagger};
//!
//! let tagger = LexiconTagger::new();
//! let tokens: Vec<String> = ["go", "to", "the", "shelter"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let tagged = tagger.tag(&tokens);
//!
//! assert_eq!(tagged[0].1, PosTag::VB);
//! assert_eq!(tagged[2].1, PosTag::DT);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Penn Treebank part-of-speech tags produced by the tagger.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// Coordinating conjunction
    CC,
    /// Cardinal number
    CD,
    /// Determiner
    DT,
    /// Existential "there"
    EX,
    /// Preposition or subordinating conjunction
    IN,
    /// Adjective
    JJ,
    /// Modal
    MD,
    /// Noun, singular or mass
    NN,
    /// Noun, plural
    NNS,
    /// Personal pronoun
    PRP,
    /// Possessive pronoun (`PRP$`)
    PRPS,
    /// Adverb
    RB,
    /// "to"
    TO,
    /// Interjection
    UH,
    /// Verb, base form
    VB,
    /// Verb, past tense
    VBD,
    /// Verb, gerund or present participle
    VBG,
    /// Verb, past participle
    VBN,
    /// Verb, non-3rd person singular present
    VBP,
    /// Verb, 3rd person singular present
    VBZ,
    /// Wh-determiner
    WDT,
    /// Wh-pronoun
    WP,
    /// Wh-adverb
    WRB,
}

impl PosTag {
    /// The Treebank spelling of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::CC => "CC",
            PosTag::CD => "CD",
            PosTag::DT => "DT",
            PosTag::EX => "EX",
            PosTag::IN => "IN",
            PosTag::JJ => "JJ",
            PosTag::MD => "MD",
            PosTag::NN => "NN",
            PosTag::NNS => "NNS",
            PosTag::PRP => "PRP",
            PosTag::PRPS => "PRP$",
            PosTag::RB => "RB",
            PosTag::TO => "TO",
            PosTag::UH => "UH",
            PosTag::VB => "VB",
            PosTag::VBD => "VBD",
            PosTag::VBG => "VBG",
            PosTag::VBN => "VBN",
            PosTag::VBP => "VBP",
            PosTag::VBZ => "VBZ",
            PosTag::WDT => "WDT",
            PosTag::WP => "WP",
            PosTag::WRB => "WRB",
        }
    }

    /// Base-form or non-3rd-person-singular present verb.
    pub fn is_base_verb(&self) -> bool {
        matches!(self, PosTag::VB | PosTag::VBP)
    }

    fn is_nominal(&self) -> bool {
        matches!(self, PosTag::NN | PosTag::NNS | PosTag::CD)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for part-of-speech taggers.
pub trait PosTagger: Send + Sync {
    /// Tag each token, preserving order.
    fn tag(&self, tokens: &[String]) -> Vec<(String, PosTag)>;

    /// Get the name of this tagger.
    fn name(&self) -> &'static str;
}

const CLOSED_CLASS: &[(&str, PosTag)] = &[
    ("the", PosTag::DT),
    ("a", PosTag::DT),
    ("an", PosTag::DT),
    ("this", PosTag::DT),
    ("that", PosTag::DT),
    ("these", PosTag::DT),
    ("those", PosTag::DT),
    ("each", PosTag::DT),
    ("every", PosTag::DT),
    ("some", PosTag::DT),
    ("any", PosTag::DT),
    ("no", PosTag::DT),
    ("all", PosTag::DT),
    ("both", PosTag::DT),
    ("either", PosTag::DT),
    ("neither", PosTag::DT),
    ("another", PosTag::DT),
    ("i", PosTag::PRP),
    ("you", PosTag::PRP),
    ("he", PosTag::PRP),
    ("she", PosTag::PRP),
    ("it", PosTag::PRP),
    ("we", PosTag::PRP),
    ("they", PosTag::PRP),
    ("me", PosTag::PRP),
    ("him", PosTag::PRP),
    ("us", PosTag::PRP),
    ("them", PosTag::PRP),
    ("myself", PosTag::PRP),
    ("yourself", PosTag::PRP),
    ("ourselves", PosTag::PRP),
    ("themselves", PosTag::PRP),
    ("itself", PosTag::PRP),
    ("my", PosTag::PRPS),
    ("your", PosTag::PRPS),
    ("his", PosTag::PRPS),
    ("her", PosTag::PRPS),
    ("its", PosTag::PRPS),
    ("our", PosTag::PRPS),
    ("their", PosTag::PRPS),
    ("in", PosTag::IN),
    ("on", PosTag::IN),
    ("at", PosTag::IN),
    ("of", PosTag::IN),
    ("for", PosTag::IN),
    ("from", PosTag::IN),
    ("with", PosTag::IN),
    ("by", PosTag::IN),
    ("about", PosTag::IN),
    ("into", PosTag::IN),
    ("over", PosTag::IN),
    ("under", PosTag::IN),
    ("after", PosTag::IN),
    ("before", PosTag::IN),
    ("because", PosTag::IN),
    ("since", PosTag::IN),
    ("during", PosTag::IN),
    ("without", PosTag::IN),
    ("through", PosTag::IN),
    ("near", PosTag::IN),
    ("between", PosTag::IN),
    ("among", PosTag::IN),
    ("around", PosTag::IN),
    ("if", PosTag::IN),
    ("while", PosTag::IN),
    ("than", PosTag::IN),
    ("as", PosTag::IN),
    ("until", PosTag::IN),
    ("per", PosTag::IN),
    ("via", PosTag::IN),
    ("upon", PosTag::IN),
    ("against", PosTag::IN),
    ("within", PosTag::IN),
    ("across", PosTag::IN),
    ("behind", PosTag::IN),
    ("toward", PosTag::IN),
    ("towards", PosTag::IN),
    ("although", PosTag::IN),
    ("though", PosTag::IN),
    ("whether", PosTag::IN),
    ("unless", PosTag::IN),
    ("to", PosTag::TO),
    ("and", PosTag::CC),
    ("or", PosTag::CC),
    ("but", PosTag::CC),
    ("nor", PosTag::CC),
    ("can", PosTag::MD),
    ("ca", PosTag::MD),
    ("could", PosTag::MD),
    ("will", PosTag::MD),
    ("wo", PosTag::MD),
    ("would", PosTag::MD),
    ("shall", PosTag::MD),
    ("should", PosTag::MD),
    ("may", PosTag::MD),
    ("might", PosTag::MD),
    ("must", PosTag::MD),
    ("'ll", PosTag::MD),
    ("'d", PosTag::MD),
    ("be", PosTag::VB),
    ("is", PosTag::VBZ),
    ("'s", PosTag::VBZ),
    ("has", PosTag::VBZ),
    ("does", PosTag::VBZ),
    ("am", PosTag::VBP),
    ("are", PosTag::VBP),
    ("'m", PosTag::VBP),
    ("'re", PosTag::VBP),
    ("'ve", PosTag::VBP),
    ("was", PosTag::VBD),
    ("were", PosTag::VBD),
    ("had", PosTag::VBD),
    ("did", PosTag::VBD),
    ("been", PosTag::VBN),
    ("being", PosTag::VBG),
    ("not", PosTag::RB),
    ("n't", PosTag::RB),
    ("very", PosTag::RB),
    ("also", PosTag::RB),
    ("now", PosTag::RB),
    ("then", PosTag::RB),
    ("here", PosTag::RB),
    ("just", PosTag::RB),
    ("still", PosTag::RB),
    ("already", PosTag::RB),
    ("again", PosTag::RB),
    ("always", PosTag::RB),
    ("never", PosTag::RB),
    ("soon", PosTag::RB),
    ("too", PosTag::RB),
    ("only", PosTag::RB),
    ("even", PosTag::RB),
    ("quite", PosTag::RB),
    ("almost", PosTag::RB),
    ("so", PosTag::RB),
    ("there", PosTag::EX),
    ("which", PosTag::WDT),
    ("what", PosTag::WP),
    ("who", PosTag::WP),
    ("whom", PosTag::WP),
    ("when", PosTag::WRB),
    ("where", PosTag::WRB),
    ("why", PosTag::WRB),
    ("how", PosTag::WRB),
    ("hello", PosTag::UH),
    ("hi", PosTag::UH),
    ("yes", PosTag::UH),
    ("ok", PosTag::UH),
    ("okay", PosTag::UH),
    ("oh", PosTag::UH),
    ("one", PosTag::CD),
    ("two", PosTag::CD),
    ("three", PosTag::CD),
    ("four", PosTag::CD),
    ("five", PosTag::CD),
    ("six", PosTag::CD),
    ("seven", PosTag::CD),
    ("eight", PosTag::CD),
    ("nine", PosTag::CD),
    ("ten", PosTag::CD),
    ("hundred", PosTag::CD),
    ("thousand", PosTag::CD),
    ("million", PosTag::CD),
];

/// Base-form verbs, most of which also have a noun reading.
const BASE_VERBS: &[&str] = &[
    "go", "come", "help", "send", "give", "bring", "get", "need", "want", "please", "call",
    "contact", "take", "make", "let", "stop", "save", "find", "tell", "keep", "leave", "move",
    "evacuate", "stay", "look", "see", "check", "know", "think", "provide", "distribute",
    "share", "donate", "pray", "follow", "listen", "read", "write", "say", "ask", "visit", "use",
    "join", "build", "fix", "repair", "eat", "drink", "feed", "buy", "sell", "pay", "work",
    "live", "die", "run", "walk", "drive", "carry", "rescue", "search", "protect", "avoid",
    "report", "inform", "remember", "try", "do", "have", "hope", "wish", "like", "love", "thank",
    "wait", "watch", "sleep", "open", "close", "turn", "put", "hold", "pass", "clean", "boil",
    "cook", "wash", "prepare", "support", "receive", "allow", "stand", "sit", "start",
    "continue", "register", "apply", "text", "assist", "respond", "return", "hurry", "lose",
    "hear", "feel", "fall", "flee", "break", "request", "deliver", "bless",
];

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "ist", "age", "ery",
    "hood", "er", "or",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "able", "ible", "ive", "al", "ic", "less", "ish", "ary", "ant", "ent",
];

static CLOSED_CLASS_LEXICON: LazyLock<HashMap<&'static str, PosTag>> =
    LazyLock::new(|| CLOSED_CLASS.iter().copied().collect());

static BASE_VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| BASE_VERBS.iter().copied().collect());

/// Lexicon and suffix-rule tagger for normalized English tokens.
#[derive(Clone, Debug, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    /// Create a new lexicon tagger.
    pub fn new() -> Self {
        LexiconTagger
    }

    fn is_number(token: &str) -> bool {
        token.chars().any(|c| c.is_ascii_digit())
            && token
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ':' | '/' | '-'))
    }

    /// Resolve a base verb against the tag of the token before it.
    fn verb_in_context(prev: Option<PosTag>) -> PosTag {
        match prev {
            None => PosTag::VB,
            Some(PosTag::TO | PosTag::MD) => PosTag::VB,
            Some(PosTag::PRP) => PosTag::VBP,
            Some(tag) if tag.is_nominal() => PosTag::VBP,
            Some(PosTag::DT | PosTag::PRPS | PosTag::JJ | PosTag::IN) => PosTag::NN,
            Some(_) => PosTag::VB,
        }
    }

    fn by_suffix(token: &str, prev: Option<PosTag>) -> PosTag {
        if token.len() > 4 && token.ends_with("ing") {
            return PosTag::VBG;
        }
        if token.len() > 3 && token.ends_with("ed") {
            return match prev {
                Some(PosTag::VBZ | PosTag::VBP | PosTag::VBD | PosTag::VB) => PosTag::VBN,
                _ => PosTag::VBD,
            };
        }
        if token.len() > 3 && token.ends_with("ly") {
            return PosTag::RB;
        }
        if NOUN_SUFFIXES
            .iter()
            .any(|s| token.len() > s.len() + 1 && token.ends_with(s))
        {
            return PosTag::NN;
        }
        if ADJECTIVE_SUFFIXES
            .iter()
            .any(|s| token.len() > s.len() + 2 && token.ends_with(s))
        {
            return PosTag::JJ;
        }
        if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
            return PosTag::NNS;
        }
        PosTag::NN
    }

    fn tag_token(token: &str, prev: Option<PosTag>) -> PosTag {
        if let Some(tag) = CLOSED_CLASS_LEXICON.get(token) {
            return *tag;
        }
        if Self::is_number(token) {
            return PosTag::CD;
        }
        if BASE_VERB_SET.contains(token) {
            return Self::verb_in_context(prev);
        }
        Self::by_suffix(token, prev)
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Vec<(String, PosTag)> {
        let mut tagged: Vec<(String, PosTag)> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let lowered = token.to_lowercase();
            let prev = tagged.last().map(|(_, tag)| *tag);
            let tag = Self::tag_token(&lowered, prev);
            tagged.push((token.clone(), tag));
        }
        tagged
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
