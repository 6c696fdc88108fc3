//! Stimulus alphabet.

use serde::{Deserialize, Serialize};

/// Letters excluded from the default alphabet because they are easy to confuse.
pub const CONFUSABLE_LETTERS: [char; 3] = ['I', 'O', 'Q'];

/// Ordered, duplicate-free set of stimulus symbols.
///
/// Serialized as a plain string, e.g. `"ABCDEFGH"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from symbols, keeping the first occurrence of each.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        let mut unique: Vec<char> = Vec::new();
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self { symbols: unique }
    }

    /// Uppercase ASCII letters minus `excluded`.
    pub fn uppercase_excluding(excluded: &[char]) -> Self {
        Self::new(('A'..='Z').filter(|c| !excluded.contains(c)))
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Position of `symbol` in the alphabet order.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&c| c == symbol)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::uppercase_excluding(&CONFUSABLE_LETTERS)
    }
}

impl From<String> for Alphabet {
    fn from(s: String) -> Self {
        Self::new(s.chars())
    }
}

impl From<&str> for Alphabet {
    fn from(s: &str) -> Self {
        Self::new(s.chars())
    }
}

impl From<Alphabet> for String {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.symbols.into_iter().collect()
    }
}
