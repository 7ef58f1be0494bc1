//! Symbol catalog

use rand::Rng;

/// The face values a reel can show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolCatalog {
    symbols: Vec<String>,
}

impl SymbolCatalog {
    /// Create a catalog from symbol names
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    /// Standard set: HP1-HP4, LP1-LP5, WILD, SCATTER, BONUS
    pub fn standard() -> Self {
        Self::new(rb_core::ReelConfig::standard().symbols)
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol name by index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    /// Index of a symbol name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == name)
    }

    /// Draw a uniformly random symbol index, None when empty
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.symbols.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.symbols.len()))
    }
}
