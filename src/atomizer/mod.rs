//! Reversible text atomization: vocabulary, capability contract, and variants.
//!
//! An [`Atomizer`] maps text to a sequence of dense vocabulary indices and
//! back. Two variants are provided: [`character::CharacterAtomizer`] (one
//! Unicode code point per atom) and [`greedy::GreedyAtomizer`] (longest-match
//! scan over a seeded multi-character vocabulary). Both share the
//! [`Vocabulary`] bijection and the same error type.

pub mod character;
pub mod greedy;

use std::collections::HashMap;

pub use character::CharacterAtomizer;
pub use greedy::GreedyAtomizer;

/// Token ID type used throughout the atomizer.
pub type AtomId = u32;

/// Errors raised when text or indices fall outside an atomizer's vocabulary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VocabError {
    #[error("atom {0:?} is not in the vocabulary")]
    UnknownAtom(String),
    #[error("index {0} is not in the vocabulary")]
    UnknownIndex(AtomId),
}

/// A bijective mapping from atom strings to dense indices `[0, N)`.
///
/// Keys are always non-empty. The decoder (index -> atom) is derived and
/// kept consistent with the encoder at construction time.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    encode: HashMap<String, AtomId>,
    decode: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary assigning index = position in `atoms`.
    ///
    /// Callers are responsible for ordering `atoms` (sorted, for induced
    /// vocabularies; frequency order, for character vocabularies).
    pub fn from_dense(atoms: Vec<String>) -> Self {
        debug_assert!(
            atoms.iter().all(|a| !a.is_empty()),
            "vocabulary atoms must be non-empty"
        );
        let mut encode = HashMap::with_capacity(atoms.len());
        for (index, atom) in atoms.iter().enumerate() {
            encode.insert(atom.clone(), index as AtomId);
        }
        debug_assert_eq!(
            encode.len(),
            atoms.len(),
            "vocabulary atoms must be unique"
        );
        Self {
            encode,
            decode: atoms,
        }
    }

    /// Number of atoms in the vocabulary.
    pub fn len(&self) -> usize {
        self.decode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decode.is_empty()
    }

    pub fn index_of(&self, atom: &str) -> Option<AtomId> {
        self.encode.get(atom).copied()
    }

    pub fn decode(&self, index: AtomId) -> Option<&str> {
        self.decode.get(index as usize).map(String::as_str)
    }

    /// All atom keys, in their index order (not sorted).
    pub fn atoms_iter(&self) -> impl Iterator<Item = &str> {
        self.decode.iter().map(String::as_str)
    }
}

/// Capability contract shared by every atomizer variant.
///
/// Rather than a shared base class, each variant implements this trait over
/// its own [`Vocabulary`]; `atoms`, `indices`, `tokenize`, and `deatomize`
/// are derived once here and need no per-variant override.
pub trait Atomizer {
    /// The vocabulary backing this atomizer.
    fn vocabulary(&self) -> &Vocabulary;

    /// Atomize `text` into vocabulary indices.
    fn atomize(&self, text: &str) -> Result<Vec<AtomId>, VocabError>;

    /// Vocabulary keys, sorted lexicographically.
    fn atoms(&self) -> Vec<&str> {
        let mut atoms: Vec<&str> = self.vocabulary().atoms_iter().collect();
        atoms.sort_unstable();
        atoms
    }

    /// Vocabulary indices, sorted ascending.
    fn indices(&self) -> Vec<AtomId> {
        let mut indices: Vec<AtomId> = (0..self.vocabulary().len() as AtomId).collect();
        indices.sort_unstable();
        indices
    }

    /// Atomize `text` into the atom strings themselves (`decoder[atomize(text)]`
    /// pointwise).
    fn tokenize(&self, text: &str) -> Result<Vec<String>, VocabError> {
        self.atomize(text)?
            .into_iter()
            .map(|index| {
                self.vocabulary()
                    .decode(index)
                    .map(str::to_owned)
                    .ok_or(VocabError::UnknownIndex(index))
            })
            .collect()
    }

    /// Reconstruct text from a sequence of vocabulary indices.
    fn deatomize(&self, indices: &[AtomId]) -> Result<String, VocabError> {
        let mut text = String::new();
        for &index in indices {
            let atom = self
                .vocabulary()
                .decode(index)
                .ok_or(VocabError::UnknownIndex(index))?;
            text.push_str(atom);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_round_trips_indices() {
        let vocab = Vocabulary::from_dense(vec!["a".into(), "b".into(), "cc".into()]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("b"), Some(1));
        assert_eq!(vocab.decode(2), Some("cc"));
        assert_eq!(vocab.index_of("missing"), None);
    }
}
