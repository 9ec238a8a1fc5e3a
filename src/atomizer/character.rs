//! One-character-per-atom tokenizer, with frequency-induced vocabularies.

use std::collections::HashMap;

use super::{Atomizer, AtomId, VocabError, Vocabulary};

/// An atomizer where every Unicode code point is its own atom.
pub struct CharacterAtomizer {
    vocab: Vocabulary,
}

impl CharacterAtomizer {
    /// Build a character atomizer directly from a vocabulary.
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Induce a vocabulary from `corpus` by code-point frequency.
    ///
    /// Atoms are assigned indices in descending-frequency order; ties are
    /// broken by first-appearance order in the corpus (a stable sort over
    /// first-seen order gives this for free).
    pub fn from_text(corpus: &str) -> Self {
        let mut counts: HashMap<char, usize> = HashMap::new();
        let mut first_seen: Vec<char> = Vec::new();

        for c in corpus.chars() {
            let entry = counts.entry(c).or_insert_with(|| {
                first_seen.push(c);
                0
            });
            *entry += 1;
        }

        let mut atoms = first_seen;
        atoms.sort_by(|a, b| counts[b].cmp(&counts[a]));

        let dense: Vec<String> = atoms.into_iter().map(|c| c.to_string()).collect();
        Self::new(Vocabulary::from_dense(dense))
    }
}

impl Atomizer for CharacterAtomizer {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn atomize(&self, text: &str) -> Result<Vec<AtomId>, VocabError> {
        text.chars()
            .map(|c| {
                let mut buf = [0u8; 4];
                let atom = c.encode_utf8(&mut buf);
                self.vocab
                    .index_of(atom)
                    .ok_or_else(|| VocabError::UnknownAtom(atom.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_corpus() {
        let corpus = "aabbbc";
        let atomizer = CharacterAtomizer::from_text(corpus);
        let indices = atomizer.atomize(corpus).unwrap();
        assert_eq!(atomizer.deatomize(&indices).unwrap(), corpus);
    }

    #[test]
    fn orders_by_descending_frequency_with_stable_ties() {
        // 'b' appears 3x, 'a' 2x, 'c' 1x -- and among equal counts the
        // first-seen atom sorts first.
        let atomizer = CharacterAtomizer::from_text("abbbac");
        assert_eq!(atomizer.atoms_by_index(), vec!["b", "a", "c"]);
    }

    #[test]
    fn unknown_code_point_is_an_error() {
        let atomizer = CharacterAtomizer::from_text("ab");
        assert_eq!(
            atomizer.atomize("abc").unwrap_err(),
            VocabError::UnknownAtom("c".to_string())
        );
    }

    trait TestExt {
        fn atoms_by_index(&self) -> Vec<&str>;
    }

    impl TestExt for CharacterAtomizer {
        fn atoms_by_index(&self) -> Vec<&str> {
            (0..self.vocab.len() as AtomId)
                .map(|i| self.vocab.decode(i).unwrap())
                .collect()
        }
    }
}
