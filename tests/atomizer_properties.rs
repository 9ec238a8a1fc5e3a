//! Property-based tests for the atomizer round-trip laws.

use clforge::atomizer::{Atomizer, CharacterAtomizer, GreedyAtomizer};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For every character atomizer built from corpus `T`,
    /// `deatomize(atomize(T)) == T`.
    #[test]
    fn prop_character_round_trips(corpus in "\\PC{0,200}") {
        let atomizer = CharacterAtomizer::from_text(&corpus);
        let indices = atomizer.atomize(&corpus).expect("corpus-derived vocabulary covers corpus");
        prop_assert_eq!(atomizer.deatomize(&indices).unwrap(), corpus);
    }

    /// For every greedy atomizer with an induced vocabulary V, text composed
    /// only from the corpus it was induced on round-trips.
    #[test]
    fn prop_greedy_round_trips(corpus in "\\PC{0,200}") {
        let atomizer = GreedyAtomizer::from_text(&corpus).expect("scan over the seeded vocabulary cannot fail");
        let indices = atomizer.atomize(&corpus).expect("induced vocabulary covers corpus");
        prop_assert_eq!(atomizer.deatomize(&indices).unwrap(), corpus);
    }

    /// `tokenize(text) == [decoder[i] for i in atomize(text)]` pointwise.
    #[test]
    fn prop_tokenize_matches_decoded_atomize(corpus in "\\PC{0,200}") {
        let atomizer = GreedyAtomizer::from_text(&corpus).expect("scan over the seeded vocabulary cannot fail");
        let indices = atomizer.atomize(&corpus).unwrap();
        let tokens = atomizer.tokenize(&corpus).unwrap();
        let decoded: Vec<String> = indices
            .iter()
            .map(|&i| atomizer.vocabulary().decode(i).unwrap().to_string())
            .collect();
        prop_assert_eq!(tokens, decoded);
    }
}
