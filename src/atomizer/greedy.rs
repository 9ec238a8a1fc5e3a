//! Greedy longest-match tokenizer over a seeded multi-character vocabulary.

use std::collections::{BTreeSet, HashMap};

use super::{Atomizer, AtomId, VocabError, Vocabulary};

/// Multi-character atoms for the target kernel language: keywords,
/// built-in functions, preprocessor directives, comment delimiters, and the
/// two-space atom. Taken verbatim from the bundled vocabulary constant this
/// atomizer is seeded from (bag-of-words analysis of a GitHub corpus plus
/// the C99 / OpenCL 1.2 specs). `"into"` is not a kernel-language keyword;
/// it is a corpus-derived artifact kept for bit-for-bit compatibility with
/// vocabularies already built from this seed set.
const GREEDY_SEED_KEYWORDS: &[&str] = &[
    "  ",
    "__assert",
    "__attribute",
    "__builtin_astype",
    "__clc_fabs",
    "__clc_fma",
    "__constant",
    "__global",
    "__inline",
    "__kernel",
    "__local",
    "__private",
    "__read_only",
    "__read_write",
    "__write_only",
    "*/",
    "/*",
    "//",
    "abs",
    "alignas",
    "alignof",
    "atomic_add",
    "auto",
    "barrier",
    "bool",
    "break",
    "case",
    "char",
    "clamp",
    "complex",
    "const",
    "constant",
    "continue",
    "default",
    "define",
    "defined",
    "do",
    "double",
    "elif",
    "else",
    "endif",
    "enum",
    "error",
    "event_t",
    "extern",
    "fabs",
    "false",
    "float",
    "for",
    "get_global_id",
    "get_global_size",
    "get_local_id",
    "get_local_size",
    "get_num_groups",
    "global",
    "goto",
    "half",
    "if",
    "ifdef",
    "ifndef",
    "image1d_array_t",
    "image1d_buffer_t",
    "image1d_t",
    "image2d_array_t",
    "image2d_t",
    "image3d_t",
    "imaginary",
    "include",
    "inline",
    "int",
    "into",
    "kernel",
    "line",
    "local",
    "long",
    "noreturn",
    "pragma",
    "private",
    "quad",
    "read_only",
    "read_write",
    "register",
    "restrict",
    "return",
    "sampler_t",
    "short",
    "shuffle",
    "signed",
    "size_t",
    "sizeof",
    "sqrt",
    "static",
    "struct",
    "switch",
    "true",
    "typedef",
    "u32",
    "uchar",
    "uint",
    "ulong",
    "undef",
    "union",
    "unsigned",
    "void",
    "volatile",
    "while",
    "wide",
    "write_only",
];

/// Every printable ASCII character, matching CPython's `string.printable`
/// (digits, lowercase, uppercase, punctuation, then whitespace). The seeded
/// vocabulary unions this set of single-character atoms with
/// [`GREEDY_SEED_KEYWORDS`].
const PRINTABLE_ASCII: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0B\x0C";

/// Longest-match scanner over a finite atom set that includes both single
/// characters and multi-character tokens.
pub struct GreedyAtomizer {
    vocab: Vocabulary,
    /// Multi-character atoms in this vocabulary, grouped by first character.
    lookup: HashMap<char, Vec<String>>,
}

impl GreedyAtomizer {
    /// Build a greedy atomizer from an already-assembled vocabulary.
    pub fn new(vocab: Vocabulary) -> Self {
        let lookup = build_lookup(&vocab);
        Self { vocab, lookup }
    }

    /// The seeded atomizer: the bundled keyword set unioned with every
    /// printable ASCII character. This is what [`Self::from_text`] uses to
    /// retokenize a corpus before inducing the final vocabulary.
    pub fn seeded() -> Self {
        let mut atoms: BTreeSet<String> = GREEDY_SEED_KEYWORDS
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        atoms.extend(PRINTABLE_ASCII.chars().map(|c| c.to_string()));
        Self::new(Vocabulary::from_dense(atoms.into_iter().collect()))
    }

    /// Induce a vocabulary from `corpus`: retokenize it with the seeded
    /// atomizer and keep only the distinct tokens actually exercised,
    /// indexed by their position in sorted order.
    pub fn from_text(corpus: &str) -> Result<Self, VocabError> {
        let seeded = Self::seeded();
        let tokens = seeded.tokenize(corpus)?;
        let unique: BTreeSet<String> = tokens.into_iter().collect();
        Ok(Self::new(Vocabulary::from_dense(unique.into_iter().collect())))
    }
}

fn build_lookup(vocab: &Vocabulary) -> HashMap<char, Vec<String>> {
    let mut lookup: HashMap<char, Vec<String>> = HashMap::new();
    for atom in vocab.atoms_iter() {
        if atom.chars().count() > 1 {
            if let Some(first) = atom.chars().next() {
                lookup.entry(first).or_default().push(atom.to_string());
            }
        }
    }
    lookup
}

/// `chars[i..j]`, clamping `j` to `chars.len()`.
///
/// The scan's trial right end can run one past the end of the text while
/// probing for an extension; Python's slice semantics clamp silently, Rust's
/// indexing does not, so we clamp explicitly here rather than let the scan
/// panic on the last character of a text.
fn clamped_slice(chars: &[char], i: usize, j: usize) -> String {
    let j = j.min(chars.len());
    chars[i..j].iter().collect()
}

impl Atomizer for GreedyAtomizer {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn atomize(&self, text: &str) -> Result<Vec<AtomId>, VocabError> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut indices = Vec::new();
        let mut i = 0usize;

        while i < n {
            let head = chars[i];
            let candidates = self.lookup.get(&head);

            let multichar_match = match candidates {
                Some(candidates) if !candidates.is_empty() => {
                    let mut j = i + 2;
                    // Extend: while the candidate head's multi-char atoms
                    // could still grow to cover a longer slice, keep probing.
                    while j <= n && candidates.iter().any(|atom| atom.starts_with(&clamped_slice(&chars, i, j)))
                    {
                        j += 1;
                    }

                    // Shrink: the longest j that exactly names an atom wins.
                    let mut matched = None;
                    while j > i + 1 {
                        let slice = clamped_slice(&chars, i, j);
                        if candidates.iter().any(|atom| *atom == slice) {
                            matched = Some((slice, j));
                            break;
                        }
                        j -= 1;
                    }
                    matched
                }
                _ => None,
            };

            match multichar_match {
                Some((atom, j)) => {
                    let index = self
                        .vocab
                        .index_of(&atom)
                        .ok_or_else(|| VocabError::UnknownAtom(atom.clone()))?;
                    indices.push(index);
                    i = j;
                }
                None => {
                    let atom = head.to_string();
                    let index = self
                        .vocab
                        .index_of(&atom)
                        .ok_or(VocabError::UnknownAtom(atom))?;
                    indices.push(index);
                    i += 1;
                }
            }
        }

        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins_over_prefix_keywords() {
        let atomizer = GreedyAtomizer::seeded();
        let tokens = atomizer.tokenize("__kernel void f").unwrap();
        assert_eq!(tokens, vec!["__kernel", " ", "void", " ", "f"]);
    }

    #[test]
    fn comment_delimiters_are_single_atoms() {
        let atomizer = GreedyAtomizer::seeded();
        let tokens = atomizer.tokenize("/* x */").unwrap();
        assert_eq!(tokens, vec!["/*", " ", "x", " ", "*/"]);
    }

    #[test]
    fn double_space_is_a_seeded_atom() {
        let atomizer = GreedyAtomizer::seeded();
        let tokens = atomizer.tokenize("  x").unwrap();
        assert_eq!(tokens, vec!["  ", "x"]);
    }

    #[test]
    fn keyword_atom_beats_four_single_chars() {
        let atomizer = GreedyAtomizer::seeded();
        let tokens = atomizer.tokenize("auto").unwrap();
        assert_eq!(tokens, vec!["auto"]);
    }

    #[test]
    fn round_trips_through_induced_vocabulary() {
        let corpus = "__kernel void inc(__global int* a, const int n){a[0]+=1;}";
        let atomizer = GreedyAtomizer::from_text(corpus).unwrap();
        let indices = atomizer.atomize(corpus).unwrap();
        assert_eq!(atomizer.deatomize(&indices).unwrap(), corpus);
    }

    #[test]
    fn induced_vocabulary_only_contains_exercised_atoms() {
        let atomizer = GreedyAtomizer::from_text("if (a) { }").unwrap();
        // "__kernel" never appears in the corpus, so it must not survive
        // induction even though it is in the seed set.
        assert!(atomizer.vocabulary().index_of("__kernel").is_none());
        assert!(atomizer.vocabulary().index_of("if").is_some());
    }

    #[test]
    fn scan_handles_match_at_end_of_text() {
        // Regression for the j > len(text) clamp: "auto" ends exactly at
        // the text boundary, so the extend loop's trial j runs past n.
        let atomizer = GreedyAtomizer::seeded();
        assert_eq!(atomizer.tokenize("auto").unwrap(), vec!["auto"]);
        assert_eq!(atomizer.tokenize("a").unwrap(), vec!["a"]);
    }
}
