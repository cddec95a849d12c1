//! Word Dictionary
//!
//! The finite list of tokens agents draw from when they coin a new word.
//! Loaded once at model construction, either from a word file (one token per
//! line) or generated from consonant-vowel syllables.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ModelError;
use crate::inventory::GlobalInventory;

/// Rejected draws before sampling from the list of free words instead
pub const MAX_INVENTION_DRAWS: usize = 64;

const CONSONANTS: &[char] = &['b', 'd', 'f', 'g', 'k', 'l', 'm', 'n', 'p', 'r', 's', 't', 'v', 'z'];
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Resource: ordered list of distinct tokens
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    /// Build from tokens, trimming whitespace and dropping blanks and repeats
    pub fn from_words<I, S>(words: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .filter(|w| seen.insert(w.clone()))
            .collect();

        if words.is_empty() {
            return Err(ModelError::EmptyDictionary);
        }
        Ok(Self { words })
    }

    /// Load a word file with one token per line
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::DictionaryIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_words(content.lines())
    }

    /// Deterministic dictionary of `len` pronounceable tokens
    ///
    /// Token `i` spells `i` in base-70 syllables, padded to two syllables.
    pub fn synthetic(len: usize) -> Result<Self, ModelError> {
        Self::from_words((0..len).map(syllable_token))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed dictionary
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Coin a word nobody currently holds, uniformly among the free words.
    ///
    /// Draws uniformly and rejects words present in `taken`. After
    /// [`MAX_INVENTION_DRAWS`] rejections it samples directly from the
    /// remaining free words, so the call terminates even on a nearly
    /// exhausted dictionary. Returns `None` only when every word is taken.
    pub fn invent<R: Rng + ?Sized>(&self, taken: &GlobalInventory, rng: &mut R) -> Option<String> {
        for _ in 0..MAX_INVENTION_DRAWS {
            let word = &self.words[rng.gen_range(0..self.words.len())];
            if !taken.contains(word) {
                return Some(word.clone());
            }
        }

        let free: Vec<&String> = self.words.iter().filter(|w| !taken.contains(w)).collect();
        free.choose(rng).map(|w| (*w).clone())
    }
}

fn syllable_token(mut index: usize) -> String {
    let base = CONSONANTS.len() * VOWELS.len();
    let mut syllables = Vec::new();
    loop {
        let digit = index % base;
        syllables.push((CONSONANTS[digit / VOWELS.len()], VOWELS[digit % VOWELS.len()]));
        index /= base;
        if index == 0 && syllables.len() >= 2 {
            break;
        }
    }
    syllables
        .iter()
        .rev()
        .flat_map(|(c, v)| [*c, *v])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_empty_dictionary_rejected() {
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(Dictionary::from_words(empty), Err(ModelError::EmptyDictionary)));
        assert!(matches!(
            Dictionary::from_words(["", "  "]),
            Err(ModelError::EmptyDictionary)
        ));
    }

    #[test]
    fn test_duplicates_collapsed_in_order() {
        let dictionary = Dictionary::from_words(["y", "x", "y", " x "]).unwrap();
        assert_eq!(dictionary.words(), &["y".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_synthetic_tokens_distinct() {
        let dictionary = Dictionary::synthetic(10_000).unwrap();
        assert_eq!(dictionary.len(), 10_000);
        assert_eq!(dictionary.get(0), Some("baba"));
        assert_eq!(dictionary.get(1), Some("babe"));
        assert!(dictionary.words().iter().all(|w| w.len() % 2 == 0 && w.len() >= 4));
    }

    #[test]
    fn test_load_word_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "apple\nbanana\n\napple\ncherry").unwrap();

        let dictionary = Dictionary::load(file.path()).unwrap();
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.get(2), Some("cherry"));

        let missing = Dictionary::load("/nonexistent/words");
        assert!(matches!(missing, Err(ModelError::DictionaryIo { .. })));
    }

    #[test]
    fn test_invent_avoids_taken_words() {
        let dictionary = Dictionary::from_words(["x", "y", "z"]).unwrap();
        let mut taken = GlobalInventory::new();
        taken.add("x");
        taken.add("z");
        let mut rng = SmallRng::seed_from_u64(5);

        for _ in 0..10 {
            assert_eq!(dictionary.invent(&taken, &mut rng).as_deref(), Some("y"));
        }

        taken.add("y");
        assert_eq!(dictionary.invent(&taken, &mut rng), None);
    }

    #[test]
    fn test_invent_is_uniform_over_free_words() {
        let words: Vec<String> = (0..1000).map(|i| format!("w{i}")).collect();
        let dictionary = Dictionary::from_words(&words).unwrap();
        let free = ["w10", "w500", "w999"];
        let mut taken = GlobalInventory::new();
        for word in words.iter().filter(|w| !free.contains(&w.as_str())) {
            taken.add(word);
        }
        let mut rng = SmallRng::seed_from_u64(1);

        let draws = 30_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            let word = dictionary.invent(&taken, &mut rng).unwrap();
            let index = free.iter().position(|f| *f == word).unwrap();
            counts[index] += 1;
        }
        for (word, count) in free.iter().zip(counts) {
            let share = count as f64 / draws as f64;
            assert!((share - 1.0 / 3.0).abs() < 0.03, "{word}: share {share}");
        }
    }
}
