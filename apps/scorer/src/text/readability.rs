//! Flesch reading ease with a vowel-group syllable estimate.

use serde::{Deserialize, Serialize};

use crate::text::{split_sentences, words};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityStats {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    pub flesch_reading_ease: f64,
}

/// Vowel groups, minus a silent trailing `e`, never below 1.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    if n > 2 && letters[n - 1] == 'e' && letters[n - 2] != 'l' && !is_vowel(letters[n - 2]) {
        count -= 1;
    }
    count.max(1)
}

/// `None` when the text has no words.
pub fn analyze(text: &str) -> Option<ReadabilityStats> {
    let sentences = split_sentences(text);
    let word_list: Vec<&str> = sentences.iter().flat_map(|s| words(s)).collect();
    if word_list.is_empty() {
        return None;
    }

    let syllables: usize = word_list.iter().map(|w| count_syllables(w)).sum();
    let sentence_count = sentences.len().max(1) as f64;
    let word_count = word_list.len() as f64;

    let ease = 206.835
        - 1.015 * (word_count / sentence_count)
        - 84.6 * (syllables as f64 / word_count);

    Some(ReadabilityStats {
        sentences: sentences.len(),
        words: word_list.len(),
        syllables,
        flesch_reading_ease: ease,
    })
}
