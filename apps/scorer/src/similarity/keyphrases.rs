//! Keyphrase candidates and diversity-aware selection (maximal marginal relevance),
//! shared by every similarity backend. Backends only differ in how they score relevance
//! and pairwise redundancy.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{tokenize, STOP_WORDS};

/// Longest n-gram considered as a phrase.
pub const MAX_NGRAM: usize = 3;

/// Phrases never span punctuation: split on clause punctuation and sentence-final dots.
static CHUNK_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,;:!?()\[\]{}\r\n|•●▪]|\.(?:\s|$)").expect("valid chunk split regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub phrase: String,
    pub ngram: usize,
    pub frequency: usize,
    /// Token offset of the first occurrence; used as the deterministic tie-breaker.
    pub first_position: usize,
}

/// All 1- to 3-gram candidates in order of first occurrence. A candidate never starts or
/// ends with a stop word and never contains a bare number.
pub fn candidates(text: &str) -> Vec<Candidate> {
    let mut found: Vec<Candidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut offset = 0;

    for chunk in CHUNK_SPLIT.split(text) {
        let tokens = tokenize(chunk);
        for start in 0..tokens.len() {
            for n in 1..=MAX_NGRAM {
                let Some(window) = tokens.get(start..start + n) else {
                    break;
                };
                if !is_phrase(window) {
                    continue;
                }
                let phrase = window.join(" ");
                match index.get(&phrase) {
                    Some(&i) => found[i].frequency += 1,
                    None => {
                        index.insert(phrase.clone(), found.len());
                        found.push(Candidate {
                            phrase,
                            ngram: n,
                            frequency: 1,
                            first_position: offset + start,
                        });
                    }
                }
            }
        }
        offset += tokens.len();
    }

    found
}

fn is_phrase(window: &[String]) -> bool {
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return false;
    };
    if STOP_WORDS.contains(first.as_str()) || STOP_WORDS.contains(last.as_str()) {
        return false;
    }
    if window.iter().any(|t| t.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }
    window.len() > 1 || first.chars().count() > 1
}

/// Frequency-based relevance normalised to [0, 1]; longer phrases get a mild boost.
pub fn frequency_relevance(candidates: &[Candidate]) -> Vec<f64> {
    let raw: Vec<f64> = candidates
        .iter()
        .map(|c| c.frequency as f64 * (1.0 + 0.5 * (c.ngram as f64 - 1.0)))
        .collect();
    let max = raw.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.into_iter().map(|r| r / max).collect()
}

/// Maximal marginal relevance. Picks up to `top_n` indices; each step maximises
/// `(1 − diversity)·relevance − diversity·max_redundancy_to_already_picked`.
/// Ties go to the lower index.
pub fn select_diverse<F>(relevance: &[f64], top_n: usize, diversity: f64, redundancy: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> f64,
{
    let diversity = diversity.clamp(0.0, 1.0);
    let mut selected: Vec<usize> = Vec::new();
    let mut remaining: Vec<usize> = (0..relevance.len()).collect();

    while selected.len() < top_n && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (slot, &candidate) in remaining.iter().enumerate() {
            let penalty = selected
                .iter()
                .map(|&s| redundancy(candidate, s))
                .fold(0.0_f64, f64::max);
            let score = (1.0 - diversity) * relevance[candidate] - diversity * penalty;
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((slot, score));
            }
        }
        let Some((slot, _)) = best else { break };
        selected.push(remaining.remove(slot));
    }

    selected
}
