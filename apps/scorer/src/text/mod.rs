//! Text utilities shared by the classifiers, the lexical similarity fallback and the
//! scorers: bullet extraction, tokenization, stop words, light stemming.

pub mod dates;
pub mod readability;

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::models::{ExperienceEntry, ResumeDocument};

/// Glyphs parsers leave at the front of bullet lines.
const BULLET_GLYPHS: &[char] = &['•', '●', '○', '◦', '▪', '■', '►', '▶', '➢', '✓', '✔', '-', '*', '–', '—', '·'];

pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has",
        "have", "if", "in", "into", "is", "it", "its", "of", "on", "or", "our", "such", "that",
        "the", "their", "then", "there", "these", "they", "this", "to", "was", "were", "will",
        "with", "we", "you", "your", "who", "which", "while", "within", "across", "over",
        "using", "via", "per", "etc", "also", "able", "must", "should", "would", "can", "all",
        "any", "other", "more", "most", "well", "including", "role", "team", "work", "experience",
        "years", "strong", "plus", "ability", "looking", "join", "about", "what", "how",
    ]
    .into_iter()
    .collect()
});

/// Strips leading bullet glyphs and surrounding whitespace.
pub fn normalize_bullet(line: &str) -> &str {
    line.trim().trim_start_matches(BULLET_GLYPHS).trim()
}

/// Every achievement bullet in the work history, in document order.
///
/// Entries without an achievements list contribute their description split into lines;
/// blank lines are dropped.
pub fn collect_bullets(resume: &ResumeDocument) -> Vec<String> {
    resume.experience.iter().flat_map(entry_bullets).collect()
}

/// Bullets of one position: its achievements, or its description lines when it has none.
pub fn entry_bullets(entry: &ExperienceEntry) -> Vec<String> {
    let explicit: Vec<String> = entry
        .achievements
        .iter()
        .map(|a| normalize_bullet(a))
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }

    entry
        .description
        .split(['\n', '•', '●', '▪'])
        .map(normalize_bullet)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// All résumé text concatenated, one section per line. Used for keyword matching and
/// document-level measures.
pub fn full_text(resume: &ResumeDocument) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(summary) = resume.summary.as_deref() {
        parts.push(summary);
    }
    parts.extend(resume.skills.iter().map(String::as_str));
    for entry in &resume.experience {
        parts.push(&entry.title);
        parts.push(&entry.company);
        parts.push(&entry.description);
        parts.extend(entry.achievements.iter().map(String::as_str));
    }
    for edu in &resume.education {
        parts.push(&edu.degree);
        parts.push(&edu.field);
        parts.push(&edu.institution);
    }
    for cert in &resume.certifications {
        parts.push(&cert.name);
        parts.push(&cert.issuer);
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whitespace-separated words that contain at least one alphanumeric character.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
}

pub fn word_count(text: &str) -> usize {
    words(text).count()
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// Lowercased tokens split on anything that is not alphanumeric, `+` or `#`
/// (so `C++` and `C#` survive as tokens).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .map(|t| t.trim_start_matches(['+', '#']))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Strips a handful of English inflections so `deployed`/`deploying`/`deploys` collapse.
pub fn stem(token: &str) -> String {
    if token.chars().count() <= 4 || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return token.to_string();
    }
    for suffix in ["ing", "ed", "es", "s"] {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if stripped.len() >= 3 {
                return stripped.to_string();
            }
        }
    }
    token.to_string()
}

/// Tokenized, stop-word-free, stemmed content terms.
pub fn content_terms(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .map(|t| stem(&t))
        .collect()
}

/// Splits on sentence terminators and newlines. Bullets without final punctuation count
/// as one sentence each.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?', '\n', ';'])
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphabetic))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceEntry;

    #[test]
    fn test_normalize_bullet_strips_glyphs() {
        assert_eq!(normalize_bullet("  • Led the team"), "Led the team");
        assert_eq!(normalize_bullet("- Built it"), "Built it");
        assert_eq!(normalize_bullet("►► Shipped"), "Shipped");
    }

    #[test]
    fn test_collect_bullets_prefers_achievements() {
        let resume = ResumeDocument {
            experience: vec![ExperienceEntry {
                description: "Ignored description".to_string(),
                achievements: vec!["• Led migration".to_string(), "  ".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(collect_bullets(&resume), vec!["Led migration".to_string()]);
    }

    #[test]
    fn test_collect_bullets_splits_description() {
        let resume = ResumeDocument {
            experience: vec![ExperienceEntry {
                description: "Built APIs\n• Reduced latency by 20%\n\n".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            collect_bullets(&resume),
            vec!["Built APIs".to_string(), "Reduced latency by 20%".to_string()]
        );
    }

    #[test]
    fn test_tokenize_keeps_language_symbols() {
        assert_eq!(tokenize("C++, C# and Node.js"), vec!["c++", "c#", "and", "node", "js"]);
    }

    #[test]
    fn test_stem_collapses_inflections() {
        assert_eq!(stem("deployed"), "deploy");
        assert_eq!(stem("deploying"), "deploy");
        assert_eq!(stem("deploys"), "deploy");
        assert_eq!(stem("aws"), "aws");
        assert_eq!(stem("k8s"), "k8s");
    }

    #[test]
    fn test_content_terms_drop_stop_words() {
        assert_eq!(content_terms("The design of APIs"), vec!["design", "apis"]);
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Built it. Shipped it!\nMaintained it");
        assert_eq!(sentences, vec!["Built it", "Shipped it", "Maintained it"]);
    }

    #[test]
    fn test_full_text_skips_blank_sections() {
        let resume = ResumeDocument {
            summary: Some("Engineer".to_string()),
            skills: vec!["Rust".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert_eq!(full_text(&resume), "Engineer\nRust");
    }
}
