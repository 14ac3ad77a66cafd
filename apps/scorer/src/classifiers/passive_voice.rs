//! Passive-voice detector: a form of "to be" followed by a past participle.

use once_cell::sync::Lazy;
use regex::Regex;

static PASSIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:am|is|are|was|were|be|been|being)\s+(?:(?:also|then|successfully|fully|later|not)\s+)?[a-z]*(?:ed|built|done|made|given|taken|written|led|run|seen|known|shown|chosen|driven|sent|kept|held|brought|bought|taught|found|put|set|paid|won|begun|grown|drawn)\b",
    )
    .expect("valid passive voice regex")
});

/// Adjectives ending in -ed that read as states, not passive constructions.
const STATE_WORDS: &[&str] = &["interested", "experienced", "skilled", "talented", "detailed", "dedicated", "motivated", "based", "focused", "excited"];

pub fn is_passive(sentence: &str) -> bool {
    PASSIVE_RE.find_iter(sentence).any(|m| {
        let participle = m
            .as_str()
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_lowercase();
        !STATE_WORDS.contains(&participle.as_str())
    })
}

/// Percentage (0–100) of bullets containing a passive construction.
pub fn passive_rate(bullets: &[String]) -> f64 {
    if bullets.is_empty() {
        return 0.0;
    }
    let passive = bullets.iter().filter(|b| is_passive(b)).count();
    passive as f64 / bullets.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_passive_constructions() {
        assert!(is_passive("The pipeline was rebuilt by the team"));
        assert!(is_passive("Reports were written weekly"));
        assert!(is_passive("Was successfully promoted twice"));
    }

    #[test]
    fn test_active_sentences_pass() {
        assert!(!is_passive("Rebuilt the pipeline"));
        assert!(!is_passive("Led 4 engineers"));
    }

    #[test]
    fn test_state_adjectives_are_not_passive() {
        assert!(!is_passive("I am experienced in Rust"));
        assert!(!is_passive("Team was based in Berlin"));
    }

    #[test]
    fn test_passive_rate() {
        let bullets = vec![
            "Rebuilt the pipeline".to_string(),
            "Dashboards were built for sales".to_string(),
        ];
        assert!((passive_rate(&bullets) - 50.0).abs() < 1e-9);
        assert_eq!(passive_rate(&[]), 0.0);
    }
}
