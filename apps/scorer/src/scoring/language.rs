//! Language: grammar and mechanics (P4.1), readability (P4.2), passive voice (P4.3,
//! penalty only).

use once_cell::sync::Lazy;
use regex::Regex;

use super::bands::at_most;
use super::{ParameterOutcome, ScoringInput};
use crate::classifiers::passive_voice::passive_rate;
use crate::errors::ScoringError;
use crate::models::Diagnostics;
use crate::text::readability;

static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S {2,}\S").expect("valid double space regex"));
/// `word,word` or `word.Word`; leaves `node.js`, `e.g.` and decimals alone.
static MISSING_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z]{2}[,;][A-Za-z]|[a-z]{2}\.[A-Z][a-z]").expect("valid missing space regex")
});

const COMMON_MISSPELLINGS: &[&str] = &[
    "acheive", "acheived", "accomodate", "adress", "begining", "buisness", "calender",
    "collegue", "comittee", "commited", "definately", "developement", "enviroment",
    "experiance", "goverment", "independant", "knowlege", "liase", "maintainance",
    "managment", "occured", "occurence", "perfomance", "proffesional", "recieve",
    "recieved", "refered", "responsable", "seperate", "succesful", "sucessful",
    "succesfully", "sucessfully", "supervisior", "tommorow", "untill", "wich",
];

/// Prose checked for mechanics: the summary plus every bullet.
fn prose(input: &ScoringInput<'_>) -> Vec<String> {
    let mut lines: Vec<String> = input
        .resume
        .summary
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    lines.extend(input.bullets.iter().cloned());
    lines
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GrammarIssues {
    pub lowercase_starts: usize,
    pub repeated_words: usize,
    pub double_spaces: usize,
    pub missing_spaces: usize,
    pub inconsistent_periods: usize,
    pub misspellings: usize,
}

impl GrammarIssues {
    pub fn total(&self) -> usize {
        self.lowercase_starts
            + self.repeated_words
            + self.double_spaces
            + self.missing_spaces
            + self.inconsistent_periods
            + self.misspellings
    }
}

fn repeated_words(line: &str) -> usize {
    let words: Vec<String> = line
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    words
        .windows(2)
        .filter(|pair| pair[0] == pair[1] && pair[0].chars().any(char::is_alphabetic))
        .count()
}

pub fn grammar_issues(bullets: &[String], lines: &[String]) -> GrammarIssues {
    let lowercase_starts = bullets
        .iter()
        .filter(|b| b.chars().find(|c| c.is_alphabetic()).is_some_and(char::is_lowercase))
        .count();

    let ended = bullets.iter().filter(|b| b.trim_end().ends_with('.')).count();
    let inconsistent_periods = usize::from(ended > 0 && ended < bullets.len());

    let mut issues = GrammarIssues {
        lowercase_starts,
        inconsistent_periods,
        ..GrammarIssues::default()
    };
    for line in lines {
        issues.repeated_words += repeated_words(line);
        issues.double_spaces += DOUBLE_SPACE.find_iter(line).count();
        issues.missing_spaces += MISSING_SPACE.find_iter(line).count();
        issues.misspellings += line
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty() && COMMON_MISSPELLINGS.contains(&w.to_lowercase().as_str()))
            .count();
    }
    issues
}

pub fn grammar(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let issues = grammar_issues(&input.bullets, &prose(input));
    let total = issues.total();
    let score = at_most(total as f64, &[(0.0, 4.0), (2.0, 3.0), (5.0, 2.0), (9.0, 1.0)], 0.0);

    Ok(ParameterOutcome::new(
        score,
        if total == 0 {
            "No mechanical issues found".to_string()
        } else {
            format!("{total} mechanical issue(s)")
        },
        Diagnostics::measurements([
            ("lowercase_starts", issues.lowercase_starts as f64),
            ("repeated_words", issues.repeated_words as f64),
            ("double_spaces", issues.double_spaces as f64),
            ("missing_spaces", issues.missing_spaces as f64),
            ("inconsistent_periods", issues.inconsistent_periods as f64),
            ("misspellings", issues.misspellings as f64),
        ]),
    ))
}

/// Band score for a Flesch reading-ease value: 30–60 is the professional sweet spot.
pub fn readability_band(ease: f64) -> f64 {
    match ease {
        e if (30.0..=60.0).contains(&e) => 3.0,
        e if (20.0..30.0).contains(&e) || (60.0..70.0).contains(&e) => 2.0,
        e if (10.0..20.0).contains(&e) || (70.0..80.0).contains(&e) => 1.0,
        _ => 0.0,
    }
}

pub fn readability(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let text = prose(input).join("\n");
    let Some(stats) = readability::analyze(&text) else {
        return Ok(ParameterOutcome::new(
            3.0,
            "No prose to assess; no penalty",
            Diagnostics::measurements([("words", 0.0)]),
        ));
    };

    Ok(ParameterOutcome::new(
        readability_band(stats.flesch_reading_ease),
        format!("Flesch reading ease {:.1}", stats.flesch_reading_ease),
        Diagnostics::measurements([
            ("flesch_reading_ease", stats.flesch_reading_ease),
            ("sentences", stats.sentences as f64),
            ("words", stats.words as f64),
            ("syllables", stats.syllables as f64),
        ]),
    ))
}

/// 0 up to 10% passive bullets, then −1 per started 10 points, −5 from 50%.
pub fn passive_penalty(rate: f64) -> f64 {
    if rate <= 10.0 {
        0.0
    } else {
        -(rate / 10.0).floor().min(5.0)
    }
}

pub fn passive_voice(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let rate = passive_rate(&input.bullets);
    Ok(ParameterOutcome::new(
        passive_penalty(rate),
        format!("{rate:.0}% of bullets use passive voice"),
        Diagnostics::measurements([("passive_rate", rate)]),
    ))
}
