//! Format: word count (P3.1), page count (P3.2), ATS friendliness (P3.3), section
//! completeness (P3.4) and date consistency (P3.5, penalty only).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ParameterOutcome, ScoringInput};
use crate::errors::ScoringError;
use crate::models::{Diagnostics, Level, ResumeDocument};
use crate::text::dates::{parse_date, parse_entry_range, DateParse};
use crate::text::word_count as count_words;

/// File formats applicant-tracking systems parse reliably. An unknown (blank) format
/// is not penalised.
const ATS_FORMATS: &[&str] = &["pdf", "docx", "doc", "txt", "rtf"];

/// Decorative glyphs, emoji, box-drawing characters and pipe-delimited table rows.
static DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[★☆✦✧✩✪✯❖◆◇♦❤♥☛☞➤➔➜✈✿❀☑☒]|[\x{1F300}-\x{1FAFF}]|[│┃┆┇║═─━┌┐└┘├┤┬┴┼╔╗╚╝]|\|[^|\n]*\||\t\t",
    )
    .expect("valid decoration regex")
});

fn word_range(level: Level) -> (f64, f64) {
    match level {
        Level::Beginner => (300.0, 600.0),
        Level::Intermediary => (400.0, 800.0),
        Level::Senior => (500.0, 1000.0),
    }
}

pub fn word_count(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let reported = input.resume.metadata.word_count;
    let words = if reported > 0 {
        f64::from(reported)
    } else {
        count_words(&input.full_text) as f64
    };
    let (low, high) = word_range(input.level());

    let deviation = if words < low {
        (low - words) / low
    } else if words > high {
        (words - high) / high
    } else {
        0.0
    };
    let score = match deviation {
        d if d <= 0.0 => 3.0,
        d if d <= 0.25 => 2.0,
        d if d <= 0.5 => 1.0,
        _ => 0.0,
    };

    Ok(ParameterOutcome::new(
        score,
        format!(
            "{} words; {} range is {}–{}",
            words, input.level(), low, high
        ),
        Diagnostics::measurements([
            ("words", words),
            ("range_low", low),
            ("range_high", high),
            ("deviation_pct", deviation * 100.0),
        ]),
    ))
}

pub fn page_count(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let pages = input.resume.metadata.page_count;
    let ideal: u32 = if input.level() == Level::Beginner { 1 } else { 2 };

    if pages == 0 {
        return Ok(ParameterOutcome::new(
            2.0,
            "Page count unknown; no penalty",
            Diagnostics::measurements([("ideal_max_pages", f64::from(ideal))]),
        ));
    }

    let score = if pages <= ideal {
        2.0
    } else if pages == ideal + 1 {
        1.0
    } else {
        0.0
    };
    Ok(ParameterOutcome::new(
        score,
        format!("{pages} page(s); ideal is at most {ideal}"),
        Diagnostics::measurements([
            ("pages", f64::from(pages)),
            ("ideal_max_pages", f64::from(ideal)),
        ]),
    ))
}

pub fn has_decoration(resume: &ResumeDocument) -> bool {
    resume.experience.iter().any(|entry| {
        DECORATION.is_match(&entry.description) || entry.achievements.iter().any(|a| DECORATION.is_match(a))
    })
}

pub fn ats_formatting(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let resume = input.resume;
    let format = resume.metadata.file_format.trim().trim_start_matches('.').to_lowercase();

    let mut issues: Vec<&str> = Vec::new();
    if !format.is_empty() && !ATS_FORMATS.contains(&format.as_str()) {
        issues.push("file format is not reliably parsed by ATS");
    }
    if resume.metadata.has_photo {
        issues.push("photo included");
    }
    if has_decoration(resume) {
        issues.push("decorative glyphs or tables in bullets");
    }
    if resume.contact.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
        issues.push("no email address");
    }

    let score = (3.0 - issues.len() as f64).max(0.0);
    let message = if issues.is_empty() {
        "ATS friendly".to_string()
    } else {
        format!("ATS issues: {}", issues.join("; "))
    };
    Ok(ParameterOutcome::new(
        score,
        message,
        Diagnostics::measurements([("issues", issues.len() as f64)]),
    ))
}

pub fn section_completeness(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let resume = input.resume;
    let has_experience = resume.experience.iter().any(|e| {
        !e.title.trim().is_empty() || !e.company.trim().is_empty() || !e.description.trim().is_empty() || !e.achievements.is_empty()
    });
    let has_education = resume.education.iter().any(|e| {
        !e.institution.trim().is_empty() || !e.degree.trim().is_empty()
    });
    let has_skills = resume.skills.iter().any(|s| !s.trim().is_empty());

    let present = [has_experience, has_education, has_skills].iter().filter(|p| **p).count();
    let score = if present == 3 || (input.level() == Level::Beginner && has_education && has_skills) {
        2.0
    } else if present == 2 {
        1.0
    } else {
        0.0
    };

    let mut missing = Vec::new();
    for (present, name) in [(has_experience, "experience"), (has_education, "education"), (has_skills, "skills")] {
        if !present {
            missing.push(name);
        }
    }
    let message = if missing.is_empty() {
        "Experience, education and skills sections present".to_string()
    } else {
        format!("Missing section(s): {}", missing.join(", "))
    };

    Ok(ParameterOutcome::new(
        score,
        message,
        Diagnostics::measurements([("sections_present", present as f64)]),
    ))
}

pub fn date_formatting(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let resume = input.resume;
    let ranges: Vec<_> = resume.experience.iter().map(parse_entry_range).collect();

    let mut parses: Vec<DateParse> = ranges.iter().flat_map(|r| [r.start, r.end]).collect();
    parses.extend(resume.education.iter().map(|e| parse_date(&e.graduation_date)));
    parses.extend(resume.certifications.iter().map(|c| parse_date(&c.date)));

    let invalid = parses.iter().filter(|p| p.is_invalid()).count();
    let reversed = ranges.iter().filter(|r| r.is_reversed()).count();
    // Mixed styles only count within the work history.
    let families: BTreeSet<&str> = ranges
        .iter()
        .flat_map(|r| [r.start, r.end])
        .filter_map(|p| p.format())
        .map(|f| f.family())
        .collect();

    let diagnostics = Diagnostics::measurements([
        ("invalid_dates", invalid as f64),
        ("reversed_ranges", reversed as f64),
        ("format_families", families.len() as f64),
    ]);

    let (score, message) = if invalid > 0 || reversed > 0 {
        (-2.0, format!("{invalid} unreadable date(s), {reversed} reversed range(s)"))
    } else if families.len() > 1 {
        let listed: Vec<&str> = families.into_iter().collect();
        (-1.0, format!("Mixed date styles: {}", listed.join(", ")))
    } else {
        (0.0, "Dates are consistent".to_string())
    };
    Ok(ParameterOutcome::new(score, message, diagnostics))
}
