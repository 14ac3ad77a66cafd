//! Professional standards (P5.1) and contact information (P5.2).

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ParameterOutcome, ScoringInput};
use crate::errors::ScoringError;
use crate::models::{Contact, Diagnostics};

/// Substrings that make an email address look unprofessional. Checked on the local part.
const UNPROFESSIONAL_EMAIL_TERMS: &[&str] = &[
    "sexy", "hottie", "cutie", "babe", "princess", "gamer", "xxx", "lover", "killer",
    "partyanimal", "swag", "lol", "crazy", "devil", "stud", "foxy", "420", "badboy", "badgirl",
];

static FIRST_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bI\b|(?i:\b(?:me|my|mine|myself)\b)").expect("valid first person regex")
});

static INFORMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:gonna|wanna|gotta|kinda|sorta|stuff|awesome|cool|super|basically|yeah|ok|okay|guys|a lot of|lots of|tons of|etc)\b",
    )
    .expect("valid informal regex")
});

/// First-person pronouns in one line. A standalone `I` directly after a capitalised word
/// is read as a Roman numeral (`Phase I`, `Tier I support`).
fn first_person_count(line: &str) -> usize {
    FIRST_PERSON
        .find_iter(line)
        .filter(|m| m.as_str() != "I" || !follows_capitalised_word(&line[..m.start()]))
        .count()
}

fn follows_capitalised_word(before: &str) -> bool {
    let before = before.strip_suffix(' ').unwrap_or(before);
    let word_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric())
        .last()
        .map(|(i, _)| i);
    word_start
        .and_then(|i| before[i..].chars().next())
        .is_some_and(char::is_uppercase)
}

pub fn unprofessional_email(email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default().to_lowercase();
    UNPROFESSIONAL_EMAIL_TERMS.iter().any(|term| local.contains(term))
}

pub fn professional_standards(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let mut prose: Vec<&str> = input.bullets.iter().map(String::as_str).collect();
    if let Some(summary) = input.resume.summary.as_deref() {
        prose.push(summary);
    }

    let email_flag = input
        .resume
        .contact
        .email
        .as_deref()
        .is_some_and(unprofessional_email);
    let pronouns: usize = prose.iter().map(|l| first_person_count(l)).sum();
    let informal: usize = prose.iter().map(|l| INFORMAL.find_iter(l).count()).sum();

    let mut issues = Vec::new();
    if email_flag {
        issues.push("unprofessional email address");
    }
    if pronouns > 0 {
        issues.push("first-person pronouns");
    }
    if informal > 0 {
        issues.push("informal language");
    }

    let score = 3.0 - issues.len() as f64;
    let message = if issues.is_empty() {
        "Professional tone throughout".to_string()
    } else {
        format!("Issues: {}", issues.join(", "))
    };
    Ok(ParameterOutcome::new(
        score,
        message,
        Diagnostics::measurements([
            ("unprofessional_email", if email_flag { 1.0 } else { 0.0 }),
            ("first_person_pronouns", pronouns as f64),
            ("informal_terms", informal as f64),
        ]),
    ))
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub fn contact_information(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let Contact {
        name,
        email,
        phone,
        location,
        linkedin,
    } = &input.resume.contact;

    let checks = [
        ("name", filled(name)),
        ("email", filled(email)),
        ("phone", filled(phone)),
        ("location or LinkedIn", filled(location) || filled(linkedin)),
    ];
    let present = checks.iter().filter(|(_, ok)| *ok).count();
    let missing: Vec<&str> = checks.iter().filter(|(_, ok)| !*ok).map(|(n, _)| *n).collect();

    let message = if missing.is_empty() {
        "Complete contact details".to_string()
    } else {
        format!("Missing: {}", missing.join(", "))
    };
    Ok(ParameterOutcome::new(
        present as f64 * 0.5,
        message,
        Diagnostics::measurements([("fields_present", present as f64)]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, ResumeDocument};
    use crate::scoring::testing::{context, input, resume_with_bullets};

    #[test]
    fn test_unprofessional_email_checks_local_part_only() {
        assert!(unprofessional_email("sexygamer99@example.com"));
        assert!(!unprofessional_email("ada.lovelace@hotmail.com"));
        assert!(!unprofessional_email(""));
    }

    #[test]
    fn test_professional_standards_deductions() {
        let ctx = context(Level::Intermediary);
        let mut resume = resume_with_bullets(&["I built lots of cool stuff", "Led the launch"]);
        resume.contact.email = Some("partyanimal@example.com".into());
        let outcome = professional_standards(&input(&resume, &ctx)).expect("scores");
        assert_eq!(outcome.score, 0.0, "{}", outcome.message);

        let clean = resume_with_bullets(&["Led the launch of the iOS app"]);
        assert_eq!(professional_standards(&input(&clean, &ctx)).expect("scores").score, 3.0);
    }

    #[test]
    fn test_pronoun_detection_ignores_roman_numerals_and_words() {
        assert_eq!(first_person_count("Shipped Phase II of the migration"), 0);
        assert_eq!(first_person_count("Improved memory usage"), 0);
        assert_eq!(first_person_count("My team and I"), 2);
    }

    #[test]
    fn test_roman_numeral_after_capitalised_word_is_not_a_pronoun() {
        assert_eq!(first_person_count("Led Phase I rollout across three regions"), 0);
        assert_eq!(first_person_count("Provided Tier I support"), 0);
        assert_eq!(first_person_count("Shipped the rollout. I then led Phase I"), 1);
        assert_eq!(first_person_count("I led the rollout"), 1);
    }

    #[test]
    fn test_contact_information_half_points() {
        let ctx = context(Level::Beginner);
        let mut resume = ResumeDocument::default();
        assert_eq!(contact_information(&input(&resume, &ctx)).expect("scores").score, 0.0);

        resume.contact = Contact {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            phone: Some("   ".into()),
            location: None,
            linkedin: Some("linkedin.com/in/ada".into()),
        };
        let outcome = contact_information(&input(&resume, &ctx)).expect("scores");
        assert_eq!(outcome.score, 1.5);
        assert_eq!(outcome.message, "Missing: phone");
    }
}
