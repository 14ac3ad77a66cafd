//! Experience: years alignment (P6.1), career recency (P6.2) and depth (P6.3).

use super::bands::at_most;
use super::{ParameterOutcome, ScoringInput};
use crate::errors::ScoringError;
use crate::models::{Diagnostics, Level};
use crate::text::dates::{months_between, parse_entry_range, total_experience_years};
use crate::text::entry_bullets;

/// Expected years of experience; `None` upper bound is open-ended.
fn years_range(level: Level) -> (f64, Option<f64>) {
    match level {
        Level::Beginner => (0.0, Some(2.0)),
        Level::Intermediary => (3.0, Some(6.0)),
        Level::Senior => (7.0, None),
    }
}

fn min_bullets(level: Level) -> f64 {
    match level {
        Level::Beginner => 2.0,
        Level::Intermediary => 3.0,
        Level::Senior => 4.0,
    }
}

pub fn years_alignment(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let experience = &input.resume.experience;
    let years = if experience.is_empty() {
        Some(0.0)
    } else {
        total_experience_years(experience, input.today)
    };
    let Some(years) = years else {
        return Ok(ParameterOutcome::new(
            2.0,
            "Experience dates could not be read",
            Diagnostics::measurements([("entries", experience.len() as f64)]),
        ));
    };

    let (low, high) = years_range(input.level());
    let distance = if years < low {
        low - years
    } else {
        // Overshooting the range is less of a problem than falling short.
        high.map_or(0.0, |h| (years - h).max(0.0) / 2.0)
    };
    let score = (4.0 - distance).max(0.0);
    let expected = match high {
        Some(h) => format!("{low}–{h}"),
        None => format!("{low}+"),
    };

    Ok(ParameterOutcome::new(
        score,
        format!(
            "{years:.1} years of experience; {} expects {expected}",
            input.level()
        ),
        Diagnostics::measurements([("years", years), ("range_low", low)]),
    ))
}

pub fn career_recency(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let latest_end = input
        .resume
        .experience
        .iter()
        .filter_map(|e| parse_entry_range(e).interval(input.today))
        .map(|(_, end)| end)
        .max();

    let Some(end) = latest_end else {
        let score = if input.level() == Level::Beginner { 3.0 } else { 0.0 };
        return Ok(ParameterOutcome::new(
            score,
            "No datable experience",
            Diagnostics::measurements(Vec::<(String, f64)>::new()),
        ));
    };

    let gap = months_between(end, input.today).max(0);
    let score = at_most(f64::from(gap), &[(6.0, 3.0), (12.0, 2.0), (24.0, 1.0)], 0.0);
    let message = if gap == 0 {
        "Currently employed".to_string()
    } else {
        format!("{gap} month(s) since the latest position ended")
    };
    Ok(ParameterOutcome::new(
        score,
        message,
        Diagnostics::measurements([("months_since_latest", f64::from(gap))]),
    ))
}

pub fn experience_depth(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let entries = &input.resume.experience;
    if entries.is_empty() {
        return Ok(ParameterOutcome::new(
            0.0,
            "No experience entries",
            Diagnostics::measurements(Vec::<(String, f64)>::new()),
        ));
    }

    let count = entries.len() as f64;
    let complete = entries.iter().filter(|e| e.is_complete()).count() as f64;
    let bullets: usize = entries.iter().map(|e| entry_bullets(e).len()).sum();
    let complete_pct = complete / count * 100.0;
    let average_bullets = bullets as f64 / count;
    let minimum = min_bullets(input.level());

    let complete_ok = complete_pct >= 80.0;
    let bullets_ok = average_bullets >= minimum;
    let score = match (complete_ok, bullets_ok) {
        (true, true) => 3.0,
        (true, false) | (false, true) => 2.0,
        (false, false) => 1.0,
    };

    Ok(ParameterOutcome::new(
        score,
        format!(
            "{complete_pct:.0}% of entries complete; {average_bullets:.1} bullets per entry (minimum {minimum})"
        ),
        Diagnostics::measurements([
            ("complete_pct", complete_pct),
            ("average_bullets", average_bullets),
            ("minimum_bullets", minimum),
        ]),
    ))
}
