//! Bullet structure (P7.1): bullets of 8–30 words read best.

use super::bands::{at_least, percent};
use super::{ParameterOutcome, ScoringInput};
use crate::errors::ScoringError;
use crate::models::Diagnostics;
use crate::text::word_count;

const MIN_WORDS: usize = 8;
const MAX_WORDS: usize = 30;

pub fn bullet_structure(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let total = input.bullets.len();
    if total == 0 {
        return Ok(ParameterOutcome::new(
            0.0,
            "No bullets to evaluate",
            Diagnostics::measurements(Vec::<(String, f64)>::new()),
        ));
    }

    let lengths: Vec<usize> = input.bullets.iter().map(|b| word_count(b)).collect();
    let well_sized = lengths
        .iter()
        .filter(|n| (MIN_WORDS..=MAX_WORDS).contains(*n))
        .count();
    let too_short = lengths.iter().filter(|n| **n < MIN_WORDS).count();
    let share = percent(well_sized, total);
    let score = at_least(share, &[(80.0, 3.0), (60.0, 2.0), (40.0, 1.0)], 0.0);

    Ok(ParameterOutcome::new(
        score,
        format!("{share:.0}% of bullets are {MIN_WORDS}–{MAX_WORDS} words"),
        Diagnostics::measurements([
            ("well_sized_pct", share),
            ("too_short", too_short as f64),
            ("too_long", (total - well_sized - too_short) as f64),
        ]),
    ))
}
