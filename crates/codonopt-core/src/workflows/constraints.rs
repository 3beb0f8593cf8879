//! Turns design settings into engine constraints.

use crate::core::genetic_code::STOP_SYMBOL;
use crate::core::models::sequence::Codon;
use crate::core::patterns::{Pattern, PatternError};
use crate::engine::config::RELAXED_SD_SPACER;
use crate::engine::constraint::Constraint;

/// Longest match of the positional SD pattern: a 4-base motif, the widest spacer and a
/// 3-base start codon.
const POSITIONAL_SD_MAX_LENGTH: usize = 4 + RELAXED_SD_SPACER.1 + 3;

/// Pins `stop_codon` at every `*` of `protein`.
pub fn build_stop_constraints(protein: &str, stop_codon: Codon) -> Vec<Constraint> {
    protein
        .chars()
        .enumerate()
        .filter(|&(_, symbol)| symbol == STOP_SYMBOL)
        .map(|(i, _)| Constraint::pin_codon(i, stop_codon))
        .collect()
}

/// One `AvoidPattern` per pattern spec (`"BsaI_site"`, `"7xC"`, `"AAAAAA"`, ...).
pub fn build_avoid_constraints<S: AsRef<str>>(
    patterns: &[S],
) -> Result<Vec<Constraint>, PatternError> {
    patterns
        .iter()
        .map(|spec| Pattern::parse(spec.as_ref()).map(Constraint::AvoidPattern))
        .collect()
}

/// One forward-strand `AvoidPattern` per SD motif.
pub fn build_sd_constraints<S: AsRef<str>>(motifs: &[S]) -> Result<Vec<Constraint>, PatternError> {
    motifs
        .iter()
        .map(|motif| {
            let motif = motif.as_ref();
            match Pattern::parse(motif)? {
                literal @ Pattern::Literal {
                    both_strands: false,
                    ..
                } => Ok(Constraint::AvoidPattern(literal)),
                _ => Err(PatternError::Unrecognized(motif.to_string())),
            }
        })
        .collect()
}

/// Bans `AGGA` followed by a 4-13 base spacer and an `ATG` or `GTG` start.
pub fn build_positional_sd_constraint() -> Result<Constraint, PatternError> {
    let (min, max) = RELAXED_SD_SPACER;
    let expression = format!("AGGA[ACGT]{{{min},{max}}}(ATG|GTG)");
    Pattern::regex(&expression, &expression, POSITIONAL_SD_MAX_LENGTH).map(Constraint::AvoidPattern)
}

/// GC bounds over `window`-long stretches, or over the whole sequence without a window.
pub fn build_gc_constraints(min: f64, max: f64, window: Option<usize>) -> Vec<Constraint> {
    vec![Constraint::EnforceGcContent { min, max, window }]
}

pub fn build_translation_constraint(protein: &str, stop_codon: Codon) -> Constraint {
    Constraint::translation(protein, stop_codon)
}
