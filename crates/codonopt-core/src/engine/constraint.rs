use super::error::EngineError;
use super::mutation::MutationSpace;
use crate::core::codon_usage::CodonUsageTable;
use crate::core::genetic_code::{self, STOP_SYMBOL};
use crate::core::models::sequence::{Codon, Location};
use crate::core::patterns::Pattern;
use crate::core::translation::TranslationError;
use std::fmt;

/// Outcome of checking one constraint: an integer cost that is zero exactly when the
/// constraint holds, plus the locations that breach it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub cost: u64,
    pub breaches: Vec<Location>,
}

impl Evaluation {
    #[inline]
    pub fn passes(&self) -> bool {
        self.cost == 0
    }

    fn breach(&mut self, cost: u64, location: Location) {
        self.cost += cost;
        self.breaches.push(location);
    }
}

/// A hard requirement on the designed sequence.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Bases at `location` must equal `sequence`.
    EnforceSequence { location: Location, sequence: Vec<u8> },
    AvoidPattern(Pattern),
    /// GC fraction bounds, inclusive, over every `window`-long stretch or, without a window,
    /// over the whole sequence.
    EnforceGcContent {
        min: f64,
        max: f64,
        window: Option<usize>,
    },
    /// The sequence must translate to `protein`, with `*` read only from `stop_codon`.
    EnforceTranslation { protein: Vec<char>, stop_codon: Codon },
    /// Sense codons below `min_frequency` in `table` are forbidden.
    AvoidRareCodons {
        table: CodonUsageTable,
        min_frequency: f64,
    },
}

impl Constraint {
    pub fn translation(protein: &str, stop_codon: Codon) -> Self {
        Constraint::EnforceTranslation {
            protein: protein.chars().collect(),
            stop_codon,
        }
    }

    pub fn pin_codon(codon_index: usize, codon: Codon) -> Self {
        Constraint::EnforceSequence {
            location: Location::new(codon_index * 3, codon_index * 3 + 3),
            sequence: codon.as_bytes().to_vec(),
        }
    }

    pub fn evaluate(&self, seq: &[u8]) -> Evaluation {
        match self {
            Constraint::EnforceSequence { location, sequence } => {
                let mismatches = count_mismatches(seq, *location, sequence);
                let mut eval = Evaluation::default();
                if mismatches > 0 {
                    eval.breach(mismatches, *location);
                }
                eval
            }
            Constraint::AvoidPattern(pattern) => {
                let breaches = pattern.find_all(seq);
                Evaluation {
                    cost: breaches.len() as u64,
                    breaches,
                }
            }
            Constraint::EnforceGcContent { min, max, window } => {
                let w = window.unwrap_or(seq.len()).min(seq.len());
                gc_windows(seq, 0, w, *min, *max)
            }
            Constraint::EnforceTranslation { .. } | Constraint::AvoidRareCodons { .. } => {
                let mut eval = Evaluation::default();
                for index in 0..seq.len() / 3 {
                    if self.codon_breached(seq, index) {
                        eval.breach(1, Location::new(index * 3, index * 3 + 3));
                    }
                }
                if let Constraint::EnforceTranslation { protein, .. } = self {
                    let missing = (seq.len() / 3).abs_diff(protein.len());
                    if missing > 0 || seq.len() % 3 != 0 {
                        eval.breach(missing.max(1) as u64, Location::new(0, seq.len()));
                    }
                }
                eval
            }
        }
    }

    /// Cost of the breaches that involve at least one base of `region`, plus any breaches
    /// whose cost is independent of the bases in `region`. Comparing this number across
    /// assignments of `region` ranks them exactly as the full cost would.
    pub fn local_cost(&self, seq: &[u8], region: Location) -> u64 {
        let n = seq.len();
        match self {
            Constraint::EnforceSequence { location, sequence } => {
                if location.overlaps(&region) {
                    count_mismatches(seq, *location, sequence)
                } else {
                    0
                }
            }
            Constraint::AvoidPattern(pattern) => {
                let radius = pattern.max_length().saturating_sub(1);
                let ctx = region.expand(radius, n);
                pattern.find_all(&seq[ctx.start..ctx.end]).len() as u64
            }
            Constraint::EnforceGcContent {
                min,
                max,
                window: Some(window),
            } => {
                let w = (*window).min(n);
                if w == 0 {
                    return 0;
                }
                let ctx = region.expand(w - 1, n);
                gc_windows(&seq[ctx.start..ctx.end], ctx.start, w, *min, *max).cost
            }
            Constraint::EnforceGcContent { window: None, .. } => self.evaluate(seq).cost,
            Constraint::EnforceTranslation { .. } | Constraint::AvoidRareCodons { .. } => region
                .codon_span()
                .take_while(|&i| i < n / 3)
                .filter(|&i| self.codon_breached(seq, i))
                .count() as u64,
        }
    }

    fn codon_breached(&self, seq: &[u8], index: usize) -> bool {
        let Ok(codon) = Codon::from_bytes(&seq[index * 3..index * 3 + 3]) else {
            return true;
        };
        match self {
            Constraint::EnforceTranslation {
                protein,
                stop_codon,
            } => match protein.get(index) {
                Some(&expected) => genetic_code::amino_acid(codon, *stop_codon) != expected,
                None => false,
            },
            Constraint::AvoidRareCodons {
                table,
                min_frequency,
            } => is_rare(table, *min_frequency, codon),
            _ => false,
        }
    }

    /// Removes from `space` the codons this constraint forbids outright. Constraints that
    /// depend on neighbouring codons leave the space untouched.
    pub fn restrict(&self, space: &mut MutationSpace) -> Result<(), EngineError> {
        let label = self.to_string();
        match self {
            Constraint::EnforceSequence { location, sequence } => {
                let len = space.len();
                for index in location.codon_span().take_while(|&i| i < len) {
                    space.restrict(index, &label, |codon| {
                        (0..3).all(|offset| {
                            let position = index * 3 + offset;
                            if position < location.start || position >= location.end {
                                return true;
                            }
                            sequence.get(position - location.start)
                                == Some(&codon.as_bytes()[offset])
                        })
                    })?;
                }
            }
            Constraint::EnforceTranslation {
                protein,
                stop_codon,
            } => {
                for (position, &symbol) in protein.iter().enumerate().take(space.len()) {
                    if symbol != STOP_SYMBOL && !genetic_code::is_amino_acid(symbol) {
                        return Err(TranslationError::UnknownAminoAcid { symbol, position }.into());
                    }
                    space.restrict(position, &label, |codon| {
                        genetic_code::amino_acid(codon, *stop_codon) == symbol
                    })?;
                }
            }
            Constraint::AvoidRareCodons {
                table,
                min_frequency,
            } => {
                for index in 0..space.len() {
                    space.restrict(index, &label, |codon| {
                        !is_rare(table, *min_frequency, codon)
                    })?;
                }
            }
            Constraint::AvoidPattern(_) | Constraint::EnforceGcContent { .. } => {}
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::EnforceSequence { location, sequence } => write!(
                f,
                "EnforceSequence[{}]({})",
                location,
                String::from_utf8_lossy(sequence)
            ),
            Constraint::AvoidPattern(pattern) => write!(f, "AvoidPattern[{pattern}]"),
            Constraint::EnforceGcContent { min, max, window } => match window {
                Some(w) => write!(f, "EnforceGCContent[{min:.2}-{max:.2}, window {w}]"),
                None => write!(f, "EnforceGCContent[{min:.2}-{max:.2}, global]"),
            },
            Constraint::EnforceTranslation { stop_codon, .. } => {
                write!(f, "EnforceTranslation[stop {stop_codon}]")
            }
            Constraint::AvoidRareCodons {
                table,
                min_frequency,
            } => write!(f, "AvoidRareCodons[{}, min {:.2}]", table.name, min_frequency),
        }
    }
}

#[inline]
fn is_rare(table: &CodonUsageTable, min_frequency: f64, codon: Codon) -> bool {
    genetic_code::standard_amino_acid(codon) != STOP_SYMBOL
        && table.relative_frequency(codon) < min_frequency
}

fn count_mismatches(seq: &[u8], location: Location, expected: &[u8]) -> u64 {
    (location.start..location.end)
        .zip(expected)
        .filter(|&(position, base)| seq.get(position) != Some(base))
        .count() as u64
}

/// Inclusive integer GC-count bounds for a window of `w` bases.
fn gc_bounds(min: f64, max: f64, w: usize) -> (usize, usize) {
    let w = w as f64;
    let lo = (min * w - 1e-9).ceil().max(0.0) as usize;
    let hi = (max * w + 1e-9).floor().max(0.0) as usize;
    (lo, hi)
}

/// Scores every `w`-long window of `seq`; `offset` shifts the reported locations back into
/// full-sequence coordinates.
fn gc_windows(seq: &[u8], offset: usize, w: usize, min: f64, max: f64) -> Evaluation {
    let mut eval = Evaluation::default();
    if w == 0 || seq.len() < w {
        return eval;
    }
    let (lo, hi) = gc_bounds(min, max, w);
    let mut prefix = Vec::with_capacity(seq.len() + 1);
    prefix.push(0usize);
    for &base in seq {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + usize::from(base == b'G' || base == b'C'));
    }
    for start in 0..=seq.len() - w {
        let gc = prefix[start + w] - prefix[start];
        let excess = if gc > hi {
            gc - hi
        } else {
            lo.saturating_sub(gc)
        };
        if excess > 0 {
            eval.breach(
                excess as u64,
                Location::new(offset + start, offset + start + w),
            );
        }
    }
    eval
}
