use crate::core::codon_usage::CodonUsageTable;
use crate::core::genetic_code::{self, STOP_SYMBOL};
use crate::core::models::sequence::{Codon, Location, reverse_complement};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodonOptimizationMethod {
    /// Push every codon towards the most frequent synonym of the host.
    UseBestCodon,
    /// Make the codon distribution of each amino acid follow the host's relative frequencies.
    MatchCodonUsage,
}

impl fmt::Display for CodonOptimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodonOptimizationMethod::UseBestCodon => f.write_str("use_best_codon"),
            CodonOptimizationMethod::MatchCodonUsage => f.write_str("match_codon_usage"),
        }
    }
}

/// A soft goal. Scores are never positive and higher is better.
#[derive(Debug, Clone)]
pub enum Objective {
    CodonOptimize {
        table: CodonUsageTable,
        method: CodonOptimizationMethod,
    },
    /// Penalizes stems of `stem_size` bases whose reverse complement appears downstream
    /// within `hairpin_window` bases.
    AvoidHairpins {
        stem_size: usize,
        hairpin_window: usize,
    },
}

impl Objective {
    pub fn score(&self, seq: &[u8]) -> f64 {
        self.local_score(seq, Location::new(0, seq.len()))
    }

    /// Part of the score that can change when bases inside `region` change. Differences of
    /// local scores between two assignments of `region` equal differences of full scores.
    pub fn local_score(&self, seq: &[u8], region: Location) -> f64 {
        match self {
            Objective::CodonOptimize {
                table,
                method: CodonOptimizationMethod::UseBestCodon,
            } => region
                .codon_span()
                .filter_map(|i| seq.get(i * 3..i * 3 + 3))
                .filter_map(|chunk| Codon::from_bytes(chunk).ok())
                .map(|codon| best_codon_penalty(table, codon))
                .sum(),
            Objective::CodonOptimize {
                table,
                method: CodonOptimizationMethod::MatchCodonUsage,
            } => usage_mismatch(table, seq),
            Objective::AvoidHairpins {
                stem_size,
                hairpin_window,
            } => {
                let first = region.start.saturating_sub(*hairpin_window);
                -(count_hairpins(seq, *stem_size, *hairpin_window, first, region.end) as f64)
            }
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::CodonOptimize { table, method } => {
                write!(f, "CodonOptimize[{}, {}]", table.name, method)
            }
            Objective::AvoidHairpins {
                stem_size,
                hairpin_window,
            } => write!(f, "AvoidHairpins[stem {stem_size}, window {hairpin_window}]"),
        }
    }
}

fn best_codon_penalty(table: &CodonUsageTable, codon: Codon) -> f64 {
    let aa = genetic_code::standard_amino_acid(codon);
    if aa == STOP_SYMBOL {
        return 0.0;
    }
    let best = table.max_frequency(aa);
    if best <= 0.0 {
        return 0.0;
    }
    table.relative_frequency(codon) / best - 1.0
}

/// Negative sum, over amino acids and their codons, of the gap between observed codon counts
/// and the counts the host's frequencies predict.
fn usage_mismatch(table: &CodonUsageTable, seq: &[u8]) -> f64 {
    let mut counts: HashMap<Codon, usize> = HashMap::new();
    let mut totals: HashMap<char, usize> = HashMap::new();
    for codon in seq
        .chunks_exact(3)
        .filter_map(|chunk| Codon::from_bytes(chunk).ok())
    {
        let aa = genetic_code::standard_amino_acid(codon);
        if aa == STOP_SYMBOL {
            continue;
        }
        *counts.entry(codon).or_default() += 1;
        *totals.entry(aa).or_default() += 1;
    }
    let mut gap = 0.0;
    for aa in genetic_code::AMINO_ACIDS.chars() {
        let Some(&total) = totals.get(&aa) else {
            continue;
        };
        for &(codon, frequency) in table.codons_for(aa) {
            let observed = counts.get(&codon).copied().unwrap_or(0) as f64;
            gap += (observed - total as f64 * frequency).abs();
        }
    }
    -gap
}

fn kmer_code(kmer: &[u8]) -> Option<u64> {
    kmer.iter().try_fold(0u64, |acc, &base| {
        let bits = match base {
            b'A' => 0,
            b'C' => 1,
            b'G' => 2,
            b'T' => 3,
            _ => return None,
        };
        Some((acc << 2) | bits)
    })
}

/// Counts stem starts `i` in `[first, last)` whose reverse complement occurs at some `j` with
/// `i + k <= j` and `j + k <= i + window`.
fn count_hairpins(seq: &[u8], k: usize, window: usize, first: usize, last: usize) -> usize {
    if k == 0 || k > 32 || window < 2 * k || seq.len() < 2 * k {
        return 0;
    }
    let span_end = (last + window).min(seq.len());
    let first = first.min(span_end);
    let codes: Vec<Option<u64>> = (first..span_end.saturating_sub(k - 1))
        .map(|i| kmer_code(&seq[i..i + k]))
        .collect();
    let rc_codes: Vec<Option<u64>> = (first..span_end.saturating_sub(k - 1))
        .map(|i| kmer_code(&reverse_complement(&seq[i..i + k])))
        .collect();

    let mut hairpins = 0;
    for i in first..last.min(seq.len().saturating_sub(k - 1)) {
        let Some(target) = rc_codes[i - first] else {
            continue;
        };
        let upper = (i + window).min(seq.len());
        if upper < i + 2 * k {
            continue;
        }
        let found = (i + k..=upper - k).any(|j| codes[j - first] == Some(target));
        if found {
            hairpins += 1;
        }
    }
    hairpins
}
