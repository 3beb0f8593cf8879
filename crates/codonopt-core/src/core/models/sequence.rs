use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Invalid nucleotide '{symbol}' at position {position}")]
    InvalidNucleotide { symbol: char, position: usize },

    #[error("A codon must be exactly 3 nucleotides long, got {0}")]
    InvalidCodonLength(usize),
}

/// A single nucleotide triplet over the {A, C, G, T} alphabet, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codon([u8; 3]);

impl Codon {
    /// The amber stop codon, the default reassigned stop in this crate.
    pub const AMBER: Codon = Codon(*b"TAG");
    pub const OCHRE: Codon = Codon(*b"TAA");
    pub const OPAL: Codon = Codon(*b"TGA");

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SequenceError> {
        if bytes.len() != 3 {
            return Err(SequenceError::InvalidCodonLength(bytes.len()));
        }
        let mut codon = [0u8; 3];
        for (i, &b) in bytes.iter().enumerate() {
            let upper = b.to_ascii_uppercase();
            if !is_nucleotide(upper) {
                return Err(SequenceError::InvalidNucleotide {
                    symbol: b as char,
                    position: i,
                });
            }
            codon[i] = upper;
        }
        Ok(Self(codon))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// Position of this codon in the conventional TCAG-ordered 64-codon table.
    pub fn table_index(&self) -> usize {
        self.0
            .iter()
            .fold(0, |acc, &b| acc * 4 + tcag_rank(b).unwrap_or(0))
    }

    pub fn from_table_index(index: usize) -> Self {
        let index = index % 64;
        Self([
            TCAG[index / 16],
            TCAG[(index / 4) % 4],
            TCAG[index % 4],
        ])
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl FromStr for Codon {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.trim().as_bytes())
    }
}

/// Half-open range `[start, end)` of base positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Location) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Grows the range by `radius` on both sides, clamped to `[0, limit)`.
    pub fn expand(&self, radius: usize, limit: usize) -> Location {
        Location::new(
            self.start.saturating_sub(radius),
            (self.end + radius).min(limit),
        )
    }

    /// Indices of the codons (reading frame 0) touched by this range.
    pub fn codon_span(&self) -> std::ops::Range<usize> {
        let first = self.start / 3;
        let last = if self.end == 0 { 0 } else { self.end.div_ceil(3) };
        first..last.max(first)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

const TCAG: [u8; 4] = *b"TCAG";

#[inline]
fn tcag_rank(base: u8) -> Option<usize> {
    match base {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

#[inline]
pub fn is_nucleotide(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

#[inline]
pub fn gc_count(sequence: &[u8]) -> usize {
    sequence.iter().filter(|&&b| b == b'G' || b == b'C').count()
}

/// Uppercases a DNA string and rejects anything outside {A, C, G, T}.
pub fn normalize_dna(sequence: &str) -> Result<Vec<u8>, SequenceError> {
    sequence
        .bytes()
        .enumerate()
        .map(|(position, b)| {
            let upper = b.to_ascii_uppercase();
            if is_nucleotide(upper) {
                Ok(upper)
            } else {
                Err(SequenceError::InvalidNucleotide {
                    symbol: b as char,
                    position,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codon_parses_case_insensitively() {
        let codon: Codon = "tag".parse().unwrap();
        assert_eq!(codon, Codon::AMBER);
        assert_eq!(codon.to_string(), "TAG");
    }

    #[test]
    fn codon_rejects_wrong_length_and_symbols() {
        assert_eq!(
            "TA".parse::<Codon>(),
            Err(SequenceError::InvalidCodonLength(2))
        );
        assert!(matches!(
            "TNG".parse::<Codon>(),
            Err(SequenceError::InvalidNucleotide { symbol: 'N', position: 1 })
        ));
    }

    #[test]
    fn table_index_round_trips_through_all_codons() {
        for i in 0..64 {
            assert_eq!(Codon::from_table_index(i).table_index(), i);
        }
        assert_eq!("TTT".parse::<Codon>().unwrap().table_index(), 0);
        assert_eq!("GGG".parse::<Codon>().unwrap().table_index(), 63);
    }

    #[test]
    fn location_codon_span_covers_partial_codons() {
        assert_eq!(Location::new(6, 9).codon_span(), 2..3);
        assert_eq!(Location::new(4, 10).codon_span(), 1..4);
        assert_eq!(Location::new(0, 0).codon_span(), 0..0);
    }

    #[test]
    fn location_expand_is_clamped() {
        let loc = Location::new(2, 5).expand(4, 7);
        assert_eq!(loc, Location::new(0, 7));
    }

    #[test]
    fn location_overlap_is_half_open() {
        let a = Location::new(0, 3);
        assert!(a.overlaps(&Location::new(2, 4)));
        assert!(!a.overlaps(&Location::new(3, 6)));
    }

    #[test]
    fn reverse_complement_and_gc_count() {
        assert_eq!(reverse_complement(b"GGTCTC"), b"GAGACC".to_vec());
        assert_eq!(gc_count(b"ATGCGC"), 4);
    }

    #[test]
    fn normalize_dna_uppercases_and_validates() {
        assert_eq!(normalize_dna("atgc").unwrap(), b"ATGC".to_vec());
        assert!(matches!(
            normalize_dna("ATXG"),
            Err(SequenceError::InvalidNucleotide { symbol: 'X', position: 2 })
        ));
    }
}
