use super::models::sequence::{Location, is_nucleotide, reverse_complement};
use phf::{Map, phf_map};
use regex::bytes::Regex;
use std::fmt;
use thiserror::Error;

/// Recognition sites keyed by lowercase enzyme name: (display name, site).
static ENZYME_SITES: Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "bsai" => ("BsaI", "GGTCTC"),
    "bsmbi" => ("BsmBI", "CGTCTC"),
    "esp3i" => ("Esp3I", "CGTCTC"),
    "bbsi" => ("BbsI", "GAAGAC"),
    "bpii" => ("BpiI", "GAAGAC"),
    "sapi" => ("SapI", "GCTCTTC"),
    "btgzi" => ("BtgZI", "GCGATG"),
    "aari" => ("AarI", "CACCTGC"),
    "paqci" => ("PaqCI", "CACCTGC"),
    "bsmai" => ("BsmAI", "GTCTC"),
    "ecori" => ("EcoRI", "GAATTC"),
    "bamhi" => ("BamHI", "GGATCC"),
    "xhoi" => ("XhoI", "CTCGAG"),
    "ndei" => ("NdeI", "CATATG"),
    "noti" => ("NotI", "GCGGCCGC"),
};

const ENZYME_SUFFIX: &str = "_site";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Unknown restriction enzyme '{0}'")]
    UnknownEnzyme(String),

    #[error("Invalid homopolymer pattern '{0}'. Expected '<length>x<base>' (e.g., '7xC')")]
    InvalidHomopolymer(String),

    #[error("Unrecognized pattern '{0}'. Expected an enzyme site, a homopolymer or an ACGT literal")]
    Unrecognized(String),

    #[error("Invalid regular expression '{expression}': {message}")]
    InvalidRegex { expression: String, message: String },
}

/// A sequence motif that a design must not contain.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact nucleotide string. Enzyme sites are searched on both strands.
    Literal {
        name: String,
        sequence: Vec<u8>,
        both_strands: bool,
    },
    /// A run of at least `length` copies of `base`.
    Homopolymer { base: u8, length: usize },
    /// A regular expression over the forward strand whose matches never exceed
    /// `max_length` bases.
    Regex {
        name: String,
        regex: Regex,
        max_length: usize,
    },
}

impl Pattern {
    /// Parses a pattern specification: `"BsaI_site"`, `"7xC"` or a literal like `"AGGAGG"`.
    pub fn parse(spec: &str) -> Result<Self, PatternError> {
        let spec = spec.trim();
        if let Some(enzyme) = spec.strip_suffix(ENZYME_SUFFIX) {
            return Self::enzyme_site(enzyme);
        }
        if let Some((count, base)) = spec.split_once(['x', 'X']) {
            if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) {
                return Self::homopolymer(count, base, spec);
            }
        }
        if !spec.is_empty() && spec.bytes().all(|b| is_nucleotide(b.to_ascii_uppercase())) {
            return Ok(Self::literal(spec));
        }
        Err(PatternError::Unrecognized(spec.to_string()))
    }

    pub fn enzyme_site(enzyme: &str) -> Result<Self, PatternError> {
        let (name, site) = ENZYME_SITES
            .get(enzyme.to_ascii_lowercase().as_str())
            .ok_or_else(|| PatternError::UnknownEnzyme(enzyme.to_string()))?;
        Ok(Pattern::Literal {
            name: format!("{name}{ENZYME_SUFFIX}"),
            sequence: site.as_bytes().to_vec(),
            both_strands: true,
        })
    }

    /// A forward-strand literal.
    pub fn literal(sequence: &str) -> Self {
        let sequence = sequence.to_ascii_uppercase();
        Pattern::Literal {
            name: sequence.clone(),
            sequence: sequence.into_bytes(),
            both_strands: false,
        }
    }

    pub fn regex(name: &str, expression: &str, max_length: usize) -> Result<Self, PatternError> {
        let regex = Regex::new(expression).map_err(|e| PatternError::InvalidRegex {
            expression: expression.to_string(),
            message: e.to_string(),
        })?;
        Ok(Pattern::Regex {
            name: name.to_string(),
            regex,
            max_length,
        })
    }

    fn homopolymer(count: &str, base: &str, spec: &str) -> Result<Self, PatternError> {
        let length: usize = count
            .parse()
            .map_err(|_| PatternError::InvalidHomopolymer(spec.to_string()))?;
        let base = match base.as_bytes() {
            [b] if is_nucleotide(b.to_ascii_uppercase()) => b.to_ascii_uppercase(),
            _ => return Err(PatternError::InvalidHomopolymer(spec.to_string())),
        };
        if length == 0 {
            return Err(PatternError::InvalidHomopolymer(spec.to_string()));
        }
        Ok(Pattern::Homopolymer { base, length })
    }

    pub fn name(&self) -> String {
        match self {
            Pattern::Literal { name, .. } | Pattern::Regex { name, .. } => name.clone(),
            Pattern::Homopolymer { base, length } => format!("{}x{}", length, *base as char),
        }
    }

    /// Longest stretch of sequence a single match can cover.
    pub fn max_length(&self) -> usize {
        match self {
            Pattern::Literal { sequence, .. } => sequence.len(),
            Pattern::Homopolymer { length, .. } => *length,
            Pattern::Regex { max_length, .. } => *max_length,
        }
    }

    /// Every match in `sequence`, overlapping matches included.
    pub fn find_all(&self, sequence: &[u8]) -> Vec<Location> {
        match self {
            Pattern::Literal {
                sequence: literal,
                both_strands,
                ..
            } => {
                let mut hits = find_literal(sequence, literal);
                if *both_strands {
                    let rc = reverse_complement(literal);
                    if rc != *literal {
                        hits.extend(find_literal(sequence, &rc));
                        hits.sort();
                    }
                }
                hits
            }
            Pattern::Homopolymer { base, length } => {
                find_literal(sequence, &vec![*base; *length])
            }
            Pattern::Regex { regex, .. } => {
                let mut hits = Vec::new();
                let mut position = 0;
                while position <= sequence.len() {
                    match regex.find_at(sequence, position) {
                        Some(m) => {
                            hits.push(Location::new(m.start(), m.end()));
                            position = m.start() + 1;
                        }
                        None => break,
                    }
                }
                hits
            }
        }
    }

    pub fn is_found_in(&self, sequence: &[u8]) -> bool {
        !self.find_all(sequence).is_empty()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn find_literal(sequence: &[u8], literal: &[u8]) -> Vec<Location> {
    if literal.is_empty() || literal.len() > sequence.len() {
        return Vec::new();
    }
    sequence
        .windows(literal.len())
        .enumerate()
        .filter(|(_, window)| *window == literal)
        .map(|(start, _)| Location::new(start, start + literal.len()))
        .collect()
}
