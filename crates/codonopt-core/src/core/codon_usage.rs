use super::genetic_code;
use super::models::sequence::{Codon, SequenceError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use thiserror::Error;

const E_COLI_TABLE: &str = include_str!("../../assets/codon_usage/e_coli.csv");
const H_SAPIENS_TABLE: &str = include_str!("../../assets/codon_usage/h_sapiens.csv");

/// Organisms with a bundled codon-usage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    EColi,
    HSapiens,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::EColi => "e_coli",
            Species::HSapiens => "h_sapiens",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum CodonUsageError {
    #[error("CSV parsing error in codon usage table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid codon in usage table: {0}")]
    InvalidCodon(#[from] SequenceError),

    #[error("Codon {codon} is listed under '{listed}' but encodes '{actual}'")]
    Inconsistent {
        codon: Codon,
        listed: char,
        actual: char,
    },

    #[error("Amino acid '{0}' has no codons in the usage table")]
    MissingAminoAcid(char),
}

#[derive(Debug, Deserialize)]
struct UsageRow {
    amino_acid: String,
    codon: String,
    relative_frequency: f64,
}

/// Relative synonymous codon frequencies of one organism: the frequencies of the codons of
/// each amino acid sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct CodonUsageTable {
    pub name: String,
    frequencies: HashMap<Codon, f64>,
    by_amino_acid: HashMap<char, Vec<(Codon, f64)>>,
}

impl CodonUsageTable {
    pub fn for_species(species: Species) -> Result<Self, CodonUsageError> {
        let text = match species {
            Species::EColi => E_COLI_TABLE,
            Species::HSapiens => H_SAPIENS_TABLE,
        };
        Self::from_reader(species.name(), text.as_bytes())
    }

    fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, CodonUsageError> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut frequencies = HashMap::new();
        let mut by_amino_acid: HashMap<char, Vec<(Codon, f64)>> = HashMap::new();

        for row in reader.deserialize() {
            let row: UsageRow = row?;
            let codon: Codon = row.codon.parse()?;
            let listed = row
                .amino_acid
                .trim()
                .chars()
                .next()
                .unwrap_or(genetic_code::UNKNOWN_SYMBOL);
            let actual = genetic_code::standard_amino_acid(codon);
            if listed != actual {
                return Err(CodonUsageError::Inconsistent {
                    codon,
                    listed,
                    actual,
                });
            }
            frequencies.insert(codon, row.relative_frequency);
            by_amino_acid
                .entry(actual)
                .or_default()
                .push((codon, row.relative_frequency));
        }

        if let Some(missing) = genetic_code::AMINO_ACIDS
            .chars()
            .find(|aa| !by_amino_acid.contains_key(aa))
        {
            return Err(CodonUsageError::MissingAminoAcid(missing));
        }

        for codons in by_amino_acid.values_mut() {
            codons.sort_by_key(|(codon, _)| codon.table_index());
        }

        Ok(Self {
            name: name.to_string(),
            frequencies,
            by_amino_acid,
        })
    }

    #[inline]
    pub fn relative_frequency(&self, codon: Codon) -> f64 {
        self.frequencies.get(&codon).copied().unwrap_or(0.0)
    }

    pub fn codons_for(&self, amino_acid: char) -> &[(Codon, f64)] {
        self.by_amino_acid
            .get(&amino_acid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn max_frequency(&self, amino_acid: char) -> f64 {
        self.codons_for(amino_acid)
            .iter()
            .map(|(_, f)| *f)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        s.parse().unwrap()
    }

    #[test]
    fn bundled_tables_cover_all_codons_and_sum_to_one() {
        for species in [Species::EColi, Species::HSapiens] {
            let table = CodonUsageTable::for_species(species).unwrap();
            assert_eq!(table.frequencies.len(), 64);
            for aa in genetic_code::AMINO_ACIDS.chars() {
                let sum: f64 = table.codons_for(aa).iter().map(|(_, f)| f).sum();
                assert!((sum - 1.0).abs() < 0.02, "{species} {aa} sums to {sum}");
            }
        }
    }

    #[test]
    fn e_coli_prefers_ctg_for_leucine() {
        let table = CodonUsageTable::for_species(Species::EColi).unwrap();
        assert_eq!(table.max_frequency('L'), table.relative_frequency(codon("CTG")));
        assert_eq!(table.max_frequency('M'), 1.0);
    }

    #[test]
    fn human_table_reports_rare_codons() {
        let table = CodonUsageTable::for_species(Species::HSapiens).unwrap();
        assert!(table.relative_frequency(codon("TCG")) < 0.1);
        assert!(table.relative_frequency(codon("CTG")) > 0.4);
    }

    #[test]
    fn from_reader_rejects_mislabeled_codons() {
        let text = "amino_acid,codon,relative_frequency\nK,ATG,1.0\n";
        let result = CodonUsageTable::from_reader("bad", text.as_bytes());
        assert!(matches!(result, Err(CodonUsageError::Inconsistent { .. })));
    }

    #[test]
    fn from_reader_fails_for_incomplete_table() {
        let text = "amino_acid,codon,relative_frequency\nM,ATG,1.0\n";
        let result = CodonUsageTable::from_reader("partial", text.as_bytes());
        assert!(matches!(result, Err(CodonUsageError::MissingAminoAcid(_))));
    }
}
