//! The standard genetic code (NCBI translation table 1).

use super::models::sequence::Codon;

/// Amino acids of the standard table in TCAG codon order.
const STANDARD_TABLE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

pub const STOP_SYMBOL: char = '*';

/// Symbol used for codons that have no meaning under the active stop convention.
pub const UNKNOWN_SYMBOL: char = 'X';

pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Translates a codon with the unmodified standard table, so every natural stop yields `*`.
#[inline]
pub fn standard_amino_acid(codon: Codon) -> char {
    STANDARD_TABLE[codon.table_index()] as char
}

/// Translates a codon under the reassigned-stop convention: only `stop_codon` reads as `*`,
/// and any other natural stop reads as [`UNKNOWN_SYMBOL`].
pub fn amino_acid(codon: Codon, stop_codon: Codon) -> char {
    if codon == stop_codon {
        return STOP_SYMBOL;
    }
    match standard_amino_acid(codon) {
        STOP_SYMBOL => UNKNOWN_SYMBOL,
        aa => aa,
    }
}

pub fn is_amino_acid(symbol: char) -> bool {
    AMINO_ACIDS.contains(symbol)
}

/// All codons encoding `symbol` in the standard table, in TCAG order.
pub fn synonymous_codons(symbol: char) -> Vec<Codon> {
    (0..64)
        .filter(|&i| STANDARD_TABLE[i] as char == symbol)
        .map(Codon::from_table_index)
        .collect()
}

/// The fixed codon used when reverse translating `symbol`: the last synonym in TCAG order.
pub fn representative_codon(symbol: char) -> Option<Codon> {
    if !is_amino_acid(symbol) {
        return None;
    }
    synonymous_codons(symbol).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        s.parse().unwrap()
    }

    #[test]
    fn standard_table_translates_known_codons() {
        assert_eq!(standard_amino_acid(codon("ATG")), 'M');
        assert_eq!(standard_amino_acid(codon("TGG")), 'W');
        assert_eq!(standard_amino_acid(codon("GCA")), 'A');
        assert_eq!(standard_amino_acid(codon("TGA")), '*');
    }

    #[test]
    fn only_configured_stop_reads_as_stop() {
        assert_eq!(amino_acid(codon("TAG"), Codon::AMBER), '*');
        assert_eq!(amino_acid(codon("TAA"), Codon::AMBER), 'X');
        assert_eq!(amino_acid(codon("TGA"), Codon::AMBER), 'X');
        assert_eq!(amino_acid(codon("TAA"), Codon::OCHRE), '*');
    }

    #[test]
    fn synonymous_codon_counts_match_the_standard_code() {
        assert_eq!(synonymous_codons('L').len(), 6);
        assert_eq!(synonymous_codons('M'), vec![codon("ATG")]);
        assert_eq!(synonymous_codons('*').len(), 3);
        let total: usize = AMINO_ACIDS.chars().map(|aa| synonymous_codons(aa).len()).sum();
        assert_eq!(total, 61);
    }

    #[test]
    fn representative_codon_is_a_synonym() {
        for aa in AMINO_ACIDS.chars() {
            let rep = representative_codon(aa).unwrap();
            assert_eq!(standard_amino_acid(rep), aa);
        }
        assert_eq!(representative_codon('*'), None);
        assert_eq!(representative_codon('B'), None);
    }
}
