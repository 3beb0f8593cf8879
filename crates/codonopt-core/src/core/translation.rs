use super::genetic_code::{self, STOP_SYMBOL, UNKNOWN_SYMBOL};
use super::models::sequence::Codon;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("No codon mapping for symbol '{symbol}' at protein position {position}")]
    UnknownAminoAcid { symbol: char, position: usize },
}

/// Builds the seed DNA for `protein`: `*` becomes `stop_codon`, every other residue its
/// representative codon. The result satisfies the translation but none of the design
/// constraints.
pub fn reverse_translate(protein: &str, stop_codon: Codon) -> Result<String, TranslationError> {
    let mut dna = String::with_capacity(protein.len() * 3);
    for (position, symbol) in protein.chars().enumerate() {
        let codon = if symbol == STOP_SYMBOL {
            stop_codon
        } else {
            genetic_code::representative_codon(symbol)
                .ok_or(TranslationError::UnknownAminoAcid { symbol, position })?
        };
        dna.push_str(&codon.to_string());
    }
    Ok(dna)
}

/// Translates `dna` codon by codon. Only `stop_codon` maps to `*`; other natural stops and
/// codons containing non-ACGT symbols map to `X`. A trailing partial codon is ignored.
pub fn translate(dna: &str, stop_codon: Codon) -> String {
    let upper = dna.to_ascii_uppercase();
    upper
        .as_bytes()
        .chunks_exact(3)
        .map(|chunk| match Codon::from_bytes(chunk) {
            Ok(codon) => genetic_code::amino_acid(codon, stop_codon),
            Err(_) => UNKNOWN_SYMBOL,
        })
        .collect()
}
