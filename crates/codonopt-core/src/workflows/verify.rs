use crate::core::genetic_code::STOP_SYMBOL;
use crate::core::io::records::{ReportRow, SequenceRecord};
use crate::core::models::sequence::Codon;
use crate::core::translation::translate;
use crate::engine::config::VerifyConfig;
use regex::Regex;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error(
        "Record '{id}': protein position {position} needs {required} bases but the DNA has {actual}"
    )]
    SequenceTooShort {
        id: String,
        position: usize,
        required: usize,
        actual: usize,
    },

    #[error("Invalid functional SD expression: {0}")]
    InvalidExpression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationMismatch {
    pub id: String,
    pub expected: String,
    pub translated: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionSiteHit {
    pub id: String,
    pub sites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdMotifHit {
    pub id: String,
    pub motifs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmberStopViolation {
    pub id: String,
    pub protein_pos: usize,
    pub codon_found: String,
}

/// An SD motif followed, after a spacer, by a start codon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalSdSite {
    pub id: String,
    pub sd_motif: String,
    pub start_codon: String,
    pub sd_position: usize,
    pub start_position: usize,
    pub spacer_bp: usize,
}

impl ReportRow for TranslationMismatch {
    fn headers() -> &'static [&'static str] {
        &["ID", "Expected", "Translated"]
    }
    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.expected.clone(),
            self.translated.clone(),
        ]
    }
}

impl ReportRow for RestrictionSiteHit {
    fn headers() -> &'static [&'static str] {
        &["ID", "RestrictionSites"]
    }
    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.sites.join(";")]
    }
}

impl ReportRow for SdMotifHit {
    fn headers() -> &'static [&'static str] {
        &["ID", "SDMotifs"]
    }
    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.motifs.join(";")]
    }
}

impl ReportRow for AmberStopViolation {
    fn headers() -> &'static [&'static str] {
        &["ID", "ProteinPos", "CodonFound"]
    }
    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.protein_pos.to_string(),
            self.codon_found.clone(),
        ]
    }
}

impl ReportRow for FunctionalSdSite {
    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "SDMotif",
            "StartCodon",
            "SD_Position",
            "Start_Position",
            "Spacer_bp",
        ]
    }
    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.sd_motif.clone(),
            self.start_codon.clone(),
            self.sd_position.to_string(),
            self.start_position.to_string(),
            self.spacer_bp.to_string(),
        ]
    }
}

/// Records whose DNA does not translate to the expected protein.
pub fn check_translation(
    records: &[SequenceRecord],
    stop_codon: Codon,
) -> Vec<TranslationMismatch> {
    records
        .iter()
        .filter_map(|record| {
            let translated = translate(&record.dna, stop_codon);
            (translated != record.protein).then(|| TranslationMismatch {
                id: record.id.clone(),
                expected: record.protein.clone(),
                translated,
            })
        })
        .collect()
}

fn literals_present<S: AsRef<str>>(dna: &str, literals: &[S]) -> Vec<String> {
    let dna = dna.to_ascii_uppercase();
    literals
        .iter()
        .map(|s| s.as_ref().to_ascii_uppercase())
        .filter(|literal| dna.contains(literal.as_str()))
        .collect()
}

pub fn check_restriction_sites<S: AsRef<str>>(
    records: &[SequenceRecord],
    sites: &[S],
) -> Vec<RestrictionSiteHit> {
    records
        .iter()
        .filter_map(|record| {
            let sites = literals_present(&record.dna, sites);
            (!sites.is_empty()).then(|| RestrictionSiteHit {
                id: record.id.clone(),
                sites,
            })
        })
        .collect()
}

/// Records containing any SD motif anywhere, whether or not a start codon follows.
pub fn check_sd_sites<S: AsRef<str>>(
    records: &[SequenceRecord],
    motifs: &[S],
) -> Vec<SdMotifHit> {
    records
        .iter()
        .filter_map(|record| {
            let motifs = literals_present(&record.dna, motifs);
            (!motifs.is_empty()).then(|| SdMotifHit {
                id: record.id.clone(),
                motifs,
            })
        })
        .collect()
}

/// Every `*` of the expected protein must sit on `stop_codon` in the DNA. Records without a
/// `*` are skipped.
pub fn check_amber_stop_codons(
    records: &[SequenceRecord],
    stop_codon: Codon,
) -> Result<Vec<AmberStopViolation>, VerifyError> {
    let expected = stop_codon.to_string();
    let mut violations = Vec::new();
    for record in records.iter().filter(|r| r.protein.contains(STOP_SYMBOL)) {
        let dna = record.dna.to_ascii_uppercase();
        for (position, _) in record
            .protein
            .chars()
            .enumerate()
            .filter(|&(_, aa)| aa == STOP_SYMBOL)
        {
            let required = 3 * (position + 1);
            let codon = dna
                .get(3 * position..required)
                .ok_or_else(|| VerifyError::SequenceTooShort {
                    id: record.id.clone(),
                    position,
                    required,
                    actual: dna.len(),
                })?;
            if codon != expected {
                violations.push(AmberStopViolation {
                    id: record.id.clone(),
                    protein_pos: position,
                    codon_found: codon.to_string(),
                });
            }
        }
    }
    Ok(violations)
}

/// Scans each DNA left to right for non-overlapping `motif, spacer, start codon` matches.
/// Motifs and start codons are tried in list order.
pub fn check_functional_sd_sites<S: AsRef<str>>(
    records: &[SequenceRecord],
    motifs: &[S],
    start_codons: &[S],
    spacer: (usize, usize),
) -> Result<Vec<FunctionalSdSite>, VerifyError> {
    let alternation = |items: &[S]| {
        items
            .iter()
            .map(|s| regex::escape(s.as_ref()))
            .collect::<Vec<_>>()
            .join("|")
    };
    let expression = format!(
        "(?i)({}).{{{},{}}}({})",
        alternation(motifs),
        spacer.0,
        spacer.1,
        alternation(start_codons)
    );
    let regex = Regex::new(&expression).map_err(|e| VerifyError::InvalidExpression(e.to_string()))?;

    let mut sites = Vec::new();
    for record in records {
        let dna = record.dna.to_ascii_uppercase();
        for captures in regex.captures_iter(&dna) {
            let (Some(sd), Some(start)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            sites.push(FunctionalSdSite {
                id: record.id.clone(),
                sd_motif: sd.as_str().to_string(),
                start_codon: start.as_str().to_string(),
                sd_position: sd.start(),
                start_position: start.start(),
                spacer_bp: start.start() - sd.end(),
            });
        }
    }
    Ok(sites)
}

/// Results of every check over one batch. Empty vectors mean no violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub translation: Vec<TranslationMismatch>,
    pub restriction_sites: Vec<RestrictionSiteHit>,
    pub sd_sites: Vec<SdMotifHit>,
    pub amber_stops: Vec<AmberStopViolation>,
    pub functional_sd_sites: Vec<FunctionalSdSite>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.translation.is_empty()
            && self.restriction_sites.is_empty()
            && self.sd_sites.is_empty()
            && self.amber_stops.is_empty()
            && self.functional_sd_sites.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationSuite {
    config: VerifyConfig,
}

impl VerificationSuite {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    pub fn translation(&self, records: &[SequenceRecord]) -> Vec<TranslationMismatch> {
        check_translation(records, self.config.stop_codon)
    }

    pub fn restriction_sites(&self, records: &[SequenceRecord]) -> Vec<RestrictionSiteHit> {
        check_restriction_sites(records, &self.config.restriction_sites)
    }

    pub fn sd_sites(&self, records: &[SequenceRecord]) -> Vec<SdMotifHit> {
        check_sd_sites(records, &self.config.sd_motifs)
    }

    pub fn amber_stops(
        &self,
        records: &[SequenceRecord],
    ) -> Result<Vec<AmberStopViolation>, VerifyError> {
        check_amber_stop_codons(records, self.config.stop_codon)
    }

    pub fn functional_sd_sites(
        &self,
        records: &[SequenceRecord],
    ) -> Result<Vec<FunctionalSdSite>, VerifyError> {
        check_functional_sd_sites(
            records,
            &self.config.sd_motifs,
            &self.config.start_codons,
            (self.config.spacer_min, self.config.spacer_max),
        )
    }

    #[instrument(skip_all, name = "verification", fields(records = records.len()))]
    pub fn run(&self, records: &[SequenceRecord]) -> Result<VerificationReport, VerifyError> {
        let report = VerificationReport {
            translation: self.translation(records),
            restriction_sites: self.restriction_sites(records),
            sd_sites: self.sd_sites(records),
            amber_stops: self.amber_stops(records)?,
            functional_sd_sites: self.functional_sd_sites(records)?,
        };
        info!(
            translation = report.translation.len(),
            restriction_sites = report.restriction_sites.len(),
            sd_sites = report.sd_sites.len(),
            amber_stops = report.amber_stops.len(),
            functional_sd_sites = report.functional_sd_sites.len(),
            "Verification finished."
        );
        Ok(report)
    }
}
