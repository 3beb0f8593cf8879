use crate::cli::DesignArgs;
use crate::commands::open_output;
use crate::config::PartialDesignConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use codonopt::core::io::records::{
    self, DEFAULT_DNA_COLUMN, DEFAULT_PROTEIN_COLUMN, ProteinRecord, ReportRow,
};
use codonopt::engine::config::DesignConfig;
use codonopt::engine::error::EngineError;
use codonopt::engine::progress::ProgressReporter;
use codonopt::engine::search::LocalSearchEngine;
use codonopt::workflows::design::{DesignOutcome, design, design_batch};
use std::io::Write;
use tracing::{info, warn};

/// One row of a batch design table. Its DNA and protein columns use the default names read
/// by `verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DesignRow {
    id: String,
    protein: String,
    dna: String,
    attempt: String,
    error: String,
}

impl DesignRow {
    fn new(record: &ProteinRecord, result: &std::result::Result<DesignOutcome, EngineError>) -> Self {
        let (dna, attempt, error) = match result {
            Ok(outcome) => (outcome.sequence.clone(), outcome.attempt.to_string(), String::new()),
            Err(e) => (String::new(), String::new(), e.to_string()),
        };
        Self {
            id: record.id.clone(),
            protein: record.protein.clone(),
            dna,
            attempt,
            error,
        }
    }
}

impl ReportRow for DesignRow {
    fn headers() -> &'static [&'static str] {
        &["ID", DEFAULT_PROTEIN_COLUMN, DEFAULT_DNA_COLUMN, "Attempt", "Error"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.protein.clone(),
            self.dna.clone(),
            self.attempt.clone(),
            self.error.clone(),
        ]
    }
}

pub fn run(args: DesignArgs, progress: &CliProgressHandler) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialDesignConfig::from_file(path)?,
        None => PartialDesignConfig::default(),
    };
    let config = partial.merge_with_cli(&args)?;
    info!(
        profile = %config.profile,
        stop_codon = %config.stop_codon,
        seed = config.search.seed,
        "Design configuration resolved."
    );

    let engine = LocalSearchEngine::new(config.search.clone());
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    match (&args.protein, &args.input) {
        (Some(protein), _) => run_single(protein, &config, &engine, &reporter, &args),
        (None, Some(input)) => {
            let proteins = records::read_proteins_from_path(
                input,
                &args.protein_column,
                args.id_column.as_deref(),
            )?;
            info!(count = proteins.len(), path = ?input, "Loaded proteins.");
            run_batch(&proteins, &config, &engine, &reporter, &args)
        }
        (None, None) => Err(CliError::Argument(
            "either --protein or --input is required".to_string(),
        )),
    }
}

fn run_single(
    protein: &str,
    config: &DesignConfig,
    engine: &LocalSearchEngine,
    reporter: &ProgressReporter,
    args: &DesignArgs,
) -> Result<()> {
    let outcome = design(protein, config, engine, reporter)?;
    if let Some(summary) = &outcome.summary {
        eprintln!("{summary}");
    }
    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "{}", outcome.sequence)?;
    out.flush()?;
    Ok(())
}

fn run_batch(
    proteins: &[ProteinRecord],
    config: &DesignConfig,
    engine: &LocalSearchEngine,
    reporter: &ProgressReporter,
    args: &DesignArgs,
) -> Result<()> {
    let sequences: Vec<&str> = proteins.iter().map(|p| p.protein.as_str()).collect();
    let results = design_batch(&sequences, config, engine, reporter);

    let rows: Vec<DesignRow> = proteins
        .iter()
        .zip(&results)
        .map(|(record, result)| DesignRow::new(record, result))
        .collect();
    for (record, result) in proteins.iter().zip(&results) {
        match result {
            Err(e) => warn!(id = %record.id, error = %e, "Design failed."),
            Ok(outcome) => {
                if let Some(summary) = &outcome.summary {
                    eprintln!("# {}\n{}", record.id, summary);
                }
            }
        }
    }

    let out = open_output(args.output.as_deref())?;
    records::write_report(out, &rows)?;

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        return Err(CliError::BatchFailed {
            failed,
            total: results.len(),
        });
    }
    Ok(())
}
