use crate::cli::{Check, VerifyArgs};
use crate::commands::open_output;
use crate::error::{CliError, Result};
use codonopt::core::io::records::{self, ColumnSpec, ReportRow, SequenceRecord};
use codonopt::engine::config::VerifyConfig;
use codonopt::workflows::verify::VerificationSuite;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn run(args: VerifyArgs) -> Result<()> {
    let columns = ColumnSpec {
        dna: args.dna_column.clone(),
        protein: args.protein_column.clone(),
        id: args.id_column.clone(),
    };
    let records = records::read_records_from_path(&args.input, &columns)?;
    info!(count = records.len(), path = ?args.input, "Loaded designed sequences.");

    let suite = VerificationSuite::new(VerifyConfig {
        stop_codon: args.stop_codon,
        ..VerifyConfig::default()
    });

    let checks = Check::ALL
        .into_iter()
        .filter(|check| args.checks.is_empty() || args.checks.contains(check));

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut violations = 0;
    for check in checks {
        let found = run_check(check, &suite, &records, args.output_dir.as_deref())?;
        info!(check = check.report_name(), violations = found, "Check finished.");
        violations += found;
    }

    if violations > 0 {
        if args.strict {
            return Err(CliError::Violations(violations));
        }
        info!(violations, "Verification found violations.");
    }
    Ok(())
}

fn run_check(
    check: Check,
    suite: &VerificationSuite,
    records: &[SequenceRecord],
    output_dir: Option<&Path>,
) -> Result<usize> {
    match check {
        Check::Translation => emit(check, &suite.translation(records), output_dir),
        Check::RestrictionSites => emit(check, &suite.restriction_sites(records), output_dir),
        Check::SdSites => emit(check, &suite.sd_sites(records), output_dir),
        Check::AmberStops => emit(check, &suite.amber_stops(records)?, output_dir),
        Check::FunctionalSd => emit(check, &suite.functional_sd_sites(records)?, output_dir),
    }
}

/// Writes one report. Files land in `output_dir`; stdout reports are preceded by a
/// `# <check>` line.
fn emit<T: ReportRow>(check: Check, rows: &[T], output_dir: Option<&Path>) -> Result<usize> {
    let path = output_dir.map(|dir| dir.join(format!("{}.csv", check.report_name())));
    let mut out = open_output(path.as_deref())?;
    if path.is_none() {
        writeln!(out, "# {}", check.report_name())?;
    }
    records::write_report(out, rows)?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn verify_args(argv: &[&str]) -> VerifyArgs {
        let mut full = vec!["codonopt", "verify"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Verify(args) => args,
            other => panic!("expected verify command, got {:?}", other),
        }
    }

    fn write_designs(dir: &Path) -> std::path::PathBuf {
        let input = dir.join("designs.csv");
        fs::write(
            &input,
            "ID,DNA sequence,Sequence\n\
             clean,ATGGCGTAG,MA*\n\
             dirty,ATGGGTCTCTAA,MGL*\n",
        )
        .unwrap();
        input
    }

    #[test]
    fn writes_one_report_per_check() {
        let dir = tempdir().unwrap();
        let input = write_designs(dir.path());
        let reports = dir.path().join("reports");
        let args = verify_args(&[
            "-i",
            input.to_str().unwrap(),
            "--id-column",
            "ID",
            "-o",
            reports.to_str().unwrap(),
        ]);

        run(args).unwrap();

        for check in Check::ALL {
            assert!(reports.join(format!("{}.csv", check.report_name())).exists());
        }
        let sites = fs::read_to_string(reports.join("restriction_sites.csv")).unwrap();
        assert_eq!(sites, "ID,RestrictionSites\ndirty,GGTCTC\n");
        let amber = fs::read_to_string(reports.join("amber_stops.csv")).unwrap();
        assert_eq!(amber, "ID,ProteinPos,CodonFound\ndirty,3,TAA\n");
        let sd = fs::read_to_string(reports.join("sd_sites.csv")).unwrap();
        assert_eq!(sd, "ID,SDMotifs\n");
    }

    #[test]
    fn strict_mode_fails_on_violations() {
        let dir = tempdir().unwrap();
        let input = write_designs(dir.path());
        let reports = dir.path().join("reports");
        let args = verify_args(&[
            "-i",
            input.to_str().unwrap(),
            "--check",
            "restriction-sites",
            "-o",
            reports.to_str().unwrap(),
            "--strict",
        ]);

        assert!(matches!(run(args), Err(CliError::Violations(1))));
        assert!(!reports.join("translation.csv").exists());
    }

    #[test]
    fn missing_column_is_a_record_error() {
        let dir = tempdir().unwrap();
        let input = write_designs(dir.path());
        let args = verify_args(&["-i", input.to_str().unwrap(), "--dna-column", "DNA"]);
        assert!(matches!(run(args), Err(CliError::Records(_))));
    }
}
