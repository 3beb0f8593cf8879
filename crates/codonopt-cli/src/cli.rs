use clap::{Args, Parser, Subcommand, ValueEnum};
use codonopt::core::io::records::{DEFAULT_DNA_COLUMN, DEFAULT_PROTEIN_COLUMN};
use codonopt::core::models::sequence::Codon;
use codonopt::engine::config::Profile;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "codonopt - design expression-ready DNA for proteins and audit designed sequences.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for batch design.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Design a DNA coding sequence for one protein or a table of proteins.
    Design(DesignArgs),
    /// Run quality checks over a table of designed sequences.
    Verify(VerifyArgs),
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug)]
pub struct DesignArgs {
    // --- Input ---
    /// Protein sequence to design, using one-letter codes and '*' for stops.
    #[arg(short, long, value_name = "SEQUENCE", conflicts_with = "input", required_unless_present = "input")]
    pub protein: Option<String>,

    /// CSV table of proteins to design in batch.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Column holding protein sequences in the input table.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PROTEIN_COLUMN)]
    pub protein_column: String,

    /// Column holding record ids. Row indices are used when absent.
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    /// Write the design (a CSV table in batch mode) to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a design configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Design Overrides ---
    /// Expression profile, overriding the config file. Defaults to 'bacterial'.
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<Profile>,

    /// Codon written at every '*' position, overriding the config file.
    #[arg(long, value_name = "CODON")]
    pub stop_codon: Option<Codon>,

    /// Sequence pattern to avoid, e.g. 'BsaI_site', '7xC' or 'AAAAAA'.
    /// Replaces the configured list. Can be used multiple times.
    #[arg(short = 'a', long = "avoid", value_name = "PATTERN")]
    pub avoid_patterns: Vec<String>,

    /// Seed for the randomized search, overriding the config file.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Print constraint and objective summaries of each design to stderr.
    #[arg(long)]
    pub summary: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.max-iterations=5000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A single quality check of the `verify` subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// Designed DNA translates back to the expected protein.
    Translation,
    /// No Type IIS restriction enzyme sites.
    RestrictionSites,
    /// No Shine-Dalgarno motifs.
    SdSites,
    /// Every '*' position carries the stop codon.
    AmberStops,
    /// No SD motif followed by a spaced start codon.
    FunctionalSd,
}

impl Check {
    pub const ALL: [Check; 5] = [
        Check::Translation,
        Check::RestrictionSites,
        Check::SdSites,
        Check::AmberStops,
        Check::FunctionalSd,
    ];

    /// Base name of the report file written for this check.
    pub fn report_name(&self) -> &'static str {
        match self {
            Check::Translation => "translation",
            Check::RestrictionSites => "restriction_sites",
            Check::SdSites => "sd_sites",
            Check::AmberStops => "amber_stops",
            Check::FunctionalSd => "functional_sd_sites",
        }
    }
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// CSV table of designed sequences.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Column holding designed DNA sequences.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DNA_COLUMN)]
    pub dna_column: String,

    /// Column holding the expected protein sequences.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PROTEIN_COLUMN)]
    pub protein_column: String,

    /// Column holding record ids. Row indices are used when absent.
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    /// Check to run. Can be used multiple times. Runs every check when omitted.
    #[arg(long = "check", value_name = "CHECK")]
    pub checks: Vec<Check>,

    /// Directory receiving one CSV report per check. Reports go to stdout when omitted.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Codon expected at every '*' position.
    #[arg(long, value_name = "CODON", default_value = "TAG")]
    pub stop_codon: Codon,

    /// Exit with an error when any check reports a violation.
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_accepts_single_protein_with_overrides() {
        let cli = Cli::try_parse_from([
            "codonopt", "-vv", "design", "--protein", "MA*", "--profile", "eukaryotic",
            "--stop-codon", "taa", "-a", "7xC", "-a", "BsaI_site", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Design(args) = cli.command else {
            panic!("expected design command");
        };
        assert_eq!(args.protein.as_deref(), Some("MA*"));
        assert_eq!(args.profile, Some(Profile::Eukaryotic));
        assert_eq!(args.stop_codon, Some(Codon::OCHRE));
        assert_eq!(args.avoid_patterns, vec!["7xC", "BsaI_site"]);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.protein_column, DEFAULT_PROTEIN_COLUMN);
    }

    #[test]
    fn design_requires_protein_or_input() {
        assert!(Cli::try_parse_from(["codonopt", "design"]).is_err());
        assert!(
            Cli::try_parse_from(["codonopt", "design", "-p", "MA", "-i", "proteins.csv"]).is_err()
        );
        assert!(Cli::try_parse_from(["codonopt", "design", "-i", "proteins.csv"]).is_ok());
    }

    #[test]
    fn verify_parses_checks_and_defaults() {
        let cli = Cli::try_parse_from([
            "codonopt", "verify", "-i", "designs.csv", "--check", "amber-stops", "--check",
            "functional-sd",
        ])
        .unwrap();
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify command");
        };
        assert_eq!(args.checks, vec![Check::AmberStops, Check::FunctionalSd]);
        assert_eq!(args.dna_column, DEFAULT_DNA_COLUMN);
        assert_eq!(args.stop_codon, Codon::AMBER);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["codonopt", "-q", "-v", "verify", "-i", "x.csv"]).is_err());
    }
}
