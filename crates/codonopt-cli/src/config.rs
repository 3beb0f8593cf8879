use crate::cli::DesignArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use codonopt::core::models::sequence::Codon;
use codonopt::engine::config::{self as core_config, Profile};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSdConfig {
    motifs: Option<Vec<String>>,
    relaxed_motifs: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSearchConfig {
    seed: Option<u64>,
    max_iterations: Option<usize>,
    max_margin: Option<usize>,
    exhaustive_threshold: Option<u64>,
    random_trials: Option<usize>,
    refinement_passes: Option<usize>,
}

/// Design settings as read from a TOML file. Every field is optional; unset fields fall back
/// to the profile defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialDesignConfig {
    profile: Option<String>,
    stop_codon: Option<String>,
    avoid_patterns: Option<Vec<String>>,
    verbose: Option<bool>,
    sd: Option<PartialSdConfig>,
    search: Option<PartialSearchConfig>,
}

impl PartialDesignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final configuration. Precedence: command-line flags, then `-S` overrides,
    /// then the file, then profile defaults.
    pub fn merge_with_cli(mut self, args: &DesignArgs) -> Result<core_config::DesignConfig> {
        self.apply_set_values(&args.set_values)?;

        let profile = match (args.profile, self.profile.as_deref()) {
            (Some(profile), _) => profile,
            (None, Some(name)) => parse_value::<Profile>("profile", name)?,
            (None, None) => Profile::Bacterial,
        };
        let stop_codon = match (args.stop_codon, self.stop_codon.as_deref()) {
            (Some(codon), _) => codon,
            (None, Some(text)) => parse_value::<Codon>("stop-codon", text)?,
            (None, None) => Codon::AMBER,
        };

        let sd = self.sd.take().unwrap_or_default();
        let search = Self::merge_search(self.search.take().unwrap_or_default(), args.seed);

        let mut builder = core_config::DesignConfigBuilder::new()
            .profile(profile)
            .stop_codon(stop_codon)
            .verbose(args.summary || self.verbose.unwrap_or(false))
            .search(search);

        if !args.avoid_patterns.is_empty() {
            builder = builder.avoid_patterns(args.avoid_patterns.clone());
        } else if let Some(patterns) = self.avoid_patterns.take() {
            builder = builder.avoid_patterns(patterns);
        }
        if let Some(motifs) = sd.motifs {
            builder = builder.sd_motifs(motifs);
        }
        if let Some(motifs) = sd.relaxed_motifs {
            builder = builder.relaxed_sd_motifs(motifs);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_search(partial: PartialSearchConfig, cli_seed: Option<u64>) -> core_config::SearchConfig {
        let defaults = core_config::SearchConfig::default();
        core_config::SearchConfig {
            max_iterations: partial.max_iterations.unwrap_or(defaults.max_iterations),
            max_margin: partial.max_margin.unwrap_or(defaults.max_margin),
            exhaustive_threshold: partial
                .exhaustive_threshold
                .unwrap_or(defaults.exhaustive_threshold),
            random_trials: partial.random_trials.unwrap_or(defaults.random_trials),
            refinement_passes: partial
                .refinement_passes
                .unwrap_or(defaults.refinement_passes),
            seed: cli_seed.or(partial.seed).unwrap_or(defaults.seed),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) =
                parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

            match key {
                "profile" => self.profile = Some(value_str.to_string()),
                "stop-codon" => self.stop_codon = Some(value_str.to_string()),
                "avoid-patterns" => self.avoid_patterns = Some(parser::parse_list(value_str)),
                "verbose" => self.verbose = Some(parse_value(key, value_str)?),
                "sd.motifs" => {
                    self.sd.get_or_insert_with(Default::default).motifs =
                        Some(parser::parse_list(value_str));
                }
                "sd.relaxed-motifs" => {
                    self.sd.get_or_insert_with(Default::default).relaxed_motifs =
                        Some(parser::parse_list(value_str));
                }
                "search.seed" => {
                    self.search.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "search.max-iterations" => {
                    self.search.get_or_insert_with(Default::default).max_iterations =
                        Some(parse_value(key, value_str)?);
                }
                "search.max-margin" => {
                    self.search.get_or_insert_with(Default::default).max_margin =
                        Some(parse_value(key, value_str)?);
                }
                "search.exhaustive-threshold" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .exhaustive_threshold = Some(parse_value(key, value_str)?);
                }
                "search.random-trials" => {
                    self.search.get_or_insert_with(Default::default).random_trials =
                        Some(parse_value(key, value_str)?);
                }
                "search.refinement-passes" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .refinement_passes = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn design_args(extra: &[&str]) -> DesignArgs {
        let mut argv = vec!["codonopt", "design", "--protein", "MA*"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Design(args) => args,
            other => panic!("expected design command, got {:?}", other),
        }
    }

    #[test]
    fn empty_config_yields_bacterial_defaults() {
        let config = PartialDesignConfig::default()
            .merge_with_cli(&design_args(&[]))
            .unwrap();
        assert_eq!(config, core_config::DesignConfig::for_profile(Profile::Bacterial));
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("design.toml");
        fs::write(
            &path,
            r#"
profile = "eukaryotic"
stop-codon = "TAA"
avoid-patterns = ["7xA"]
verbose = true

[sd]
motifs = ["AGGAGG"]

[search]
seed = 11
random-trials = 50
"#,
        )
        .unwrap();

        let config = PartialDesignConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&design_args(&[]))
            .unwrap();
        assert_eq!(config.profile, Profile::Eukaryotic);
        assert_eq!(config.stop_codon, Codon::OCHRE);
        assert_eq!(config.avoid_patterns, vec!["7xA"]);
        assert_eq!(config.sd_motifs, vec!["AGGAGG"]);
        assert!(config.verbose);
        assert_eq!(config.search.seed, 11);
        assert_eq!(config.search.random_trials, 50);
        assert_eq!(
            config.search.max_iterations,
            core_config::SearchConfig::default().max_iterations
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("design.toml");
        fs::write(&path, "organism = \"yeast\"\n").unwrap();
        let result = PartialDesignConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn flags_override_set_values_which_override_file() {
        let partial: PartialDesignConfig =
            toml::from_str("profile = \"eukaryotic\"\n[search]\nseed = 1\n").unwrap();
        let args = design_args(&[
            "--profile",
            "bacterial",
            "-S",
            "search.seed=5",
            "-S",
            "avoid-patterns=7xC, AAAAAA",
        ]);
        let config = partial.merge_with_cli(&args).unwrap();
        assert_eq!(config.profile, Profile::Bacterial);
        assert_eq!(config.search.seed, 5);
        assert_eq!(config.avoid_patterns, vec!["7xC", "AAAAAA"]);

        let partial: PartialDesignConfig = toml::from_str("[search]\nseed = 1\n").unwrap();
        let args = design_args(&["--seed", "9", "-S", "search.seed=5"]);
        assert_eq!(partial.merge_with_cli(&args).unwrap().search.seed, 9);
    }

    #[test]
    fn avoid_flags_replace_file_patterns() {
        let partial: PartialDesignConfig =
            toml::from_str("avoid-patterns = [\"7xA\"]\n").unwrap();
        let config = partial
            .merge_with_cli(&design_args(&["-a", "GAATTC"]))
            .unwrap();
        assert_eq!(config.avoid_patterns, vec!["GAATTC"]);
    }

    #[test]
    fn invalid_set_values_are_reported() {
        let bad_key = design_args(&["-S", "search.temperature=3"]);
        assert!(matches!(
            PartialDesignConfig::default().merge_with_cli(&bad_key),
            Err(CliError::Config(msg)) if msg.contains("search.temperature")
        ));

        let bad_number = design_args(&["-S", "search.seed=many"]);
        assert!(PartialDesignConfig::default().merge_with_cli(&bad_number).is_err());

        let no_separator = design_args(&["-S", "verbose"]);
        assert!(PartialDesignConfig::default().merge_with_cli(&no_separator).is_err());
    }

    #[test]
    fn invalid_file_values_surface_as_config_errors() {
        let partial: PartialDesignConfig = toml::from_str("stop-codon = \"TAGG\"\n").unwrap();
        assert!(matches!(
            partial.merge_with_cli(&design_args(&[])),
            Err(CliError::Config(_))
        ));

        let partial: PartialDesignConfig = toml::from_str("[search]\nrandom-trials = 0\n").unwrap();
        assert!(matches!(
            partial.merge_with_cli(&design_args(&[])),
            Err(CliError::Config(msg)) if msg.contains("random_trials")
        ));
    }
}
