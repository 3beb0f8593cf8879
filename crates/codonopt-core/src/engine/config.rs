use crate::core::codon_usage::Species;
use crate::core::models::sequence::Codon;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Patterns avoided when the caller does not supply its own list: BsaI and Esp3I sites plus
/// seven-base C and G runs.
pub const DEFAULT_AVOID_PATTERNS: [&str; 4] = ["BsaI_site", "Esp3I_site", "7xC", "7xG"];

/// Shine-Dalgarno-like motifs banned anywhere in a bacterial design.
pub const SD_MOTIFS: [&str; 7] = ["AGGAGG", "GGAGG", "AGGGA", "AGGAG", "GGAG", "AGGA", "GAGG"];

/// Motif list of the relaxed bacterial attempt: the bare `AGGA` gives way to `AAGGA`.
pub const RELAXED_SD_MOTIFS: [&str; 7] =
    ["AGGAGG", "GGAGG", "AGGGA", "AGGAG", "AAGGA", "GGAG", "GAGG"];

/// BsaI and BsmBI recognition sites on both strands.
pub const RESTRICTION_SITES: [&str; 4] = ["GGTCTC", "GAGACC", "CGTCTC", "GAGACG"];

pub const START_CODONS: [&str; 3] = ["ATG", "GTG", "TTG"];

/// Spacer between an SD motif and a start codon, inclusive, used by the functional-SD check.
pub const FUNCTIONAL_SD_SPACER: (usize, usize) = (3, 13);

/// Spacer of the positional `AGGA` ban added by the relaxed bacterial attempt.
pub const RELAXED_SD_SPACER: (usize, usize) = (4, 13);

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// E. coli expression: SD suppression with one relaxation retry.
    Bacterial,
    /// Human expression: rare-codon avoidance and codon-usage matching, no retry.
    Eukaryotic,
}

impl Profile {
    pub fn species(&self) -> Species {
        match self {
            Profile::Bacterial => Species::EColi,
            Profile::Eukaryotic => Species::HSapiens,
        }
    }

    pub fn allows_relaxation(&self) -> bool {
        matches!(self, Profile::Bacterial)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Bacterial => f.write_str("bacterial"),
            Profile::Eukaryotic => f.write_str("eukaryotic"),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bacterial" | "ecoli" | "e_coli" | "e-coli" => Ok(Profile::Bacterial),
            "eukaryotic" | "human" | "h_sapiens" | "h-sapiens" => Ok(Profile::Eukaryotic),
            other => Err(ConfigError::InvalidParameter {
                name: "profile",
                reason: format!("unknown profile '{other}', expected 'bacterial' or 'eukaryotic'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Upper bound on breach-resolution steps before giving up.
    pub max_iterations: usize,
    /// How many extra codons on each side a stuck breach window may grow by.
    pub max_margin: usize,
    /// Windows with at most this many codon combinations are searched exhaustively.
    pub exhaustive_threshold: u64,
    pub random_trials: usize,
    pub refinement_passes: usize,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            max_margin: 3,
            exhaustive_threshold: 20_000,
            random_trials: 2_000,
            refinement_passes: 2,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    pub profile: Profile,
    pub stop_codon: Codon,
    pub avoid_patterns: Vec<String>,
    pub sd_motifs: Vec<String>,
    pub relaxed_sd_motifs: Vec<String>,
    pub verbose: bool,
    pub search: SearchConfig,
}

impl DesignConfig {
    /// The default configuration of `profile`.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            profile,
            stop_codon: Codon::AMBER,
            avoid_patterns: owned(&DEFAULT_AVOID_PATTERNS),
            sd_motifs: owned(&SD_MOTIFS),
            relaxed_sd_motifs: owned(&RELAXED_SD_MOTIFS),
            verbose: false,
            search: SearchConfig::default(),
        }
    }
}

#[derive(Default)]
pub struct DesignConfigBuilder {
    profile: Option<Profile>,
    stop_codon: Option<Codon>,
    avoid_patterns: Option<Vec<String>>,
    sd_motifs: Option<Vec<String>>,
    relaxed_sd_motifs: Option<Vec<String>>,
    verbose: Option<bool>,
    search: Option<SearchConfig>,
}

impl DesignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }
    pub fn stop_codon(mut self, codon: Codon) -> Self {
        self.stop_codon = Some(codon);
        self
    }
    pub fn avoid_patterns(mut self, patterns: Vec<String>) -> Self {
        self.avoid_patterns = Some(patterns);
        self
    }
    pub fn sd_motifs(mut self, motifs: Vec<String>) -> Self {
        self.sd_motifs = Some(motifs);
        self
    }
    pub fn relaxed_sd_motifs(mut self, motifs: Vec<String>) -> Self {
        self.relaxed_sd_motifs = Some(motifs);
        self
    }
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    pub fn build(self) -> Result<DesignConfig, ConfigError> {
        let profile = self
            .profile
            .ok_or(ConfigError::MissingParameter("profile"))?;
        let defaults = DesignConfig::for_profile(profile);

        let search = self.search.unwrap_or(defaults.search);
        if search.random_trials == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "random_trials",
                reason: "must be at least 1".to_string(),
            });
        }
        if search.exhaustive_threshold == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "exhaustive_threshold",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(DesignConfig {
            profile,
            stop_codon: self.stop_codon.unwrap_or(defaults.stop_codon),
            avoid_patterns: self.avoid_patterns.unwrap_or(defaults.avoid_patterns),
            sd_motifs: self.sd_motifs.unwrap_or(defaults.sd_motifs),
            relaxed_sd_motifs: self
                .relaxed_sd_motifs
                .unwrap_or(defaults.relaxed_sd_motifs),
            verbose: self.verbose.unwrap_or(defaults.verbose),
            search,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyConfig {
    pub stop_codon: Codon,
    pub restriction_sites: Vec<String>,
    pub sd_motifs: Vec<String>,
    pub start_codons: Vec<String>,
    pub spacer_min: usize,
    pub spacer_max: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            stop_codon: Codon::AMBER,
            restriction_sites: owned(&RESTRICTION_SITES),
            sd_motifs: owned(&SD_MOTIFS),
            start_codons: owned(&START_CODONS),
            spacer_min: FUNCTIONAL_SD_SPACER.0,
            spacer_max: FUNCTIONAL_SD_SPACER.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_profile() {
        let result = DesignConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("profile")));
    }

    #[test]
    fn builder_fills_defaults() {
        let config = DesignConfigBuilder::new()
            .profile(Profile::Bacterial)
            .build()
            .unwrap();
        assert_eq!(config.stop_codon, Codon::AMBER);
        assert_eq!(config.avoid_patterns, owned(&DEFAULT_AVOID_PATTERNS));
        assert_eq!(config.sd_motifs.len(), 7);
        assert!(!config.verbose);
    }

    #[test]
    fn builder_overrides_are_per_config() {
        let custom = DesignConfigBuilder::new()
            .profile(Profile::Eukaryotic)
            .avoid_patterns(vec!["AAAAAA".to_string()])
            .verbose(true)
            .build()
            .unwrap();
        let default = DesignConfig::for_profile(Profile::Eukaryotic);
        assert_eq!(custom.avoid_patterns, vec!["AAAAAA".to_string()]);
        assert_eq!(default.avoid_patterns, owned(&DEFAULT_AVOID_PATTERNS));
        assert!(custom.verbose);
    }

    #[test]
    fn builder_rejects_zero_random_trials() {
        let search = SearchConfig {
            random_trials: 0,
            ..SearchConfig::default()
        };
        let result = DesignConfigBuilder::new()
            .profile(Profile::Bacterial)
            .search(search)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "random_trials", .. })
        ));
    }

    #[test]
    fn profile_parses_aliases() {
        assert_eq!("human".parse::<Profile>().unwrap(), Profile::Eukaryotic);
        assert_eq!("E_COLI".parse::<Profile>().unwrap(), Profile::Bacterial);
        assert!("plant".parse::<Profile>().is_err());
    }

    #[test]
    fn relaxed_motifs_drop_bare_agga() {
        assert!(SD_MOTIFS.contains(&"AGGA"));
        assert!(!RELAXED_SD_MOTIFS.contains(&"AGGA"));
        assert!(RELAXED_SD_MOTIFS.contains(&"AAGGA"));
    }
}
