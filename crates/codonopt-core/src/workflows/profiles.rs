use super::constraints::{
    build_avoid_constraints, build_gc_constraints, build_positional_sd_constraint,
    build_sd_constraints, build_stop_constraints, build_translation_constraint,
};
use crate::core::codon_usage::CodonUsageTable;
use crate::engine::config::{DesignConfig, Profile};
use crate::engine::constraint::Constraint;
use crate::engine::error::EngineError;
use crate::engine::objective::{CodonOptimizationMethod, Objective};
use std::fmt;

pub const BACTERIAL_GC_BOUNDS: (f64, f64) = (0.30, 0.65);
pub const EUKARYOTIC_GLOBAL_GC_BOUNDS: (f64, f64) = (0.25, 0.60);
pub const EUKARYOTIC_WINDOW_GC_BOUNDS: (f64, f64) = (0.20, 0.75);
pub const GC_WINDOW: usize = 50;
pub const RARE_CODON_THRESHOLD: f64 = 0.10;
pub const HAIRPIN_STEM_SIZE: usize = 8;
pub const HAIRPIN_WINDOW: usize = 200;

/// Which of the two design attempts a recipe is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attempt {
    First,
    Relaxed,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::First => f.write_str("first"),
            Attempt::Relaxed => f.write_str("relaxed"),
        }
    }
}

/// Constraints and objectives handed to the engine for one attempt.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub constraints: Vec<Constraint>,
    pub objectives: Vec<Objective>,
}

pub fn build_recipe(
    protein: &str,
    config: &DesignConfig,
    attempt: Attempt,
) -> Result<Recipe, EngineError> {
    let table = CodonUsageTable::for_species(config.profile.species())?;
    let hairpins = Objective::AvoidHairpins {
        stem_size: HAIRPIN_STEM_SIZE,
        hairpin_window: HAIRPIN_WINDOW,
    };
    let mut constraints = build_avoid_constraints(&config.avoid_patterns)?;

    let objectives = match config.profile {
        Profile::Bacterial => {
            match attempt {
                Attempt::First => constraints.extend(build_sd_constraints(&config.sd_motifs)?),
                Attempt::Relaxed => {
                    constraints.extend(build_sd_constraints(&config.relaxed_sd_motifs)?);
                    constraints.push(build_positional_sd_constraint()?);
                }
            }
            constraints.extend(build_stop_constraints(protein, config.stop_codon));
            let (min, max) = BACTERIAL_GC_BOUNDS;
            constraints.extend(build_gc_constraints(min, max, Some(GC_WINDOW)));
            vec![
                Objective::CodonOptimize {
                    table,
                    method: CodonOptimizationMethod::UseBestCodon,
                },
                hairpins,
            ]
        }
        Profile::Eukaryotic => {
            constraints.push(Constraint::AvoidRareCodons {
                table: table.clone(),
                min_frequency: RARE_CODON_THRESHOLD,
            });
            let (min, max) = EUKARYOTIC_GLOBAL_GC_BOUNDS;
            constraints.extend(build_gc_constraints(min, max, None));
            let (min, max) = EUKARYOTIC_WINDOW_GC_BOUNDS;
            constraints.extend(build_gc_constraints(min, max, Some(GC_WINDOW)));
            vec![
                Objective::CodonOptimize {
                    table,
                    method: CodonOptimizationMethod::MatchCodonUsage,
                },
                hairpins,
            ]
        }
    };
    constraints.push(build_translation_constraint(protein, config.stop_codon));

    Ok(Recipe {
        constraints,
        objectives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(recipe: &Recipe) -> Vec<String> {
        recipe.constraints.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn bacterial_first_attempt_bans_bare_agga() {
        let config = DesignConfig::for_profile(Profile::Bacterial);
        let recipe = build_recipe("MA*G", &config, Attempt::First).unwrap();
        let labels = labels(&recipe);
        assert!(labels.contains(&"AvoidPattern[AGGA]".to_string()));
        assert!(labels.contains(&"EnforceSequence[6-9](TAG)".to_string()));
        assert!(labels.contains(&"EnforceGCContent[0.30-0.65, window 50]".to_string()));
        assert_eq!(labels.len(), 4 + 7 + 1 + 1 + 1);
        assert_eq!(recipe.objectives.len(), 2);
    }

    #[test]
    fn bacterial_relaxed_attempt_swaps_motifs_and_adds_positional_ban() {
        let config = DesignConfig::for_profile(Profile::Bacterial);
        let labels = labels(&build_recipe("MA", &config, Attempt::Relaxed).unwrap());
        assert!(!labels.contains(&"AvoidPattern[AGGA]".to_string()));
        assert!(labels.contains(&"AvoidPattern[AAGGA]".to_string()));
        assert!(labels.iter().any(|l| l.contains("AGGA[ACGT]{4,13}(ATG|GTG)")));
    }

    #[test]
    fn eukaryotic_recipe_has_rare_codons_and_two_gc_bounds() {
        let config = DesignConfig::for_profile(Profile::Eukaryotic);
        let recipe = build_recipe("MA*", &config, Attempt::First).unwrap();
        let labels = labels(&recipe);
        assert!(labels.contains(&"AvoidRareCodons[h_sapiens, min 0.10]".to_string()));
        assert!(labels.contains(&"EnforceGCContent[0.25-0.60, global]".to_string()));
        assert!(labels.contains(&"EnforceGCContent[0.20-0.75, window 50]".to_string()));
        assert!(!labels.iter().any(|l| l.starts_with("EnforceSequence")));
        assert!(
            recipe.objectives[0]
                .to_string()
                .contains("match_codon_usage")
        );
    }
}
