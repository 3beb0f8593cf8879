use super::config::SearchConfig;
use super::error::EngineError;
use super::problem::DnaOptimizationProblem;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::sequence::{Codon, Location};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

const SCORE_EPSILON: f64 = 1e-9;

/// A constraint solver. Given a problem it either leaves the problem holding a sequence that
/// satisfies every constraint and returns that sequence, or fails; a failure caused by
/// unsatisfiable constraints is recognizable through [`EngineError::is_no_solution`].
pub trait OptimizationEngine: Sync {
    fn run(
        &self,
        problem: &mut DnaOptimizationProblem,
        reporter: &ProgressReporter,
    ) -> Result<String, EngineError>;
}

/// Breach-by-breach local search followed by greedy per-codon objective refinement.
#[derive(Debug, Clone, Default)]
pub struct LocalSearchEngine {
    config: SearchConfig,
}

impl LocalSearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    fn resolve_constraints(
        &self,
        problem: &mut DnaOptimizationProblem,
        rng: &mut StdRng,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        reporter.report(Progress::PhaseStart {
            name: "Constraint Resolution",
        });
        let initial_cost = problem.total_cost();
        info!(cost = initial_cost, "Starting constraint resolution.");
        reporter.report(Progress::TaskStart {
            total_steps: initial_cost,
        });

        let mut resolved_cost = initial_cost;
        for iteration in 0..self.config.max_iterations {
            let Some((index, breach)) = problem.first_breach() else {
                info!(iterations = iteration, "All constraints satisfied.");
                reporter.report(Progress::TaskFinish);
                reporter.report(Progress::PhaseFinish);
                return Ok(());
            };

            if !self.resolve_breach(problem, breach, rng) {
                let constraint = problem.constraints()[index].to_string();
                info!(%constraint, location = %breach, "Breach could not be resolved.");
                reporter.report(Progress::TaskFinish);
                reporter.report(Progress::PhaseFinish);
                return Err(EngineError::NoSolution {
                    constraint,
                    location: breach,
                });
            }

            let cost = problem.total_cost();
            for _ in cost..resolved_cost {
                reporter.report(Progress::TaskIncrement);
            }
            resolved_cost = resolved_cost.min(cost);
            reporter.report(Progress::StatusUpdate {
                text: format!("Iteration {}, remaining cost: {}", iteration + 1, cost),
            });
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        if problem.all_constraints_pass() {
            Ok(())
        } else {
            Err(EngineError::Convergence {
                iterations: self.config.max_iterations,
            })
        }
    }

    /// Tries windows of growing margin around `breach` until the local constraint cost drops.
    fn resolve_breach(
        &self,
        problem: &mut DnaOptimizationProblem,
        breach: Location,
        rng: &mut StdRng,
    ) -> bool {
        let num_codons = problem.num_codons();
        let span = breach.codon_span();

        for margin in 0..=self.config.max_margin {
            let first = span.start.saturating_sub(margin);
            let last = (span.end + margin).min(num_codons);
            let mutable: Vec<usize> = (first..last)
                .filter(|&i| problem.mutation_space().is_mutable(i))
                .collect();
            if mutable.is_empty() {
                continue;
            }

            let region = Location::new(first * 3, last * 3);
            let current = problem.local_cost(region);
            let combinations = problem.mutation_space().combinations(&mutable);

            let (cost, assignment) = if combinations <= self.config.exhaustive_threshold {
                exhaustive_search(problem, &mutable, region)
            } else {
                random_search(problem, &mutable, region, self.config.random_trials, rng)
            };

            if cost < current {
                for (&index, &codon) in mutable.iter().zip(&assignment) {
                    problem.set_codon(index, codon);
                }
                debug!(
                    location = %breach,
                    margin,
                    before = current,
                    after = cost,
                    "Breach window improved."
                );
                return true;
            }
        }
        false
    }

    fn optimize_objectives(
        &self,
        problem: &mut DnaOptimizationProblem,
        rng: &mut StdRng,
        reporter: &ProgressReporter,
    ) {
        if problem.objectives().is_empty() || self.config.refinement_passes == 0 {
            return;
        }
        reporter.report(Progress::PhaseStart {
            name: "Objective Optimization",
        });
        let initial_score = problem.objective_score();
        info!(score = initial_score, "Starting objective optimization.");

        let mut order: Vec<usize> = (0..problem.num_codons())
            .filter(|&i| problem.mutation_space().is_mutable(i))
            .collect();

        for pass in 0..self.config.refinement_passes {
            order.shuffle(rng);
            reporter.report(Progress::TaskStart {
                total_steps: order.len() as u64,
            });
            let mut changed = 0usize;
            for &index in &order {
                if improve_codon(problem, index) {
                    changed += 1;
                }
                reporter.report(Progress::TaskIncrement);
            }
            reporter.report(Progress::TaskFinish);
            debug!(pass = pass + 1, changed, "Refinement pass complete.");
            if changed == 0 {
                break;
            }
        }

        info!(
            initial = initial_score,
            optimized = problem.objective_score(),
            "Objective optimization finished."
        );
        reporter.report(Progress::PhaseFinish);
    }
}

impl OptimizationEngine for LocalSearchEngine {
    #[instrument(skip_all, name = "local_search")]
    fn run(
        &self,
        problem: &mut DnaOptimizationProblem,
        reporter: &ProgressReporter,
    ) -> Result<String, EngineError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.resolve_constraints(problem, &mut rng, reporter)?;
        self.optimize_objectives(problem, &mut rng, reporter);

        let breaches = problem
            .evaluations()
            .iter()
            .filter(|e| !e.passes())
            .count();
        if breaches > 0 {
            return Err(EngineError::Unresolved { breaches });
        }
        Ok(problem.sequence())
    }
}

/// Tries every joint assignment of `mutable` and returns the cheapest, first found on ties.
/// The problem is left as it was.
fn exhaustive_search(
    problem: &mut DnaOptimizationProblem,
    mutable: &[usize],
    region: Location,
) -> (u64, Vec<Codon>) {
    let original: Vec<Codon> = mutable.iter().map(|&i| problem.codon(i)).collect();
    let mut best = (u64::MAX, original.clone());

    let choices: Vec<Vec<Codon>> = mutable
        .iter()
        .map(|&i| problem.mutation_space().choices(i).to_vec())
        .collect();
    for assignment in choices.into_iter().multi_cartesian_product() {
        for (&index, &codon) in mutable.iter().zip(&assignment) {
            problem.set_codon(index, codon);
        }
        let cost = problem.local_cost(region);
        if cost < best.0 {
            best = (cost, assignment);
            if cost == 0 {
                break;
            }
        }
    }

    for (&index, &codon) in mutable.iter().zip(&original) {
        problem.set_codon(index, codon);
    }
    best
}

/// Hill climbing with single-codon moves; sideways moves are accepted. Returns the best
/// assignment seen and leaves the problem as it was.
fn random_search(
    problem: &mut DnaOptimizationProblem,
    mutable: &[usize],
    region: Location,
    trials: usize,
    rng: &mut StdRng,
) -> (u64, Vec<Codon>) {
    let original: Vec<Codon> = mutable.iter().map(|&i| problem.codon(i)).collect();
    let mut current_cost = problem.local_cost(region);
    let mut best = (current_cost, original.clone());

    for _ in 0..trials {
        let slot = rng.gen_range(0..mutable.len());
        let index = mutable[slot];
        let choices = problem.mutation_space().choices(index);
        let Some(&candidate) = choices.choose(rng) else {
            continue;
        };
        let previous = problem.codon(index);
        if candidate == previous {
            continue;
        }

        problem.set_codon(index, candidate);
        let cost = problem.local_cost(region);
        if cost <= current_cost {
            current_cost = cost;
            if cost < best.0 {
                best = (cost, mutable.iter().map(|&i| problem.codon(i)).collect());
                if cost == 0 {
                    break;
                }
            }
        } else {
            problem.set_codon(index, previous);
        }
    }

    for (&index, &codon) in mutable.iter().zip(&original) {
        problem.set_codon(index, codon);
    }
    best
}

/// Replaces the codon at `index` by the synonym with the best objective score that keeps
/// every nearby constraint satisfied. Returns whether the codon changed.
fn improve_codon(problem: &mut DnaOptimizationProblem, index: usize) -> bool {
    let region = Location::new(index * 3, index * 3 + 3);
    let original = problem.codon(index);
    let baseline_cost = problem.local_cost(region);
    let mut best = (original, problem.local_objective_score(region));

    let choices = problem.mutation_space().choices(index).to_vec();
    for candidate in choices {
        if candidate == original {
            continue;
        }
        problem.set_codon(index, candidate);
        if problem.local_cost(region) <= baseline_cost {
            let score = problem.local_objective_score(region);
            if score > best.1 + SCORE_EPSILON {
                best = (candidate, score);
            }
        }
    }
    problem.set_codon(index, best.0);
    best.0 != original
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codon_usage::{CodonUsageTable, Species};
    use crate::core::patterns::Pattern;
    use crate::core::translation::reverse_translate;
    use crate::engine::constraint::Constraint;
    use crate::engine::objective::{CodonOptimizationMethod, Objective};

    fn engine() -> LocalSearchEngine {
        LocalSearchEngine::new(SearchConfig::default())
    }

    #[test]
    fn removes_pattern_while_keeping_translation() {
        let protein = "MKKKKG";
        let seed = reverse_translate(protein, Codon::AMBER).unwrap();
        let mut problem = DnaOptimizationProblem::new(
            &seed,
            vec![
                Constraint::translation(protein, Codon::AMBER),
                Constraint::AvoidPattern(Pattern::literal("AAGAAG")),
            ],
            vec![],
        )
        .unwrap();
        assert!(!problem.all_constraints_pass());
        let dna = engine().run(&mut problem, &ProgressReporter::new()).unwrap();
        assert!(!dna.contains("AAGAAG"));
        assert_eq!(
            crate::core::translation::translate(&dna, Codon::AMBER),
            protein
        );
    }

    #[test]
    fn impossible_constraint_is_no_solution() {
        let mut problem = DnaOptimizationProblem::new(
            "ATGTGG",
            vec![
                Constraint::translation("MW", Codon::AMBER),
                Constraint::AvoidPattern(Pattern::literal("TGG")),
            ],
            vec![],
        )
        .unwrap();
        let err = engine()
            .run(&mut problem, &ProgressReporter::new())
            .unwrap_err();
        assert!(err.is_no_solution());
    }

    #[test]
    fn refinement_moves_codons_towards_best_usage() {
        let table = CodonUsageTable::for_species(Species::EColi).unwrap();
        let protein = "MLLLL*";
        let mut problem = DnaOptimizationProblem::new(
            "ATGTTATTATTATTATAG",
            vec![Constraint::translation(protein, Codon::AMBER)],
            vec![Objective::CodonOptimize {
                table,
                method: CodonOptimizationMethod::UseBestCodon,
            }],
        )
        .unwrap();
        let dna = engine().run(&mut problem, &ProgressReporter::new()).unwrap();
        assert_eq!(dna, "ATGCTGCTGCTGCTGTAG");
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let protein = "MAGSAGSAGSAGSAGSAGS*";
        let seed = reverse_translate(protein, Codon::AMBER).unwrap();
        let build = || {
            DnaOptimizationProblem::new(
                &seed,
                vec![
                    Constraint::translation(protein, Codon::AMBER),
                    Constraint::EnforceGcContent {
                        min: 0.3,
                        max: 0.65,
                        window: Some(30),
                    },
                ],
                vec![Objective::AvoidHairpins {
                    stem_size: 6,
                    hairpin_window: 60,
                }],
            )
            .unwrap()
        };
        let mut first = build();
        let mut second = build();
        let a = engine().run(&mut first, &ProgressReporter::new()).unwrap();
        let b = engine().run(&mut second, &ProgressReporter::new()).unwrap();
        assert_eq!(a, b);
        assert!(first.all_constraints_pass());
    }
}
