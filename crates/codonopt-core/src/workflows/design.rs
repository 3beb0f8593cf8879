use super::profiles::{Attempt, build_recipe};
use crate::core::translation::{reverse_translate, translate};
use crate::engine::config::DesignConfig;
use crate::engine::error::EngineError;
use crate::engine::problem::DnaOptimizationProblem;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search::OptimizationEngine;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Where a design stands between engine invocations.
#[derive(Debug)]
pub enum AttemptState {
    Attempt1,
    Relaxed,
    Succeeded { sequence: String, attempt: Attempt },
    Failed(EngineError),
}

impl AttemptState {
    /// The attempt to run next, or `None` once the design is finished.
    pub fn pending_attempt(&self) -> Option<Attempt> {
        match self {
            AttemptState::Attempt1 => Some(Attempt::First),
            AttemptState::Relaxed => Some(Attempt::Relaxed),
            AttemptState::Succeeded { .. } | AttemptState::Failed(_) => None,
        }
    }

    /// Applies the outcome of the pending attempt. Only a no-solution failure of the first
    /// attempt moves on to the relaxed attempt, and only when the profile allows it.
    pub fn advance(self, outcome: Result<String, EngineError>, relaxation_allowed: bool) -> Self {
        match (self, outcome) {
            (AttemptState::Attempt1, Ok(sequence)) => AttemptState::Succeeded {
                sequence,
                attempt: Attempt::First,
            },
            (AttemptState::Relaxed, Ok(sequence)) => AttemptState::Succeeded {
                sequence,
                attempt: Attempt::Relaxed,
            },
            (AttemptState::Attempt1, Err(e)) if relaxation_allowed && e.is_no_solution() => {
                AttemptState::Relaxed
            }
            (AttemptState::Attempt1 | AttemptState::Relaxed, Err(e)) => AttemptState::Failed(e),
            (finished, _) => finished,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignOutcome {
    pub sequence: String,
    pub attempt: Attempt,
    /// Constraint and objective summaries of the last attempt, present in verbose mode.
    pub summary: Option<String>,
}

#[instrument(skip_all, name = "design_workflow", fields(profile = %config.profile, residues = protein.len()))]
pub fn design<E>(
    protein: &str,
    config: &DesignConfig,
    engine: &E,
    reporter: &ProgressReporter,
) -> Result<DesignOutcome, EngineError>
where
    E: OptimizationEngine + ?Sized,
{
    let seed = reverse_translate(protein, config.stop_codon)?;
    let relaxation_allowed = config.profile.allows_relaxation();
    let mut state = AttemptState::Attempt1;
    let mut summary = None;

    while let Some(attempt) = state.pending_attempt() {
        info!(%attempt, "Starting design attempt.");
        reporter.message(format!("Design attempt: {attempt}"));

        let recipe = build_recipe(protein, config, attempt)?;
        let mut problem =
            DnaOptimizationProblem::new(&seed, recipe.constraints, recipe.objectives)?;
        let outcome = engine.run(&mut problem, reporter);

        if config.verbose {
            let text = format!(
                "{}{}",
                problem.constraints_text_summary(),
                problem.objectives_text_summary()
            );
            info!("Attempt {attempt} summary:\n{text}");
            summary = Some(text);
        }
        if let Err(e) = &outcome {
            warn!(%attempt, error = %e, "Design attempt failed.");
        }
        state = state.advance(outcome, relaxation_allowed);
    }

    match state {
        AttemptState::Succeeded { sequence, attempt } => {
            if sequence.len() != protein.len() * 3
                || translate(&sequence, config.stop_codon) != protein
            {
                return Err(EngineError::Unresolved { breaches: 1 });
            }
            info!(%attempt, length = sequence.len(), "Design complete.");
            Ok(DesignOutcome {
                sequence,
                attempt,
                summary,
            })
        }
        AttemptState::Failed(e) => Err(e),
        AttemptState::Attempt1 | AttemptState::Relaxed => Err(EngineError::Internal(
            "design loop stopped before reaching a final state".to_string(),
        )),
    }
}

/// Designs every protein independently. Results keep the input order.
#[instrument(skip_all, name = "design_batch", fields(count = proteins.len()))]
pub fn design_batch<E, S>(
    proteins: &[S],
    config: &DesignConfig,
    engine: &E,
    reporter: &ProgressReporter,
) -> Vec<Result<DesignOutcome, EngineError>>
where
    E: OptimizationEngine + ?Sized,
    S: AsRef<str> + Sync,
{
    reporter.report(Progress::PhaseStart { name: "Design" });
    reporter.report(Progress::TaskStart {
        total_steps: proteins.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = proteins.iter();

    #[cfg(feature = "parallel")]
    let iterator = proteins.par_iter();

    let results: Vec<_> = iterator
        .map(|protein| {
            let result = design(protein.as_ref(), config, engine, &ProgressReporter::new());
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(designed = results.len() - failed, failed, "Batch design finished.");
    results
}
