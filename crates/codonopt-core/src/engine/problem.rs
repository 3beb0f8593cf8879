use super::constraint::{Constraint, Evaluation};
use super::error::EngineError;
use super::mutation::MutationSpace;
use super::objective::Objective;
use crate::core::models::sequence::{Codon, Location, normalize_dna};
use std::fmt::Write;

/// A sequence under optimization together with the constraints it must meet and the
/// objectives it should maximize.
#[derive(Debug, Clone)]
pub struct DnaOptimizationProblem {
    sequence: Vec<u8>,
    codons: Vec<Codon>,
    constraints: Vec<Constraint>,
    objectives: Vec<Objective>,
    mutation_space: MutationSpace,
}

impl DnaOptimizationProblem {
    /// Builds the problem and its mutation space. Seed codons the space forbids are replaced
    /// by the first allowed codon.
    pub fn new(
        sequence: &str,
        constraints: Vec<Constraint>,
        objectives: Vec<Objective>,
    ) -> Result<Self, EngineError> {
        let bases = normalize_dna(sequence)?;
        if bases.len() % 3 != 0 {
            return Err(EngineError::FrameLength(bases.len()));
        }

        let codons = bases
            .chunks_exact(3)
            .map(Codon::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;

        let mut mutation_space = MutationSpace::unconstrained(codons.len());
        for constraint in &constraints {
            constraint.restrict(&mut mutation_space)?;
        }

        let mut problem = Self {
            sequence: bases,
            codons,
            constraints,
            objectives,
            mutation_space,
        };
        for index in 0..problem.codons.len() {
            let current = problem.codons[index];
            if !problem.mutation_space.allows(index, current) {
                let replacement = problem.mutation_space.choices(index)[0];
                problem.set_codon(index, replacement);
            }
        }
        Ok(problem)
    }

    pub fn sequence(&self) -> String {
        String::from_utf8_lossy(&self.sequence).into_owned()
    }

    #[inline]
    pub fn bases(&self) -> &[u8] {
        &self.sequence
    }

    #[inline]
    pub fn num_codons(&self) -> usize {
        self.codons.len()
    }

    #[inline]
    pub fn codon(&self, index: usize) -> Codon {
        self.codons[index]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn mutation_space(&self) -> &MutationSpace {
        &self.mutation_space
    }

    pub(crate) fn set_codon(&mut self, index: usize, codon: Codon) {
        self.codons[index] = codon;
        self.sequence[index * 3..index * 3 + 3].copy_from_slice(codon.as_bytes());
    }

    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.constraints
            .iter()
            .map(|c| c.evaluate(&self.sequence))
            .collect()
    }

    pub fn total_cost(&self) -> u64 {
        self.evaluations().iter().map(|e| e.cost).sum()
    }

    /// Sum of constraint costs that bases in `region` can influence.
    pub fn local_cost(&self, region: Location) -> u64 {
        self.constraints
            .iter()
            .map(|c| c.local_cost(&self.sequence, region))
            .sum()
    }

    pub fn objective_score(&self) -> f64 {
        self.objectives
            .iter()
            .map(|o| o.score(&self.sequence))
            .sum()
    }

    pub fn local_objective_score(&self, region: Location) -> f64 {
        self.objectives
            .iter()
            .map(|o| o.local_score(&self.sequence, region))
            .sum()
    }

    pub fn all_constraints_pass(&self) -> bool {
        self.constraints
            .iter()
            .all(|c| c.evaluate(&self.sequence).passes())
    }

    /// The first breach of the first failing constraint, in constraint order.
    pub fn first_breach(&self) -> Option<(usize, Location)> {
        self.constraints.iter().enumerate().find_map(|(i, c)| {
            c.evaluate(&self.sequence)
                .breaches
                .first()
                .map(|location| (i, *location))
        })
    }

    pub fn constraints_text_summary(&self) -> String {
        let evaluations = self.evaluations();
        let passing = evaluations.iter().filter(|e| e.passes()).count();
        let mut out = String::new();
        let verdict = if passing == evaluations.len() {
            "SUCCESS - all constraints evaluations pass"
        } else {
            "FAILURE - some constraints evaluations fail"
        };
        let _ = writeln!(
            out,
            "===> {verdict} ({passing}/{} passing)",
            evaluations.len()
        );
        for (constraint, eval) in self.constraints.iter().zip(&evaluations) {
            if eval.passes() {
                let _ = writeln!(out, "  PASS  {constraint}");
            } else {
                let locations: Vec<String> =
                    eval.breaches.iter().take(5).map(|l| l.to_string()).collect();
                let more = eval.breaches.len().saturating_sub(locations.len());
                let _ = write!(
                    out,
                    "  FAIL  {constraint}: {} breach(es) at {}",
                    eval.breaches.len(),
                    locations.join(", ")
                );
                if more > 0 {
                    let _ = write!(out, " and {more} more");
                }
                out.push('\n');
            }
        }
        out
    }

    pub fn objectives_text_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "===> TOTAL OBJECTIVES SCORE: {:.2}", self.objective_score());
        for objective in &self.objectives {
            let _ = writeln!(
                out,
                "  {:>9.2}  {objective}",
                objective.score(&self.sequence)
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns::Pattern;

    #[test]
    fn new_rejects_bad_input() {
        assert!(matches!(
            DnaOptimizationProblem::new("ATGN", vec![], vec![]),
            Err(EngineError::InvalidSequence(_))
        ));
        assert!(matches!(
            DnaOptimizationProblem::new("ATGA", vec![], vec![]),
            Err(EngineError::FrameLength(4))
        ));
    }

    #[test]
    fn new_snaps_seed_into_mutation_space() {
        let problem = DnaOptimizationProblem::new(
            "ATGTAA",
            vec![Constraint::translation("M*", Codon::AMBER)],
            vec![],
        )
        .unwrap();
        assert_eq!(problem.sequence(), "ATGTAG");
        assert!(problem.all_constraints_pass());
    }

    #[test]
    fn first_breach_follows_constraint_order() {
        let problem = DnaOptimizationProblem::new(
            "AGGAGGAAA",
            vec![
                Constraint::AvoidPattern(Pattern::literal("GAAA")),
                Constraint::AvoidPattern(Pattern::literal("AGGA")),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(problem.first_breach(), Some((0, Location::new(5, 9))));
        assert_eq!(problem.total_cost(), 3);
    }

    #[test]
    fn summaries_report_pass_and_fail() {
        let problem = DnaOptimizationProblem::new(
            "AGGATT",
            vec![
                Constraint::AvoidPattern(Pattern::literal("AGGA")),
                Constraint::AvoidPattern(Pattern::literal("CCCC")),
            ],
            vec![],
        )
        .unwrap();
        let summary = problem.constraints_text_summary();
        assert!(summary.contains("FAILURE"));
        assert!(summary.contains("FAIL  AvoidPattern[AGGA]: 1 breach(es) at 0-4"));
        assert!(summary.contains("PASS  AvoidPattern[CCCC]"));
        assert!(problem.objectives_text_summary().contains("TOTAL OBJECTIVES SCORE"));
    }
}
