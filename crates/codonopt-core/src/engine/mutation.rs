use super::error::EngineError;
use crate::core::models::sequence::{Codon, Location};

/// The codons each position of the design may take. Constraints that pin or restrict codons
/// shrink this space once, up front, so the search never proposes a forbidden codon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSpace {
    choices: Vec<Vec<Codon>>,
}

impl MutationSpace {
    /// Every position may take any of the 64 codons.
    pub fn unconstrained(num_codons: usize) -> Self {
        let all: Vec<Codon> = (0..64).map(Codon::from_table_index).collect();
        Self {
            choices: vec![all; num_codons],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[inline]
    pub fn choices(&self, index: usize) -> &[Codon] {
        &self.choices[index]
    }

    pub fn is_mutable(&self, index: usize) -> bool {
        self.choices[index].len() > 1
    }

    pub fn allows(&self, index: usize, codon: Codon) -> bool {
        self.choices[index].contains(&codon)
    }

    /// Keeps only the codons at `index` accepted by `keep`. Emptying a position means no
    /// sequence can satisfy the constraint named `source`.
    pub fn restrict<F>(&mut self, index: usize, source: &str, keep: F) -> Result<(), EngineError>
    where
        F: Fn(Codon) -> bool,
    {
        let slot = &mut self.choices[index];
        slot.retain(|&codon| keep(codon));
        if slot.is_empty() {
            return Err(EngineError::NoSolution {
                constraint: source.to_string(),
                location: Location::new(index * 3, index * 3 + 3),
            });
        }
        Ok(())
    }

    /// Number of joint assignments of `indices`, saturating at `u64::MAX`.
    pub fn combinations(&self, indices: &[usize]) -> u64 {
        indices.iter().fold(1u64, |acc, &i| {
            acc.saturating_mul(self.choices[i].len() as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_shrinks_choices() {
        let mut space = MutationSpace::unconstrained(2);
        space
            .restrict(0, "test", |c| c.as_bytes()[0] == b'A')
            .unwrap();
        assert_eq!(space.choices(0).len(), 16);
        assert_eq!(space.choices(1).len(), 64);
        assert_eq!(space.combinations(&[0, 1]), 16 * 64);
    }

    #[test]
    fn restrict_to_nothing_is_no_solution() {
        let mut space = MutationSpace::unconstrained(3);
        let err = space.restrict(2, "pin", |_| false).unwrap_err();
        match err {
            EngineError::NoSolution { constraint, location } => {
                assert_eq!(constraint, "pin");
                assert_eq!(location, Location::new(6, 9));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pinned_position_is_not_mutable() {
        let mut space = MutationSpace::unconstrained(1);
        space.restrict(0, "pin", |c| c == Codon::AMBER).unwrap();
        assert!(!space.is_mutable(0));
        assert!(space.allows(0, Codon::AMBER));
    }
}
