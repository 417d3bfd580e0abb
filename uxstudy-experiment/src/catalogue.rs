use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{StudyError, StudyResult};

/// Ordered instruction names and the index each one is scored by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionCatalogue {
    names: Vec<String>,
    indices: Vec<usize>,
}

impl InstructionCatalogue {
    pub fn new(names: Vec<String>, indices: Vec<usize>) -> StudyResult<Self> {
        if names.len() != indices.len() {
            return Err(StudyError::Configuration(format!(
                "catalogue has {} names but {} indices",
                names.len(),
                indices.len()
            )));
        }
        if names.is_empty() {
            return Err(StudyError::Configuration("catalogue is empty".into()));
        }
        let mut seen = HashSet::new();
        for &index in &indices {
            if index >= names.len() || !seen.insert(index) {
                return Err(StudyError::Configuration(format!(
                    "catalogue index {index} is duplicated or exceeds the {} names",
                    names.len()
                )));
            }
        }
        Ok(Self { names, indices })
    }

    /// Catalogue whose indices follow name order.
    pub fn from_names(names: Vec<String>) -> StudyResult<Self> {
        let indices = (0..names.len()).collect();
        Self::new(names, indices)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn name_for(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Repeats every index `multiplier` times and shuffles the result. The name
    /// stream is derived from the same permutation, so position `k` of both
    /// streams is always the same trial.
    pub fn build<R: Rng + ?Sized>(&self, multiplier: u32, rng: &mut R) -> StudyResult<TrialSequence> {
        if multiplier == 0 {
            return Err(StudyError::Configuration(
                "instruction multiplier must be at least 1".into(),
            ));
        }
        let mut indices: Vec<usize> = self
            .indices
            .iter()
            .copied()
            .cycle()
            .take(self.indices.len() * multiplier as usize)
            .collect();
        indices.shuffle(rng);

        let names = indices
            .iter()
            .map(|&i| self.names[i].clone())
            .collect();

        Ok(TrialSequence { indices, names })
    }

    /// Checks a pre-generated sequence against this catalogue. Positions past
    /// the shorter stream are only range-checked.
    pub fn check_sequence(&self, sequence: &TrialSequence) -> StudyResult<()> {
        for (k, &index) in sequence.indices().iter().enumerate() {
            let Some(expected) = self.name_for(index) else {
                return Err(StudyError::Configuration(format!(
                    "trial {k} targets index {index}, but the catalogue has {} entries",
                    self.len()
                )));
            };
            match sequence.names().get(k) {
                Some(name) if name != expected => {
                    return Err(StudyError::Configuration(format!(
                        "trial {k} is named {name:?}, but index {index} is {expected:?}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// The trial order for a participant: an index stream and a name stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSequence {
    indices: Vec<usize>,
    names: Vec<String>,
}

impl TrialSequence {
    /// Assembles a sequence from pre-generated streams. Lengths are not checked
    /// here; `check_consistent` reports a mismatch when the sequence is used.
    pub fn from_parts(indices: Vec<usize>, names: Vec<String>) -> Self {
        Self { indices, names }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_at(&self, turn: usize) -> StudyResult<usize> {
        self.indices
            .get(turn)
            .copied()
            .ok_or(StudyError::IndexOutOfRange {
                index: turn,
                len: self.indices.len(),
            })
    }

    pub fn name_at(&self, turn: usize) -> StudyResult<&str> {
        self.names
            .get(turn)
            .map(String::as_str)
            .ok_or(StudyError::IndexOutOfRange {
                index: turn,
                len: self.names.len(),
            })
    }

    pub fn check_consistent(&self) -> StudyResult<()> {
        if self.indices.len() != self.names.len() {
            return Err(StudyError::SequenceLengthMismatch {
                indices: self.indices.len(),
                names: self.names.len(),
            });
        }
        Ok(())
    }
}
