use crate::prelude::{PipelineError, PipelineResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const SLOTS_PER_DATASET: usize = 3;

/// Timestamp slots the detection backend has imagery for.
pub const DATASETS: [[&str; SLOTS_PER_DATASET]; 4] = [
    [
        "2025-11-08-15-30-00",
        "2025-11-08-15-40-00",
        "2025-11-08-15-50-00",
    ],
    [
        "2025-10-21-09-00-00",
        "2025-10-21-09-10-00",
        "2025-10-21-09-20-00",
    ],
    [
        "2025-09-14-11-15-00",
        "2025-09-14-11-25-00",
        "2025-09-14-11-35-00",
    ],
    [
        "2025-08-30-13-45-00",
        "2025-08-30-13-55-00",
        "2025-08-30-14-05-00",
    ],
];

pub const DEFAULT_DATASET_INDEX: usize = 3;

/// The single choice point for which dataset a run replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSelection {
    Fixed {
        index: usize,
    },
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Default for DatasetSelection {
    fn default() -> Self {
        DatasetSelection::Fixed {
            index: DEFAULT_DATASET_INDEX,
        }
    }
}

impl DatasetSelection {
    pub fn validate(&self) -> PipelineResult<()> {
        match self {
            DatasetSelection::Fixed { index } if *index >= DATASETS.len() => {
                Err(PipelineError::Config(format!(
                    "dataset index {} out of range (0..{})",
                    index,
                    DATASETS.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Returns the chosen index and its slots.
    pub fn select(&self) -> PipelineResult<(usize, &'static [&'static str; SLOTS_PER_DATASET])> {
        self.validate()?;
        let index = match self {
            DatasetSelection::Fixed { index } => *index,
            DatasetSelection::Random { seed: Some(seed) } => {
                StdRng::seed_from_u64(*seed).gen_range(0..DATASETS.len())
            }
            DatasetSelection::Random { seed: None } => rand::thread_rng().gen_range(0..DATASETS.len()),
        };
        Ok((index, &DATASETS[index]))
    }
}
