use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::batch::{Batch, BatchSource};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// In-memory dataset split into mini-batches, optionally reshuffled on
/// every pass. The final batch is smaller when the dataset size is not a
/// multiple of `batch_size`.
pub struct DataLoader {
    inputs: Matrix,
    targets: Matrix,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl DataLoader {
    pub fn new(inputs: Matrix, targets: Matrix, batch_size: usize) -> Result<DataLoader> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize);
        }
        if inputs.rows != targets.rows {
            return Err(Error::ShapeMismatch {
                context: "dataset rows",
                expected: (inputs.rows, targets.cols),
                found: targets.shape(),
            });
        }
        Ok(DataLoader {
            inputs,
            targets,
            batch_size,
            shuffle: false,
            rng: StdRng::from_entropy(),
        })
    }

    /// Builds a loader from per-sample rows, the layout most callers hold.
    pub fn from_samples(
        inputs: Vec<Vec<f64>>,
        targets: Vec<Vec<f64>>,
        batch_size: usize,
    ) -> Result<DataLoader> {
        DataLoader::new(Matrix::from_rows(inputs)?, Matrix::from_rows(targets)?, batch_size)
    }

    pub fn shuffled(mut self, shuffle: bool) -> DataLoader {
        self.shuffle = shuffle;
        self
    }

    /// Fixes the shuffle order for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> DataLoader {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_batches(&self) -> usize {
        (self.inputs.rows + self.batch_size - 1) / self.batch_size
    }
}

impl BatchSource for DataLoader {
    fn dataset_len(&self) -> usize {
        self.inputs.rows
    }

    fn batches(&mut self) -> Box<dyn Iterator<Item = Batch> + '_> {
        let mut order: Vec<usize> = (0..self.inputs.rows).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }

        let inputs = &self.inputs;
        let targets = &self.targets;
        let chunks: Vec<Vec<usize>> = order.chunks(self.batch_size).map(<[usize]>::to_vec).collect();
        Box::new(chunks.into_iter().map(move |idx| {
            Batch::new(inputs.select_rows(&idx), targets.select_rows(&idx))
        }))
    }
}
