use crate::math::matrix::Matrix;

/// One step's worth of data: `inputs` and `targets` share the row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Matrix,
    pub targets: Matrix,
}

impl Batch {
    pub fn new(inputs: Matrix, targets: Matrix) -> Batch {
        Batch { inputs, targets }
    }

    /// Number of items, counted from the targets.
    pub fn len(&self) -> usize {
        self.targets.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_parts(self) -> (Matrix, Matrix) {
        (self.inputs, self.targets)
    }
}

/// A finite, restartable stream of batches.
///
/// Each call to `batches` starts a fresh pass over the underlying dataset.
pub trait BatchSource {
    /// Total item count of the underlying dataset.
    fn dataset_len(&self) -> usize;

    fn batches(&mut self) -> Box<dyn Iterator<Item = Batch> + '_>;
}

/// Pre-built batches, replayed in order on every pass.
impl BatchSource for Vec<Batch> {
    fn dataset_len(&self) -> usize {
        self.iter().map(Batch::len).sum()
    }

    fn batches(&mut self) -> Box<dyn Iterator<Item = Batch> + '_> {
        Box::new(self.iter().cloned())
    }
}
