use crate::error::Result;
use crate::math::matrix::Matrix;

/// A compute target that batches are moved onto before a step.
pub trait Device {
    fn transfer(&self, tensor: Matrix) -> Result<Matrix>;
}

/// Host memory; transfers are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cpu;

impl Device for Cpu {
    fn transfer(&self, tensor: Matrix) -> Result<Matrix> {
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_transfer_is_identity() {
        let m = Matrix::from_rows(vec![vec![0.25, -1.0], vec![3.0, 0.0]]).unwrap();
        assert_eq!(Cpu.transfer(m.clone()).unwrap(), m);
    }
}
