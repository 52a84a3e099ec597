//! Dense Jacobians from a recorded tape.

use std::fmt;
use std::ops::{Index, IndexMut};

use num_traits::{Float, One, Zero};

use crate::errors::{ADError, Result};
use crate::gradient::{dim, Gradient};
use crate::identifier::Identifier;
use crate::tape::JacobianTape;

/// Row-major `outputs x inputs` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Jacobian<R> {
    rows: usize,
    cols: usize,
    data: Vec<R>,
}

impl<R: Float> Jacobian<R> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![R::zero(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<R> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: R) {
        self[(row, col)] = value;
    }

    pub fn row(&self, row: usize) -> &[R] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Sets every entry to zero.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|v| *v = R::zero());
    }
}

impl<R> Index<(usize, usize)> for Jacobian<R> {
    type Output = R;
    fn index(&self, (row, col): (usize, usize)) -> &R {
        &self.data[row * self.cols + col]
    }
}

impl<R> IndexMut<(usize, usize)> for Jacobian<R> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut R {
        &mut self.data[row * self.cols + col]
    }
}

impl<R: Float + fmt::Display> fmt::Display for Jacobian<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let entries: Vec<String> = self.row(row).iter().map(|v| v.to_string()).collect();
            writeln!(f, "[{}]", entries.join(", "))?;
        }
        Ok(())
    }
}

/// Computes `d outputs / d inputs` by reverse sweeps over `tape`.
///
/// Each sweep seeds `dim::<G>()` outputs at once, so a tape with
/// [`crate::gradient::Direction`] gradients needs `outputs / N` sweeps
/// instead of one per output.
pub fn compute_jacobian<G: Gradient>(
    tape: &mut JacobianTape<G>,
    inputs: &[Identifier],
    outputs: &[Identifier],
) -> Result<Jacobian<G::Real>> {
    let mut jacobian = Jacobian::new(outputs.len(), inputs.len());
    fill_jacobian(tape, inputs, outputs, &mut jacobian)?;
    Ok(jacobian)
}

/// Like [`compute_jacobian`], writing into an existing matrix of shape
/// `outputs.len() x inputs.len()`.
///
/// Rows of passive outputs and columns of passive inputs are zero. The
/// adjoints of `tape` are cleared before every sweep and once more at the
/// end.
pub fn fill_jacobian<G: Gradient>(
    tape: &mut JacobianTape<G>,
    inputs: &[Identifier],
    outputs: &[Identifier],
    jacobian: &mut Jacobian<G::Real>,
) -> Result<()> {
    let expected = (outputs.len(), inputs.len());
    if jacobian.shape() != expected {
        return Err(ADError::DimensionMismatch {
            expected,
            received: jacobian.shape(),
        });
    }
    jacobian.clear();

    let width = dim::<G>();
    for (chunk, rows) in outputs.chunks(width).enumerate() {
        log::debug!("jacobian sweep {chunk} over {} outputs", rows.len());
        tape.clear_adjoints();
        for (direction, &output) in rows.iter().enumerate() {
            if !output.is_active() {
                continue;
            }
            let mut seed = tape.gradient(output)?;
            *seed.at_mut(direction) = *seed.at_mut(direction) + G::Real::one();
            tape.seed(output, seed)?;
        }

        tape.evaluate();

        for (col, &input) in inputs.iter().enumerate() {
            if !input.is_active() {
                continue;
            }
            let gradient = tape.gradient(input)?;
            for direction in 0..rows.len() {
                let value = gradient.at(direction);
                if !value.is_zero() {
                    jacobian[(chunk * width + direction, col)] = value;
                }
            }
        }
    }
    tape.clear_adjoints();
    Ok(())
}
