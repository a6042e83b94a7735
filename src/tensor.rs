use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::error::{Error, Result};

/// Dense row-major 2-D tensor. Element (r, c) lives at data[r * cols + c]
/// and data.len() == rows * cols holds for every constructed value.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub data: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl Tensor {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Result<Tensor> {
        if rows == 0 || cols == 0 {
            return Err(Error::Shape(format!(
                "zero-extent {}x{} tensor is not allowed",
                rows, cols
            )));
        }
        if data.len() != rows * cols {
            return Err(Error::Shape(format!(
                "data length {} does not match {}x{} tensor",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Tensor { data, rows, cols })
    }

    /// Builds a tensor from nested rows. Fails on an empty outer vector or
    /// ragged inner rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Tensor> {
        let num_rows = rows.len();
        if num_rows == 0 {
            return Err(Error::Shape("cannot build a tensor from zero rows".to_string()));
        }
        let num_cols = rows[0].len();
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in &rows {
            if row.len() != num_cols {
                return Err(Error::Shape(format!(
                    "ragged rows: expected {} columns, found {}",
                    num_cols,
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Tensor::new(data, num_rows, num_cols)
    }

    pub fn scalar(value: f64) -> Tensor {
        Tensor { data: vec![value], rows: 1, cols: 1 }
    }

    pub fn zeros(rows: usize, cols: usize) -> Tensor {
        Tensor { data: vec![0.0; rows * cols], rows, cols }
    }

    pub fn ones(rows: usize, cols: usize) -> Tensor {
        Tensor { data: vec![1.0; rows * cols], rows, cols }
    }

    /// Uniform random fill in [-0.5, 0.5) from an explicitly seeded Pcg64,
    /// so identical seeds reproduce identical tensors.
    pub fn random(rows: usize, cols: usize, seed: u64) -> Tensor {
        let mut rng = Pcg64::seed_from_u64(seed);
        let uniform = Uniform::new(-0.5, 0.5);
        let data = (0..rows * cols)
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<f64>>();
        Tensor { data, rows, cols }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Index { row, col, rows: self.rows, cols: self.cols });
        }
        Ok(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Index { row, col, rows: self.rows, cols: self.cols });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    #[allow(dead_code)]
    pub fn print(&self) {
        for r in 0..self.rows {
            for c in 0..self.cols {
                print!("{:.5} ", self.data[r * self.cols + c]);
            }
            println!();
        }
    }

    /// Standard matrix product. result(i, k) = sum over j of
    /// self(i, j) * other(j, k).
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        if self.cols != other.rows {
            return Err(Error::Shape(format!(
                "matmul: {}x{} * {}x{} dimension mismatch",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                let a = self.data[i * self.cols + j];
                for k in 0..other.cols {
                    data[i * other.cols + k] += a * other.data[j * other.cols + k];
                }
            }
        }
        Tensor::new(data, self.rows, other.cols)
    }

    pub fn transpose(&self) -> Tensor {
        let mut data = vec![0.0; self.rows * self.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                data[k * self.rows + i] = self.data[i * self.cols + k];
            }
        }
        Tensor { data, rows: self.cols, cols: self.rows }
    }

    /// Elementwise combination with broadcasting: each axis must either match
    /// or be 1 on one side; the output extent is the max of the two. A 1x1
    /// tensor broadcasts against anything.
    fn broadcast_with<F>(&self, other: &Tensor, op: F) -> Result<Tensor>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_nonempty()?;
        other.check_nonempty()?;
        let rows_compatible =
            self.rows == other.rows || self.rows == 1 || other.rows == 1;
        let cols_compatible =
            self.cols == other.cols || self.cols == 1 || other.cols == 1;
        if !rows_compatible || !cols_compatible {
            return Err(Error::Shape(format!(
                "cannot broadcast {}x{} against {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let out_rows = self.rows.max(other.rows);
        let out_cols = self.cols.max(other.cols);
        let mut data = Vec::with_capacity(out_rows * out_cols);
        for r in 0..out_rows {
            // An extent-1 axis always indexes 0; a matching axis indexes r/c.
            let ra = r % self.rows;
            let rb = r % other.rows;
            for c in 0..out_cols {
                let a = self.data[ra * self.cols + c % self.cols];
                let b = other.data[rb * other.cols + c % other.cols];
                data.push(op(a, b));
            }
        }
        Tensor::new(data, out_rows, out_cols)
    }

    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, |a, b| a - b)
    }

    /// Hadamard (elementwise) product.
    pub fn multiply(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, |a, b| a * b)
    }

    pub fn divide(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, |a, b| a / b)
    }

    /// Maps every element through `f`, returning a new tensor.
    pub fn apply<F>(&self, f: F) -> Tensor
    where
        F: Fn(f64) -> f64,
    {
        let data = self.data.iter().map(|&x| f(x)).collect();
        Tensor { data, rows: self.rows, cols: self.cols }
    }

    pub fn scale(&self, scalar: f64) -> Tensor {
        self.apply(|x| x * scalar)
    }

    pub fn square(&self) -> Tensor {
        self.apply(|x| x * x)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.sum() / self.size() as f64
    }

    // The fill constructors are infallible, so a zero-extent tensor can
    // still reach the operations that index along an axis.
    fn check_nonempty(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::Shape(format!(
                "operation on zero-extent {}x{} tensor",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    fn check_axis(&self, axis: usize) -> Result<()> {
        if axis > 1 {
            return Err(Error::Shape(format!("axis must be 0 or 1, got {}", axis)));
        }
        Ok(())
    }

    /// Sums along an axis: axis 0 collapses rows (1 x cols result), axis 1
    /// collapses columns (rows x 1 result).
    pub fn sum_axis(&self, axis: usize) -> Result<Tensor> {
        self.check_axis(axis)?;
        if axis == 0 {
            let mut data = vec![0.0; self.cols];
            for r in 0..self.rows {
                for c in 0..self.cols {
                    data[c] += self.data[r * self.cols + c];
                }
            }
            Tensor::new(data, 1, self.cols)
        } else {
            let mut data = vec![0.0; self.rows];
            for r in 0..self.rows {
                for c in 0..self.cols {
                    data[r] += self.data[r * self.cols + c];
                }
            }
            Tensor::new(data, self.rows, 1)
        }
    }

    pub fn mean_axis(&self, axis: usize) -> Result<Tensor> {
        let sums = self.sum_axis(axis)?;
        let divisor = if axis == 0 { self.rows } else { self.cols };
        Ok(sums.scale(1.0 / divisor as f64))
    }

    /// Index of the largest element along an axis, as an integer-valued
    /// tensor. The first maximal element wins ties.
    pub fn argmax(&self, axis: usize) -> Result<Tensor> {
        self.check_nonempty()?;
        self.check_axis(axis)?;
        if axis == 0 {
            let mut data = vec![0.0; self.cols];
            for c in 0..self.cols {
                let mut max_val = f64::NEG_INFINITY;
                let mut max_idx = 0;
                for r in 0..self.rows {
                    let entry = self.data[r * self.cols + c];
                    if entry > max_val {
                        max_val = entry;
                        max_idx = r;
                    }
                }
                data[c] = max_idx as f64;
            }
            Tensor::new(data, 1, self.cols)
        } else {
            let mut data = vec![0.0; self.rows];
            for r in 0..self.rows {
                let mut max_val = f64::NEG_INFINITY;
                let mut max_idx = 0;
                for c in 0..self.cols {
                    let entry = self.data[r * self.cols + c];
                    if entry > max_val {
                        max_val = entry;
                        max_idx = c;
                    }
                }
                data[r] = max_idx as f64;
            }
            Tensor::new(data, self.rows, 1)
        }
    }

    pub fn max_axis(&self, axis: usize) -> Result<Tensor> {
        let indices = self.argmax(axis)?;
        let mut max_vals = Tensor::zeros(indices.rows, indices.cols);
        if axis == 0 {
            for c in 0..self.cols {
                let r = indices.data[c] as usize;
                max_vals.data[c] = self.data[r * self.cols + c];
            }
        } else {
            for r in 0..self.rows {
                let c = indices.data[r] as usize;
                max_vals.data[r] = self.data[r * self.cols + c];
            }
        }
        Ok(max_vals)
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|x| x.is_nan())
    }
}
