//! Core Tensor type

use super::Shape;
use crate::error::{Error, Result};
use std::fmt;

/// Host-resident, row-major `f32` tensor
///
/// `Tensor` is the in-memory form of every operand in tilemv: the large
/// matrix fed to the tile engine, convolution weights `[C_out, C_in, kH, kW]`,
/// input activations `[C_in, H, W]`, and the lowered 2D matrices.
///
/// Storage is always contiguous. There are no views; slicing happens on the
/// `&[f32]` returned by [`Tensor::data`].
///
/// # Example
///
/// ```
/// use tilemv::tensor::Tensor;
///
/// let a = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// assert_eq!(a.shape(), &[2, 2]);
/// assert_eq!(a.get(&[1, 0]), Some(3.0));
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
}

impl Tensor {
    /// Create a tensor by copying `data` with the given shape
    ///
    /// Returns `ShapeMismatch` if `data.len()` differs from the shape's element count.
    pub fn from_slice(data: &[f32], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor taking ownership of `data`
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let shape = Shape::from(shape);
        let expected = shape.elem_count();
        if data.len() != expected {
            return Err(Error::shape_mismatch(&[expected], &[data.len()]));
        }
        Ok(Self { data, shape })
    }

    /// Create a zero-filled tensor
    pub fn zeros(shape: &[usize]) -> Self {
        let shape = Shape::from(shape);
        Self {
            data: vec![0.0; shape.elem_count()],
            shape,
        }
    }

    /// Get the tensor shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element storage
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major element storage
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor, returning its storage
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Flat offset of a multi-dimensional index, or `None` if out of bounds
    pub fn offset_of(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.ndim() {
            return None;
        }
        let strides = self.shape.strides();
        let mut offset = 0;
        for ((&i, &dim), &stride) in index.iter().zip(self.shape.iter()).zip(strides.iter()) {
            if i >= dim {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// Read one element by multi-dimensional index
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.offset_of(index).map(|off| self.data[off])
    }

    /// Borrow row `r` of a 2D tensor
    pub fn row(&self, r: usize) -> Result<&[f32]> {
        let (rows, cols) = self.dims2("row")?;
        if r >= rows {
            return Err(Error::invalid_argument(
                "row",
                format!("row {} out of bounds for {} rows", r, rows),
            ));
        }
        Ok(&self.data[r * cols..(r + 1) * cols])
    }

    /// Copy column `c` of a 2D tensor
    pub fn column(&self, c: usize) -> Result<Vec<f32>> {
        let (_, cols) = self.dims2("column")?;
        if c >= cols {
            return Err(Error::invalid_argument(
                "column",
                format!("column {} out of bounds for {} columns", c, cols),
            ));
        }
        Ok(self.data.iter().skip(c).step_by(cols).copied().collect())
    }

    /// Dense 2D matrix multiply: `[m, k] x [k, n] -> [m, n]`
    ///
    /// Plain triple loop; used as the reference product for lowered matrices.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        let (m, k) = self.dims2("matmul lhs")?;
        let (k2, n) = other.dims2("matmul rhs")?;
        if k != k2 {
            return Err(Error::shape_mismatch(&[k, n], other.shape()));
        }

        let mut out = vec![0.0f32; m * n];
        for i in 0..m {
            let lhs_row = &self.data[i * k..(i + 1) * k];
            let out_row = &mut out[i * n..(i + 1) * n];
            for (p, &a) in lhs_row.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                let rhs_row = &other.data[p * n..(p + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        Tensor::from_vec(out, &[m, n])
    }

    pub(crate) fn dims2(&self, op: &'static str) -> Result<(usize, usize)> {
        match *self.shape.as_slice() {
            [rows, cols] => Ok((rows, cols)),
            _ => Err(Error::invalid_argument(
                op,
                format!("expects 2D tensor, got {}D", self.ndim()),
            )),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("numel", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_validates_len() {
        assert!(Tensor::from_slice(&[1.0, 2.0, 3.0], &[2, 2]).is_err());
        let t = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.get(&[1, 2]), Some(6.0));
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0]), None);
    }

    #[test]
    fn test_zeros_and_storage() {
        let mut t = Tensor::zeros(&[2, 0, 3]);
        assert_eq!(t.numel(), 0);
        assert!(t.is_empty());

        t = Tensor::zeros(&[3, 2]);
        assert_eq!((t.ndim(), t.numel()), (2, 6));
        t.data_mut()[5] = 1.5;
        assert_eq!(t.into_vec(), vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.5]);
    }

    #[test]
    fn test_row_and_column() {
        let t = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.row(1).unwrap(), &[4.0, 5.0, 6.0]);
        assert_eq!(t.column(1).unwrap(), vec![2.0, 5.0]);
        assert!(t.column(3).is_err());
    }

    #[test]
    fn test_matmul() {
        let a = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = Tensor::from_slice(&[5.0, 6.0, 7.0, 8.0], &[2, 2]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_inner_dim_mismatch() {
        let a = Tensor::zeros(&[2, 3]);
        let b = Tensor::zeros(&[2, 3]);
        assert!(matches!(a.matmul(&b), Err(Error::ShapeMismatch { .. })));
    }
}
