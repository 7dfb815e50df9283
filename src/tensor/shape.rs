//! Shape type: dimensions of a tensor

use smallvec::SmallVec;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

/// Stack allocation threshold for dimensions
/// Convolution weights are the largest shapes handled here (4D)
pub(crate) const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Shape(SmallVec<[usize; STACK_DIMS]>);

impl Shape {
    /// View shape as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// Number of dimensions in this shape.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total element count (product of all dimensions).
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Row-major strides, in elements.
    pub fn strides(&self) -> SmallVec<[usize; STACK_DIMS]> {
        let mut strides: SmallVec<[usize; STACK_DIMS]> = SmallVec::from_elem(1, self.0.len());
        for i in (0..self.0.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.0[i + 1];
        }
        strides
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<[usize]> for Shape {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Self(value.iter().copied().collect())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(value: [usize; N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
