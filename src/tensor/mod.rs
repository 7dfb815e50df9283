//! Tensor types
//!
//! This module provides the host `Tensor` type: a contiguous, row-major
//! `f32` array with a small-vector shape.

mod core;
mod shape;

pub use core::Tensor;
pub use shape::Shape;
