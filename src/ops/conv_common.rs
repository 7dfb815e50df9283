//! Shared validation and shape arithmetic for convolution lowering.

use crate::error::{Error, Result};

/// Validates that a tensor is 3-dimensional (input activations).
#[inline]
pub fn validate_3d_tensor(shape: &[usize], arg_name: &'static str, op: &'static str) -> Result<()> {
    if shape.len() != 3 {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!("{} expects 3D tensor, got {}D", op, shape.len()),
        });
    }
    Ok(())
}

/// Validates that a tensor is 4-dimensional (convolution weights).
#[inline]
pub fn validate_4d_tensor(shape: &[usize], arg_name: &'static str, op: &'static str) -> Result<()> {
    if shape.len() != 4 {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!("{} expects 4D tensor, got {}D", op, shape.len()),
        });
    }
    Ok(())
}

/// Validates that a dimension is non-zero.
#[inline]
pub fn validate_positive(value: usize, name: &'static str, op: &'static str) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidArgument {
            arg: name,
            reason: format!("{} requires {} > 0, got 0", op, name),
        });
    }
    Ok(())
}

/// Validates that a kernel window fits inside the input plane.
#[inline]
pub fn validate_kernel_fits(
    kernel: (usize, usize),
    input: (usize, usize),
    op: &'static str,
) -> Result<()> {
    if kernel.0 > input.0 || kernel.1 > input.1 {
        return Err(Error::InvalidArgument {
            arg: "kernel",
            reason: format!(
                "{} kernel {}x{} does not fit input {}x{}",
                op, kernel.0, kernel.1, input.0, input.1
            ),
        });
    }
    Ok(())
}

/// Dimensions of one valid, unit-stride convolution lowering.
///
/// Weight layout: `[c_out, c_in, k_h, k_w]`. Input layout: `[c_in, height, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoweringParams {
    /// Output channels
    pub c_out: usize,
    /// Input channels
    pub c_in: usize,
    /// Kernel height
    pub k_h: usize,
    /// Kernel width
    pub k_w: usize,
    /// Input height
    pub height: usize,
    /// Input width
    pub width: usize,
}

impl LoweringParams {
    /// Derive and validate parameters from weight and input shapes.
    pub fn from_shapes(weight_shape: &[usize], input_shape: &[usize]) -> Result<Self> {
        const OP: &str = "lower";
        validate_4d_tensor(weight_shape, "weight", OP)?;
        validate_3d_tensor(input_shape, "input", OP)?;

        let (c_out, c_in, k_h, k_w) = (
            weight_shape[0],
            weight_shape[1],
            weight_shape[2],
            weight_shape[3],
        );
        let (input_c, height, width) = (input_shape[0], input_shape[1], input_shape[2]);

        validate_positive(c_out, "c_out", OP)?;
        validate_positive(c_in, "c_in", OP)?;
        validate_positive(k_h, "kernel_h", OP)?;
        validate_positive(k_w, "kernel_w", OP)?;
        if input_c != c_in {
            return Err(Error::InvalidArgument {
                arg: "input",
                reason: format!(
                    "{} input has {} channels, weight expects C_in = {}",
                    OP, input_c, c_in
                ),
            });
        }
        validate_kernel_fits((k_h, k_w), (height, width), OP)?;

        Ok(Self {
            c_out,
            c_in,
            k_h,
            k_w,
            height,
            width,
        })
    }

    /// Length of one flattened receptive field: `c_in * k_h * k_w`
    #[inline]
    pub fn patch_len(&self) -> usize {
        self.c_in * self.k_h * self.k_w
    }

    /// Output height: `height - k_h + 1`
    #[inline]
    pub fn out_h(&self) -> usize {
        self.height - self.k_h + 1
    }

    /// Output width: `width - k_w + 1`
    #[inline]
    pub fn out_w(&self) -> usize {
        self.width - self.k_w + 1
    }

    /// Number of window positions: `out_h * out_w`
    #[inline]
    pub fn num_patches(&self) -> usize {
        self.out_h() * self.out_w()
    }
}
