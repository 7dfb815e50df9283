//! Convolution on a block device via lowering

use super::TileEngine;
use super::lowering::lower;
use crate::error::Result;
use crate::runtime::BlockDevice;
use crate::tensor::Tensor;

impl<D: BlockDevice> TileEngine<D> {
    /// Valid, unit-stride convolution executed on the block device
    ///
    /// Lowers `weights` `[C_out, C_in, kH, kW]` and `inputs` `[C_in, H, W]`,
    /// then runs one tiled multiply per patch column. Returns
    /// `[C_out, out_h * out_w]`, the same layout as
    /// [`conv2d_valid`](super::conv2d_valid).
    pub fn conv2d(&mut self, weights: &Tensor, inputs: &Tensor) -> Result<Tensor> {
        let (weight_matrix, patch_matrix) = lower(weights, inputs)?;
        let (c_out, patch_len) = weight_matrix.dims2("conv2d weights")?;
        let (_, num_patches) = patch_matrix.dims2("conv2d patches")?;

        let mut out = Tensor::zeros(&[c_out, num_patches]);
        let mut column = vec![0.0f32; c_out];
        for p in 0..num_patches {
            let patch = patch_matrix.column(p)?;
            self.multiply(weight_matrix.data(), &patch, &mut column, patch_len, c_out)?;
            for (oc, &v) in column.iter().enumerate() {
                out.data_mut()[oc * num_patches + p] = v;
            }
        }
        Ok(out)
    }
}
