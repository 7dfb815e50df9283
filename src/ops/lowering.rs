//! Convolution lowering (im2col)
//!
//! Rewrites a valid, unit-stride 2D convolution as one matrix product:
//!
//! ```text
//! weights [C_out, C_in, kH, kW]  -> weight matrix [C_out, C_in*kH*kW]
//! inputs  [C_in, H, W]           -> patch matrix  [C_in*kH*kW, (H-kH+1)*(W-kW+1)]
//! weight matrix x patch matrix   == conv2d(inputs, weights) as [C_out, out_h*out_w]
//! ```
//!
//! Both matrices index the receptive field the same way: input channel
//! major, then kernel row, then kernel column. Patch columns enumerate window
//! positions `(y, x)` in row-major order.

use super::conv_common::{LoweringParams, validate_3d_tensor, validate_4d_tensor, validate_positive};
use crate::error::Result;
use crate::tensor::Tensor;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Flatten each output channel's `[C_in, kH, kW]` filter into one row
///
/// The row-major weight layout already stores every filter in
/// channel/row/column order, so this is a reshape.
pub fn lower_weights(weights: &Tensor) -> Result<Tensor> {
    const OP: &str = "lower_weights";
    validate_4d_tensor(weights.shape(), "weight", OP)?;
    let [c_out, c_in, k_h, k_w] = [
        weights.shape()[0],
        weights.shape()[1],
        weights.shape()[2],
        weights.shape()[3],
    ];
    validate_positive(c_out, "c_out", OP)?;
    validate_positive(c_in, "c_in", OP)?;
    validate_positive(k_h, "kernel_h", OP)?;
    validate_positive(k_w, "kernel_w", OP)?;

    Tensor::from_slice(weights.data(), &[c_out, c_in * k_h * k_w])
}

/// Extract every `k_h x k_w` window of `inputs` as one column
pub fn lower_inputs(inputs: &Tensor, k_h: usize, k_w: usize) -> Result<Tensor> {
    validate_3d_tensor(inputs.shape(), "input", "lower_inputs")?;
    // the output channel count plays no part in patch extraction
    let params = LoweringParams::from_shapes(&[1, inputs.shape()[0], k_h, k_w], inputs.shape())?;

    let num_patches = params.num_patches();
    let mut patches = vec![0.0f32; params.patch_len() * num_patches];
    let src = inputs.data();

    #[cfg(feature = "rayon")]
    {
        patches
            .par_chunks_mut(num_patches)
            .enumerate()
            .for_each(|(row, dst)| fill_patch_row(src, &params, row, dst));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (row, dst) in patches.chunks_mut(num_patches).enumerate() {
            fill_patch_row(src, &params, row, dst);
        }
    }

    Tensor::from_vec(patches, &[params.patch_len(), num_patches])
}

/// Lower weights and inputs together, checking they describe the same convolution
pub fn lower(weights: &Tensor, inputs: &Tensor) -> Result<(Tensor, Tensor)> {
    let params = LoweringParams::from_shapes(weights.shape(), inputs.shape())?;
    let weight_matrix = lower_weights(weights)?;
    let patch_matrix = lower_inputs(inputs, params.k_h, params.k_w)?;
    Ok((weight_matrix, patch_matrix))
}

/// Direct valid, unit-stride convolution, shaped `[C_out, out_h * out_w]`
///
/// Reference result for the lowering: `lower_weights(w) x lower_inputs(x)`
/// must match it up to rounding.
pub fn conv2d_valid(weights: &Tensor, inputs: &Tensor) -> Result<Tensor> {
    let params = LoweringParams::from_shapes(weights.shape(), inputs.shape())?;
    let LoweringParams {
        c_out,
        c_in,
        k_h,
        k_w,
        height,
        width,
    } = params;
    let (out_h, out_w) = (params.out_h(), params.out_w());
    let (w, x) = (weights.data(), inputs.data());

    let mut out = vec![0.0f32; c_out * out_h * out_w];
    for oc in 0..c_out {
        for oy in 0..out_h {
            for ox in 0..out_w {
                let mut sum = 0.0f32;
                for ic in 0..c_in {
                    for ky in 0..k_h {
                        for kx in 0..k_w {
                            let w_idx = ((oc * c_in + ic) * k_h + ky) * k_w + kx;
                            let x_idx = (ic * height + oy + ky) * width + ox + kx;
                            sum += w[w_idx] * x[x_idx];
                        }
                    }
                }
                out[(oc * out_h + oy) * out_w + ox] = sum;
            }
        }
    }
    Tensor::from_vec(out, &[c_out, out_h * out_w])
}

/// Fill patch-matrix row `row` (one `(ic, ky, kx)` tap across all windows)
fn fill_patch_row(src: &[f32], params: &LoweringParams, row: usize, dst: &mut [f32]) {
    let taps = params.k_h * params.k_w;
    let ic = row / taps;
    let ky = (row % taps) / params.k_w;
    let kx = row % params.k_w;
    let out_w = params.out_w();

    for (y, dst_row) in dst.chunks_exact_mut(out_w).enumerate() {
        let start = (ic * params.height + y + ky) * params.width + kx;
        dst_row.copy_from_slice(&src[start..start + out_w]);
    }
}
