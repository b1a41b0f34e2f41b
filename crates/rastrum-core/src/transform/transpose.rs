//! Raster mirroring about the vertical or horizontal axis.
//!
//! Unlike the other geometry operators a transpose is never a no-op; it
//! always produces a new raster of identical dimensions. Pixels are moved
//! whole, so the operation is exact for every byte-aligned layout and an
//! involution: applying the same transpose twice restores the original.

use std::borrow::Cow;

use tracing::debug;

use crate::raster::{Raster, TransformError};
use crate::Transpose;

/// Mirror a raster about the axis selected by `transpose`.
///
/// # Returns
///
/// A new raster of identical dimensions and layout; never the input
/// aliased.
///
/// # Errors
///
/// Returns [`TransformError::UnsupportedLayout`] for a zero-byte-width
/// layout and [`TransformError::AllocationFailure`] if the output buffer
/// cannot be allocated.
pub fn apply_transpose<'a>(
    raster: &'a Raster,
    transpose: Transpose,
) -> Result<Cow<'a, Raster>, TransformError> {
    let bpp = raster.layout.bytes_per_pixel();
    if bpp == 0 {
        return Err(TransformError::UnsupportedLayout(raster.layout));
    }

    let mut out = Raster::allocate(raster.width, raster.height, raster.layout)?;
    let row_bytes = raster.width as usize * bpp;

    match transpose {
        Transpose::Horizontal => {
            for (src_row, dst_row) in raster
                .pixels
                .chunks_exact(row_bytes.max(1))
                .zip(out.pixels.chunks_exact_mut(row_bytes.max(1)))
            {
                for (src_px, dst_px) in src_row
                    .chunks_exact(bpp)
                    .zip(dst_row.rchunks_exact_mut(bpp))
                {
                    dst_px.copy_from_slice(src_px);
                }
            }
        }
        Transpose::Vertical => {
            for (src_row, dst_row) in raster
                .pixels
                .chunks_exact(row_bytes.max(1))
                .zip(out.pixels.rchunks_exact_mut(row_bytes.max(1)))
            {
                dst_row.copy_from_slice(src_row);
            }
        }
    }

    debug!(
        width = raster.width,
        height = raster.height,
        ?transpose,
        "transposed raster"
    );
    Ok(Cow::Owned(out))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
