//! Normalization of opaque custom layouts into standard RGB.

use std::borrow::Cow;

use tracing::debug;

use crate::raster::{PixelLayout, Raster, TransformError};

/// Copy a raster in the catch-all `Custom` layout pixel-by-pixel into a
/// new [`PixelLayout::Rgb`] raster of identical dimensions.
///
/// The first three samples of each custom pixel are taken as R, G, B; a
/// one- or two-sample layout replicates its first sample across all three
/// channels. Rasters in any standard layout are returned aliased.
///
/// This is extremely expensive and should be avoided when possible;
/// downstream operators that reject `Custom` name this function as the
/// remediation, and the pipeline driver decides whether to invoke it.
///
/// # Errors
///
/// Returns [`TransformError::UnsupportedLayout`] for a zero-byte-width
/// custom layout and [`TransformError::AllocationFailure`] if the output
/// buffer cannot be allocated.
pub fn custom_to_rgb(raster: &Raster) -> Result<Cow<'_, Raster>, TransformError> {
    let bpp = match raster.layout {
        PixelLayout::Custom { bytes_per_pixel } => bytes_per_pixel as usize,
        _ => return Ok(Cow::Borrowed(raster)),
    };
    if bpp == 0 {
        return Err(TransformError::UnsupportedLayout(raster.layout));
    }

    let mut out = Raster::allocate(raster.width, raster.height, PixelLayout::Rgb)?;
    for (src_px, dst_px) in raster
        .pixels
        .chunks_exact(bpp)
        .zip(out.pixels.chunks_exact_mut(3))
    {
        if bpp >= 3 {
            dst_px.copy_from_slice(&src_px[..3]);
        } else {
            dst_px.fill(src_px[0]);
        }
    }

    debug!(
        width = raster.width,
        height = raster.height,
        bytes_per_pixel = bpp,
        "normalized custom layout to RGB"
    );
    Ok(Cow::Owned(out))
}
