//! Alpha channel removal.

use std::borrow::Cow;

use tracing::debug;

use super::composite_over_black;
use crate::raster::{pixel_offset, PixelLayout, Raster, TransformError};

/// Remove the alpha channel from a raster.
///
/// Sources in alpha-blue-green-red order map to [`PixelLayout::Bgr`];
/// every other alpha-bearing layout maps to [`PixelLayout::Rgb`]. Straight
/// alpha is composited over an opaque black background. Idempotent: a
/// raster without alpha is returned aliased, so removing alpha twice is
/// the same as removing it once.
///
/// # Errors
///
/// Returns [`TransformError::AllocationFailure`] if the output buffer
/// cannot be allocated.
pub fn remove_alpha(raster: &Raster) -> Result<Cow<'_, Raster>, TransformError> {
    if !raster.layout.has_alpha() {
        return Ok(Cow::Borrowed(raster));
    }

    let target = match raster.layout {
        PixelLayout::Abgr => PixelLayout::Bgr,
        _ => PixelLayout::Rgb,
    };
    let mut out = Raster::allocate(raster.width, raster.height, target)?;

    for y in 0..raster.height {
        for x in 0..raster.width {
            let [r, g, b, a] = raster.rgba_at(x, y).unwrap_or([0, 0, 0, 0]);
            let (r, g, b) = (
                composite_over_black(r, a),
                composite_over_black(g, a),
                composite_over_black(b, a),
            );
            let idx = pixel_offset(raster.width, x, y, 3);
            match target {
                PixelLayout::Bgr => {
                    out.pixels[idx..idx + 3].copy_from_slice(&[b, g, r]);
                }
                _ => {
                    out.pixels[idx..idx + 3].copy_from_slice(&[r, g, b]);
                }
            }
        }
    }

    debug!(
        width = raster.width,
        height = raster.height,
        from = ?raster.layout,
        to = ?target,
        "removed alpha channel"
    );
    Ok(Cow::Owned(out))
}
