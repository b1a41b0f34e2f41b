//! Grayscale and bitonal filtering.

use std::borrow::Cow;

use tracing::debug;

use super::composite_over_black;
use crate::luminance::luminance_u8;
use crate::raster::{pixel_offset, PixelLayout, Raster, TransformError};
use crate::Filter;

/// Luminance at or above which a pixel reads as white in bitonal output.
///
/// Mid-gray; a fixed threshold keeps the filter reproducible across
/// platforms.
pub const BITONAL_THRESHOLD: u8 = 128;

/// Apply a colorimetric filter to a raster.
///
/// `Gray` produces a new [`PixelLayout::Gray8`] raster of identical
/// dimensions holding the BT.709 luminance of each pixel; `Bitonal`
/// thresholds that luminance at [`BITONAL_THRESHOLD`]. Alpha is
/// composited over opaque black before the luminance is taken. A filtered
/// raster is always freshly allocated, even when the input is already
/// grayscale.
///
/// # Returns
///
/// The input raster aliased for [`Filter::None`], otherwise a new raster.
///
/// # Errors
///
/// Returns [`TransformError::UnsupportedLayout`] for `Custom` layouts
/// (run [`super::custom_to_rgb`] first) and
/// [`TransformError::AllocationFailure`] if the output buffer cannot be
/// allocated.
pub fn apply_filter(raster: &Raster, filter: Filter) -> Result<Cow<'_, Raster>, TransformError> {
    if filter.is_no_op() {
        return Ok(Cow::Borrowed(raster));
    }
    if raster.layout.is_custom() {
        return Err(TransformError::UnsupportedLayout(raster.layout));
    }

    let bitonal = filter == Filter::Bitonal;
    let layout = if bitonal {
        PixelLayout::Bitonal
    } else {
        PixelLayout::Gray8
    };
    let mut out = Raster::allocate(raster.width, raster.height, layout)?;

    for y in 0..raster.height {
        for x in 0..raster.width {
            let [r, g, b, a] = raster.rgba_at(x, y).unwrap_or([0, 0, 0, 0]);
            let lum = luminance_u8(
                composite_over_black(r, a),
                composite_over_black(g, a),
                composite_over_black(b, a),
            );
            let value = if bitonal {
                if lum >= BITONAL_THRESHOLD {
                    255
                } else {
                    0
                }
            } else {
                lum
            };
            out.pixels[pixel_offset(raster.width, x, y, 1)] = value;
        }
    }

    debug!(
        width = raster.width,
        height = raster.height,
        ?filter,
        "filtered raster"
    );
    Ok(Cow::Owned(out))
}
