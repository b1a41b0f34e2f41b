//! Raster cropping with reduction-factor-aware region arithmetic.
//!
//! Crop regions are expressed relative to the full-size reference image.
//! The input raster may already have been halved `n` times by a decoding
//! collaborator; the region is mapped into its coordinate space by
//! multiplying with `ReductionFactor::scale()` before any pixels move.

use std::borrow::Cow;

use tracing::debug;

use crate::raster::{Raster, TransformError};
use crate::{Crop, CropUnit, ReductionFactor};

/// Crop a raster to the region described by `crop`.
///
/// # Arguments
///
/// * `raster` - Source raster, possibly pre-reduced
/// * `crop` - Crop region relative to the full-size reference
/// * `reduction` - Number of times `raster` has already been halved
///
/// # Returns
///
/// The input raster aliased when the crop is a no-op, otherwise a new
/// raster containing exactly the clamped region. A region that clamps to
/// zero width or height yields an empty raster, not an error.
///
/// # Errors
///
/// Returns [`TransformError::InvalidGeometry`] when the region lies
/// entirely outside the raster or has a negative extent, and
/// [`TransformError::AllocationFailure`] if the output buffer cannot be
/// allocated.
pub fn apply_crop<'a>(
    raster: &'a Raster,
    crop: &Crop,
    reduction: ReductionFactor,
) -> Result<Cow<'a, Raster>, TransformError> {
    if crop.is_no_op() {
        return Ok(Cow::Borrowed(raster));
    }

    let scale = reduction.scale();
    let region_x = crop.x * scale;
    let region_y = crop.y * scale;
    let region_width = crop.width * scale;
    let region_height = crop.height * scale;

    let (x, y, requested_width, requested_height) = match crop.unit {
        CropUnit::Percent => (
            (region_x * raster.width as f64).round() as i64,
            (region_y * raster.height as f64).round() as i64,
            (region_width * raster.width as f64).round() as i64,
            (region_height * raster.height as f64).round() as i64,
        ),
        CropUnit::Pixels => (
            region_x.round() as i64,
            region_y.round() as i64,
            region_width.round() as i64,
            region_height.round() as i64,
        ),
    };

    if x < 0 || y < 0 || requested_width < 0 || requested_height < 0 {
        return Err(TransformError::InvalidGeometry(format!(
            "crop region ({}, {}) {}x{} has a negative component",
            x, y, requested_width, requested_height
        )));
    }
    if x > raster.width as i64 || y > raster.height as i64 {
        return Err(TransformError::InvalidGeometry(format!(
            "crop origin ({}, {}) lies outside {}x{} raster",
            x, y, raster.width, raster.height
        )));
    }

    // Truncate rather than read past the raster's edge.
    let cropped_width = requested_width.min(raster.width as i64 - x) as u32;
    let cropped_height = requested_height.min(raster.height as i64 - y) as u32;
    let (x, y) = (x as u32, y as u32);

    if x == 0 && y == 0 && cropped_width == raster.width && cropped_height == raster.height {
        return Ok(Cow::Borrowed(raster));
    }

    let mut out = Raster::allocate(cropped_width, cropped_height, raster.layout)?;
    let bpp = raster.layout.bytes_per_pixel();
    let src_row_bytes = raster.width as usize * bpp;
    let out_row_bytes = cropped_width as usize * bpp;

    for row in 0..cropped_height as usize {
        let src_start = (y as usize + row) * src_row_bytes + x as usize * bpp;
        let dst_start = row * out_row_bytes;
        out.pixels[dst_start..dst_start + out_row_bytes]
            .copy_from_slice(&raster.pixels[src_start..src_start + out_row_bytes]);
    }

    debug!(
        src_width = raster.width,
        src_height = raster.height,
        out_width = cropped_width,
        out_height = cropped_height,
        "cropped raster"
    );
    Ok(Cow::Owned(out))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::PixelLayout;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (4u32..=64, 4u32..=64)
    }

    fn create_test_raster(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Raster::new(width, height, PixelLayout::Rgb, pixels)
    }

    proptest! {
        /// Property: output dimensions never exceed the extent remaining
        /// beyond the crop origin.
        #[test]
        fn prop_crop_containment(
            (width, height) in dimensions_strategy(),
            x in 0u32..=32,
            y in 0u32..=32,
            region_w in 0u32..=96,
            region_h in 0u32..=96,
        ) {
            prop_assume!(x <= width && y <= height);
            let raster = create_test_raster(width, height);
            let crop = Crop {
                unit: CropUnit::Pixels,
                x: x as f64,
                y: y as f64,
                width: region_w as f64,
                height: region_h as f64,
            };
            let result = apply_crop(&raster, &crop, ReductionFactor::default()).unwrap();

            prop_assert!(result.width <= width - x);
            prop_assert!(result.height <= height - y);
        }

        /// Property: buffer length stays consistent with the output
        /// dimensions.
        #[test]
        fn prop_buffer_matches_dimensions(
            (width, height) in dimensions_strategy(),
            (left, top, crop_w, crop_h) in (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0),
        ) {
            let raster = create_test_raster(width, height);
            let crop = Crop {
                unit: CropUnit::Percent,
                x: left,
                y: top,
                width: crop_w,
                height: crop_h,
            };
            let result = apply_crop(&raster, &crop, ReductionFactor::default()).unwrap();

            prop_assert_eq!(
                result.pixels.len(),
                (result.width * result.height * 3) as usize
            );
        }

        /// Property: a full crop returns a pixel-identical raster.
        #[test]
        fn prop_full_crop_identity(
            (width, height) in dimensions_strategy(),
        ) {
            let raster = create_test_raster(width, height);
            let result = apply_crop(&raster, &Crop::full(), ReductionFactor::default()).unwrap();

            prop_assert_eq!(result.width, raster.width);
            prop_assert_eq!(result.height, raster.height);
            prop_assert_eq!(&result.pixels, &raster.pixels);
        }

        /// Property: cropping is deterministic.
        #[test]
        fn prop_crop_deterministic(
            (width, height) in dimensions_strategy(),
            (left, top, crop_w, crop_h) in (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0),
        ) {
            let raster = create_test_raster(width, height);
            let crop = Crop {
                unit: CropUnit::Percent,
                x: left,
                y: top,
                width: crop_w,
                height: crop_h,
            };
            let a = apply_crop(&raster, &crop, ReductionFactor::default()).unwrap();
            let b = apply_crop(&raster, &crop, ReductionFactor::default()).unwrap();

            prop_assert_eq!(a.as_ref(), b.as_ref());
        }
    }
}
