//! Raster rotation by arbitrary angles with bilinear interpolation.
//!
//! The rotation uses inverse mapping: for each pixel in the output canvas,
//! we calculate which source pixels contribute to it and interpolate their
//! values. The canvas is expanded to contain the rotated rectangle exactly,
//! and the output gains an alpha channel so the corners exposed by the
//! rotation are transparent rather than undefined.
//!
//! For rotation by angle θ, the inverse transform is:
//! ```text
//! src_x = (dst_x - dst_cx) * cos(θ) + (dst_y - dst_cy) * sin(θ) + src_cx
//! src_y = (dst_y - dst_cy) * cos(θ) - (dst_x - dst_cx) * sin(θ) + src_cy
//! ```

use std::borrow::Cow;

use tracing::debug;

use crate::raster::{pixel_offset, PixelLayout, Raster, TransformError};
use crate::Rotate;

/// Compute the dimensions of the bounding canvas for a rotated raster.
///
/// When a raster is rotated, its corners extend beyond the original
/// bounds; the canvas is the smallest rectangle containing all four
/// rotated corners:
/// `round(|w·cos| + |h·sin|) x round(|h·cos| + |w·sin|)`.
///
/// Angles are reduced modulo 360 first, so 450 degrees behaves like 90.
pub fn rotated_canvas_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized.abs() < 0.001 || (360.0 - normalized).abs() < 0.001 {
        return (width, height);
    }

    let radians = normalized.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();
    let w = width as f64;
    let h = height as f64;

    let canvas_width = (w * cos + h * sin).round() as u32;
    let canvas_height = (h * cos + w * sin).round() as u32;
    (canvas_width, canvas_height)
}

/// Rotate a raster about its center.
///
/// The output canvas is expanded to fit the entire rotated raster (no
/// clipping), and the source lands centered in it. The output layout is
/// always [`PixelLayout::Rgba`]; regions outside the rotated source are
/// fully transparent.
///
/// # Returns
///
/// The input raster aliased when the rotation is a no-op, otherwise a new
/// RGBA raster of the expanded canvas dimensions.
///
/// # Errors
///
/// Returns [`TransformError::UnsupportedLayout`] for `Custom` layouts and
/// [`TransformError::AllocationFailure`] if the canvas does not fit in
/// memory.
pub fn apply_rotation<'a>(
    raster: &'a Raster,
    rotate: &Rotate,
) -> Result<Cow<'a, Raster>, TransformError> {
    if rotate.is_no_op() {
        return Ok(Cow::Borrowed(raster));
    }
    if raster.layout.is_custom() {
        return Err(TransformError::UnsupportedLayout(raster.layout));
    }

    let (canvas_width, canvas_height) =
        rotated_canvas_size(raster.width, raster.height, rotate.degrees);
    let mut out = Raster::allocate(canvas_width, canvas_height, PixelLayout::Rgba)?;

    let radians = rotate.degrees.rem_euclid(360.0).to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_cx = raster.width as f64 / 2.0;
    let src_cy = raster.height as f64 / 2.0;
    let dst_cx = canvas_width as f64 / 2.0;
    let dst_cy = canvas_height as f64 / 2.0;

    for dst_y in 0..canvas_height {
        for dst_x in 0..canvas_width {
            let dx = dst_x as f64 - dst_cx;
            let dy = dst_y as f64 - dst_cy;

            // Inverse rotation back into source coordinates
            let src_x = dx * cos + dy * sin + src_cx;
            let src_y = dy * cos - dx * sin + src_cy;

            let pixel = sample_bilinear(raster, src_x, src_y);
            let idx = pixel_offset(canvas_width, dst_x, dst_y, 4);
            out.pixels[idx..idx + 4].copy_from_slice(&pixel);
        }
    }

    debug!(
        src_width = raster.width,
        src_height = raster.height,
        canvas_width,
        canvas_height,
        degrees = rotate.degrees,
        "rotated raster"
    );
    Ok(Cow::Owned(out))
}

/// Sample a straight-alpha RGBA pixel using bilinear interpolation.
///
/// The 4 nearest source pixels are weighted by distance; coordinates
/// outside the source read as fully transparent. On the last row and
/// column the neighbor indices are clamped so edge pixels interpolate
/// against themselves instead of being clipped away.
fn sample_bilinear(raster: &Raster, x: f64, y: f64) -> [u8; 4] {
    if raster.width == 0 || raster.height == 0 {
        return [0, 0, 0, 0];
    }
    let max_x = (raster.width - 1) as f64;
    let max_y = (raster.height - 1) as f64;
    if x < 0.0 || x > max_x || y < 0.0 || y > max_y {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(raster.width - 1);
    let y1 = (y0 + 1).min(raster.height - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = rgba_f64(raster, x0, y0);
    let p10 = rgba_f64(raster, x1, y0);
    let p01 = rgba_f64(raster, x0, y1);
    let p11 = rgba_f64(raster, x1, y1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

#[inline]
fn rgba_f64(raster: &Raster, x: u32, y: u32) -> [f64; 4] {
    let px = raster.rgba_at(x, y).unwrap_or([0, 0, 0, 0]);
    [px[0] as f64, px[1] as f64, px[2] as f64, px[3] as f64]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test raster with a gradient pattern.
    fn test_raster(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 8) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Raster::new(width, height, PixelLayout::Rgb, pixels)
    }

    #[test]
    fn test_no_rotation_is_borrowed() {
        let raster = test_raster(100, 50);
        let result = apply_rotation(&raster, &Rotate::new(0.0)).unwrap();

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.layout, PixelLayout::Rgb);
    }

    #[test]
    fn test_full_turn_is_borrowed() {
        let raster = test_raster(50, 50);
        let result = apply_rotation(&raster, &Rotate::new(360.0)).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_90_degree_canvas_swaps_dimensions() {
        let (w, h) = rotated_canvas_size(100, 50, 90.0);
        assert_eq!((w, h), (50, 100));
    }

    #[test]
    fn test_180_degree_canvas() {
        let (w, h) = rotated_canvas_size(100, 50, 180.0);
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_45_degree_canvas() {
        // Diagonal of a 100x100 square is 100 * sqrt(2) ~ 141.4
        let (w, h) = rotated_canvas_size(100, 100, 45.0);
        assert_eq!((w, h), (141, 141));
    }

    #[test]
    fn test_large_angles_reduced() {
        assert_eq!(rotated_canvas_size(100, 50, 720.0), (100, 50));
        assert_eq!(rotated_canvas_size(100, 50, 450.0), (50, 100));
    }

    #[test]
    fn test_negative_angle_same_canvas() {
        let a = rotated_canvas_size(100, 50, 30.0);
        let b = rotated_canvas_size(100, 50, -30.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rotation_output_is_rgba() {
        let raster = test_raster(50, 50);
        let result = apply_rotation(&raster, &Rotate::new(45.0)).unwrap();

        assert_eq!(result.layout, PixelLayout::Rgba);
        assert_eq!(
            result.byte_size(),
            (result.width * result.height * 4) as usize
        );
    }

    #[test]
    fn test_rotation_expands_canvas() {
        let raster = test_raster(100, 100);
        let result = apply_rotation(&raster, &Rotate::new(45.0)).unwrap();

        assert!(result.width > raster.width);
        assert!(result.height > raster.height);
    }

    #[test]
    fn test_exposed_corners_are_transparent() {
        let raster = Raster::new(20, 20, PixelLayout::Rgb, vec![255u8; 20 * 20 * 3]);
        let result = apply_rotation(&raster, &Rotate::new(45.0)).unwrap();

        // Top-left corner of the canvas lies outside the rotated square
        assert_eq!(result.rgba_at(0, 0), Some([0, 0, 0, 0]));
        // The canvas center lies inside it and stays opaque
        let center = result
            .rgba_at(result.width / 2, result.height / 2)
            .unwrap();
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_rotation_center_stays_bright() {
        // A white block at the source center should still be near the
        // canvas center after rotation.
        let size = 21;
        let mut pixels = vec![0u8; (size * size * 3) as usize];
        let center = size / 2;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let px = (center as i32 + dx) as u32;
                let py = (center as i32 + dy) as u32;
                let idx = ((py * size + px) * 3) as usize;
                pixels[idx..idx + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        let raster = Raster::new(size, size, PixelLayout::Rgb, pixels);

        let result = apply_rotation(&raster, &Rotate::new(90.0)).unwrap();
        let center_px = result
            .rgba_at(result.width / 2, result.height / 2)
            .unwrap();
        assert!(center_px[0] > 128, "center was {:?}", center_px);
    }

    #[test]
    fn test_rotation_of_gray_raster() {
        let raster = Raster::new(10, 10, PixelLayout::Gray8, vec![200u8; 100]);
        let result = apply_rotation(&raster, &Rotate::new(30.0)).unwrap();

        assert_eq!(result.layout, PixelLayout::Rgba);
        assert!(result.width > 0 && result.height > 0);
    }

    #[test]
    fn test_rotation_custom_layout_is_error() {
        let raster = Raster::new(
            4,
            4,
            PixelLayout::Custom { bytes_per_pixel: 2 },
            vec![0u8; 32],
        );
        let result = apply_rotation(&raster, &Rotate::new(45.0));
        assert!(matches!(
            result,
            Err(TransformError::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn test_tiny_raster_rotation() {
        let raster = Raster::new(1, 1, PixelLayout::Rgb, vec![128, 128, 128]);
        let result = apply_rotation(&raster, &Rotate::new(45.0)).unwrap();
        assert!(result.width >= 1);
        assert!(result.height >= 1);
    }

    #[test]
    fn test_180_degree_keeps_last_row_and_column() {
        // dst (1, 1) maps back onto the source's last pixel exactly; edge
        // samples interpolate against themselves rather than vanishing.
        let raster = Raster::new(2, 2, PixelLayout::Rgb, vec![255u8; 2 * 2 * 3]);
        let result = apply_rotation(&raster, &Rotate::new(180.0)).unwrap();

        assert_eq!((result.width, result.height), (2, 2));
        assert_eq!(result.rgba_at(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_single_column_raster_survives_rotation() {
        // A 1-pixel-wide source has every pixel on the last column; the
        // rotated output must still contain opaque content.
        let raster = Raster::new(1, 3, PixelLayout::Rgb, vec![255u8; 3 * 3]);
        let result = apply_rotation(&raster, &Rotate::new(90.0)).unwrap();

        assert_eq!((result.width, result.height), (3, 1));
        let opaque = (0..result.width)
            .filter_map(|x| result.rgba_at(x, 0))
            .filter(|px| px[3] == 255)
            .count();
        assert!(opaque >= 1, "no opaque pixels in rotated column");
    }

    #[test]
    fn test_canvas_contains_all_corners() {
        // The four rotated corners of the source must land inside the
        // canvas for any angle.
        for &degrees in &[1.0, 15.0, 45.0, 89.0, 90.0, 135.0, 179.0, 270.0, 359.0] {
            let (w, h) = (100.0f64, 60.0f64);
            let (cw, ch) = rotated_canvas_size(100, 60, degrees);
            let radians = degrees.to_radians();
            let (cos, sin) = (radians.cos(), radians.sin());
            for &(x, y) in &[(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
                let dx = x - w / 2.0;
                let dy = y - h / 2.0;
                let rx = dx * cos - dy * sin + cw as f64 / 2.0;
                let ry = dx * sin + dy * cos + ch as f64 / 2.0;
                assert!(
                    rx >= -1.0 && rx <= cw as f64 + 1.0,
                    "corner x {} outside canvas {} at {} degrees",
                    rx,
                    cw,
                    degrees
                );
                assert!(
                    ry >= -1.0 && ry <= ch as f64 + 1.0,
                    "corner y {} outside canvas {} at {} degrees",
                    ry,
                    ch,
                    degrees
                );
            }
        }
    }

    #[test]
    fn test_rotation_deterministic() {
        let raster = test_raster(30, 30);
        let a = apply_rotation(&raster, &Rotate::new(37.0)).unwrap();
        let b = apply_rotation(&raster, &Rotate::new(37.0)).unwrap();
        assert_eq!(a.as_ref(), b.as_ref());
    }
}
