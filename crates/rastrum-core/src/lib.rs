//! Rastrum Core - Raster transform pipeline
//!
//! This crate provides the stateless operators behind on-demand image
//! derivative generation: crop, scale, rotate, transpose, grayscale and
//! bitonal filtering, alpha removal, and pixel-layout normalization.
//!
//! Every operator maps one in-memory [`Raster`] to another. Decoding,
//! encoding, request parsing, and operation sequencing belong to external
//! collaborators; this crate consumes already-decoded rasters and
//! already-validated operation descriptors.
//!
//! # Ownership
//!
//! Operators return `Cow<Raster>`: `Borrowed` when the requested operation
//! is a no-op (zero copy, the input aliased), `Owned` otherwise. An input
//! raster's buffer is never mutated, so callers can rely on referential
//! transparency and may invoke operators concurrently on different rasters
//! without coordination.

pub mod color;
pub mod luminance;
pub mod raster;
pub mod transform;

pub use color::{apply_filter, custom_to_rgb, remove_alpha};
pub use raster::{PixelLayout, Raster, TransformError};
pub use transform::{
    apply_crop, apply_rotation, apply_scale, apply_transpose, rotated_canvas_size,
    scale_target_size,
};

/// Count of halving-downsample steps already applied to a raster relative
/// to a full-size reference.
///
/// Crop and scale descriptors are expressed in full-size coordinates; the
/// reduction factor maps them into the coordinate space of a raster that a
/// decoding or caching collaborator has already downsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ReductionFactor(pub u32);

impl ReductionFactor {
    /// Create a reduction factor of `n` prior halvings.
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    /// The multiplier mapping full-size coordinates into the reduced
    /// raster's coordinate space: `0.5^n`.
    pub fn scale(self) -> f64 {
        0.5f64.powi(self.0.min(i32::MAX as u32) as i32)
    }
}

/// Unit of a crop region's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CropUnit {
    /// Absolute pixel coordinates in the full-size reference image.
    Pixels,
    /// Fractions (0.0 to 1.0) of the full-size reference dimensions.
    Percent,
}

/// A crop region, relative to the full-size reference image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Crop {
    /// Coordinate unit for all four region values.
    pub unit: CropUnit,
    /// Left edge of the region.
    pub x: f64,
    /// Top edge of the region.
    pub y: f64,
    /// Region width.
    pub width: f64,
    /// Region height.
    pub height: f64,
}

impl Crop {
    /// A percent-unit crop covering the full frame.
    pub fn full() -> Self {
        Self {
            unit: CropUnit::Percent,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Returns true if this crop requests the full frame regardless of the
    /// raster it is applied to.
    pub fn is_no_op(&self) -> bool {
        self.unit == CropUnit::Percent
            && self.x <= 0.0
            && self.y <= 0.0
            && self.width >= 1.0
            && self.height >= 1.0
    }
}

/// A scale request, relative to the full-size reference image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Scale {
    /// Match the given width, derive height from the source aspect ratio.
    AspectFitWidth(u32),
    /// Match the given height, derive width from the source aspect ratio.
    AspectFitHeight(u32),
    /// Fit inside the given box, preserving the source aspect ratio.
    AspectFitInside { width: u32, height: u32 },
    /// Stretch to exactly the given dimensions.
    NonAspectFill { width: u32, height: u32 },
    /// Scale both dimensions by the given fraction of the full-size
    /// reference (1.0 = full size).
    Percent(f64),
}

/// A rotation by an arbitrary angle.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rotate {
    /// Rotation in degrees, positive = clockwise. Values outside
    /// [0, 360) are reduced modulo 360.
    pub degrees: f64,
}

impl Rotate {
    /// Create a rotation of the given number of degrees.
    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Returns true if the rotation is equivalent to 0 degrees.
    pub fn is_no_op(&self) -> bool {
        let normalized = self.degrees.rem_euclid(360.0);
        normalized.abs() < 0.001 || (360.0 - normalized).abs() < 0.001
    }
}

/// Colorimetric filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Filter {
    /// Leave the raster untouched.
    #[default]
    None,
    /// Convert to 8-bit grayscale.
    Gray,
    /// Convert to 1-bit monochrome.
    Bitonal,
}

impl Filter {
    /// Returns true if the filter leaves the raster untouched.
    pub fn is_no_op(self) -> bool {
        self == Filter::None
    }
}

/// Mirror axis selection. Never a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Transpose {
    /// Reflect about the vertical axis (left-right mirror).
    Horizontal,
    /// Reflect about the horizontal axis (top-bottom mirror).
    Vertical,
}
