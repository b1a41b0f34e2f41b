//! Geometry operators: crop, scale, rotate, transpose.
//!
//! Each operator is a pure function from one raster to another. The order
//! in which operators are applied is the caller's decision; a typical
//! derivative pipeline runs crop, then scale, then rotate, then transpose.
//!
//! # Coordinate System
//!
//! - Crop and scale descriptors are expressed relative to the *full-size*
//!   reference image; a [`crate::ReductionFactor`] maps them into the
//!   coordinate space of an already-downsampled input raster
//! - Rotation angles are in degrees, positive = clockwise
//! - Origin is top-left corner

mod crop;
mod rotate;
mod scale;
mod transpose;

pub use crop::apply_crop;
pub use rotate::{apply_rotation, rotated_canvas_size};
pub use scale::{apply_scale, scale_target_size};
pub use transpose::apply_transpose;
