//! Colorimetric operators: grayscale/bitonal filtering, alpha removal,
//! and pixel-layout normalization.
//!
//! These operators change what a pixel means rather than where it sits.
//! Alpha is always straight (non-premultiplied) and composited over an
//! opaque black background when it has to be resolved away.

mod alpha;
mod filter;
mod normalize;

pub use alpha::remove_alpha;
pub use filter::{apply_filter, BITONAL_THRESHOLD};
pub use normalize::custom_to_rgb;

/// Composite a straight-alpha channel value over opaque black.
#[inline]
pub(crate) fn composite_over_black(channel: u8, alpha: u8) -> u8 {
    ((channel as u16 * alpha as u16 + 127) / 255) as u8
}
