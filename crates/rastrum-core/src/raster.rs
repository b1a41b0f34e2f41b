//! Core raster types for the transform pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for raster transform operations.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A crop or scale request resolved to a region or target size that
    /// is internally inconsistent even after clamping.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An operator received a pixel layout it cannot interpret. Running
    /// [`crate::color::custom_to_rgb`] first usually resolves this.
    #[error("Unsupported pixel layout: {0:?}")]
    UnsupportedLayout(PixelLayout),

    /// The requested output buffer could not be allocated.
    #[error("Failed to allocate {bytes} bytes for output raster")]
    AllocationFailure { bytes: u128 },
}

/// Channel composition and memory arrangement of a raster's pixels.
///
/// A small closed set; operators pattern-match on it explicitly. `Custom`
/// is the catch-all for layouts no downstream operator understands, with
/// only its byte width known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelLayout {
    /// 3 bytes per pixel, byte order R, G, B.
    Rgb,
    /// 4 bytes per pixel, byte order R, G, B, A.
    Rgba,
    /// 4 bytes per pixel, byte order A, B, G, R.
    Abgr,
    /// 3 bytes per pixel, byte order B, G, R.
    Bgr,
    /// 1 byte per pixel, 8-bit grayscale.
    Gray8,
    /// Logically 1-bit monochrome, stored one byte per pixel with
    /// values 0 or 255.
    Bitonal,
    /// An opaque layout unsupported by downstream operators.
    Custom { bytes_per_pixel: u8 },
}

impl PixelLayout {
    /// Byte width of a single pixel in this layout.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            PixelLayout::Rgba | PixelLayout::Abgr => 4,
            PixelLayout::Gray8 | PixelLayout::Bitonal => 1,
            PixelLayout::Custom { bytes_per_pixel } => bytes_per_pixel as usize,
        }
    }

    /// Returns true if this layout carries an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelLayout::Rgba | PixelLayout::Abgr)
    }

    /// Returns true for the catch-all unsupported layout.
    #[inline]
    pub fn is_custom(self) -> bool {
        matches!(self, PixelLayout::Custom { .. })
    }
}

/// Byte offset of the pixel at (x, y) in a raster of the given width.
///
/// Computed entirely in `usize`: [`Raster::allocate`] accepts buffers up
/// to `isize::MAX` bytes, so a pixel count can exceed `u32::MAX` and
/// 32-bit index arithmetic would overflow.
#[inline]
pub(crate) fn pixel_offset(width: u32, x: u32, y: u32, bytes_per_pixel: usize) -> usize {
    (y as usize * width as usize + x as usize) * bytes_per_pixel
}

/// An in-memory rectangular pixel grid with a defined layout.
///
/// Invariant: `pixels.len() == width * height * layout.bytes_per_pixel()`.
/// Operators treat the buffer as read-only; a no-op returns the input
/// aliased, anything else returns a freshly allocated raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel composition and memory arrangement.
    pub layout: PixelLayout,
    /// Row-major pixel data.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new raster over an existing pixel buffer.
    pub fn new(width: u32, height: u32, layout: PixelLayout, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * layout.bytes_per_pixel(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }

    /// Allocate a zero-filled raster of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::AllocationFailure`] if the buffer size
    /// overflows or the allocation is refused. A pathological scale or
    /// rotate request surfaces here instead of aborting.
    pub fn allocate(
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, TransformError> {
        let bytes =
            width as u128 * height as u128 * layout.bytes_per_pixel() as u128;
        if bytes > isize::MAX as u128 {
            return Err(TransformError::AllocationFailure { bytes });
        }
        let len = bytes as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| TransformError::AllocationFailure { bytes })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read the pixel at (x, y) as straight-alpha RGBA.
    ///
    /// Layouts without alpha read as fully opaque; bitonal and grayscale
    /// replicate their single sample across R, G, B. Returns `None` for
    /// `Custom` layouts, which operators must reject up front.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        debug_assert!(x < self.width && y < self.height, "Pixel out of bounds");
        let bpp = self.layout.bytes_per_pixel();
        let idx = pixel_offset(self.width, x, y, bpp);
        let px = &self.pixels[idx..idx + bpp];
        match self.layout {
            PixelLayout::Rgb => Some([px[0], px[1], px[2], 255]),
            PixelLayout::Rgba => Some([px[0], px[1], px[2], px[3]]),
            PixelLayout::Abgr => Some([px[3], px[2], px[1], px[0]]),
            PixelLayout::Bgr => Some([px[2], px[1], px[0], 255]),
            PixelLayout::Gray8 => Some([px[0], px[0], px[0], 255]),
            PixelLayout::Bitonal => {
                let v = if px[0] != 0 { 255 } else { 0 };
                Some([v, v, v, 255])
            }
            PixelLayout::Custom { .. } => None,
        }
    }
}
