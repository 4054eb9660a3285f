//! Image data types shared across renderer components.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)

use std::fmt;

/// Decoded image data for a loaded image resource.
///
/// Contains straight (non-premultiplied) RGBA pixel data and intrinsic
/// dimensions. Backends convert to their own pixel format when drawing.
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Intrinsic width of the image in pixels.
    width: u32,
    /// Intrinsic height of the image in pixels.
    height: u32,
    /// Raw RGBA pixel data (width * height * 4 bytes).
    rgba_data: Vec<u8>,
}

impl LoadedImage {
    /// Create a new `LoadedImage` from decoded RGBA pixel data.
    ///
    /// Returns `None` when `rgba_data` is not exactly `width * height * 4`
    /// bytes or either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Option<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if width == 0 || height == 0 || rgba_data.len() as u64 != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba_data,
        })
    }

    /// A `width` x `height` image filled with one RGBA color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let pixels = (width as usize) * (height as usize);
        Self::new(width, height, rgba.repeat(pixels))
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic dimensions as `(width, height)` in `f32`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn dimensions_f32(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Raw RGBA pixel data.
    #[must_use]
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_image_rejects_bad_lengths() {
        assert!(LoadedImage::new(2, 2, vec![0; 16]).is_some());
        assert!(LoadedImage::new(2, 2, vec![0; 15]).is_none());
        assert!(LoadedImage::new(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn test_loaded_image_solid() {
        let img = LoadedImage::solid(3, 1, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.rgba_data(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(img.dimensions_f32(), (3.0, 1.0));
    }
}
