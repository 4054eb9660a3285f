//! Image loading pipeline: fetch, detect format, and decode.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! 1. **Fetch**: an [`ImageFetcher`] turns a source string into bytes.
//!    [`LocalFetcher`] reads `data:` URLs and local files; network schemes
//!    are never fetched here.
//! 2. **Detect**: [`detect_format()`] picks SVG or raster from the
//!    extension, the `data:` media type, or magic bytes.
//! 3. **Decode**: an [`ImageDecoder`] per format.

use std::fs;
use std::path::Path;

use koala_common::data_url::decode_data_url;
use koala_common::image::LoadedImage;

use crate::error::{PaintError, PaintResult};

/// Detected image format.
///
/// Only two variants are needed: the `image` crate handles raster sub-format
/// detection (PNG/JPEG/GIF/WebP/…) internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG vector image (decoded via usvg + resvg).
    Svg,
    /// Raster image (decoded via the `image` crate).
    Raster,
}

/// Whether `src` needs the network to resolve.
#[must_use]
pub fn is_network_source(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strip query string (`?…`) and fragment identifier (`#…`) so that the
/// remaining path can be checked for a file extension.
///
/// [URL Standard § 4.1](https://url.spec.whatwg.org/#concept-url-path)
#[must_use]
pub fn strip_url_decorations(src: &str) -> &str {
    let without_fragment = src.split_once('#').map_or(src, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Detect whether `bytes` represent an SVG or a raster image.
///
/// 1. `.svg` extension on `src`.
/// 2. `data:image/svg` media type.
/// 3. `<?xml` or `<svg` within the first 256 non-whitespace bytes.
/// 4. Otherwise raster.
#[must_use]
pub fn detect_format(src: &str, bytes: &[u8]) -> ImageFormat {
    if src.starts_with("data:image/svg") {
        return ImageFormat::Svg;
    }
    if !src.starts_with("data:")
        && Path::new(strip_url_decorations(src))
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return ImageFormat::Svg;
    }

    let head: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(256)
        .copied()
        .collect();
    if head.starts_with(b"<?xml") || head.starts_with(b"<svg") {
        return ImageFormat::Svg;
    }
    ImageFormat::Raster
}

/// Resolves an image source to raw bytes.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the bytes behind `src`.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::ImageLoad`] if the bytes cannot be read.
    fn fetch(&self, src: &str) -> PaintResult<Vec<u8>>;
}

/// Reads `data:` URLs and the local filesystem. `file://` prefixes are
/// stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl ImageFetcher for LocalFetcher {
    fn fetch(&self, src: &str) -> PaintResult<Vec<u8>> {
        if is_network_source(src) {
            return Err(PaintError::ImageLoad(format!(
                "network source '{src}' cannot be fetched synchronously"
            )));
        }
        if src.starts_with("data:") {
            return decode_data_url(src).map_err(|e| PaintError::ImageLoad(e.to_string()));
        }
        let path = src.strip_prefix("file://").unwrap_or(src);
        fs::read(strip_url_decorations(path))
            .map_err(|e| PaintError::ImageLoad(format!("failed to read '{path}': {e}")))
    }
}

/// A decoder that can turn raw bytes into a [`LoadedImage`].
pub trait ImageDecoder: Send + Sync {
    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str;

    /// Whether this decoder handles the given format.
    fn supports(&self, format: ImageFormat) -> bool;

    /// Attempt to decode `bytes` into a [`LoadedImage`].
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::ImageLoad`] if the bytes cannot be decoded.
    fn decode(&self, bytes: &[u8]) -> PaintResult<LoadedImage>;
}

/// Decodes SVG images via usvg → resvg rasterization.
pub struct SvgDecoder;

impl ImageDecoder for SvgDecoder {
    fn name(&self) -> &'static str {
        "SVG (resvg)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Svg
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn decode(&self, bytes: &[u8]) -> PaintResult<LoadedImage> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| PaintError::ImageLoad(format!("failed to parse SVG: {e}")))?;

        let size = tree.size();
        let (w, h) = (size.width().ceil() as u32, size.height().ceil() as u32);
        let mut pixmap = tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| PaintError::ImageLoad("SVG has zero-size dimensions".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // resvg renders premultiplied; LoadedImage is straight alpha.
        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        LoadedImage::new(w, h, rgba)
            .ok_or_else(|| PaintError::ImageLoad("SVG produced no pixels".to_string()))
    }
}

/// Decodes raster images (PNG, JPEG, GIF, WebP, …) via the `image` crate.
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "Raster (image crate)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Raster
    }

    fn decode(&self, bytes: &[u8]) -> PaintResult<LoadedImage> {
        let dynamic_img = ::image::load_from_memory(bytes)
            .map_err(|e| PaintError::ImageLoad(format!("could not decode image ({e})")))?;
        let rgba = dynamic_img.to_rgba8();
        let (w, h) = rgba.dimensions();
        LoadedImage::new(w, h, rgba.into_raw())
            .ok_or_else(|| PaintError::ImageLoad("image has zero-size dimensions".to_string()))
    }
}

/// Detects the format and dispatches to the matching decoder.
pub struct ImageLoaderPipeline {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl ImageLoaderPipeline {
    /// Create a pipeline with the default decoders (SVG + raster).
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![Box::new(SvgDecoder), Box::new(RasterDecoder)],
        }
    }

    /// Decode `bytes` fetched from `src`.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::ImageLoad`] if no decoder supports the
    /// detected format or decoding fails.
    pub fn decode(&self, bytes: &[u8], src: &str) -> PaintResult<LoadedImage> {
        let format = detect_format(src, bytes);
        let decoder = self
            .decoders
            .iter()
            .find(|d| d.supports(format))
            .ok_or_else(|| PaintError::ImageLoad(format!("no decoder for format {format:?}")))?;
        log::debug!("decoding '{src}' with {}", decoder.name());
        decoder.decode(bytes)
    }
}

impl Default for ImageLoaderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("icon.SVG", b""), ImageFormat::Svg);
        assert_eq!(detect_format("icon.svg?v=2#x", b""), ImageFormat::Svg);
        assert_eq!(detect_format("data:image/svg+xml,<svg/>", b""), ImageFormat::Svg);
        assert_eq!(detect_format("blob", b"  \n<svg>"), ImageFormat::Svg);
        assert_eq!(detect_format("photo.png", b"\x89PNG"), ImageFormat::Raster);
    }

    #[test]
    fn test_network_sources() {
        assert!(is_network_source("https://example.com/a.png"));
        assert!(is_network_source("HTTP://example.com/a.png"));
        assert!(!is_network_source("file:///tmp/a.png"));
        assert!(LocalFetcher.fetch("http://example.com/a.png").is_err());
    }

    #[test]
    fn test_local_fetcher_reads_data_urls() {
        assert_eq!(
            LocalFetcher.fetch("data:text/plain;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_svg_decoder() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
            <rect width="4" height="2" fill="#ff0000"/></svg>"##;
        let image = SvgDecoder.decode(svg).unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(&image.rgba_data()[..4], &[255, 0, 0, 255]);
    }
}
