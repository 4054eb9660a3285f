//! Replaced image content.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! Images resolve synchronously or not at all. A source is fetched and
//! decoded at most once per cache lifetime, even when several threads miss
//! on it together; network sources and failed loads paint a placeholder box
//! instead.

mod loader;

pub use loader::{
    ImageDecoder, ImageFetcher, ImageFormat, ImageLoaderPipeline, LocalFetcher, RasterDecoder,
    SvgDecoder, detect_format, is_network_source, strip_url_decorations,
};

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use koala_common::image::LoadedImage;
use koala_common::{ColorValue, Point, Rect};

use crate::canvas::StrokeStyle;
use crate::context::PaintContext;
use crate::error::{PaintError, PaintResult};
use crate::text::{TextAlign, TextPainter};

/// Minimum frame size for the broken-image glyph.
const GLYPH_MIN_SIZE: (f32, f32) = (40.0, 40.0);
/// Minimum frame size for the source label.
const LABEL_MIN_SIZE: (f32, f32) = (100.0, 60.0);
/// Characters of the source kept in the label.
const LABEL_MAX_CHARS: usize = 17;
const LABEL_FONT_SIZE: f32 = 10.0;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A load in progress. Other misses on the same source wait for its result.
struct LoadInFlight {
    result: Mutex<Option<PaintResult<Arc<LoadedImage>>>>,
    done: Condvar,
}

impl LoadInFlight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn set(&self, result: PaintResult<Arc<LoadedImage>>) {
        *lock(&self.result) = Some(result);
        self.done.notify_all();
    }

    fn wait(&self) -> PaintResult<Arc<LoadedImage>> {
        let mut guard = lock(&self.result);
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            guard = self
                .done
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Paints `img` content with a per-source decode cache.
pub struct ImagePainter {
    cache: Mutex<HashMap<String, Arc<LoadedImage>>>,
    in_flight: Mutex<HashMap<String, Arc<LoadInFlight>>>,
    fetcher: Box<dyn ImageFetcher>,
    pipeline: ImageLoaderPipeline,
    text: TextPainter,
}

impl ImagePainter {
    /// A painter reading local files and `data:` URLs. `text` draws the
    /// placeholder label.
    #[must_use]
    pub fn new(text: TextPainter) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            fetcher: Box::new(LocalFetcher),
            pipeline: ImageLoaderPipeline::new(),
            text,
        }
    }

    /// Builder: fetch bytes through `fetcher`.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl ImageFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, Arc<LoadedImage>>> {
        lock(&self.cache)
    }

    /// The cached image for `src`, if any.
    #[must_use]
    pub fn cached(&self, src: &str) -> Option<Arc<LoadedImage>> {
        self.lock_cache().get(src).cloned()
    }

    /// Number of cached images.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Drop every cached image. Loads already in flight still land in the
    /// cache when they finish.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Cache an image decoded elsewhere (e.g. by an asynchronous loader).
    ///
    /// If `src` is already cached the existing image wins and is returned.
    pub fn insert(&self, src: &str, image: LoadedImage) -> Arc<LoadedImage> {
        Arc::clone(
            self.lock_cache()
                .entry(src.to_string())
                .or_insert_with(|| Arc::new(image)),
        )
    }

    /// Fetch and decode `src` without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::ImageLoad`] if
    /// the source cannot be fetched or decoded.
    pub fn load(&self, src: &str) -> PaintResult<LoadedImage> {
        let bytes = self.fetcher.fetch(src)?;
        self.pipeline.decode(&bytes, src)
    }

    /// The cached image for `src`, loading and caching it on a miss.
    ///
    /// Concurrent misses on the same source share one load: the first
    /// caller fetches and decodes, the others block until it finishes and
    /// get its result. Failures are not cached.
    ///
    /// # Errors
    ///
    /// Returns the load error, or [`PaintError::ImageLoad`] for network
    /// sources, which are never fetched.
    pub fn resolve(&self, src: &str) -> PaintResult<Arc<LoadedImage>> {
        if let Some(image) = self.cached(src) {
            log::debug!("image cache hit: {src}");
            return Ok(image);
        }
        if is_network_source(src) {
            return Err(PaintError::ImageLoad(format!(
                "network image '{src}' not resolved synchronously"
            )));
        }

        let flight = {
            let mut in_flight = lock(&self.in_flight);
            if let Some(flight) = in_flight.get(src) {
                let flight = Arc::clone(flight);
                drop(in_flight);
                log::debug!("waiting for in-flight load: {src}");
                return flight.wait();
            }
            let flight = Arc::new(LoadInFlight::new());
            let _ = in_flight.insert(src.to_string(), Arc::clone(&flight));
            flight
        };

        // A load that finished between the cache check and registering
        // this one already cached the image.
        let result = match self.cached(src) {
            Some(image) => Ok(image),
            None => self.load(src).map(|image| {
                log::debug!("image cache miss, loaded: {src}");
                self.insert(src, image)
            }),
        };
        flight.set(result.clone());
        let _ = lock(&self.in_flight).remove(src);
        result
    }

    /// Draw the image behind `src` into `frame`, or a placeholder.
    ///
    /// Never fails: load errors are logged and replaced by the placeholder.
    pub fn paint_image(&self, src: &str, frame: Rect, ctx: &mut PaintContext<'_>) {
        match self.resolve(src) {
            Ok(image) => ctx.canvas().draw_image(&image, frame),
            Err(e) if is_network_source(src) => {
                log::debug!("{e}");
                self.paint_placeholder(src, frame, ctx);
            }
            Err(e) => {
                log::warn!("image '{src}' failed to load: {e}");
                self.paint_placeholder(src, frame, ctx);
            }
        }
    }

    /// Gray box, then a broken-image glyph and the source label when the
    /// frame has room.
    pub fn paint_placeholder(&self, src: &str, frame: Rect, ctx: &mut PaintContext<'_>) {
        ctx.canvas().fill_rect(frame, ColorValue::LIGHT_GRAY);
        ctx.canvas()
            .stroke_rect(frame, &StrokeStyle::solid(1.0, ColorValue::GRAY));

        let fits = |(w, h): (f32, f32)| frame.width >= w && frame.height >= h;
        if !fits(GLYPH_MIN_SIZE) {
            return;
        }
        let with_label = fits(LABEL_MIN_SIZE);
        let glyph_center = Point::new(
            frame.mid_x(),
            if with_label {
                frame.mid_y() - 8.0
            } else {
                frame.mid_y()
            },
        );
        draw_broken_image_glyph(glyph_center, frame.width.min(frame.height), ctx);

        if with_label {
            let label_frame = Rect::new(frame.min_x(), frame.max_y() - 20.0, frame.width, 16.0);
            if let Err(e) = self.text.paint_simple_text(
                &placeholder_label(src),
                LABEL_FONT_SIZE,
                ColorValue::GRAY,
                label_frame,
                TextAlign::Center,
                ctx,
            ) {
                log::debug!("placeholder label for '{src}' not drawn: {e}");
            }
        }
    }
}

/// The source as shown under the placeholder glyph.
#[must_use]
pub fn placeholder_label(src: &str) -> String {
    if src.chars().count() <= LABEL_MAX_CHARS {
        return src.to_string();
    }
    let mut label: String = src.chars().take(LABEL_MAX_CHARS).collect();
    label.push_str("...");
    label
}

/// A picture frame with a mountain and a crack through it.
fn draw_broken_image_glyph(center: Point, extent: f32, ctx: &mut PaintContext<'_>) {
    let size = (extent * 0.4).min(32.0);
    let icon = Rect::new(center.x - size / 2.0, center.y - size / 2.0, size, size);
    let stroke = StrokeStyle::solid(1.5, ColorValue::GRAY);
    let at = |fx: f32, fy: f32| Point::new(fx.mul_add(size, icon.x), fy.mul_add(size, icon.y));

    let canvas = ctx.canvas();
    canvas.stroke_rect(icon, &stroke);
    canvas.stroke_line(at(0.15, 0.8), at(0.4, 0.45), &stroke);
    canvas.stroke_line(at(0.4, 0.45), at(0.6, 0.65), &stroke);
    canvas.stroke_line(at(0.6, 0.65), at(0.85, 0.35), &stroke);
    canvas.stroke_line(at(0.7, 0.0), at(0.55, 0.3), &stroke);
    canvas.stroke_line(at(0.55, 0.3), at(0.75, 0.5), &stroke);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_label_truncates() {
        assert_eq!(placeholder_label("cat.png"), "cat.png");
        assert_eq!(
            placeholder_label("https://example.com/images/cat.png"),
            "https://example.c..."
        );
    }
}
