//! Tests for image painting: cache behavior, local loading, and placeholders.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use koala_common::image::LoadedImage;
use koala_common::{ColorValue, Rect};
use koala_paint::{
    ApproximateShaper, CanvasOp, ImageFetcher, ImagePainter, PaintContext, PaintError,
    PaintResult, RecordingCanvas, SkiaCanvas, TextPainter,
};

const RED_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
    <rect width="8" height="4" fill="#ff0000"/></svg>"##;

/// Fetcher serving fixed bytes and counting how often it was asked.
struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    bytes: Option<Vec<u8>>,
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, src: &str) -> PaintResult<Vec<u8>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.bytes
            .clone()
            .ok_or_else(|| PaintError::ImageLoad(format!("no such image: {src}")))
    }
}

/// Fetcher that takes a while, so concurrent misses overlap.
struct SlowFetcher {
    calls: Arc<AtomicUsize>,
    bytes: Option<Vec<u8>>,
}

impl ImageFetcher for SlowFetcher {
    fn fetch(&self, src: &str) -> PaintResult<Vec<u8>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        self.bytes
            .clone()
            .ok_or_else(|| PaintError::ImageLoad(format!("no such image: {src}")))
    }
}

fn text() -> TextPainter {
    TextPainter::new(Arc::new(ApproximateShaper))
}

/// Helper to build a painter over a counting fetcher.
fn counting_painter(bytes: Option<&[u8]>) -> (ImagePainter, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let painter = ImagePainter::new(text()).with_fetcher(CountingFetcher {
        calls: Arc::clone(&calls),
        bytes: bytes.map(<[u8]>::to_vec),
    });
    (painter, calls)
}

fn paint(painter: &ImagePainter, src: &str, frame: Rect) -> RecordingCanvas {
    let mut canvas = RecordingCanvas::new();
    {
        let mut ctx = PaintContext::new(&mut canvas, Rect::new(0.0, 0.0, 800.0, 600.0));
        painter.paint_image(src, frame, &mut ctx);
    }
    canvas
}

fn images_drawn(canvas: &RecordingCanvas) -> Vec<((u32, u32), Rect)> {
    canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            CanvasOp::DrawImage {
                image_size, dest, ..
            } => Some((*image_size, *dest)),
            _ => None,
        })
        .collect()
}

fn is_placeholder(canvas: &RecordingCanvas, frame: Rect) -> bool {
    canvas.ops().iter().any(|op| {
        matches!(op, CanvasOp::FillRect { rect, color, .. }
            if *rect == frame && *color == ColorValue::LIGHT_GRAY)
    })
}

// ========== cache ==========

#[test]
fn test_cache_hit_performs_no_io() {
    let (painter, calls) = counting_painter(Some(RED_SVG));
    let frame = Rect::new(0.0, 0.0, 16.0, 8.0);

    let first = paint(&painter, "logo.svg", frame);
    let second = paint(&painter, "logo.svg", frame);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(painter.cached_len(), 1);
    assert_eq!(images_drawn(&first), vec![((8, 4), frame)]);
    assert_eq!(images_drawn(&first), images_drawn(&second));
}

#[test]
fn test_cache_keyed_by_source_string() {
    let (painter, calls) = counting_painter(Some(RED_SVG));
    let frame = Rect::new(0.0, 0.0, 16.0, 8.0);
    let _ = paint(&painter, "a.svg", frame);
    let _ = paint(&painter, "b.svg", frame);
    let _ = paint(&painter, "a.svg", frame);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(painter.cached_len(), 2);
}

#[test]
fn test_clear_cache_forces_reload() {
    let (painter, calls) = counting_painter(Some(RED_SVG));
    let frame = Rect::new(0.0, 0.0, 16.0, 8.0);
    let _ = paint(&painter, "logo.svg", frame);
    painter.clear_cache();
    assert_eq!(painter.cached_len(), 0);
    assert!(painter.cached("logo.svg").is_none());
    let _ = paint(&painter, "logo.svg", frame);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_insert_first_wins() {
    let painter = ImagePainter::new(text());
    let first = painter.insert("x", LoadedImage::solid(2, 2, [0, 0, 0, 255]).unwrap());
    let second = painter.insert("x", LoadedImage::solid(5, 5, [0, 0, 0, 255]).unwrap());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.width(), 2);
}

#[test]
fn test_inserted_image_drawn_without_fetch() {
    let (painter, calls) = counting_painter(None);
    let _ = painter.insert(
        "https://example.com/cat.png",
        LoadedImage::solid(3, 3, [1, 2, 3, 255]).unwrap(),
    );
    let frame = Rect::new(0.0, 0.0, 30.0, 30.0);
    let canvas = paint(&painter, "https://example.com/cat.png", frame);
    assert_eq!(images_drawn(&canvas), vec![((3, 3), frame)]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_misses_share_one_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let painter = ImagePainter::new(text()).with_fetcher(SlowFetcher {
        calls: Arc::clone(&calls),
        bytes: Some(RED_SVG.to_vec()),
    });

    let images: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| painter.resolve("logo.svg").unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(painter.cached_len(), 1);
    assert!(images.iter().all(|image| Arc::ptr_eq(image, &images[0])));
}

#[test]
fn test_concurrent_failed_load_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let painter = ImagePainter::new(text()).with_fetcher(SlowFetcher {
        calls: Arc::clone(&calls),
        bytes: None,
    });

    let failures = thread::scope(|scope| {
        let workers: Vec<_> = (0..3)
            .map(|_| scope.spawn(|| painter.resolve("missing.png")))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .filter(Result::is_err)
            .count()
    });

    assert_eq!(failures, 3);
    assert_eq!(painter.cached_len(), 0);
    // A later call tries again.
    assert!(painter.resolve("missing.png").is_err());
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

// ========== placeholders ==========

#[test]
fn test_network_source_always_placeholder() {
    let (painter, calls) = counting_painter(Some(RED_SVG));
    let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
    for src in ["http://example.com/a.svg", "https://example.com/a.svg"] {
        let canvas = paint(&painter, src, frame);
        assert!(images_drawn(&canvas).is_empty());
        assert!(is_placeholder(&canvas, frame));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(painter.cached_len(), 0);
}

#[test]
fn test_failed_load_paints_placeholder() {
    let (painter, _) = counting_painter(None);
    let frame = Rect::new(0.0, 0.0, 30.0, 30.0);
    let canvas = paint(&painter, "missing.png", frame);
    assert!(is_placeholder(&canvas, frame));
    assert_eq!(painter.cached_len(), 0);
}

#[test]
fn test_small_placeholder_has_no_glyph() {
    let (painter, _) = counting_painter(None);
    let canvas = paint(&painter, "missing.png", Rect::new(0.0, 0.0, 39.0, 80.0));
    assert_eq!(canvas.drawing_ops().count(), 2);
}

#[test]
fn test_medium_placeholder_has_glyph_but_no_label() {
    let (painter, _) = counting_painter(None);
    let canvas = paint(&painter, "missing.png", Rect::new(0.0, 0.0, 60.0, 60.0));
    assert!(canvas.drawing_ops().count() > 2);
    assert!(
        !canvas
            .ops()
            .iter()
            .any(|op| matches!(op, CanvasOp::DrawGlyphs { .. }))
    );
}

#[test]
fn test_large_placeholder_has_label_near_bottom() {
    let (painter, _) = counting_painter(None);
    let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
    let canvas = paint(&painter, "missing.png", frame);
    let label = canvas.ops().iter().find_map(|op| match op {
        CanvasOp::DrawGlyphs { bounds, color, .. } => Some((*bounds, *color)),
        _ => None,
    });
    let (bounds, color) = label.unwrap();
    assert_eq!(color, ColorValue::GRAY);
    assert!(bounds.min_y() >= frame.max_y() - 20.0);
    assert!(bounds.max_y() <= frame.max_y());
    assert!((bounds.mid_x() - frame.mid_x()).abs() < 1e-3);
}

// ========== local loading ==========

#[test]
fn test_png_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swatch.png");
    SkiaCanvas::new(6, 3)
        .unwrap()
        .with_background(ColorValue::rgb(0, 0, 255))
        .save_png(&path)
        .unwrap();

    let painter = ImagePainter::new(text());
    let image = painter.load(path.to_str().unwrap()).unwrap();
    assert_eq!((image.width(), image.height()), (6, 3));
    assert_eq!(&image.rgba_data()[..4], &[0, 0, 255, 255]);

    let url = format!("file://{}", path.display());
    let frame = Rect::new(0.0, 0.0, 12.0, 6.0);
    let canvas = paint(&painter, &url, frame);
    assert_eq!(images_drawn(&canvas), vec![((6, 3), frame)]);
    assert!(painter.cached(&url).is_some());
}

#[test]
fn test_svg_data_url() {
    let painter = ImagePainter::new(text());
    let src = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' width='4' height='4'/>";
    let canvas = paint(&painter, src, Rect::new(0.0, 0.0, 4.0, 4.0));
    assert_eq!(images_drawn(&canvas).len(), 1);
}

#[test]
fn test_corrupt_file_is_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let painter = ImagePainter::new(text());
    let frame = Rect::new(0.0, 0.0, 50.0, 50.0);
    let canvas = paint(&painter, path.to_str().unwrap(), frame);
    assert!(is_placeholder(&canvas, frame));
    assert!(painter.load(path.to_str().unwrap()).is_err());
}
