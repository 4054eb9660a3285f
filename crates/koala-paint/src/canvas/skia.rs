//! Software rasterizer backed by tiny-skia.
//!
//! The canvas keeps a stack of layers. The bottom layer is the output
//! pixmap; [`Canvas::begin_alpha`] pushes a transparent layer that is
//! composited onto the one below with its opacity when the owning state is
//! restored. Clips are kept as device-space masks and intersected by taking
//! the per-pixel minimum. Saved states share their clip mask; only
//! [`Canvas::clip_rect`] allocates a new one.

use std::path::Path;
use std::sync::Arc;

use koala_common::image::LoadedImage;
use koala_common::{ColorValue, Point, Rect, Transform};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, IntSize, Mask, Paint, PathBuilder, Pixmap, PixmapPaint,
    Shader, Stroke, StrokeDash,
};

use super::{Canvas, StrokeStyle};
use crate::error::{PaintError, PaintResult};
use crate::text::ShapedText;

#[derive(Clone)]
struct State {
    transform: Transform,
    clip: Option<Arc<Mask>>,
    /// Set when `begin_alpha` pushed a layer at this level.
    layer_opacity: Option<f32>,
}

/// A [`Canvas`] rasterizing into a tiny-skia pixmap.
pub struct SkiaCanvas {
    layers: Vec<Pixmap>,
    stack: Vec<State>,
    state: State,
}

fn to_skia_transform(t: &Transform) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(t.a, t.b, t.c, t.d, t.e, t.f)
}

fn to_skia_color(color: ColorValue) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Create a `Paint` with a solid color.
fn solid_paint(color: ColorValue) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(to_skia_color(color)),
        anti_alias: true,
        ..Paint::default()
    }
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

/// Intersect two masks by taking the minimum alpha of each pixel.
fn intersect_masks(dst: &mut Mask, src: &Mask) {
    for (d, s) in dst.data_mut().iter_mut().zip(src.data()) {
        *d = (*d).min(*s);
    }
}

/// Convert straight RGBA into a premultiplied pixmap.
#[allow(clippy::cast_possible_truncation)]
fn premultiplied_pixmap(width: u32, height: u32, rgba: &[u8]) -> Option<Pixmap> {
    let mut data = rgba.to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, IntSize::from_wh(width, height)?)
}

impl SkiaCanvas {
    /// A transparent canvas of `width` x `height` device pixels.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::InvalidContext`] if either dimension is zero or
    /// the pixmap cannot be allocated.
    pub fn new(width: u32, height: u32) -> PaintResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(PaintError::InvalidContext)?;
        Ok(Self {
            layers: vec![pixmap],
            stack: Vec::new(),
            state: State {
                transform: Transform::IDENTITY,
                clip: None,
                layer_opacity: None,
            },
        })
    }

    /// Builder: fill the whole surface with `color` before painting.
    #[must_use]
    pub fn with_background(mut self, color: ColorValue) -> Self {
        if let Some(base) = self.layers.first_mut() {
            base.fill(to_skia_color(color));
        }
        self
    }

    /// Surface width in device pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.layers.first().map_or(0, Pixmap::width)
    }

    /// Surface height in device pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.layers.first().map_or(0, Pixmap::height)
    }

    /// The finished surface. Open alpha layers are not included.
    #[must_use]
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.layers.first()
    }

    /// Straight-alpha color of one device pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorValue> {
        let c = self.pixmap()?.pixel(x, y)?.demultiply();
        Some(ColorValue::rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Encode the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::Unsupported`] if encoding or writing fails.
    pub fn save_png(&self, path: &Path) -> PaintResult<()> {
        let pixmap = self.pixmap().ok_or(PaintError::InvalidContext)?;
        pixmap.save_png(path).map_err(|e| {
            PaintError::Unsupported(format!("failed to save '{}': {e}", path.display()))
        })
    }

    fn skia_transform(&self) -> tiny_skia::Transform {
        to_skia_transform(&self.state.transform)
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, style: &StrokeStyle) {
        let dash = if style.dash.is_empty() {
            None
        } else {
            StrokeDash::new(style.dash.clone(), 0.0)
        };
        let stroke = Stroke {
            width: style.width,
            dash,
            ..Stroke::default()
        };
        let transform = self.skia_transform();
        let paint = solid_paint(style.color);
        if let Some(target) = self.layers.last_mut() {
            target.stroke_path(path, &paint, &stroke, transform, self.state.clip.as_deref());
        }
    }

    fn draw_glyph_coverage(
        &mut self,
        device: Rect,
        width: u32,
        height: u32,
        coverage: &[u8],
        color: ColorValue,
    ) {
        let rgba: Vec<u8> = coverage
            .iter()
            .flat_map(|&alpha| {
                let a = u16::from(alpha) * u16::from(color.a) / 255;
                #[allow(clippy::cast_possible_truncation)]
                let a = a as u8;
                [color.r, color.g, color.b, a]
            })
            .collect();
        let Some(glyph) = premultiplied_pixmap(width, height, &rgba) else {
            return;
        };
        #[allow(clippy::cast_precision_loss)]
        let placement = tiny_skia::Transform::from_row(
            device.width / width as f32,
            0.0,
            0.0,
            device.height / height as f32,
            device.x,
            device.y,
        );
        if let Some(target) = self.layers.last_mut() {
            target.draw_pixmap(
                0,
                0,
                glyph.as_ref(),
                &PixmapPaint::default(),
                placement,
                self.state.clip.as_deref(),
            );
        }
    }
}

impl Canvas for SkiaCanvas {
    fn save(&mut self) {
        // The saved copy keeps any pending layer so the outer restore still
        // composites it.
        self.stack.push(self.state.clone());
        self.state.layer_opacity = None;
    }

    fn restore(&mut self) {
        if let Some(opacity) = self.state.layer_opacity
            && self.layers.len() > 1
            && let Some(layer) = self.layers.pop()
            && let Some(below) = self.layers.last_mut()
        {
            let paint = PixmapPaint {
                opacity,
                blend_mode: BlendMode::SourceOver,
                quality: FilterQuality::Nearest,
            };
            below.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &paint,
                tiny_skia::Transform::identity(),
                None,
            );
        }
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        let (w, h) = (self.width(), self.height());
        let Some(mut mask) = Mask::new(w, h) else {
            return;
        };
        if let Some(rect) = skia_rect(rect) {
            mask.fill_path(
                &PathBuilder::from_rect(rect),
                FillRule::Winding,
                true,
                self.skia_transform(),
            );
        }
        // An empty rect leaves the mask fully transparent: nothing draws.
        if let Some(existing) = &self.state.clip {
            intersect_masks(&mut mask, existing);
        }
        self.state.clip = Some(Arc::new(mask));
    }

    fn concat(&mut self, transform: &Transform) {
        self.state.transform = self.state.transform.pre_concat(transform);
    }

    fn transform(&self) -> Transform {
        self.state.transform
    }

    fn begin_alpha(&mut self, opacity: f32) {
        if self.state.layer_opacity.is_some() {
            return;
        }
        let Some(layer) = Pixmap::new(self.width(), self.height()) else {
            return;
        };
        self.layers.push(layer);
        self.state.layer_opacity = Some(opacity.clamp(0.0, 1.0));
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        if color.is_transparent() {
            return;
        }
        let Some(rect) = skia_rect(rect) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let transform = self.skia_transform();
        if let Some(target) = self.layers.last_mut() {
            target.fill_path(
                &path,
                &solid_paint(color),
                FillRule::Winding,
                transform,
                self.state.clip.as_deref(),
            );
        }
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        if let Some(rect) = skia_rect(rect) {
            self.stroke_path(&PathBuilder::from_rect(rect), style);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn draw_image(&mut self, image: &LoadedImage, dest: Rect) {
        let Some(pixmap) = premultiplied_pixmap(image.width(), image.height(), image.rgba_data())
        else {
            return;
        };
        let (w, h) = image.dimensions_f32();
        let placement = self
            .skia_transform()
            .pre_concat(tiny_skia::Transform::from_row(
                dest.width / w,
                0.0,
                0.0,
                dest.height / h,
                dest.x,
                dest.y,
            ));
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        if let Some(target) = self.layers.last_mut() {
            target.draw_pixmap(
                0,
                0,
                pixmap.as_ref(),
                &paint,
                placement,
                self.state.clip.as_deref(),
            );
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_glyphs(&mut self, origin: Point, text: &ShapedText, color: ColorValue) {
        if color.is_transparent() {
            return;
        }
        let transform = self.state.transform;
        for glyph in &text.glyphs {
            let local = Rect::new(
                origin.x + glyph.x as f32,
                origin.y + glyph.y as f32,
                glyph.width as f32,
                glyph.height as f32,
            );
            let device = transform.map_rect(&local);
            if device.is_empty() {
                continue;
            }
            self.draw_glyph_coverage(device, glyph.width, glyph.height, &glyph.coverage, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_respects_clip_and_restore() {
        let mut canvas = SkiaCanvas::new(20, 20).unwrap();
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), ColorValue::BLACK);
        canvas.restore();

        assert_eq!(canvas.pixel(5, 5), Some(ColorValue::BLACK));
        assert_eq!(canvas.pixel(15, 5).map(|c| c.a), Some(0));
    }

    #[test]
    fn test_save_shares_clip_mask() {
        let mut canvas = SkiaCanvas::new(20, 20).unwrap();
        canvas.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        canvas.save();
        canvas.save();
        let current = canvas.state.clip.as_ref().unwrap();
        for saved in &canvas.stack {
            assert!(Arc::ptr_eq(saved.clip.as_ref().unwrap(), current));
        }

        // A nested clip allocates its own mask and still intersects.
        canvas.clip_rect(Rect::new(5.0, 0.0, 15.0, 20.0));
        assert!(!Arc::ptr_eq(
            canvas.stack[0].clip.as_ref().unwrap(),
            canvas.state.clip.as_ref().unwrap()
        ));
        canvas.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), ColorValue::BLACK);
        canvas.restore();
        canvas.restore();

        assert_eq!(canvas.pixel(7, 5), Some(ColorValue::BLACK));
        assert_eq!(canvas.pixel(2, 5).map(|c| c.a), Some(0));
        assert_eq!(canvas.pixel(12, 5).map(|c| c.a), Some(0));
    }

    #[test]
    fn test_alpha_layer_composites_on_restore() {
        let mut canvas = SkiaCanvas::new(4, 4)
            .unwrap()
            .with_background(ColorValue::WHITE);
        canvas.save();
        canvas.begin_alpha(0.5);
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), ColorValue::BLACK);
        // Not visible until the layer is composited.
        assert_eq!(canvas.pixel(1, 1), Some(ColorValue::WHITE));
        canvas.restore();

        let px = canvas.pixel(1, 1).unwrap();
        assert!((120..=136).contains(&px.r), "got {px:?}");
    }

    #[test]
    fn test_alpha_layer_survives_nested_save() {
        let mut canvas = SkiaCanvas::new(4, 4)
            .unwrap()
            .with_background(ColorValue::WHITE);
        canvas.save();
        canvas.begin_alpha(0.5);
        canvas.save();
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), ColorValue::BLACK);
        canvas.restore();
        assert_eq!(canvas.pixel(1, 1), Some(ColorValue::WHITE));
        canvas.restore();

        let px = canvas.pixel(1, 1).unwrap();
        assert!((120..=136).contains(&px.r), "got {px:?}");
        assert_eq!(canvas.layers.len(), 1);
    }

    #[test]
    fn test_draw_image_scales_into_dest() {
        let mut canvas = SkiaCanvas::new(10, 10).unwrap();
        let red = LoadedImage::solid(1, 1, [255, 0, 0, 255]).unwrap();
        canvas.draw_image(&red, Rect::new(2.0, 2.0, 6.0, 6.0));
        assert_eq!(canvas.pixel(5, 5), Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(0, 0).map(|c| c.a), Some(0));
    }
}
