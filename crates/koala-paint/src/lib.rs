//! Paint stage for the Koala renderer.
//!
//! Walks a laid-out [`koala_tree::RenderTree`] and issues drawing commands
//! against an abstract [`Canvas`].
//!
//! # Scope
//!
//! - **Traversal** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!   - Per-node clip, transform, and opacity scopes
//!   - Background → content → children → decorations → debug overlay
//!   - Failure containment per subtree
//!
//! - **Sub-painters**
//!   - [`BackgroundPainter`]: solid background fills
//!   - [`TextPainter`]: wrapped paragraphs and aligned single-line labels
//!   - [`BorderPainter`]: solid, dashed, dotted, and double edges
//!   - [`ImagePainter`]: cached image decoding with placeholders
//!
//! - **Backends**
//!   - [`SkiaCanvas`]: raster output through tiny-skia
//!   - [`RecordingCanvas`]: records operations for inspection
//!   - [`FontdueShaper`]: real glyph rasterization through fontdue
//!   - [`ApproximateShaper`]: font-free deterministic metrics
//!
//! # Not Yet Implemented
//!
//! - Asynchronous image loading (hosts may [`ImagePainter::insert`] results)
//! - Rounded corners and joined border corners
//! - Shadows, gradients, and filters

pub mod background;
pub mod border;
pub mod canvas;
pub mod context;
pub mod engine;
pub mod error;
pub mod image;
pub mod text;

pub use background::BackgroundPainter;
pub use border::{BorderPainter, EdgeStroke, edge_strokes};
pub use canvas::{Canvas, CanvasOp, RecordingCanvas, SkiaCanvas, StrokeStyle};
pub use context::{PaintContext, ScopedState};
pub use engine::{ChildFailurePolicy, EngineConfig, InvalidationObserver, PaintEngine};
pub use error::{PaintError, PaintResult};
pub use image::{ImageFetcher, ImagePainter, LocalFetcher};
pub use text::{
    ApproximateShaper, FontFace, FontSpec, FontdueShaper, ShapedGlyph, ShapedText, TextAlign,
    TextPainter, TextShaper,
};
