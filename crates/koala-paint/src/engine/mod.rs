//! Paint traversal.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! The engine walks a [`RenderTree`] depth-first and paints each node in a
//! fixed order inside its own canvas state scope:
//!
//! 1. Background
//! 2. Content: text for text runs, otherwise element-specific content
//! 3. Children, in order, skipping children composited on their own layer
//! 4. Decorations: borders, then text-decoration lines on anchors
//! 5. Debug overlay, when the context asks for it
//!
//! A failing node restores its state and reports failure. Whether that
//! failure reaches the parent's result is set by [`ChildFailurePolicy`]; a
//! broken subtree never stops its siblings from painting.

mod content;
mod overlay;

use std::sync::Arc;

use koala_common::{ColorValue, Rect, Transform};
use koala_tree::{NodeId, RenderNode, RenderTree};

use crate::background::BackgroundPainter;
use crate::border::BorderPainter;
use crate::context::PaintContext;
use crate::error::{PaintError, PaintResult};
use crate::image::ImagePainter;
use crate::text::{TextPainter, TextShaper};

/// What a failed child means for its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildFailurePolicy {
    /// The parent's result only reflects its own painting.
    #[default]
    Ignore,
    /// The parent still paints every child but reports failure (and keeps
    /// its repaint flag) if any child failed.
    Propagate,
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How child failures affect the parent.
    pub child_failures: ChildFailurePolicy,
    /// Backdrop used for an `html` element with a transparent background.
    pub root_background: ColorValue,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            child_failures: ChildFailurePolicy::Ignore,
            root_background: ColorValue::WHITE,
        }
    }
}

impl EngineConfig {
    /// Builder: set the child failure policy.
    #[must_use]
    pub const fn with_child_failures(mut self, policy: ChildFailurePolicy) -> Self {
        self.child_failures = policy;
        self
    }

    /// Builder: set the `html` backdrop color.
    #[must_use]
    pub const fn with_root_background(mut self, color: ColorValue) -> Self {
        self.root_background = color;
        self
    }
}

/// Called with a rectangle that needs repainting.
pub type InvalidationObserver = Box<dyn Fn(Rect) + Send + Sync>;

/// Paints render trees onto a [`Canvas`](crate::Canvas).
pub struct PaintEngine {
    config: EngineConfig,
    background: BackgroundPainter,
    borders: BorderPainter,
    text: TextPainter,
    images: ImagePainter,
    observer: Option<InvalidationObserver>,
}

impl PaintEngine {
    /// An engine shaping text with `shaper`, using the default image loader.
    #[must_use]
    pub fn new(shaper: Arc<dyn TextShaper>) -> Self {
        let text = TextPainter::new(shaper);
        Self {
            config: EngineConfig::default(),
            background: BackgroundPainter,
            borders: BorderPainter,
            images: ImagePainter::new(text.clone()),
            text,
            observer: None,
        }
    }

    /// Builder: replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: replace the image painter (e.g. to inject a fetcher).
    #[must_use]
    pub fn with_image_painter(mut self, images: ImagePainter) -> Self {
        self.images = images;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The text painter, also used for widget labels.
    #[must_use]
    pub const fn text_painter(&self) -> &TextPainter {
        &self.text
    }

    /// The image painter and its cache.
    #[must_use]
    pub const fn image_painter(&self) -> &ImagePainter {
        &self.images
    }

    /// Register the callback told about regions needing repaint.
    pub fn set_invalidation_observer(&mut self, observer: impl Fn(Rect) + Send + Sync + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&self, rect: Rect) {
        if let Some(observer) = &self.observer {
            observer(rect);
        }
    }

    /// Mark `id` and its subtree dirty and report its frame in root
    /// coordinates to the invalidation observer.
    ///
    /// Returns `false` if `id` has been released.
    pub fn invalidate(&self, tree: &mut RenderTree, id: NodeId) -> bool {
        let Some(frame) = tree.frame_in_root(id) else {
            return false;
        };
        tree.mark_subtree_dirty(id);
        self.notify(frame);
        true
    }

    /// Paint the tree's root clipped to the viewport and scaled by the
    /// context's scale factor.
    ///
    /// Returns `false` if the tree has no root, the context is invalid, or
    /// the root failed to paint.
    pub fn paint_tree(&self, tree: &mut RenderTree, ctx: &mut PaintContext<'_>) -> bool {
        let Some(root) = tree.root() else {
            log::warn!("paint_tree called on a tree without a root");
            return false;
        };
        if let Err(e) = ctx.validate() {
            log::warn!("cannot paint: {e}");
            return false;
        }
        let scale = ctx.scale_factor();
        let viewport = ctx.viewport();
        let mut scope = ctx.scoped();
        scope.canvas().concat(&Transform::scale(scale, scale));
        scope.canvas().clip_rect(viewport);
        self.paint(tree, root, &mut scope)
    }

    /// Paint `id` and its subtree in the current canvas state.
    ///
    /// Returns `true` when the node painted completely. Nodes that painted
    /// successfully have their repaint flag cleared.
    pub fn paint(&self, tree: &mut RenderTree, id: NodeId, ctx: &mut PaintContext<'_>) -> bool {
        let mut painted = Vec::new();
        let ok = self.paint_contained(tree, id, ctx, &mut painted);
        for node in painted {
            if let Some(node) = tree.get_mut(node) {
                node.needs_repaint = false;
            }
        }
        ok
    }

    /// Paint one node, logging and reporting its failure instead of
    /// returning it.
    fn paint_contained(
        &self,
        tree: &RenderTree,
        id: NodeId,
        ctx: &mut PaintContext<'_>,
        painted: &mut Vec<NodeId>,
    ) -> bool {
        let Some(node) = tree.get(id) else {
            log::warn!("skipping released node {id:?}");
            return false;
        };
        match self.paint_node(tree, id, node, ctx, painted) {
            Ok(true) => {
                painted.push(id);
                true
            }
            Ok(false) => false,
            Err(e) => {
                let tag = node.tag_name().unwrap_or_else(|| "#text".to_string());
                log::warn!("failed to paint <{tag}>: {e}");
                if node.frame.is_finite() {
                    self.notify(node.frame);
                }
                false
            }
        }
    }

    /// `Ok(false)` means the node painted but a child failed under
    /// [`ChildFailurePolicy::Propagate`].
    fn paint_node(
        &self,
        tree: &RenderTree,
        id: NodeId,
        node: &RenderNode,
        ctx: &mut PaintContext<'_>,
        painted: &mut Vec<NodeId>,
    ) -> PaintResult<bool> {
        let frame = node.frame;
        if !frame.is_finite() {
            return Err(PaintError::InvalidFrame);
        }
        if frame.is_empty() {
            return Ok(true);
        }
        log::trace!("paint {id:?} {:?} {frame:?}", node.tag_name());

        let mut scope = ctx.scoped();
        scope.canvas().clip_rect(frame);
        if !node.transform.is_identity() {
            if !node.transform.is_invertible() {
                return Err(PaintError::Unsupported(
                    "non-invertible transform".to_string(),
                ));
            }
            scope.canvas().concat(&node.transform);
        }
        if node.opacity < 1.0 {
            scope.canvas().begin_alpha(node.opacity.max(0.0));
        }

        self.paint_background(node, &mut scope);
        self.paint_content(node, &mut scope)?;
        let children_ok = self.paint_children(tree, id, frame, &mut scope, painted);
        self.paint_decorations(node, &mut scope);
        if scope.debug_overlay() {
            overlay::paint_debug_overlay(node, &self.text, &mut scope);
        }
        Ok(children_ok)
    }

    fn paint_background(&self, node: &RenderNode, ctx: &mut PaintContext<'_>) {
        let mut color = node
            .style
            .as_ref()
            .map_or(ColorValue::TRANSPARENT, |s| s.background_color);
        if color.is_transparent() && node.element.as_ref().is_some_and(|e| e.is("html")) {
            color = self.config.root_background;
        }
        self.background.paint_background(color, node.frame, ctx);
    }

    fn paint_content(&self, node: &RenderNode, ctx: &mut PaintContext<'_>) -> PaintResult<()> {
        if node.is_text_node() {
            let text = node.text_content.as_deref().unwrap_or_default();
            return self
                .text
                .paint_text(text, node.style.as_deref(), node.frame, ctx);
        }
        match &node.element {
            Some(element) => content::paint_element(self, node, element, ctx),
            None => Ok(()),
        }
    }

    /// Children are laid out relative to this node's frame origin.
    fn paint_children(
        &self,
        tree: &RenderTree,
        id: NodeId,
        frame: Rect,
        ctx: &mut PaintContext<'_>,
        painted: &mut Vec<NodeId>,
    ) -> bool {
        let children = tree.children(id);
        if children.is_empty() {
            return true;
        }
        let mut scope = ctx.scoped();
        scope
            .canvas()
            .concat(&Transform::translate(frame.x, frame.y));

        let mut all_ok = true;
        for &child in children {
            if let Some(layer) = tree.get(child).and_then(|c| c.layer) {
                log::debug!("skipping {child:?}: composited on layer {}", layer.0);
                continue;
            }
            if !self.paint_contained(tree, child, &mut scope, painted) {
                all_ok = false;
            }
        }
        all_ok || self.config.child_failures == ChildFailurePolicy::Ignore
    }

    fn paint_decorations(&self, node: &RenderNode, ctx: &mut PaintContext<'_>) {
        let Some(style) = node.style.as_deref() else {
            return;
        };
        self.borders.paint_borders(style, node.frame, ctx);
        if node.element.as_ref().is_some_and(|e| e.is("a")) {
            content::paint_text_decoration(style, node.frame, ctx);
        }
    }
}
