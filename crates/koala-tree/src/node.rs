//! Render tree nodes.

use std::collections::HashMap;
use std::sync::Arc;

use koala_common::{Rect, Transform};

use crate::arena::NodeId;
use crate::style::ComputedStyle;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// The markup element a render node was generated for.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
///
/// NOTE: We only store the local name and attributes; paint never needs
/// namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// An element with no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: AttributesMap::new(),
        }
    }

    /// Builder: add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the attribute is present (even if empty).
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// The tag name lowercased, the key for element-specific painting.
    #[must_use]
    pub fn local_name(&self) -> String {
        self.tag_name.to_ascii_lowercase()
    }

    /// Case-insensitive tag comparison.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

/// Identifies a compositing layer owned by some mechanism outside paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// A laid-out visual node.
///
/// Everything except `needs_repaint` is read-only to paint. The tree wiring
/// (`parent`, `children`) is managed through [`crate::RenderTree`].
#[derive(Debug, Clone)]
pub struct RenderNode {
    /// Border box in the parent's coordinate space.
    pub frame: Rect,
    /// Content box in the same space, when layout recorded one.
    pub content_box: Option<Rect>,
    /// Applied before painting; identity is the common case.
    pub transform: Transform,
    /// Group opacity in `[0, 1]`.
    pub opacity: f32,
    /// Resolved style. Many nodes (e.g. a block and its text runs) share one.
    pub style: Option<Arc<ComputedStyle>>,
    /// Set when a separate compositor owns this subtree.
    pub layer: Option<LayerId>,
    /// Text to paint for text nodes, or an element's label text.
    pub text_content: Option<String>,
    /// The originating element, absent for text and anonymous boxes.
    pub element: Option<ElementData>,
    /// Cleared by paint after this node paints successfully.
    pub needs_repaint: bool,
    is_text: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl RenderNode {
    fn with_frame(frame: Rect) -> Self {
        Self {
            frame,
            content_box: None,
            transform: Transform::IDENTITY,
            opacity: 1.0,
            style: None,
            layer: None,
            text_content: None,
            element: None,
            needs_repaint: true,
            is_text: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A box generated for `element`.
    #[must_use]
    pub fn element(element: ElementData, frame: Rect) -> Self {
        Self {
            element: Some(element),
            ..Self::with_frame(frame)
        }
    }

    /// A text run.
    #[must_use]
    pub fn text(text: impl Into<String>, frame: Rect) -> Self {
        Self {
            text_content: Some(text.into()),
            is_text: true,
            ..Self::with_frame(frame)
        }
    }

    /// An anonymous box with no element and no text.
    #[must_use]
    pub fn anonymous(frame: Rect) -> Self {
        Self::with_frame(frame)
    }

    /// Builder: attach a style.
    #[must_use]
    pub fn with_style(mut self, style: Arc<ComputedStyle>) -> Self {
        self.style = Some(style);
        self
    }

    /// Builder: set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder: mark as composited on its own layer.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Builder: set the text content (e.g. a button's label).
    #[must_use]
    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder: record the content box.
    #[must_use]
    pub fn with_content_box(mut self, content_box: Rect) -> Self {
        self.content_box = Some(content_box);
        self
    }

    /// Whether this node is a text run.
    #[must_use]
    pub const fn is_text_node(&self) -> bool {
        self.is_text
    }

    /// Lowercased tag name, if this node has an element.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        self.element.as_ref().map(ElementData::local_name)
    }

    /// The parent node, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in paint order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
