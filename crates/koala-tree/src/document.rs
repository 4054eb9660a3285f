//! Serialized render trees.
//!
//! A [`NodeDocument`] is the on-disk form of a laid-out subtree, used by the
//! CLI and by fixtures. Style values are kept as the strings a stylesheet
//! would contain. Unparseable values are reported once and fall back to the
//! property's initial value, the same recovery the cascade applies.

use std::collections::HashMap;
use std::sync::Arc;

use koala_common::warning::warn_once;
use koala_common::{ColorValue, Rect, Transform};
use serde::{Deserialize, Serialize};

use crate::arena::{NodeId, RenderTree, TreeError};
use crate::node::{ElementData, LayerId, RenderNode};
use crate::style::{BorderEdge, BorderStyle, ComputedStyle, FontWeight, LengthValue, TextDecoration};

const fn default_opacity() -> f32 {
    1.0
}

/// One node of a serialized tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDocument {
    /// Element tag; absent for text runs and anonymous boxes.
    pub tag: Option<String>,
    /// Element attributes.
    pub attrs: HashMap<String, String>,
    /// Text content. Without a `tag` this makes the node a text run.
    pub text: Option<String>,
    /// `[x, y, width, height]` relative to the parent's frame origin.
    pub frame: [f32; 4],
    /// `[x, y, width, height]` in the same space as `frame`.
    pub content_box: Option<[f32; 4]>,
    /// Affine matrix `[a, b, c, d, e, f]`.
    pub transform: Option<[f32; 6]>,
    /// Group opacity.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Compositing layer id, if a separate compositor owns this subtree.
    pub layer: Option<u64>,
    /// Resolved style. Text runs without one share their parent's.
    pub style: Option<StyleDocument>,
    /// Children in paint order.
    pub children: Vec<NodeDocument>,
}

impl Default for NodeDocument {
    fn default() -> Self {
        Self {
            tag: None,
            attrs: HashMap::new(),
            text: None,
            frame: [0.0; 4],
            content_box: None,
            transform: None,
            opacity: default_opacity(),
            layer: None,
            style: None,
            children: Vec::new(),
        }
    }
}

/// Style properties in stylesheet syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleDocument {
    /// e.g. `"#eee"` or `"white"`.
    pub background_color: Option<String>,
    /// Text color.
    pub color: Option<String>,
    /// Shorthand for all four edges: `"2px dashed"`.
    pub border: Option<String>,
    /// Overrides the top edge.
    pub border_top: Option<String>,
    /// Overrides the right edge.
    pub border_right: Option<String>,
    /// Overrides the bottom edge.
    pub border_bottom: Option<String>,
    /// Overrides the left edge.
    pub border_left: Option<String>,
    /// Shared border color.
    pub border_color: Option<String>,
    /// `"14px"`, `"1.5em"`.
    pub font_size: Option<String>,
    /// `"bold"`, `"300"`.
    pub font_weight: Option<String>,
    /// `"underline"`, `"line-through"`.
    pub text_decoration: Option<String>,
}

fn parse_or_warn<T>(property: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        warn_once("Document", &format!("ignoring invalid {property}: {value:?}"));
    }
    parsed
}

/// Parse a border shorthand: any order of a width and a style keyword.
fn parse_border_edge(text: &str) -> Option<BorderEdge> {
    let mut edge = BorderEdge {
        width: LengthValue::Px(1.0),
        style: BorderStyle::None,
    };
    let mut saw_style = false;
    for token in text.split_whitespace() {
        if let Some(style) = BorderStyle::parse(token) {
            edge.style = style;
            saw_style = true;
        } else if let Some(width) = LengthValue::parse(token) {
            edge.width = width;
        } else {
            return None;
        }
    }
    saw_style.then_some(edge)
}

impl StyleDocument {
    /// Resolve into a [`ComputedStyle`], warning about invalid values.
    #[must_use]
    pub fn to_computed(&self) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        let color = |property: &str, value: Option<&str>, slot: &mut ColorValue| {
            if let Some(parsed) = value.and_then(|v| parse_or_warn(property, v, ColorValue::parse)) {
                *slot = parsed;
            }
        };
        color(
            "background-color",
            self.background_color.as_deref(),
            &mut style.background_color,
        );
        color("color", self.color.as_deref(), &mut style.color);
        color(
            "border-color",
            self.border_color.as_deref(),
            &mut style.border_color,
        );

        if let Some(edge) = self
            .border
            .as_deref()
            .and_then(|v| parse_or_warn("border", v, parse_border_edge))
        {
            style.set_all_borders(edge);
        }
        for (property, value, slot) in [
            ("border-top", self.border_top.as_deref(), &mut style.border_top),
            ("border-right", self.border_right.as_deref(), &mut style.border_right),
            ("border-bottom", self.border_bottom.as_deref(), &mut style.border_bottom),
            ("border-left", self.border_left.as_deref(), &mut style.border_left),
        ] {
            if let Some(edge) = value.and_then(|v| parse_or_warn(property, v, parse_border_edge))
            {
                *slot = edge;
            }
        }

        if let Some(size) = self
            .font_size
            .as_deref()
            .and_then(|v| parse_or_warn("font-size", v, LengthValue::parse))
        {
            style.font_size = size;
        }
        if let Some(weight) = self
            .font_weight
            .as_deref()
            .and_then(|v| parse_or_warn("font-weight", v, FontWeight::parse))
        {
            style.font_weight = weight;
        }
        if let Some(decoration) = self
            .text_decoration
            .as_deref()
            .and_then(|v| parse_or_warn("text-decoration", v, TextDecoration::parse))
        {
            style.text_decoration = decoration;
        }
        style
    }
}

const fn rect_from(values: [f32; 4]) -> Rect {
    Rect::new(values[0], values[1], values[2], values[3])
}

impl NodeDocument {
    fn to_node(&self, inherited: Option<&Arc<ComputedStyle>>) -> RenderNode {
        let frame = rect_from(self.frame);
        let mut node = match (&self.tag, &self.text) {
            (Some(tag), _) => {
                let mut element = ElementData::new(tag.clone());
                element.attrs.clone_from(&self.attrs);
                let mut node = RenderNode::element(element, frame);
                node.text_content.clone_from(&self.text);
                node
            }
            (None, Some(text)) => RenderNode::text(text.clone(), frame),
            (None, None) => RenderNode::anonymous(frame),
        };

        node.content_box = self.content_box.map(rect_from);
        if let Some([a, b, c, d, e, f]) = self.transform {
            node.transform = Transform::new(a, b, c, d, e, f);
        }
        node.opacity = self.opacity;
        node.layer = self.layer.map(LayerId);
        node.style = match &self.style {
            Some(style) => Some(Arc::new(style.to_computed())),
            None if node.is_text_node() => inherited.cloned(),
            None => None,
        };
        node
    }
}

impl RenderTree {
    /// Build a tree from a document and make its top node the root.
    ///
    /// # Errors
    ///
    /// Propagates [`TreeError`] from wiring the nodes together, which only
    /// happens if the tree is corrupted mid-build.
    pub fn from_document(doc: &NodeDocument) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        let root = tree.alloc(doc.to_node(None));
        tree.set_root(root)?;

        let mut pending: Vec<(NodeId, &NodeDocument)> = vec![(root, doc)];
        while let Some((id, node_doc)) = pending.pop() {
            let style = tree.get(id).and_then(|n| n.style.clone());
            for child_doc in &node_doc.children {
                let child = tree.append_new(id, child_doc.to_node(style.as_ref()))?;
                pending.push((child, child_doc));
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_border_edge() {
        assert_eq!(
            parse_border_edge("2px dashed"),
            Some(BorderEdge::new(2.0, BorderStyle::Dashed))
        );
        assert_eq!(
            parse_border_edge("solid"),
            Some(BorderEdge::new(1.0, BorderStyle::Solid))
        );
        assert_eq!(parse_border_edge("2px"), None);
        assert_eq!(parse_border_edge("2px wavy"), None);
    }
}
