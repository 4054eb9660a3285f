//! Tests for building render trees from serialized documents.

use std::sync::Arc;

use koala_common::{ColorValue, Rect, Transform};
use koala_tree::{
    BorderEdge, BorderStyle, FontWeight, LayerId, LengthValue, NodeDocument, RenderTree, Side,
    TextDecoration,
};

const DOCUMENT: &str = r##"{
    "tag": "html",
    "frame": [0, 0, 200, 100],
    "style": { "background-color": "#eeeeee" },
    "children": [
        {
            "tag": "div",
            "frame": [10, 10, 100, 40],
            "transform": [1, 0, 0, 1, 5, 0],
            "opacity": 0.5,
            "layer": 7,
            "style": {
                "color": "red",
                "border": "2px dashed",
                "border-left": "4px double",
                "font-size": "20px",
                "font-weight": "bold",
                "text-decoration": "underline"
            },
            "children": [
                { "text": "Hello", "frame": [0, 0, 50, 20] }
            ]
        },
        {
            "tag": "input",
            "attrs": { "placeholder": "Search" },
            "frame": [10, 60, 100, 20]
        }
    ]
}"##;

#[test]
fn test_from_document_structure() {
    let doc: NodeDocument = serde_json::from_str(DOCUMENT).unwrap();
    let tree = RenderTree::from_document(&doc).unwrap();

    let root = tree.root().unwrap();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.get(root).unwrap().tag_name().as_deref(), Some("html"));

    let children = tree.children(root);
    assert_eq!(children.len(), 2);
    let div = tree.get(children[0]).unwrap();
    assert_eq!(div.frame, Rect::new(10.0, 10.0, 100.0, 40.0));
    assert_eq!(div.transform, Transform::translate(5.0, 0.0));
    assert!((div.opacity - 0.5).abs() < f32::EPSILON);
    assert_eq!(div.layer, Some(LayerId(7)));

    let input = tree.get(children[1]).unwrap();
    assert!((input.opacity - 1.0).abs() < f32::EPSILON);
    assert_eq!(
        input.element.as_ref().unwrap().attr("placeholder"),
        Some("Search")
    );
    assert!(input.style.is_none());
}

#[test]
fn test_from_document_styles() {
    let doc: NodeDocument = serde_json::from_str(DOCUMENT).unwrap();
    let tree = RenderTree::from_document(&doc).unwrap();
    let root = tree.root().unwrap();

    let root_style = tree.get(root).unwrap().style.clone().unwrap();
    assert_eq!(root_style.background_color, ColorValue::rgb(0xee, 0xee, 0xee));

    let div_id = tree.children(root)[0];
    let style = tree.get(div_id).unwrap().style.clone().unwrap();
    assert_eq!(style.color, ColorValue::rgb(255, 0, 0));
    assert_eq!(*style.border(Side::Top), BorderEdge::new(2.0, BorderStyle::Dashed));
    assert_eq!(*style.border(Side::Left), BorderEdge::new(4.0, BorderStyle::Double));
    assert_eq!(style.font_size, LengthValue::Px(20.0));
    assert_eq!(style.font_weight, FontWeight::Bold);
    assert_eq!(style.text_decoration, TextDecoration::Underline);
}

#[test]
fn test_text_runs_share_parent_style() {
    let doc: NodeDocument = serde_json::from_str(DOCUMENT).unwrap();
    let tree = RenderTree::from_document(&doc).unwrap();
    let div_id = tree.children(tree.root().unwrap())[0];
    let text_id = tree.children(div_id)[0];

    let text = tree.get(text_id).unwrap();
    assert!(text.is_text_node());
    assert_eq!(text.text_content.as_deref(), Some("Hello"));

    let div_style = tree.get(div_id).unwrap().style.as_ref().unwrap();
    assert!(Arc::ptr_eq(div_style, text.style.as_ref().unwrap()));
}

#[test]
fn test_invalid_style_values_fall_back() {
    let doc: NodeDocument = serde_json::from_str(
        r#"{ "tag": "p", "style": { "color": "not-a-color", "border": "3px wavy" } }"#,
    )
    .unwrap();
    let tree = RenderTree::from_document(&doc).unwrap();
    let style = tree.get(tree.root().unwrap()).unwrap().style.clone().unwrap();
    assert_eq!(style.color, ColorValue::BLACK);
    assert_eq!(style.border(Side::Top).style, BorderStyle::None);
}
