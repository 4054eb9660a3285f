//! Render tree for the Koala paint stage.
//!
//! Layout and style resolution have already run by the time a tree reaches
//! this crate's consumers: every node carries its final frame, transform,
//! opacity, and a fully resolved [`ComputedStyle`].
//!
//! # Design
//!
//! Nodes live in a [`RenderTree`] arena addressed by generational
//! [`NodeId`]s. The tree owns every node and a node owns its children, so
//! releasing a node destroys its whole subtree exactly once. A `NodeId` is a
//! non-owning handle: after its node is released the id stops resolving
//! instead of aliasing whatever reuses the slot.

pub mod arena;
pub mod document;
pub mod node;
pub mod style;

pub use arena::{NodeId, RenderTree, TreeError};
pub use document::{NodeDocument, StyleDocument};
pub use node::{AttributesMap, ElementData, LayerId, RenderNode};
pub use style::{
    BorderEdge, BorderStyle, ComputedStyle, DEFAULT_FONT_SIZE_PX, FontWeight, LengthValue, Side,
    TextDecoration,
};
