//! Common utilities for the Koala renderer.
//!
//! This crate provides shared infrastructure used by the tree and paint crates:
//! - **Geometry** - points, sizes, rectangles, edge insets, affine transforms
//! - **Color** - sRGB colors with hex and named-color parsing
//! - **Images** - decoded RGBA image data
//! - **Data URLs** - synchronous decoding of `data:` resources
//! - **Warning System** - deduplicated diagnostics for unsupported features

pub mod color;
pub mod data_url;
pub mod geometry;
pub mod image;
pub mod warning;

pub use color::ColorValue;
pub use geometry::{EdgeSizes, Point, Rect, Size, Transform};
