//! Stamp construction and compositing.
//!
//! - [`layout`]: stamp dimensions, text and colour
//! - [`metrics`]: Helvetica-Bold glyph widths for centering
//! - [`placement`]: corner anchoring and rotation handling
//! - [`render`]: drawing the stamp into a single-page overlay
//! - [`text_scan`]: where a page already has text, for automatic placement
//! - [`merge`]: compositing the overlay onto a target page

pub mod layout;
pub mod merge;
pub mod metrics;
pub mod placement;
pub mod render;
pub mod text_scan;

pub use layout::{Color, Corner, StampLayout};
pub use merge::PageMerger;
pub use placement::PageGeometry;
pub use render::OverlayRenderer;
