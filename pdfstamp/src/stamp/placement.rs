//! Stamp placement on the target page.
//!
//! The stamp is anchored to a corner of the page as the viewer sees it. A page
//! with `/Rotate` is displayed turned clockwise, so the corner is computed in
//! viewer space and mapped back into page space, and the stamp is drawn
//! counter-rotated so it reads upright.

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::stamp::layout::{Corner, StampLayout};
use crate::stamp::text_scan::Rect;
use crate::utils;

/// Size, origin and rotation of the page that receives the stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// MediaBox as `[llx, lly, urx, ury]`.
    pub media_box: [f32; 4],
    /// Clockwise display rotation: 0, 90, 180 or 270.
    pub rotation: u16,
}

impl PageGeometry {
    /// Unrotated page with the given size and origin at `(0, 0)`.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            media_box: [0.0, 0.0, width, height],
            rotation: 0,
        }
    }

    /// Read the geometry of a page, following page-tree inheritance.
    pub fn of_page(doc: &Document, page_id: ObjectId) -> Self {
        Self {
            media_box: utils::media_box(doc, page_id),
            rotation: utils::rotation(doc, page_id),
        }
    }

    /// Same geometry with a different rotation.
    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = rotation % 360;
        self
    }

    /// Page width in unrotated page space.
    pub fn width(&self) -> f32 {
        self.media_box[2] - self.media_box[0]
    }

    /// Page height in unrotated page space.
    pub fn height(&self) -> f32 {
        self.media_box[3] - self.media_box[1]
    }

    /// Page size as displayed to the viewer.
    pub fn viewer_size(&self) -> (f32, f32) {
        if self.rotation % 180 == 90 {
            (self.height(), self.width())
        } else {
            (self.width(), self.height())
        }
    }

    /// Map a viewer-space point (origin at the visible bottom-left) to page
    /// coordinates.
    pub fn viewer_to_page(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = (self.width(), self.height());
        let (px, py) = match self.rotation {
            90 => (w - y, x),
            180 => (w - x, h - y),
            270 => (y, h - x),
            _ => (x, y),
        };
        (px + self.media_box[0], py + self.media_box[1])
    }

    /// Map a page-space point to viewer space. Inverse of
    /// [`viewer_to_page`](Self::viewer_to_page).
    pub fn page_to_viewer(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = (self.width(), self.height());
        let (px, py) = (x - self.media_box[0], y - self.media_box[1]);
        match self.rotation {
            90 => (py, w - px),
            180 => (w - px, h - py),
            270 => (h - py, px),
            _ => (px, py),
        }
    }

    /// Bounding box of a page-space rectangle in viewer space.
    pub fn page_rect_to_viewer(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.page_to_viewer(rect[0], rect[1]);
        let (bx, by) = self.page_to_viewer(rect[2], rect[3]);
        [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)]
    }
}

/// Corners tried by [`Corner::Auto`], in order of preference. The lower right
/// corner wins every tie regardless of its position here.
const AUTO_CANDIDATES: [Corner; 4] = [
    Corner::TopRight,
    Corner::TopLeft,
    Corner::BottomRight,
    Corner::BottomLeft,
];

/// Whether the stamp area plus margins fits on the visible page.
pub fn fits(layout: &StampLayout, geometry: &PageGeometry) -> bool {
    let (view_w, view_h) = geometry.viewer_size();
    layout.width + 2.0 * layout.margin <= view_w && layout.height + 2.0 * layout.margin <= view_h
}

/// Bottom-left corner of the stamp area in viewer space when anchored to
/// `corner`.
///
/// On pages too small for the stamp the origin is clamped to the page, so the
/// stamp overhangs the top or right edge rather than the bottom-left one.
/// [`Corner::Auto`] is treated as the lower right corner; resolve it with
/// [`choose_corner`] first.
pub fn viewer_origin(layout: &StampLayout, geometry: &PageGeometry, corner: Corner) -> (f32, f32) {
    let (view_w, view_h) = geometry.viewer_size();
    let right = view_w - layout.margin - layout.width;
    let top = view_h - layout.margin - layout.height;

    let (x, y) = match corner {
        Corner::TopLeft => (layout.margin, top),
        Corner::TopRight => (right, top),
        Corner::BottomLeft => (layout.margin, layout.margin),
        Corner::BottomRight | Corner::Auto => (right, layout.margin),
    };

    (x.max(0.0), y.max(0.0))
}

/// Resolve the layout corner for a page.
///
/// Fixed corners are returned as is. For [`Corner::Auto`] each candidate
/// corner is scored by the area its stamp would share with `text_boxes`
/// (page space); the lowest score wins and the lower right corner wins ties.
pub fn choose_corner(layout: &StampLayout, geometry: &PageGeometry, text_boxes: &[Rect]) -> Corner {
    if layout.corner != Corner::Auto {
        return layout.corner;
    }

    let viewer_boxes: Vec<Rect> = text_boxes
        .iter()
        .map(|b| geometry.page_rect_to_viewer(b))
        .collect();

    let score = |corner: Corner| -> f32 {
        let (x, y) = viewer_origin(layout, geometry, corner);
        let area = [x, y, x + layout.width, y + layout.height];
        viewer_boxes.iter().map(|b| overlap(&area, b)).sum()
    };

    let preferred = score(Corner::BottomRight);
    let mut best = (Corner::BottomRight, preferred);
    for corner in AUTO_CANDIDATES {
        let s = score(corner);
        if s < best.1 {
            best = (corner, s);
        }
    }

    debug!(corner = ?best.0, overlap = best.1, boxes = text_boxes.len(), "Chose stamp corner");
    best.0
}

/// Area shared by two rectangles.
fn overlap(a: &Rect, b: &Rect) -> f32 {
    let dx = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let dy = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    dx * dy
}

/// Transformation matrix (`a b c d e f` of the `cm` operator) that maps stamp
/// coordinates into page space, for a stamp anchored to `corner`.
pub fn stamp_matrix(layout: &StampLayout, geometry: &PageGeometry, corner: Corner) -> [f32; 6] {
    let (vx, vy) = viewer_origin(layout, geometry, corner);
    let (e, f) = geometry.viewer_to_page(vx, vy);

    let (a, b, c, d) = match geometry.rotation {
        90 => (0.0, 1.0, -1.0, 0.0),
        180 => (-1.0, 0.0, 0.0, -1.0),
        270 => (0.0, -1.0, 1.0, 0.0),
        _ => (1.0, 0.0, 0.0, 1.0),
    };

    [a, b, c, d, e, f]
}
