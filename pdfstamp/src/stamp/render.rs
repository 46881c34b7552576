//! Overlay rendering.
//!
//! The overlay is a standalone single-page PDF with the same MediaBox as the
//! target page. Its only content is the stamp: a rounded box, two centered
//! text lines and two horizontal rules, all in the layout colour.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, instrument, warn};

use crate::error::{PdfStampError, Result};
use crate::stamp::layout::{Corner, StampLayout};
use crate::stamp::metrics::{self, FONT_NAME};
use crate::stamp::placement::{self, PageGeometry};
use crate::stamp::text_scan;

/// Resource name of the stamp font inside the overlay page.
pub const FONT_RESOURCE: &str = "FStamp";

/// Bézier control-point factor for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Renders stamp overlays for a fixed layout.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    layout: StampLayout,
}

impl OverlayRenderer {
    /// Create a renderer for `layout`.
    pub fn new(layout: StampLayout) -> Self {
        Self { layout }
    }

    /// Layout used by this renderer.
    pub fn layout(&self) -> &StampLayout {
        &self.layout
    }

    /// Render the overlay for page `page_id` of `doc`, a document with
    /// `page_count` pages.
    ///
    /// Reads the page geometry and, for [`Corner::Auto`], the text already on
    /// the page to pick the stamp corner.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStampError::RenderFailed`] if the content stream cannot
    /// be encoded.
    pub fn render_for_page(
        &self,
        doc: &Document,
        page_id: ObjectId,
        page_count: u32,
    ) -> Result<Document> {
        let geometry = PageGeometry::of_page(doc, page_id);
        let corner = if self.layout.corner == Corner::Auto {
            let boxes = text_scan::text_boxes(doc, page_id);
            placement::choose_corner(&self.layout, &geometry, &boxes)
        } else {
            self.layout.corner
        };
        self.render_at(page_count, &geometry, corner)
    }

    /// Render the overlay for a document with `page_count` pages whose first
    /// page has the given geometry, in the layout corner.
    ///
    /// [`Corner::Auto`] has no page text to go by here and places the stamp
    /// in the lower right corner.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStampError::RenderFailed`] if the content stream cannot
    /// be encoded.
    pub fn render(&self, page_count: u32, geometry: &PageGeometry) -> Result<Document> {
        self.render_at(page_count, geometry, self.layout.corner)
    }

    #[instrument(skip(self), level = "debug")]
    fn render_at(&self, page_count: u32, geometry: &PageGeometry, corner: Corner) -> Result<Document> {
        if !placement::fits(&self.layout, geometry) {
            let (width, height) = geometry.viewer_size();
            warn!(
                width,
                height,
                "Page is smaller than the stamp, stamp will overhang the page edge"
            );
        }

        let mut operations = vec![Operation::new("q", vec![])];
        let matrix = placement::stamp_matrix(&self.layout, geometry, corner);
        operations.push(Operation::new(
            "cm",
            matrix.iter().map(|v| Object::Real(*v)).collect(),
        ));
        operations.extend(self.stamp_operations(page_count));
        operations.push(Operation::new("Q", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| PdfStampError::render_failed(e.to_string()))?;

        debug!(
            page_count,
            ?corner,
            matrix = ?matrix,
            bytes = content.len(),
            "Rendered stamp overlay"
        );

        Ok(single_page_document(content, geometry.media_box))
    }

    /// Drawing operations for the stamp in stamp-local coordinates.
    pub fn stamp_operations(&self, page_count: u32) -> Vec<Operation> {
        let l = &self.layout;
        let color = l.color;
        let center_x = l.width / 2.0;
        let top_y = l.height - l.top_padding;

        let box_width = l.box_width();
        let box_x = center_x - box_width / 2.0;
        let box_y = top_y - l.box_height;

        let header_y = top_y - l.header_offset;
        let count_y = header_y - l.line_spacing;
        let rule1_y = count_y - l.rule_offset;
        let rule2_y = rule1_y - l.rule_gap;

        let mut ops = vec![
            Operation::new("RG", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new("w", vec![l.border_width.into()]),
        ];

        ops.extend(rounded_rect(
            box_x,
            box_y,
            box_width,
            l.box_height,
            l.corner_radius,
        ));
        ops.push(Operation::new("S", vec![]));

        ops.extend(centered_text(&l.header_text, center_x, header_y, l.font_size));
        ops.extend(centered_text(
            &l.count_text(page_count),
            center_x,
            count_y,
            l.font_size,
        ));

        let rule_x0 = box_x + l.rule_inset;
        let rule_x1 = box_x + box_width - l.rule_inset;
        ops.push(Operation::new("w", vec![l.rule_width.into()]));
        for y in [rule1_y, rule2_y] {
            ops.push(Operation::new("m", vec![rule_x0.into(), y.into()]));
            ops.push(Operation::new("l", vec![rule_x1.into(), y.into()]));
            ops.push(Operation::new("S", vec![]));
        }

        ops
    }
}

/// Text operations drawing `text` centered on `center_x` with its baseline
/// at `y`.
fn centered_text(text: &str, center_x: f32, y: f32, font_size: f32) -> Vec<Operation> {
    let x = center_x - metrics::string_width(text, font_size) / 2.0;

    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.into()), font_size.into()],
        ),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(
                metrics::encode_win_ansi(text),
                StringFormat::Literal,
            )],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Path construction for a rectangle with rounded corners, starting and
/// ending at the left end of the bottom edge. The caller paints it.
fn rounded_rect(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<Operation> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let k = r * KAPPA;
    let (x1, y1) = (x + w, y + h);

    let point = |op: &str, coords: &[f32]| {
        Operation::new(op, coords.iter().map(|v| Object::Real(*v)).collect())
    };

    vec![
        point("m", &[x + r, y]),
        point("l", &[x1 - r, y]),
        point("c", &[x1 - r + k, y, x1, y + r - k, x1, y + r]),
        point("l", &[x1, y1 - r]),
        point("c", &[x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1]),
        point("l", &[x + r, y1]),
        point("c", &[x + r - k, y1, x, y1 - r + k, x, y1 - r]),
        point("l", &[x, y + r]),
        point("c", &[x, y + r - k, x + r - k, y, x + r, y]),
        Operation::new("h", vec![]),
    ]
}

/// Build a one-page document around an encoded content stream.
fn single_page_document(content: Vec<u8>, media_box: [f32; 4]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => FONT_NAME,
        "Encoding" => "WinAnsiEncoding",
    });

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => media_box.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}
