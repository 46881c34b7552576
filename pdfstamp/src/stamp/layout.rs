//! Stamp layout configuration.
//!
//! A [`StampLayout`] describes every dimension of the stamp. All values are
//! in PDF points and are measured inside the stamp area, whose origin is its
//! bottom-left corner. The defaults reproduce the classic red
//! "Received and Reviewed" stamp.
//!
//! Layouts can be loaded from JSON. Missing fields take their default value:
//!
//! ```
//! use pdfstamp::stamp::{Corner, StampLayout};
//!
//! let layout = StampLayout::from_json(r#"{ "corner": "top-left", "font_size": 12 }"#).unwrap();
//! assert_eq!(layout.corner, Corner::TopLeft);
//! assert_eq!(layout.font_size, 12.0);
//! assert_eq!(layout.width, 260.0);
//! ```

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{PdfStampError, Result};
use crate::stamp::metrics;

/// Placeholder replaced by the page count in [`StampLayout::count_template`].
pub const PAGES_PLACEHOLDER: &str = "{pages}";

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl Color {
    /// Pure red, the classic stamp colour.
    pub const RED: Self = Self {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse a colour from a `RRGGBB` hex string, with or without a leading `#`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstamp::stamp::Color;
    ///
    /// let color = Color::parse_hex("#0000ff").unwrap();
    /// assert_eq!(color, Color { r: 0.0, g: 0.0, b: 1.0 });
    /// ```
    pub fn parse_hex(s: &str) -> anyhow::Result<Self> {
        let hex = s.trim().trim_start_matches('#');

        if hex.len() != 6 || !hex.is_ascii() {
            bail!("Invalid colour: {s}. Expected six hex digits like 'ff0000'");
        }

        let channel = |range: std::ops::Range<usize>| -> anyhow::Result<f32> {
            let value = u8::from_str_radix(&hex[range], 16)
                .with_context(|| format!("Invalid colour: {s}"))?;
            Ok(f32::from(value) / 255.0)
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

/// Page corner the stamp is anchored to, as seen by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    /// Upper left corner.
    TopLeft,
    /// Upper right corner.
    TopRight,
    /// Lower left corner.
    BottomLeft,
    /// Lower right corner.
    #[default]
    BottomRight,
    /// The corner whose area overlaps the least page text. Ties go to the
    /// lower right corner.
    Auto,
}

impl FromStr for Corner {
    type Err = PdfStampError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top-left" | "tl" => Ok(Self::TopLeft),
            "top-right" | "tr" => Ok(Self::TopRight),
            "bottom-left" | "bl" => Ok(Self::BottomLeft),
            "bottom-right" | "br" => Ok(Self::BottomRight),
            "auto" => Ok(Self::Auto),
            _ => Err(PdfStampError::invalid_config(format!(
                "Invalid corner: {s}. Must be one of: top-left, top-right, bottom-left, bottom-right, auto"
            ))),
        }
    }
}

/// Geometry and text of the stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampLayout {
    /// Width of the stamp area.
    pub width: f32,
    /// Height of the stamp area.
    pub height: f32,
    /// Gap between the top of the stamp area and the top of the box.
    pub top_padding: f32,
    /// Horizontal space removed from the stamp width before scaling the box.
    pub box_side_inset: f32,
    /// Box width as a fraction of `width - box_side_inset`.
    pub box_width_ratio: f32,
    /// Height of the rounded box.
    pub box_height: f32,
    /// Corner radius of the box.
    pub corner_radius: f32,
    /// Stroke width of the box outline.
    pub border_width: f32,
    /// Colour of outline, text and rules.
    pub color: Color,
    /// Font size of both text lines (Helvetica-Bold).
    pub font_size: f32,
    /// First text line.
    pub header_text: String,
    /// Second text line; `{pages}` is replaced by the page count.
    pub count_template: String,
    /// Distance from the top of the box to the header baseline.
    pub header_offset: f32,
    /// Distance between the header baseline and the count baseline.
    pub line_spacing: f32,
    /// Distance from the count baseline down to the first rule.
    pub rule_offset: f32,
    /// Distance between the two rules.
    pub rule_gap: f32,
    /// Stroke width of the rules.
    pub rule_width: f32,
    /// Horizontal inset of the rules from the box sides.
    pub rule_inset: f32,
    /// Distance between the stamp area and the visible page edges.
    pub margin: f32,
    /// Corner the stamp is anchored to.
    pub corner: Corner,
}

impl Default for StampLayout {
    fn default() -> Self {
        Self {
            width: 260.0,
            height: 180.0,
            top_padding: 20.0,
            box_side_inset: 30.0,
            box_width_ratio: 0.85,
            box_height: 140.0,
            corner_radius: 10.0,
            border_width: 2.0,
            color: Color::RED,
            font_size: 11.0,
            header_text: "Received and Reviewed".to_string(),
            count_template: format!("{PAGES_PLACEHOLDER} Pages"),
            header_offset: 24.0,
            line_spacing: 16.0,
            rule_offset: 36.0,
            rule_gap: 36.0,
            rule_width: 2.5,
            rule_inset: 8.0,
            margin: 12.0,
            corner: Corner::BottomRight,
        }
    }
}

impl StampLayout {
    /// Parse a layout from JSON text and validate it.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let layout: Self = serde_json::from_str(json).context("Malformed layout JSON")?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load a layout from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStampError::FailedToReadLayout`] if the file cannot be
    /// read and [`PdfStampError::InvalidLayout`] if it does not describe a
    /// valid layout.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|source| {
            PdfStampError::FailedToReadLayout {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::from_json(&json).map_err(|err| PdfStampError::InvalidLayout {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })
    }

    /// Validate dimensions and text.
    pub fn validate(&self) -> anyhow::Result<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("box_width_ratio", self.box_width_ratio),
            ("box_height", self.box_height),
            ("font_size", self.font_size),
            ("border_width", self.border_width),
            ("rule_width", self.rule_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} must be a positive number, got {value}");
            }
        }

        let non_negative = [
            ("top_padding", self.top_padding),
            ("box_side_inset", self.box_side_inset),
            ("corner_radius", self.corner_radius),
            ("header_offset", self.header_offset),
            ("line_spacing", self.line_spacing),
            ("rule_offset", self.rule_offset),
            ("rule_gap", self.rule_gap),
            ("rule_inset", self.rule_inset),
            ("margin", self.margin),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                bail!("{name} must not be negative, got {value}");
            }
        }

        if !self.color.is_valid() {
            bail!("color components must be between 0 and 1");
        }

        if self.box_width() <= 2.0 * self.rule_inset {
            bail!(
                "box is {:.1}pt wide, too narrow for a rule inset of {}",
                self.box_width(),
                self.rule_inset
            );
        }

        if self.top_padding + self.box_height > self.height {
            bail!(
                "box does not fit: top_padding + box_height ({}) exceeds height ({})",
                self.top_padding + self.box_height,
                self.height
            );
        }

        if !self.count_template.contains(PAGES_PLACEHOLDER) {
            bail!("count_template must contain the {PAGES_PLACEHOLDER} placeholder");
        }

        for (name, text) in [
            ("header_text", &self.header_text),
            ("count_template", &self.count_template),
        ] {
            if let Some(c) = metrics::first_unencodable(text) {
                bail!("{name} contains {c:?}, which {} cannot display", metrics::FONT_NAME);
            }
        }

        Ok(())
    }

    /// Width of the rounded box.
    pub fn box_width(&self) -> f32 {
        (self.width - self.box_side_inset) * self.box_width_ratio
    }

    /// Text of the count line for a document with `page_count` pages.
    pub fn count_text(&self, page_count: u32) -> String {
        self.count_template
            .replace(PAGES_PLACEHOLDER, &page_count.to_string())
    }
}
