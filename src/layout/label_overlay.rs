use serde::{Deserialize, Serialize};

use crate::core::{Corner, Rect};
use crate::error::{ComposeError, ComposeResult};
use crate::render::Color;
use crate::tree::{Label, TreePath};

use super::ResolvedLabel;

/// Typography and placement of corner labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub font_size: f64,
    /// Gap between the label box and the cell corner.
    pub inset: f64,
    /// Average glyph width as a fraction of the font size, used to estimate
    /// the label box width.
    pub glyph_width_ratio: f64,
    pub color: Color,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            inset: 4.0,
            glyph_width_ratio: 0.6,
            color: Color::BLACK,
        }
    }
}

impl LabelStyle {
    pub fn validate(self) -> ComposeResult<Self> {
        for (name, value) in [
            ("font_size", self.font_size),
            ("glyph_width_ratio", self.glyph_width_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ComposeError::InvalidData(format!(
                    "label style `{name}` must be finite and > 0"
                )));
            }
        }
        if !self.inset.is_finite() || self.inset < 0.0 {
            return Err(ComposeError::InvalidData(
                "label style `inset` must be finite and >= 0".to_owned(),
            ));
        }
        self.color.validate()?;
        Ok(self)
    }

    fn text_box(self, text: &str) -> (f64, f64) {
        let glyphs = text.chars().count() as f64;
        (glyphs * self.font_size * self.glyph_width_ratio, self.font_size)
    }
}

/// Positions a grid's labels at the corners of its children's cells.
///
/// Runs after layout and never feeds back into it.
pub fn overlay_labels(
    grid: &TreePath,
    labels: &[Label],
    cells: &[Rect],
    style: LabelStyle,
) -> ComposeResult<Vec<ResolvedLabel>> {
    labels
        .iter()
        .map(|label| {
            let cell = cells
                .get(label.child)
                .ok_or_else(|| ComposeError::LabelTargetOutOfRange {
                    path: grid.clone(),
                    child: label.child,
                    children: cells.len(),
                })?;
            let (width, height) = style.text_box(&label.text);
            let x = if label.corner.is_left() {
                cell.x + style.inset
            } else {
                cell.right() - style.inset - width
            };
            let y = if label.corner.is_top() {
                cell.y + style.inset
            } else {
                cell.bottom() - style.inset - height
            };
            Ok(ResolvedLabel {
                grid: grid.clone(),
                child: label.child,
                corner: label.corner,
                text: label.text.clone(),
                bounds: Rect::new(x, y, width, height),
                font_size: style.font_size,
            })
        })
        .collect()
}

impl ResolvedLabel {
    /// Anchor point of the label's text on its corner.
    #[must_use]
    pub fn text_origin(&self) -> (f64, f64) {
        let x = match self.corner {
            Corner::TopLeft | Corner::BottomLeft => self.bounds.x,
            Corner::TopRight | Corner::BottomRight => self.bounds.right(),
        };
        (x, self.bounds.y)
    }
}
