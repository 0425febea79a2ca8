use serde::{Deserialize, Serialize};

use smallvec::SmallVec;

use crate::core::{Anchor, Axis, BlockRole, Corner, Rect, RenderHandle, Size};
use crate::error::{ComposeError, ComposeResult};
use crate::layout::{ComposedFigure, LabelStyle};
use crate::render::{TextHAlign, TextPrimitive};

/// Draw command for one placed block.
///
/// The exporter renders `handle` at the size of `rect` rather than stretching
/// its intrinsic rendering: anchors keep their intrinsic offsets from the
/// rect origin, which is what alignment padding was solved against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDraw {
    pub handle: RenderHandle,
    pub role: BlockRole,
    pub rect: Rect,
    pub intrinsic: Size,
    #[serde(default)]
    pub anchors: SmallVec<[Anchor; 2]>,
}

impl BlockDraw {
    /// Output position of a named anchor once drawn.
    #[must_use]
    pub fn anchor_position(&self, axis: Axis, name: &str) -> Option<f64> {
        self.anchors
            .iter()
            .find(|anchor| anchor.axis == axis && anchor.name == name)
            .map(|anchor| self.rect.origin_along(axis) + anchor.offset)
    }
}

/// Backend-agnostic scene for one export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureFrame {
    pub size: Size,
    pub draws: Vec<BlockDraw>,
    pub texts: Vec<TextPrimitive>,
}

impl FigureFrame {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            draws: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Flattens a composed figure: blocks in draw order, labels on top.
    #[must_use]
    pub fn from_figure(figure: &ComposedFigure, style: LabelStyle) -> Self {
        let mut frame = Self::new(figure.size);
        frame.draws = figure
            .blocks
            .iter()
            .map(|block| BlockDraw {
                handle: block.handle.clone(),
                role: block.role.clone(),
                rect: block.content,
                intrinsic: block.intrinsic,
                anchors: block.anchors.clone(),
            })
            .collect();
        frame.texts = figure
            .labels
            .iter()
            .map(|label| {
                let (x, y) = label.text_origin();
                let h_align = match label.corner {
                    Corner::TopLeft | Corner::BottomLeft => TextHAlign::Left,
                    Corner::TopRight | Corner::BottomRight => TextHAlign::Right,
                };
                TextPrimitive::new(label.text.clone(), x, y, label.font_size, style.color, h_align)
            })
            .collect();
        frame
    }

    #[must_use]
    pub fn with_draw(mut self, draw: BlockDraw) -> Self {
        self.draws.push(draw);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    pub fn validate(&self) -> ComposeResult<()> {
        self.size.validate("frame")?;
        for draw in &self.draws {
            if !draw.rect.is_finite() || draw.rect.width <= 0.0 || draw.rect.height <= 0.0 {
                return Err(ComposeError::InvalidData(format!(
                    "draw rect of `{}` must be finite with positive extent",
                    draw.handle.as_str()
                )));
            }
            draw.intrinsic.validate("intrinsic draw")?;
            if let Some(anchor) = draw
                .anchors
                .iter()
                .find(|anchor| anchor.offset > draw.rect.extent_along(anchor.axis))
            {
                return Err(ComposeError::InvalidData(format!(
                    "anchor `{}` of `{}` falls outside its draw rect",
                    anchor.name,
                    draw.handle.as_str()
                )));
            }
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty() && self.texts.is_empty()
    }
}
