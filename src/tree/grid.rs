use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Axis, Corner, LegendMatch, PLOT_ORIGIN, Side, TrackSize};
use crate::error::ComposeError;

use super::NodeId;

/// Cell occupancy of one grid child. Spans are at least one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSpan {
    pub row: usize,
    pub column: usize,
    #[serde(default = "default_span")]
    pub row_span: usize,
    #[serde(default = "default_span")]
    pub column_span: usize,
}

fn default_span() -> usize {
    1
}

impl CellSpan {
    #[must_use]
    pub const fn at(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    #[must_use]
    pub const fn spanning(row: usize, column: usize, row_span: usize, column_span: usize) -> Self {
        Self {
            row,
            column,
            row_span,
            column_span,
        }
    }

    /// First track index on `axis` (column for horizontal, row for vertical).
    #[must_use]
    pub fn leading(self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.column,
            Axis::Vertical => self.row,
        }
    }

    #[must_use]
    pub fn span(self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.column_span,
            Axis::Vertical => self.row_span,
        }
    }

    #[must_use]
    pub fn range(self, axis: Axis) -> Range<usize> {
        let leading = self.leading(axis);
        leading..leading.saturating_add(self.span(axis))
    }

    #[must_use]
    pub fn shifted(mut self, axis: Axis, by: usize) -> Self {
        match axis {
            Axis::Horizontal => self.column += by,
            Axis::Vertical => self.row += by,
        }
        self
    }

    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let columns = self.range(Axis::Horizontal);
        self.range(Axis::Vertical)
            .flat_map(move |row| columns.clone().map(move |column| (row, column)))
    }
}

/// Per-axis plot-area alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignMode {
    #[default]
    #[serde(rename = "none")]
    None,
    /// Children sharing a column (row), transitively through spans, get their
    /// anchors aligned to one absolute position.
    #[serde(rename = "align-anchors")]
    Anchors,
    /// Every anchored child of the grid gets the same cell-local anchor offset.
    #[serde(rename = "align-shared")]
    Shared,
}

impl FromStr for AlignMode {
    type Err = ComposeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "none" => Ok(Self::None),
            "align-anchors" => Ok(Self::Anchors),
            "align-shared" => Ok(Self::Shared),
            other => Err(ComposeError::InvalidData(format!(
                "unknown alignment mode `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub horizontal: AlignMode,
    #[serde(default)]
    pub vertical: AlignMode,
    #[serde(default = "default_anchor_name")]
    pub anchor: String,
}

fn default_anchor_name() -> String {
    PLOT_ORIGIN.to_owned()
}

impl Default for Alignment {
    fn default() -> Self {
        Self::new(AlignMode::None, AlignMode::None)
    }
}

impl Alignment {
    #[must_use]
    pub fn new(horizontal: AlignMode, vertical: AlignMode) -> Self {
        Self {
            horizontal,
            vertical,
            anchor: default_anchor_name(),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    #[must_use]
    pub fn mode(&self, axis: Axis) -> AlignMode {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridChild {
    pub node: NodeId,
    pub cell: CellSpan,
}

/// Corner annotation bound to a direct child of the declaring grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub child: usize,
    pub corner: Corner,
    pub text: String,
}

impl Label {
    #[must_use]
    pub fn new(child: usize, corner: Corner, text: impl Into<String>) -> Self {
        Self {
            child,
            corner,
            text: text.into(),
        }
    }
}

/// Generated label text sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSequence {
    /// `A`, `B`, ..., `Z`, `AA`, `AB`, ...
    UpperAlpha,
    /// `a`, `b`, ..., `z`, `aa`, `ab`, ...
    LowerAlpha,
}

impl LabelSequence {
    #[must_use]
    pub fn label(self, index: usize) -> String {
        let base = match self {
            Self::UpperAlpha => b'A',
            Self::LowerAlpha => b'a',
        };
        let mut letters = Vec::new();
        let mut remaining = index + 1;
        while remaining > 0 {
            remaining -= 1;
            letters.push(char::from(base + (remaining % 26) as u8));
            remaining /= 26;
        }
        letters.iter().rev().collect()
    }
}

/// Where a shared legend goes once extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum LegendPosition {
    /// Drop the legend entirely.
    None,
    /// The corner cell of the grid, which must be empty.
    Corner(Corner),
    /// A new fixed-size track on this side, sized to the legend.
    Side(Side),
    /// An explicit empty cell range.
    Cell(CellSpan),
}

impl FromStr for LegendPosition {
    type Err = ComposeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input == "none" {
            return Ok(Self::None);
        }
        if let Ok(corner) = input.parse::<Corner>() {
            return Ok(Self::Corner(corner));
        }
        input
            .parse::<Side>()
            .map(Self::Side)
            .map_err(|_| ComposeError::InvalidData(format!("unknown legend position `{input}`")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendGroup {
    /// Child indices of the declaring grid.
    pub members: Vec<usize>,
    pub position: LegendPosition,
    #[serde(default)]
    pub matching: LegendMatch,
}

impl LegendGroup {
    #[must_use]
    pub fn new(members: impl Into<Vec<usize>>, position: LegendPosition) -> Self {
        Self {
            members: members.into(),
            position,
            matching: LegendMatch::Ordered,
        }
    }

    #[must_use]
    pub fn with_matching(mut self, matching: LegendMatch) -> Self {
        self.matching = matching;
        self
    }
}

/// Row/column arrangement of child blocks or nested grids.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub rows: Vec<TrackSize>,
    pub columns: Vec<TrackSize>,
    pub alignment: Alignment,
    pub children: Vec<GridChild>,
    pub labels: Vec<Label>,
    pub legend_group: Option<LegendGroup>,
}

impl Grid {
    /// Grid with uniform relative tracks.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_tracks(TrackSize::uniform(rows), TrackSize::uniform(columns))
    }

    #[must_use]
    pub fn with_tracks(rows: Vec<TrackSize>, columns: Vec<TrackSize>) -> Self {
        Self {
            rows,
            columns,
            alignment: Alignment::default(),
            children: Vec::new(),
            labels: Vec::new(),
            legend_group: None,
        }
    }

    #[must_use]
    pub fn with_row_weights(mut self, weights: &[f64]) -> Self {
        self.rows = TrackSize::from_weights(weights);
        self
    }

    #[must_use]
    pub fn with_column_weights(mut self, weights: &[f64]) -> Self {
        self.columns = TrackSize::from_weights(weights);
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn tracks(&self, axis: Axis) -> &[TrackSize] {
        match axis {
            Axis::Horizontal => &self.columns,
            Axis::Vertical => &self.rows,
        }
    }

    /// Cell of the given corner of the grid.
    #[must_use]
    pub fn corner_cell(&self, corner: Corner) -> CellSpan {
        let row = if corner.is_top() {
            0
        } else {
            self.row_count().saturating_sub(1)
        };
        let column = if corner.is_left() {
            0
        } else {
            self.column_count().saturating_sub(1)
        };
        CellSpan::at(row, column)
    }
}
