use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Anchor, Axis, Block, BlockRole, Corner, Rect, RenderHandle, Size};
use crate::tree::{NodeId, TreePath};

/// Final placement of one block in output coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Source node; `None` for a shared legend produced during extraction.
    pub node: Option<NodeId>,
    pub path: TreePath,
    pub handle: RenderHandle,
    pub role: BlockRole,
    /// Full cell (union of spanned tracks).
    pub cell: Rect,
    /// Cell minus alignment padding; the block is rendered at this size with
    /// its anchors at their intrinsic offsets from the content origin.
    pub content: Rect,
    /// Intrinsic size after legend extraction.
    pub intrinsic: Size,
    pub anchors: SmallVec<[Anchor; 2]>,
}

impl PlacedBlock {
    /// Absolute output position of a named anchor.
    #[must_use]
    pub fn anchor_position(&self, axis: Axis, name: &str) -> Option<f64> {
        self.anchors
            .iter()
            .find(|anchor| anchor.axis == axis && anchor.name == name)
            .map(|anchor| self.content.origin_along(axis) + anchor.offset)
    }

    /// Anchor position measured from the cell's leading edge.
    #[must_use]
    pub fn anchor_in_cell(&self, axis: Axis, name: &str) -> Option<f64> {
        self.anchor_position(axis, name)
            .map(|position| position - self.cell.origin_along(axis))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedGrid {
    pub node: NodeId,
    pub path: TreePath,
    pub cell: Rect,
    pub content: Rect,
}

/// Label positioned after layout, in output coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLabel {
    /// Grid declaring the label.
    pub grid: TreePath,
    pub child: usize,
    pub corner: Corner,
    pub text: String,
    /// Estimated text box.
    pub bounds: Rect,
    pub font_size: f64,
}

/// Result of one composition: every block's rectangle plus resolved labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedFigure {
    pub size: Size,
    /// Draw order: depth-first, children in declaration order.
    pub blocks: Vec<PlacedBlock>,
    pub grids: Vec<PlacedGrid>,
    pub labels: Vec<ResolvedLabel>,
}

impl ComposedFigure {
    #[must_use]
    pub(crate) fn empty(size: Size) -> Self {
        Self {
            size,
            blocks: Vec::new(),
            grids: Vec::new(),
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn block(&self, handle: &str) -> Option<&PlacedBlock> {
        self.blocks
            .iter()
            .find(|block| block.handle.as_str() == handle)
    }

    #[must_use]
    pub fn block_at(&self, path: &TreePath) -> Option<&PlacedBlock> {
        self.blocks.iter().find(|block| &block.path == path)
    }

    #[must_use]
    pub fn grid_at(&self, path: &TreePath) -> Option<&PlacedGrid> {
        self.grids.iter().find(|grid| &grid.path == path)
    }

    #[must_use]
    pub fn shared_legends(&self) -> Vec<&PlacedBlock> {
        self.blocks
            .iter()
            .filter(|block| matches!(block.role, BlockRole::SharedLegend { .. }))
            .collect()
    }

    #[must_use]
    pub fn label(&self, text: &str) -> Option<&ResolvedLabel> {
        self.labels.iter().find(|label| label.text == text)
    }

    /// Wraps the finished figure as a `Composite` block so it can be nested in
    /// another composition.
    ///
    /// The composite exposes the anchors of its leading blocks (those with no
    /// other block entirely before them on the axis), taking the furthest
    /// position per anchor name.
    #[must_use]
    pub fn to_block(&self, handle: impl Into<String>) -> Block {
        let mut block = Block::new(handle, self.size).with_role(BlockRole::Composite);
        for axis in Axis::ALL {
            let mut exposed: IndexMap<&str, OrderedFloat<f64>> = IndexMap::new();
            for placed in self.blocks.iter().filter(|placed| self.is_leading(placed, axis)) {
                for anchor in placed.anchors.iter().filter(|anchor| anchor.axis == axis) {
                    let position = OrderedFloat(placed.content.origin_along(axis) + anchor.offset);
                    let slot = exposed.entry(anchor.name.as_str()).or_insert(position);
                    *slot = (*slot).max(position);
                }
            }
            for (name, position) in exposed {
                block = block.with_anchor(axis, name, position.0);
            }
        }
        block
    }

    fn is_leading(&self, placed: &PlacedBlock, axis: Axis) -> bool {
        let start = placed.cell.origin_along(axis);
        !self.blocks.iter().any(|other| {
            other.cell.origin_along(axis) + other.cell.extent_along(axis) <= start + 1e-9
        })
    }
}
