//! Arena-backed composition tree: blocks, grids, labels and legend groups.

mod composition;
mod grid;
mod node;
mod validation;

pub use composition::CompositionTree;
pub use grid::{
    AlignMode, Alignment, CellSpan, Grid, GridChild, Label, LabelSequence, LegendGroup,
    LegendPosition,
};
pub use node::{Node, NodeId, TreePath};
