use crate::core::{Block, Corner};
use crate::error::{ComposeError, ComposeResult};

use super::validation::validate_tree;
use super::{CellSpan, Grid, GridChild, Label, LabelSequence, LegendGroup, Node, NodeId};

/// Arena of blocks and grids forming one composition.
///
/// Grids reference their children by `NodeId`; every node may be placed at
/// most once, which `validate` checks together with cell occupancy, labels and
/// legend groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl CompositionTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) -> NodeId {
        self.push(Node::Block(block))
    }

    pub fn add_grid(&mut self, grid: Grid) -> NodeId {
        self.push(Node::Grid(grid))
    }

    /// Places `child` into `grid` at `cell` and returns its child index.
    pub fn place(&mut self, grid: NodeId, child: NodeId, cell: CellSpan) -> ComposeResult<usize> {
        if grid == child {
            return Err(ComposeError::InvalidTree(format!(
                "node {grid} cannot contain itself"
            )));
        }
        if self.node(child).is_none() {
            return Err(ComposeError::InvalidTree(format!("unknown node {child}")));
        }
        let grid = self.grid_mut(grid)?;
        grid.children.push(GridChild { node: child, cell });
        Ok(grid.children.len() - 1)
    }

    pub fn label(
        &mut self,
        grid: NodeId,
        child: usize,
        corner: Corner,
        text: impl Into<String>,
    ) -> ComposeResult<()> {
        self.grid_mut(grid)?
            .labels
            .push(Label::new(child, corner, text));
        Ok(())
    }

    /// Labels every current child of `grid` in declaration order.
    pub fn auto_label(
        &mut self,
        grid: NodeId,
        sequence: LabelSequence,
        corner: Corner,
    ) -> ComposeResult<()> {
        let grid = self.grid_mut(grid)?;
        let labels: Vec<Label> = (0..grid.children.len())
            .map(|child| Label::new(child, corner, sequence.label(child)))
            .collect();
        grid.labels.extend(labels);
        Ok(())
    }

    pub fn share_legend(&mut self, grid: NodeId, group: LegendGroup) -> ComposeResult<()> {
        let grid = self.grid_mut(grid)?;
        if grid.legend_group.is_some() {
            return Err(ComposeError::InvalidTree(
                "grid already declares a legend group".to_owned(),
            ));
        }
        grid.legend_group = Some(group);
        Ok(())
    }

    pub fn set_root(&mut self, root: NodeId) -> ComposeResult<()> {
        if self.node(root).is_none() {
            return Err(ComposeError::InvalidTree(format!("unknown node {root}")));
        }
        self.root = Some(root);
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn grid(&self, id: NodeId) -> Option<&Grid> {
        self.node(id).and_then(Node::as_grid)
    }

    #[must_use]
    pub fn block(&self, id: NodeId) -> Option<&Block> {
        self.node(id).and_then(Node::as_block)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy of the tree with every label removed.
    #[must_use]
    pub fn without_labels(&self) -> Self {
        let mut tree = self.clone();
        for node in &mut tree.nodes {
            if let Node::Grid(grid) = node {
                grid.labels.clear();
            }
        }
        tree
    }

    /// Structural validation; returns the root on success.
    pub fn validate(&self) -> ComposeResult<NodeId> {
        validate_tree(self)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    fn grid_mut(&mut self, id: NodeId) -> ComposeResult<&mut Grid> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Grid(grid)) => Ok(grid),
            Some(Node::Block(_)) => Err(ComposeError::InvalidTree(format!(
                "node {id} is a block, not a grid"
            ))),
            None => Err(ComposeError::InvalidTree(format!("unknown node {id}"))),
        }
    }
}
