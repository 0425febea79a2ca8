use std::collections::HashSet;

use crate::core::Axis;
use crate::error::{ComposeError, ComposeResult};

use super::{CellSpan, CompositionTree, Grid, LegendPosition, Node, NodeId, TreePath};

/// Checks the whole tree before any layout work happens.
pub(crate) fn validate_tree(tree: &CompositionTree) -> ComposeResult<NodeId> {
    let root = tree
        .root()
        .ok_or_else(|| ComposeError::InvalidTree("composition root is not set".to_owned()))?;

    let mut visited = vec![false; tree.len()];
    let mut stack = vec![(root, TreePath::root())];
    while let Some((id, path)) = stack.pop() {
        let node = tree
            .node(id)
            .ok_or_else(|| ComposeError::InvalidTree(format!("unknown node {id} at {path}")))?;
        if std::mem::replace(&mut visited[id.index()], true) {
            return Err(ComposeError::InvalidTree(format!(
                "node {id} is placed more than once (again at {path})"
            )));
        }

        match node {
            Node::Block(block) => block.validate()?,
            Node::Grid(grid) => {
                validate_grid(tree, grid, &path)?;
                // Reverse push keeps depth-first order matching child order.
                for (index, child) in grid.children.iter().enumerate().rev() {
                    stack.push((child.node, path.child(index)));
                }
            }
        }
    }
    Ok(root)
}

fn validate_grid(tree: &CompositionTree, grid: &Grid, path: &TreePath) -> ComposeResult<()> {
    if grid.rows.is_empty() || grid.columns.is_empty() {
        return Err(ComposeError::InvalidTree(format!(
            "grid at {path} must have at least one row and one column"
        )));
    }
    for track in grid.rows.iter().chain(&grid.columns) {
        track.validate()?;
    }
    if grid.alignment.anchor.is_empty() {
        return Err(ComposeError::InvalidData(format!(
            "alignment anchor name at {path} must not be empty"
        )));
    }

    let mut occupancy = Occupancy::new(grid.row_count(), grid.column_count());
    for child in &grid.children {
        occupancy.claim(child.cell, path)?;
    }

    let mut labeled = HashSet::with_capacity(grid.labels.len());
    for label in &grid.labels {
        if label.child >= grid.children.len() {
            return Err(ComposeError::LabelTargetOutOfRange {
                path: path.clone(),
                child: label.child,
                children: grid.children.len(),
            });
        }
        if !labeled.insert(label.child) {
            return Err(ComposeError::DuplicateLabel {
                path: path.clone(),
                child: label.child,
            });
        }
        if label.text.is_empty() {
            return Err(ComposeError::InvalidData(format!(
                "label text for child {} at {path} must not be empty",
                label.child
            )));
        }
    }

    let Some(group) = &grid.legend_group else {
        return Ok(());
    };
    if group.members.is_empty() {
        return Err(ComposeError::InvalidTree(format!(
            "legend group at {path} has no members"
        )));
    }
    let mut seen = HashSet::with_capacity(group.members.len());
    let mut with_legend = 0_usize;
    for &member in &group.members {
        let child = grid.children.get(member).ok_or_else(|| {
            ComposeError::InvalidTree(format!(
                "legend group member {member} at {path} is out of range"
            ))
        })?;
        if !seen.insert(member) {
            return Err(ComposeError::InvalidTree(format!(
                "legend group member {member} at {path} is listed twice"
            )));
        }
        let block = tree.block(child.node).ok_or_else(|| {
            ComposeError::InvalidTree(format!(
                "legend group member {member} at {path} is not a block"
            ))
        })?;
        if block.has_legend() {
            with_legend += 1;
        }
    }
    // All members legend-free means the legend was already extracted.
    if with_legend > 0 && with_legend < group.members.len() {
        let missing = group
            .members
            .iter()
            .copied()
            .find(|&member| {
                tree.block(grid.children[member].node)
                    .is_some_and(|block| !block.has_legend())
            })
            .unwrap_or(group.members[0]);
        return Err(ComposeError::LegendMissing {
            path: path.clone(),
            child: missing,
        });
    }

    if with_legend == 0 {
        return Ok(());
    }
    match group.position {
        LegendPosition::None | LegendPosition::Side(_) => {}
        LegendPosition::Corner(corner) => occupancy.claim(grid.corner_cell(corner), path)?,
        LegendPosition::Cell(cell) => occupancy.claim(cell, path)?,
    }
    Ok(())
}

struct Occupancy {
    rows: usize,
    columns: usize,
    taken: Vec<bool>,
}

impl Occupancy {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            taken: vec![false; rows * columns],
        }
    }

    fn claim(&mut self, cell: CellSpan, path: &TreePath) -> ComposeResult<()> {
        if cell.span(Axis::Horizontal) == 0 || cell.span(Axis::Vertical) == 0 {
            return Err(ComposeError::InvalidData(format!(
                "cell spans at {path} must be >= 1"
            )));
        }
        for (row, column) in cell.cells() {
            if row >= self.rows || column >= self.columns {
                return Err(ComposeError::CellOutOfRange {
                    path: path.clone(),
                    row,
                    column,
                    rows: self.rows,
                    columns: self.columns,
                });
            }
            let slot = &mut self.taken[row * self.columns + column];
            if *slot {
                return Err(ComposeError::CellOverlap {
                    path: path.clone(),
                    row,
                    column,
                });
            }
            *slot = true;
        }
        Ok(())
    }
}
