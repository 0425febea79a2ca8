use serde::{Deserialize, Serialize};

use crate::core::{Block, Corner, TrackSize};
use crate::error::{ComposeError, ComposeResult};
use crate::layout::ComposedFigure;
use crate::tree::{
    Alignment, CellSpan, CompositionTree, Grid, Label, LabelSequence, LegendGroup, NodeId,
};

use super::ComposeConfig;

pub const COMPOSITION_DECLARATION_JSON_SCHEMA_V1: u32 = 1;
pub const COMPOSED_FIGURE_JSON_SCHEMA_V1: u32 = 1;

/// One node of a nested composition literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDeclaration {
    Block(Block),
    Grid(GridDeclaration),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDeclaration {
    pub rows: Vec<TrackSize>,
    pub columns: Vec<TrackSize>,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub children: Vec<ChildDeclaration>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub auto_labels: Option<AutoLabels>,
    #[serde(default)]
    pub legend_group: Option<LegendGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDeclaration {
    pub cell: CellSpan,
    pub node: NodeDeclaration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLabels {
    pub sequence: LabelSequence,
    #[serde(default = "default_auto_label_corner")]
    pub corner: Corner,
}

fn default_auto_label_corner() -> Corner {
    Corner::TopLeft
}

/// Versioned composition literal: root settings plus the node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionDeclarationJsonContractV1 {
    pub schema_version: u32,
    #[serde(default)]
    pub config: ComposeConfig,
    pub root: NodeDeclaration,
}

impl CompositionDeclarationJsonContractV1 {
    #[must_use]
    pub fn new(config: ComposeConfig, root: NodeDeclaration) -> Self {
        Self {
            schema_version: COMPOSITION_DECLARATION_JSON_SCHEMA_V1,
            config,
            root,
        }
    }

    pub fn from_json_str(input: &str) -> ComposeResult<Self> {
        let payload: Self = serde_json::from_str(input).map_err(|e| {
            ComposeError::InvalidData(format!("failed to parse composition declaration: {e}"))
        })?;
        if payload.schema_version != COMPOSITION_DECLARATION_JSON_SCHEMA_V1 {
            return Err(ComposeError::InvalidData(format!(
                "unsupported composition declaration schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload)
    }

    pub fn to_json_pretty(&self) -> ComposeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ComposeError::InvalidData(format!("failed to serialize composition declaration: {e}"))
        })
    }

    /// Builds the arena tree; the declaration's root becomes the tree root.
    pub fn to_tree(&self) -> ComposeResult<CompositionTree> {
        let mut tree = CompositionTree::new();
        let root = add_declared_node(&mut tree, &self.root)?;
        tree.set_root(root)?;
        Ok(tree)
    }
}

fn add_declared_node(tree: &mut CompositionTree, node: &NodeDeclaration) -> ComposeResult<NodeId> {
    let declaration = match node {
        NodeDeclaration::Block(block) => return Ok(tree.add_block(block.clone())),
        NodeDeclaration::Grid(declaration) => declaration,
    };

    let mut grid = Grid::with_tracks(declaration.rows.clone(), declaration.columns.clone())
        .with_alignment(declaration.alignment.clone());
    grid.labels = declaration.labels.clone();
    let grid = tree.add_grid(grid);
    for child in &declaration.children {
        let child_id = add_declared_node(tree, &child.node)?;
        tree.place(grid, child_id, child.cell)?;
    }
    if let Some(auto) = declaration.auto_labels {
        tree.auto_label(grid, auto.sequence, auto.corner)?;
    }
    if let Some(group) = &declaration.legend_group {
        tree.share_legend(grid, group.clone())?;
    }
    Ok(grid)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedFigureJsonContractV1 {
    pub schema_version: u32,
    pub figure: ComposedFigure,
}

impl ComposedFigure {
    pub fn to_json_contract_v1_pretty(&self) -> ComposeResult<String> {
        let payload = ComposedFigureJsonContractV1 {
            schema_version: COMPOSED_FIGURE_JSON_SCHEMA_V1,
            figure: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ComposeError::InvalidData(format!(
                "failed to serialize composed figure contract v1: {e}"
            ))
        })
    }

    /// Accepts either a bare figure or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ComposeResult<Self> {
        if let Ok(figure) = serde_json::from_str::<ComposedFigure>(input) {
            return Ok(figure);
        }
        let payload: ComposedFigureJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ComposeError::InvalidData(format!("failed to parse composed figure json payload: {e}"))
        })?;
        if payload.schema_version != COMPOSED_FIGURE_JSON_SCHEMA_V1 {
            return Err(ComposeError::InvalidData(format!(
                "unsupported composed figure schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.figure)
    }
}
