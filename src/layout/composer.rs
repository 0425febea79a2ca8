use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::{Axis, Block, Rect, Size, TrackSize};
use crate::error::{ComposeError, ComposeResult};
use crate::tree::{
    Alignment, CellSpan, CompositionTree, Grid, Label, LegendPosition, Node, NodeId, TreePath,
};

use super::sizing_solver::alignment_padding;
use super::{
    AnchorOffsets, ComposedFigure, GridSolveInput, LabelStyle, PlacedBlock, PlacedGrid,
    SolverChild, extract_shared_legend, overlay_labels, solve_grid,
};

/// Resolves a `CompositionTree` into a `ComposedFigure`.
///
/// Resolution runs in two passes. The bottom-up pass extracts shared legends
/// and turns every nested grid into a block-like node with an intrinsic size
/// and exposed anchors. The placement pass hands each grid the rectangle its
/// parent solved for it, places its children and overlays its labels.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    tree: &'a CompositionTree,
    style: LabelStyle,
}

impl<'a> Composer<'a> {
    #[must_use]
    pub fn new(tree: &'a CompositionTree) -> Self {
        Self {
            tree,
            style: LabelStyle::default(),
        }
    }

    #[must_use]
    pub fn with_label_style(mut self, style: LabelStyle) -> Self {
        self.style = style;
        self
    }

    /// Composes at `output` size, or at the root's intrinsic size when `None`.
    pub fn compose(&self, output: Option<Size>) -> ComposeResult<ComposedFigure> {
        let root = self.tree.validate()?;
        let style = self.style.validate()?;
        debug!(nodes = self.tree.len(), "composition started");

        let mut prepared = Preparation::new(self.tree.len());
        self.prepare(root, &TreePath::root(), &mut prepared)?;

        let size = match output {
            Some(size) => size.validate("output")?,
            None => {
                let intrinsic = prepared.intrinsic(&ChildSource::Node(root))?;
                for axis in Axis::ALL {
                    let available = intrinsic.along(axis);
                    if !available.is_finite() || available <= 0.0 {
                        return Err(ComposeError::UnresolvableSize {
                            path: TreePath::root(),
                            axis,
                            available,
                        });
                    }
                }
                intrinsic
            }
        };

        let mut figure = ComposedFigure::empty(size);
        let bounds = Rect::from_size(size);
        let placement = Placement {
            prepared: &prepared,
            style,
        };
        placement.place(root, TreePath::root(), bounds, bounds, &mut figure)?;

        debug!(
            width = size.width,
            height = size.height,
            blocks = figure.blocks.len(),
            labels = figure.labels.len(),
            "composition resolved"
        );
        Ok(figure)
    }

    fn prepare(
        &self,
        id: NodeId,
        path: &TreePath,
        prepared: &mut Preparation,
    ) -> ComposeResult<()> {
        let node = self
            .tree
            .node(id)
            .ok_or_else(|| ComposeError::InvalidTree(format!("unknown node {id} at {path}")))?;
        let grid = match node {
            Node::Block(block) => {
                prepared.set(id, Prepared::Block(block.clone()));
                return Ok(());
            }
            Node::Grid(grid) => grid,
        };

        for (index, child) in grid.children.iter().enumerate() {
            self.prepare(child.node, &path.child(index), prepared)?;
        }

        let mut rows = grid.rows.clone();
        let mut columns = grid.columns.clone();
        let mut children: Vec<PreparedChild> = grid
            .children
            .iter()
            .map(|child| PreparedChild {
                source: ChildSource::Node(child.node),
                cell: child.cell,
            })
            .collect();

        if let Some(group) = &grid.legend_group {
            let extraction = {
                let members = group
                    .members
                    .iter()
                    .map(|&member| {
                        let node = member_node(grid, member, path)?;
                        match prepared.get(node)? {
                            Prepared::Block(block) => Ok((member, block)),
                            Prepared::Grid(_) => Err(ComposeError::InvalidTree(format!(
                                "legend group member {member} at {path} is not a block"
                            ))),
                        }
                    })
                    .collect::<ComposeResult<Vec<_>>>()?;
                extract_shared_legend(path, &members, group.matching, group.position)?
            };

            for (&member, block) in group.members.iter().zip(extraction.members) {
                prepared.set(member_node(grid, member, path)?, Prepared::Block(block));
            }
            if let Some(legend) = extraction.legend {
                insert_shared_legend(
                    grid,
                    group.position,
                    legend,
                    &mut rows,
                    &mut columns,
                    &mut children,
                );
            }
        }

        let intrinsic = prepared.grid_intrinsic(&rows, &columns, &children)?;
        prepared.set(
            id,
            Prepared::Grid(PreparedGrid {
                rows,
                columns,
                alignment: grid.alignment.clone(),
                children,
                labels: grid.labels.clone(),
                intrinsic,
            }),
        );
        Ok(())
    }
}

fn member_node(grid: &Grid, member: usize, path: &TreePath) -> ComposeResult<NodeId> {
    grid.children
        .get(member)
        .map(|child| child.node)
        .ok_or_else(|| {
            ComposeError::InvalidTree(format!(
                "legend group member {member} at {path} is out of range"
            ))
        })
}

fn insert_shared_legend(
    grid: &Grid,
    position: LegendPosition,
    legend: Block,
    rows: &mut Vec<TrackSize>,
    columns: &mut Vec<TrackSize>,
    children: &mut Vec<PreparedChild>,
) {
    let cell = match position {
        LegendPosition::None => return,
        LegendPosition::Corner(corner) => grid.corner_cell(corner),
        LegendPosition::Cell(cell) => cell,
        LegendPosition::Side(side) => {
            let axis = side.axis();
            let track = TrackSize::Fixed(legend.size.along(axis));
            let tracks = match axis {
                Axis::Horizontal => &mut *columns,
                Axis::Vertical => &mut *rows,
            };
            let index = if side.is_leading() {
                tracks.insert(0, track);
                for child in children.iter_mut() {
                    child.cell = child.cell.shifted(axis, 1);
                }
                0
            } else {
                tracks.push(track);
                tracks.len() - 1
            };
            match axis {
                Axis::Horizontal => CellSpan::spanning(0, index, rows.len(), 1),
                Axis::Vertical => CellSpan::spanning(index, 0, 1, columns.len()),
            }
        }
    };
    children.push(PreparedChild {
        source: ChildSource::SharedLegend(legend),
        cell,
    });
}

#[derive(Debug, Clone)]
enum Prepared {
    Block(Block),
    Grid(PreparedGrid),
}

/// A grid after legend extraction, with its effective tracks and children.
#[derive(Debug, Clone)]
struct PreparedGrid {
    rows: Vec<TrackSize>,
    columns: Vec<TrackSize>,
    alignment: Alignment,
    children: Vec<PreparedChild>,
    labels: Vec<Label>,
    intrinsic: Size,
}

impl PreparedGrid {
    fn tracks(&self, axis: Axis) -> &[TrackSize] {
        match axis {
            Axis::Horizontal => &self.columns,
            Axis::Vertical => &self.rows,
        }
    }
}

#[derive(Debug, Clone)]
struct PreparedChild {
    source: ChildSource,
    cell: CellSpan,
}

#[derive(Debug, Clone)]
enum ChildSource {
    Node(NodeId),
    SharedLegend(Block),
}

/// Arena of prepared nodes, indexed like the source tree.
struct Preparation {
    nodes: Vec<Option<Prepared>>,
}

impl Preparation {
    fn new(len: usize) -> Self {
        Self {
            nodes: (0..len).map(|_| None).collect(),
        }
    }

    fn set(&mut self, id: NodeId, node: Prepared) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = Some(node);
        }
    }

    fn get(&self, id: NodeId) -> ComposeResult<&Prepared> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| ComposeError::InvalidTree(format!("node {id} was not prepared")))
    }

    fn intrinsic(&self, source: &ChildSource) -> ComposeResult<Size> {
        match source {
            ChildSource::SharedLegend(block) => Ok(block.size),
            ChildSource::Node(id) => match self.get(*id)? {
                Prepared::Block(block) => Ok(block.size),
                Prepared::Grid(grid) => Ok(grid.intrinsic),
            },
        }
    }

    /// Smallest size at which every track fits the intrinsic extent of its
    /// children while keeping relative weights. Spanning children spread
    /// their extent evenly over the spanned tracks.
    fn grid_intrinsic(
        &self,
        rows: &[TrackSize],
        columns: &[TrackSize],
        children: &[PreparedChild],
    ) -> ComposeResult<Size> {
        let mut size = Size::new(0.0, 0.0);
        for axis in Axis::ALL {
            let tracks = match axis {
                Axis::Horizontal => columns,
                Axis::Vertical => rows,
            };
            let mut required = vec![0.0_f64; tracks.len()];
            for child in children {
                let extent = self.intrinsic(&child.source)?.along(axis);
                let share = extent / child.cell.span(axis).max(1) as f64;
                for track in child.cell.range(axis) {
                    if let Some(slot) = required.get_mut(track) {
                        *slot = slot.max(share);
                    }
                }
            }

            let mut fixed = 0.0;
            let mut weight_sum = 0.0;
            for track in tracks {
                match *track {
                    TrackSize::Fixed(extent) => fixed += extent,
                    TrackSize::Relative(weight) => weight_sum += weight,
                }
            }
            let relative = tracks
                .iter()
                .zip(&required)
                .filter_map(|(track, need)| match *track {
                    TrackSize::Relative(weight) => Some(OrderedFloat(need * weight_sum / weight)),
                    TrackSize::Fixed(_) => None,
                })
                .max()
                .map_or(0.0, |total| total.0);
            size = size.with_along(axis, fixed + relative);
        }
        Ok(size)
    }

    /// Anchor offsets exposed by a child for alignment in its parent.
    ///
    /// A nested grid exposes the largest anchor among children whose leading
    /// edge is only preceded by fixed tracks, since only those positions are
    /// independent of the size the grid ends up with. Each such anchor
    /// includes the padding the grid's own alignment will give that child.
    fn anchor_offsets(&self, source: &ChildSource, name: &str) -> ComposeResult<AnchorOffsets> {
        let grid = match source {
            ChildSource::SharedLegend(block) => return Ok(block_offsets(block, name)),
            ChildSource::Node(id) => match self.get(*id)? {
                Prepared::Block(block) => return Ok(block_offsets(block, name)),
                Prepared::Grid(grid) => grid,
            },
        };

        let aligned = self.solver_children(grid, &grid.alignment.anchor)?;
        let exposed = if name == grid.alignment.anchor {
            aligned.clone()
        } else {
            self.solver_children(grid, name)?
        };

        let mut offsets = AnchorOffsets::default();
        for axis in Axis::ALL {
            let tracks = grid.tracks(axis);
            let origins: Vec<Option<f64>> = grid
                .children
                .iter()
                .map(|child| fixed_origin(tracks, child.cell.leading(axis)))
                .collect();
            let padding = alignment_padding(axis, grid.alignment.mode(axis), &aligned, &origins);
            let best = origins
                .iter()
                .zip(&padding)
                .zip(&exposed)
                .filter_map(|((origin, pad), child)| {
                    let offset = child.anchors.get(axis)?;
                    Some(OrderedFloat((*origin)? + pad + offset))
                })
                .max();
            offsets.set(axis, best.map(|offset| offset.0));
        }
        Ok(offsets)
    }

    fn solver_children(&self, grid: &PreparedGrid, name: &str) -> ComposeResult<Vec<SolverChild>> {
        grid.children
            .iter()
            .map(|child| {
                Ok(SolverChild {
                    cell: child.cell,
                    anchors: self.anchor_offsets(&child.source, name)?,
                })
            })
            .collect()
    }
}

/// Offset of track `leading` from the grid origin when only fixed tracks
/// precede it.
fn fixed_origin(tracks: &[TrackSize], leading: usize) -> Option<f64> {
    tracks.get(..leading)?.iter().try_fold(0.0, |base, track| match *track {
        TrackSize::Fixed(extent) => Some(base + extent),
        TrackSize::Relative(_) => None,
    })
}

fn block_offsets(block: &Block, name: &str) -> AnchorOffsets {
    AnchorOffsets {
        horizontal: block.anchor(Axis::Horizontal, name),
        vertical: block.anchor(Axis::Vertical, name),
    }
}

struct Placement<'p> {
    prepared: &'p Preparation,
    style: LabelStyle,
}

impl Placement<'_> {
    fn place(
        &self,
        id: NodeId,
        path: TreePath,
        cell: Rect,
        content: Rect,
        figure: &mut ComposedFigure,
    ) -> ComposeResult<()> {
        match self.prepared.get(id)? {
            Prepared::Block(block) => {
                figure
                    .blocks
                    .push(placed_block(Some(id), path, block, cell, content));
                Ok(())
            }
            Prepared::Grid(grid) => self.place_grid(id, grid, path, cell, content, figure),
        }
    }

    fn place_grid(
        &self,
        id: NodeId,
        grid: &PreparedGrid,
        path: TreePath,
        cell: Rect,
        content: Rect,
        figure: &mut ComposedFigure,
    ) -> ComposeResult<()> {
        figure.grids.push(PlacedGrid {
            node: id,
            path: path.clone(),
            cell,
            content,
        });

        let solver_children = self
            .prepared
            .solver_children(grid, &grid.alignment.anchor)?;
        let layouts = solve_grid(GridSolveInput {
            path: &path,
            rows: &grid.rows,
            columns: &grid.columns,
            horizontal: grid.alignment.horizontal,
            vertical: grid.alignment.vertical,
            children: &solver_children,
            bounds: content,
        })?;

        for (index, (child, layout)) in grid.children.iter().zip(&layouts).enumerate() {
            let child_path = path.child(index);
            match &child.source {
                ChildSource::SharedLegend(block) => figure.blocks.push(placed_block(
                    None,
                    child_path,
                    block,
                    layout.cell,
                    layout.content,
                )),
                ChildSource::Node(node) => {
                    self.place(*node, child_path, layout.cell, layout.content, figure)?;
                }
            }
        }

        let cells: Vec<Rect> = layouts.iter().map(|layout| layout.cell).collect();
        let labels = overlay_labels(&path, &grid.labels, &cells, self.style)?;
        figure.labels.extend(labels);
        Ok(())
    }
}

fn placed_block(
    node: Option<NodeId>,
    path: TreePath,
    block: &Block,
    cell: Rect,
    content: Rect,
) -> PlacedBlock {
    PlacedBlock {
        node,
        path,
        handle: block.handle.clone(),
        role: block.role.clone(),
        cell,
        content,
        intrinsic: block.size,
        anchors: block.anchors.clone(),
    }
}
