use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{Axis, Rect, TrackSize, divide_tracks, span_union};
use crate::error::{ComposeError, ComposeResult};
use crate::tree::{AlignMode, CellSpan, TreePath};

/// Anchor offsets of one child for the grid's alignment anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorOffsets {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
}

impl AnchorOffsets {
    #[must_use]
    pub fn get(self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    pub fn set(&mut self, axis: Axis, offset: Option<f64>) {
        match axis {
            Axis::Horizontal => self.horizontal = offset,
            Axis::Vertical => self.vertical = offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverChild {
    pub cell: CellSpan,
    pub anchors: AnchorOffsets,
}

/// Resolved rectangles of one grid child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub cell: Rect,
    pub content: Rect,
    /// Leading-edge padding applied per axis.
    pub padding: AnchorOffsets,
}

#[derive(Debug, Clone, Copy)]
pub struct GridSolveInput<'a> {
    pub path: &'a TreePath,
    pub rows: &'a [TrackSize],
    pub columns: &'a [TrackSize],
    pub horizontal: AlignMode,
    pub vertical: AlignMode,
    pub children: &'a [SolverChild],
    pub bounds: Rect,
}

impl GridSolveInput<'_> {
    fn tracks(&self, axis: Axis) -> &[TrackSize] {
        match axis {
            Axis::Horizontal => self.columns,
            Axis::Vertical => self.rows,
        }
    }

    fn mode(&self, axis: Axis) -> AlignMode {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Computes cell and content rectangles for every child of one grid.
///
/// Track extents come from fixed sizes and relative weights only; alignment
/// padding is taken out of each child's own cell so track proportions hold.
pub fn solve_grid(input: GridSolveInput<'_>) -> ComposeResult<Vec<CellLayout>> {
    let bounds = input.bounds;
    let mut spans = Vec::with_capacity(2);
    for axis in Axis::ALL {
        let origin = bounds.origin_along(axis);
        let available = bounds.extent_along(axis);
        let divided = divide_tracks(input.tracks(axis), origin, available).ok_or_else(|| {
            ComposeError::UnresolvableSize {
                path: input.path.clone(),
                axis,
                available,
            }
        })?;
        spans.push(divided);
    }
    let (columns, rows) = (&spans[0], &spans[1]);

    let mut layouts = Vec::with_capacity(input.children.len());
    for child in input.children {
        let cell = child.cell;
        let out_of_range = || ComposeError::CellOutOfRange {
            path: input.path.clone(),
            row: cell.row,
            column: cell.column,
            rows: rows.len(),
            columns: columns.len(),
        };
        let x = span_union(columns, cell.column, cell.column_span).ok_or_else(out_of_range)?;
        let y = span_union(rows, cell.row, cell.row_span).ok_or_else(out_of_range)?;
        let rect = Rect::new(x.start, y.start, x.extent, y.extent);
        layouts.push(CellLayout {
            cell: rect,
            content: rect,
            padding: AnchorOffsets {
                horizontal: Some(0.0),
                vertical: Some(0.0),
            },
        });
    }

    for axis in Axis::ALL {
        let origins: Vec<Option<f64>> = layouts
            .iter()
            .map(|layout| Some(layout.cell.origin_along(axis)))
            .collect();
        let padding = alignment_padding(axis, input.mode(axis), input.children, &origins);
        for ((layout, child), pad) in layouts.iter_mut().zip(input.children).zip(padding) {
            let available = layout.cell.extent_along(axis);
            // The anchor must still land inside the padded content.
            let anchor = child.anchors.get(axis).unwrap_or(0.0);
            if pad >= available || pad + anchor > available {
                return Err(ComposeError::UnresolvableSize {
                    path: input.path.clone(),
                    axis,
                    available,
                });
            }
            layout.content = layout.content.inset_leading(axis, pad);
            layout.padding.set(axis, Some(pad));
        }
    }

    trace!(
        path = %input.path,
        children = layouts.len(),
        rows = rows.len(),
        columns = columns.len(),
        "solved grid"
    );
    Ok(layouts)
}

/// Leading-edge padding per child so anchors line up under `mode`.
///
/// `origins` holds each child's cell origin on `axis`; `None` marks an origin
/// that is not known yet, which keeps that child out of `Anchors` targets.
pub(crate) fn alignment_padding(
    axis: Axis,
    mode: AlignMode,
    children: &[SolverChild],
    origins: &[Option<f64>],
) -> Vec<f64> {
    let mut padding = vec![0.0; children.len()];
    match mode {
        AlignMode::None => {}
        AlignMode::Shared => {
            let target = children
                .iter()
                .filter_map(|child| child.anchors.get(axis))
                .map(OrderedFloat)
                .max();
            if let Some(OrderedFloat(target)) = target {
                for (pad, child) in padding.iter_mut().zip(children) {
                    if let Some(offset) = child.anchors.get(axis) {
                        *pad = target - offset;
                    }
                }
            }
        }
        AlignMode::Anchors => {
            let absolute = |index: usize| {
                let origin = origins.get(index).copied().flatten()?;
                children[index].anchors.get(axis).map(|offset| origin + offset)
            };
            for members in track_groups(axis, children).values() {
                let target = members
                    .iter()
                    .filter_map(|&index| absolute(index))
                    .map(OrderedFloat)
                    .max();
                let Some(OrderedFloat(target)) = target else {
                    continue;
                };
                for &index in members {
                    if let Some(position) = absolute(index) {
                        padding[index] = target - position;
                    }
                }
            }
        }
    }
    padding
}

/// Groups children whose track ranges on `axis` overlap, transitively.
///
/// Keys are group representatives in first-seen order.
fn track_groups(axis: Axis, children: &[SolverChild]) -> IndexMap<usize, Vec<usize>> {
    let mut parent: Vec<usize> = (0..children.len()).collect();
    fn find(parent: &mut [usize], mut index: usize) -> usize {
        while parent[index] != index {
            parent[index] = parent[parent[index]];
            index = parent[index];
        }
        index
    }

    for a in 0..children.len() {
        for b in (a + 1)..children.len() {
            let left = children[a].cell.range(axis);
            let right = children[b].cell.range(axis);
            if left.start < right.end && right.start < left.end {
                let root_a = find(&mut parent, a);
                let root_b = find(&mut parent, b);
                if root_a != root_b {
                    parent[root_b] = root_a;
                }
            }
        }
    }

    let mut groups: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for index in 0..children.len() {
        let root = find(&mut parent, index);
        groups.entry(root).or_default().push(index);
    }
    groups
}
