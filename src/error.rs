use thiserror::Error;

use crate::core::Axis;
use crate::tree::TreePath;

pub type ComposeResult<T> = Result<T, ComposeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error(
        "cell out of range at {path}: row={row}, column={column} (grid is {rows}x{columns})"
    )]
    CellOutOfRange {
        path: TreePath,
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("overlapping children at {path}: cell row={row}, column={column} is already occupied")]
    CellOverlap {
        path: TreePath,
        row: usize,
        column: usize,
    },

    #[error("duplicate label for child {child} at {path}")]
    DuplicateLabel { path: TreePath, child: usize },

    #[error("label target {child} out of range at {path} (grid has {children} children)")]
    LabelTargetOutOfRange {
        path: TreePath,
        child: usize,
        children: usize,
    },

    #[error("legend group member {child} at {path} has no legend")]
    LegendMissing { path: TreePath, child: usize },

    #[error("invalid composition tree: {0}")]
    InvalidTree(String),

    #[error("ambiguous shared legend at {path}: expected {expected:?}, found {found:?}")]
    AmbiguousLegend {
        path: TreePath,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("unresolvable size at {path}: {axis:?} space {available} cannot satisfy the grid")]
    UnresolvableSize {
        path: TreePath,
        axis: Axis,
        available: f64,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl ComposeError {
    /// Returns `true` for errors raised by structural validation, before any
    /// layout work happens.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CellOutOfRange { .. }
                | Self::CellOverlap { .. }
                | Self::DuplicateLabel { .. }
                | Self::LabelTargetOutOfRange { .. }
                | Self::LegendMissing { .. }
                | Self::InvalidTree(_)
        )
    }

    /// Tree path of the offending node when the error is bound to one.
    #[must_use]
    pub fn path(&self) -> Option<&TreePath> {
        match self {
            Self::CellOutOfRange { path, .. }
            | Self::CellOverlap { path, .. }
            | Self::DuplicateLabel { path, .. }
            | Self::LabelTargetOutOfRange { path, .. }
            | Self::LegendMissing { path, .. }
            | Self::AmbiguousLegend { path, .. }
            | Self::UnresolvableSize { path, .. } => Some(path),
            Self::InvalidTree(_) | Self::InvalidData(_) | Self::Export(_) => None,
        }
    }
}
