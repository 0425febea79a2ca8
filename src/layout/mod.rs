//! Layout engine: legend extraction, grid solving, label overlay and the
//! composer that drives them over a composition tree.

mod composed;
mod composer;
mod label_overlay;
mod legend_extraction;
mod sizing_solver;

pub use composed::{ComposedFigure, PlacedBlock, PlacedGrid, ResolvedLabel};
pub use composer::Composer;
pub use label_overlay::{LabelStyle, overlay_labels};
pub use legend_extraction::{LegendExtraction, extract_shared_legend};
pub use sizing_solver::{AnchorOffsets, CellLayout, GridSolveInput, SolverChild, solve_grid};
