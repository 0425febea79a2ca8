//! panel-grid: grid composition engine for rendered plot panels.
//!
//! Already-rendered panels go in as opaque blocks with intrinsic sizes,
//! alignment anchors and optional legends. Nested grids with relative track
//! weights arrange them, shared legends are deduplicated, plot areas are
//! aligned across panels with different margins, and corner labels are
//! overlaid. The composed figure is handed to an `Exporter`.

pub mod api;
pub mod core;
pub mod error;
pub mod layout;
pub mod render;
pub mod telemetry;
pub mod tree;

pub use api::{ComposeConfig, FigureComposer};
pub use error::{ComposeError, ComposeResult};
