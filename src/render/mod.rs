mod export_target;
mod frame;
mod null_exporter;
mod primitives;

pub use export_target::{ExportFormat, ExportTarget};
pub use frame::{BlockDraw, FigureFrame};
pub use null_exporter::NullExporter;
pub use primitives::{Color, TextHAlign, TextPrimitive};

use crate::error::ComposeResult;

/// Contract implemented by the export collaborator.
///
/// Exporters receive a fully resolved, deterministic `FigureFrame`; resolving
/// render handles, rasterizing and writing files all happen behind this seam.
pub trait Exporter {
    fn export(&mut self, frame: &FigureFrame, target: Option<&ExportTarget>) -> ComposeResult<()>;
}
