use crate::error::ComposeResult;
use crate::render::{ExportTarget, Exporter, FigureFrame};

/// No-op exporter used by tests and headless layout runs.
///
/// It still validates the frame so invalid geometry is caught before a real
/// backend sees it.
#[derive(Debug, Default)]
pub struct NullExporter {
    pub export_count: usize,
    pub last_draw_count: usize,
    pub last_text_count: usize,
    pub last_target: Option<ExportTarget>,
}

impl Exporter for NullExporter {
    fn export(&mut self, frame: &FigureFrame, target: Option<&ExportTarget>) -> ComposeResult<()> {
        frame.validate()?;
        self.export_count += 1;
        self.last_draw_count = frame.draws.len();
        self.last_text_count = frame.texts.len();
        self.last_target = target.cloned();
        Ok(())
    }
}
