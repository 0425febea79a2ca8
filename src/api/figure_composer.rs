use tracing::debug;

use crate::error::{ComposeError, ComposeResult};
use crate::layout::{ComposedFigure, Composer};
use crate::render::{Exporter, FigureFrame};
use crate::tree::CompositionTree;

use super::ComposeConfig;

/// Entry point pairing the layout engine with an export collaborator.
pub struct FigureComposer<E: Exporter> {
    exporter: E,
    config: ComposeConfig,
}

impl<E: Exporter> FigureComposer<E> {
    pub fn new(exporter: E, config: ComposeConfig) -> ComposeResult<Self> {
        let config = config.validate()?;
        Ok(Self { exporter, config })
    }

    #[must_use]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    #[must_use]
    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn into_exporter(self) -> E {
        self.exporter
    }

    /// Resolves the tree without exporting. Pure: no exporter call happens.
    pub fn compose(&self, tree: &CompositionTree) -> ComposeResult<ComposedFigure> {
        Composer::new(tree)
            .with_label_style(self.config.label_style)
            .compose(self.config.output_size)
    }

    #[must_use]
    pub fn build_frame(&self, figure: &ComposedFigure) -> FigureFrame {
        FigureFrame::from_figure(figure, self.config.label_style)
    }

    /// Composes and hands the result to the exporter exactly once.
    ///
    /// Composition errors abort before the exporter is called.
    pub fn compose_and_export(&mut self, tree: &CompositionTree) -> ComposeResult<ComposedFigure> {
        let figure = self.compose(tree)?;
        let frame = self.build_frame(&figure);
        self.exporter
            .export(&frame, self.config.export.as_ref())
            .map_err(|err| match err {
                ComposeError::Export(_) => err,
                other => ComposeError::Export(other.to_string()),
            })?;
        debug!(
            draws = frame.draws.len(),
            texts = frame.texts.len(),
            "figure exported"
        );
        Ok(figure)
    }
}
