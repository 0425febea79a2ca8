use serde::{Deserialize, Serialize};

use crate::core::Size;
use crate::error::ComposeResult;
use crate::layout::LabelStyle;
use crate::render::{Color, ExportTarget};

/// Root-level composition settings.
///
/// This type is serializable so scripts can keep figure setup next to the
/// composition declaration instead of inventing their own format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Output size in layout units; `None` composes at the root's intrinsic size.
    #[serde(default)]
    pub output_size: Option<Size>,
    #[serde(default)]
    pub label_style: LabelStyle,
    /// Passed through to the exporter unexamined.
    #[serde(default)]
    pub export: Option<ExportTarget>,
}

impl ComposeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output_size(mut self, width: f64, height: f64) -> Self {
        self.output_size = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn with_label_style(mut self, style: LabelStyle) -> Self {
        self.label_style = style;
        self
    }

    /// Sets label font size, keeping the rest of the label style.
    #[must_use]
    pub fn with_label_font_size(mut self, font_size: f64) -> Self {
        self.label_style.font_size = font_size;
        self
    }

    #[must_use]
    pub fn with_label_color(mut self, color: Color) -> Self {
        self.label_style.color = color;
        self
    }

    #[must_use]
    pub fn with_export_target(mut self, target: ExportTarget) -> Self {
        self.export = Some(target);
        self
    }

    pub fn validate(self) -> ComposeResult<Self> {
        if let Some(size) = self.output_size {
            size.validate("output")?;
        }
        self.label_style.validate()?;
        if let Some(target) = &self.export {
            target.validate()?;
        }
        Ok(self)
    }
}
