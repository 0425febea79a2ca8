use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Size;
use crate::error::{ComposeError, ComposeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Tiff,
    Pdf,
    Svg,
}

impl ExportFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "pdf" => Some(Self::Pdf),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_raster(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Tiff)
    }
}

/// Export parameters handed through to the export collaborator.
///
/// Layout never reads these; only obviously invalid values are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Physical output size (e.g. inches or centimetres) for the encoder.
    #[serde(default)]
    pub physical_size: Option<Size>,
    #[serde(default)]
    pub dpi: Option<u32>,
    /// Lossy encoder quality, 1..=100.
    #[serde(default)]
    pub quality: Option<u8>,
    /// Encoder-specific compression name (e.g. `lzw` for TIFF).
    #[serde(default)]
    pub compression: Option<String>,
}

impl ExportTarget {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            path: path.into(),
            format,
            physical_size: None,
            dpi: None,
            quality: None,
            compression: None,
        }
    }

    /// Builds a target whose format is inferred from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> ComposeResult<Self> {
        let path = path.into();
        let format = ExportFormat::from_path(&path).ok_or_else(|| {
            ComposeError::InvalidData(format!(
                "cannot infer export format from `{}`",
                path.display()
            ))
        })?;
        Ok(Self::new(path, format))
    }

    #[must_use]
    pub fn with_physical_size(mut self, width: f64, height: f64) -> Self {
        self.physical_size = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    pub fn validate(&self) -> ComposeResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ComposeError::InvalidData(
                "export path must not be empty".to_owned(),
            ));
        }
        if let Some(size) = self.physical_size {
            size.validate("physical export")?;
        }
        if self.dpi == Some(0) {
            return Err(ComposeError::InvalidData(
                "export dpi must be > 0".to_owned(),
            ));
        }
        if let Some(quality) = self.quality {
            if !(1..=100).contains(&quality) {
                return Err(ComposeError::InvalidData(
                    "export quality must be in 1..=100".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportFormat, ExportTarget};

    #[test]
    fn format_is_inferred_from_extension() {
        let target = ExportTarget::from_path("figures/plant_growth.TIFF").expect("tiff target");
        assert_eq!(target.format, ExportFormat::Tiff);
        assert!(ExportTarget::from_path("figures/plant_growth").is_err());
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let target = ExportTarget::new("out.jpg", ExportFormat::Jpeg).with_quality(0);
        assert!(target.validate().is_err());
        let target = target.with_quality(90).with_dpi(300).with_physical_size(7.0, 8.0);
        assert!(target.validate().is_ok());
    }
}
