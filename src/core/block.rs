use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Axis, LegendContent, LegendEntry, Size};
use crate::error::{ComposeError, ComposeResult};

/// Anchor name used for plot-area alignment unless a grid overrides it.
pub const PLOT_ORIGIN: &str = "plot-origin";

/// Opaque key resolved by the export collaborator at render time.
///
/// The layout engine never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderHandle(String);

impl RenderHandle {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Named reference offset measured from a block's leading edge on `axis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub axis: Axis,
    pub name: String,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockRole {
    #[default]
    Panel,
    SharedLegend {
        entries: Vec<LegendEntry>,
    },
    /// A finished figure reused as one block of another composition.
    Composite,
}

/// One renderable unit as produced by the external renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub handle: RenderHandle,
    pub size: Size,
    #[serde(default)]
    pub anchors: SmallVec<[Anchor; 2]>,
    #[serde(default)]
    pub legend: Option<LegendContent>,
    #[serde(default)]
    pub role: BlockRole,
}

impl Block {
    #[must_use]
    pub fn new(handle: impl Into<String>, size: Size) -> Self {
        Self {
            handle: RenderHandle::new(handle),
            size,
            anchors: SmallVec::new(),
            legend: None,
            role: BlockRole::Panel,
        }
    }

    /// Adds an anchor, replacing any existing anchor with the same axis/name.
    #[must_use]
    pub fn with_anchor(mut self, axis: Axis, name: impl Into<String>, offset: f64) -> Self {
        let name = name.into();
        self.anchors
            .retain(|anchor| !(anchor.axis == axis && anchor.name == name));
        self.anchors.push(Anchor { axis, name, offset });
        self
    }

    /// Shorthand for the plot-area origin anchor on `axis`.
    #[must_use]
    pub fn with_plot_origin(self, axis: Axis, offset: f64) -> Self {
        self.with_anchor(axis, PLOT_ORIGIN, offset)
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendContent) -> Self {
        self.legend = Some(legend);
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: BlockRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn anchor(&self, axis: Axis, name: &str) -> Option<f64> {
        self.anchors
            .iter()
            .find(|anchor| anchor.axis == axis && anchor.name == name)
            .map(|anchor| anchor.offset)
    }

    #[must_use]
    pub fn has_legend(&self) -> bool {
        self.legend.is_some()
    }

    /// Derived copy with the legend sub-block removed.
    ///
    /// The intrinsic size shrinks by the legend extent on the legend's axis;
    /// anchors on that axis move back when the legend sat on the leading side.
    /// A block without a legend is returned unchanged.
    #[must_use]
    pub fn without_legend(&self) -> Self {
        let mut stripped = self.clone();
        let Some(legend) = stripped.legend.take() else {
            return stripped;
        };

        let axis = legend.side.axis();
        let extent = legend.extent().clamp(0.0, self.size.along(axis));
        stripped.size = self.size.with_along(axis, self.size.along(axis) - extent);
        if legend.side.is_leading() {
            for anchor in stripped.anchors.iter_mut().filter(|a| a.axis == axis) {
                anchor.offset = (anchor.offset - extent).max(0.0);
            }
        }
        stripped
    }

    pub fn validate(&self) -> ComposeResult<()> {
        self.size.validate("block")?;
        for anchor in &self.anchors {
            if !anchor.offset.is_finite() || anchor.offset < 0.0 {
                return Err(ComposeError::InvalidData(format!(
                    "anchor `{}` of block `{}` must be finite and >= 0",
                    anchor.name,
                    self.handle.as_str()
                )));
            }
            if anchor.offset > self.size.along(anchor.axis) {
                return Err(ComposeError::InvalidData(format!(
                    "anchor `{}` of block `{}` lies outside the block",
                    anchor.name,
                    self.handle.as_str()
                )));
            }
        }
        if let Some(legend) = &self.legend {
            legend.validate()?;
            if legend.extent() >= self.size.along(legend.side.axis()) {
                return Err(ComposeError::InvalidData(format!(
                    "legend of block `{}` is larger than the block",
                    self.handle.as_str()
                )));
            }
        }
        Ok(())
    }
}
