use serde::{Deserialize, Serialize};

use crate::core::{RenderHandle, Side, Size};
use crate::error::{ComposeError, ComposeResult};

/// One legend key: a category label plus an opaque style key chosen by the
/// external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    #[serde(default)]
    pub style: String,
}

impl LegendEntry {
    #[must_use]
    pub fn new(label: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: style.into(),
        }
    }
}

/// Legend sub-block of a rendered panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendContent {
    pub entries: Vec<LegendEntry>,
    /// Space the legend occupies inside its panel.
    pub size: Size,
    pub side: Side,
    pub handle: RenderHandle,
}

impl LegendContent {
    #[must_use]
    pub fn new(handle: RenderHandle, size: Size, side: Side) -> Self {
        Self {
            entries: Vec::new(),
            size,
            side,
            handle,
        }
    }

    #[must_use]
    pub fn with_entry(mut self, label: impl Into<String>, style: impl Into<String>) -> Self {
        self.entries.push(LegendEntry::new(label, style));
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .extend(labels.into_iter().map(|label| LegendEntry::new(label, "")));
        self
    }

    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.label.clone()).collect()
    }

    /// Extent the legend consumes along its side's axis.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.size.along(self.side.axis())
    }

    #[must_use]
    pub fn matches(&self, other: &Self, matching: LegendMatch) -> bool {
        match matching {
            LegendMatch::Ordered => self
                .entries
                .iter()
                .map(|entry| entry.label.as_str())
                .eq(other.entries.iter().map(|entry| entry.label.as_str())),
            LegendMatch::Unordered => {
                let mut left = self.labels();
                let mut right = other.labels();
                left.sort_unstable();
                right.sort_unstable();
                left == right
            }
        }
    }

    pub fn validate(&self) -> ComposeResult<()> {
        self.size.validate("legend")?;
        if self.entries.iter().any(|entry| entry.label.is_empty()) {
            return Err(ComposeError::InvalidData(
                "legend entry label must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// How legend equality is decided when extracting a shared legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendMatch {
    /// Same labels in the same order.
    #[default]
    Ordered,
    /// Same labels as a multiset, order ignored.
    Unordered,
}
