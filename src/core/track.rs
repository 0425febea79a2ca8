use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, ComposeResult};

/// Size declaration of one grid row or column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TrackSize {
    /// Share of the space left after fixed tracks, proportional to the weight.
    Relative(f64),
    /// Exact extent in output units.
    Fixed(f64),
}

impl Default for TrackSize {
    fn default() -> Self {
        Self::Relative(1.0)
    }
}

impl TrackSize {
    #[must_use]
    pub fn uniform(count: usize) -> Vec<Self> {
        vec![Self::default(); count]
    }

    #[must_use]
    pub fn from_weights(weights: &[f64]) -> Vec<Self> {
        weights.iter().copied().map(Self::Relative).collect()
    }

    pub fn validate(self) -> ComposeResult<Self> {
        let (name, value) = match self {
            Self::Relative(weight) => ("relative weight", weight),
            Self::Fixed(extent) => ("fixed extent", extent),
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(ComposeError::InvalidData(format!(
                "track {name} must be finite and > 0"
            )));
        }
        Ok(self)
    }
}

/// Resolved position of one track along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSpan {
    pub start: f64,
    pub extent: f64,
}

impl TrackSpan {
    #[must_use]
    pub fn end(self) -> f64 {
        self.start + self.extent
    }
}

/// Splits `[origin, origin + total]` into consecutive tracks.
///
/// Fixed tracks take their extent first; relative tracks share the remainder by
/// `weight / sum(weights)`. The last track snaps to the far edge so rounding
/// never leaves a gap. Returns `None` when some track would get no space.
#[must_use]
pub fn divide_tracks(tracks: &[TrackSize], origin: f64, total: f64) -> Option<Vec<TrackSpan>> {
    if tracks.is_empty() || !origin.is_finite() || !total.is_finite() || total <= 0.0 {
        return None;
    }

    let fixed_sum: f64 = tracks
        .iter()
        .filter_map(|track| match track {
            TrackSize::Fixed(extent) => Some(*extent),
            TrackSize::Relative(_) => None,
        })
        .sum();
    let weight_sum: f64 = tracks
        .iter()
        .filter_map(|track| match track {
            TrackSize::Relative(weight) => Some(*weight),
            TrackSize::Fixed(_) => None,
        })
        .sum();
    let remaining = total - fixed_sum;
    let has_relative = weight_sum > 0.0;
    if has_relative && remaining <= 0.0 {
        return None;
    }
    if !has_relative && fixed_sum > total {
        return None;
    }

    let far_edge = origin + total;
    let last_index = tracks.len() - 1;
    let mut spans = Vec::with_capacity(tracks.len());
    let mut cursor = origin;
    for (index, track) in tracks.iter().enumerate() {
        let extent = match *track {
            TrackSize::Fixed(extent) => extent,
            TrackSize::Relative(weight) => remaining * (weight / weight_sum),
        };
        let end = if index == last_index && has_relative {
            far_edge
        } else {
            (cursor + extent).min(far_edge)
        };
        let span = TrackSpan {
            start: cursor,
            extent: end - cursor,
        };
        if !span.extent.is_finite() || span.extent <= 0.0 {
            return None;
        }
        spans.push(span);
        cursor = end;
    }
    Some(spans)
}

/// Combined span of tracks `first..first + count`.
#[must_use]
pub fn span_union(spans: &[TrackSpan], first: usize, count: usize) -> Option<TrackSpan> {
    let head = spans.get(first)?;
    let tail = spans.get(first + count.max(1) - 1)?;
    Some(TrackSpan {
        start: head.start,
        extent: tail.end() - head.start,
    })
}
