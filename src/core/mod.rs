pub mod block;
pub mod legend;
pub mod track;
pub mod types;

pub use block::{Anchor, Block, BlockRole, PLOT_ORIGIN, RenderHandle};
pub use legend::{LegendContent, LegendEntry, LegendMatch};
pub use track::{TrackSize, TrackSpan, divide_tracks, span_union};
pub use types::{Axis, Corner, Rect, Side, Size};
