#[cfg(feature = "parallel-compose")]
use rayon::prelude::*;

use crate::error::ComposeResult;
use crate::layout::{ComposedFigure, Composer};
use crate::tree::CompositionTree;

use super::ComposeConfig;

/// Composes independent figures; results keep input order.
///
/// Compositions share no state, so with `parallel-compose` each tree is
/// resolved on the rayon pool.
pub fn compose_many(
    trees: &[CompositionTree],
    config: &ComposeConfig,
) -> Vec<ComposeResult<ComposedFigure>> {
    let compose_one = |tree: &CompositionTree| {
        Composer::new(tree)
            .with_label_style(config.label_style)
            .compose(config.output_size)
    };

    #[cfg(feature = "parallel-compose")]
    {
        trees.par_iter().map(compose_one).collect()
    }

    #[cfg(not(feature = "parallel-compose"))]
    {
        trees.iter().map(compose_one).collect()
    }
}
