use tracing::debug;

use crate::core::{Block, BlockRole, LegendContent, LegendMatch};
use crate::error::{ComposeError, ComposeResult};
use crate::tree::{LegendPosition, TreePath};

/// Outcome of resolving one legend group.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendExtraction {
    /// Members in input order, legends removed.
    pub members: Vec<Block>,
    /// Standalone shared legend, absent when suppressed or already extracted.
    pub legend: Option<Block>,
}

/// Deduplicates the legends of sibling blocks into one standalone block.
///
/// `members` pairs each block with its child index in the declaring grid.
/// A set where no member has a legend is returned unchanged.
pub fn extract_shared_legend(
    path: &TreePath,
    members: &[(usize, &Block)],
    matching: LegendMatch,
    position: LegendPosition,
) -> ComposeResult<LegendExtraction> {
    let legends: Vec<(usize, Option<&LegendContent>)> = members
        .iter()
        .map(|(child, block)| (*child, block.legend.as_ref()))
        .collect();

    if legends.iter().all(|(_, legend)| legend.is_none()) {
        return Ok(LegendExtraction {
            members: members.iter().map(|(_, block)| (*block).clone()).collect(),
            legend: None,
        });
    }

    let mut reference: Option<&LegendContent> = None;
    for (child, legend) in &legends {
        let Some(legend) = *legend else {
            return Err(ComposeError::LegendMissing {
                path: path.clone(),
                child: *child,
            });
        };
        match reference {
            None => reference = Some(legend),
            Some(expected) if !expected.matches(legend, matching) => {
                return Err(ComposeError::AmbiguousLegend {
                    path: path.clone(),
                    expected: expected.labels(),
                    found: legend.labels(),
                });
            }
            Some(_) => {}
        }
    }

    let stripped = members
        .iter()
        .map(|(_, block)| block.without_legend())
        .collect();
    let legend = match (position, reference) {
        (LegendPosition::None, _) => {
            debug!(path = %path, "shared legend suppressed by position `none`");
            None
        }
        (_, Some(shared)) => Some(
            Block::new(shared.handle.as_str(), shared.size).with_role(BlockRole::SharedLegend {
                entries: shared.entries.clone(),
            }),
        ),
        (_, None) => None,
    };

    Ok(LegendExtraction {
        members: stripped,
        legend,
    })
}
