//! The `Max Diff` columns.

use log::debug;
use snafu::ensure;

use crate::config::*;
use crate::{ColumnOutOfRangeSnafu, CrosstabError};

/// The spread of the numeric values of a group of cells.
///
/// `members` are positions in `cells`. Suppressed and missing cells are left
/// out. The minimum starts from the first member (or zero if that member is
/// left out), the maximum from the first numeric value. Returns `None` when
/// fewer than two numeric values remain.
pub fn max_diff(cells: &[ResolvedCell], members: &[usize]) -> Result<Option<f64>, CrosstabError> {
    for m in members {
        ensure!(
            *m < cells.len(),
            ColumnOutOfRangeSnafu {
                column: *m,
                width: cells.len()
            }
        );
    }
    let values: Vec<Option<f64>> = members.iter().map(|m| cells[*m].value.numeric()).collect();
    if values.iter().flatten().count() < 2 {
        return Ok(None);
    }
    // TODO: seed with +infinity once the reports no longer rely on it.
    let mut min = values.first().copied().flatten().unwrap_or(0.0);
    let mut max: Option<f64> = None;
    for v in values.iter().flatten() {
        if *v < min {
            min = *v;
        }
        if max.map(|m| *v > m).unwrap_or(true) {
            max = Some(*v);
        }
    }
    Ok(max.map(|m| m - min))
}

/// Computes one `Max Diff N` column per comparison group.
pub fn compute_max_diffs(
    rows: &[ResponseRow],
    groups: &[ComparisonGroup],
) -> Result<Vec<DerivedColumn>, CrosstabError> {
    let mut res: Vec<DerivedColumn> = Vec::new();
    for (gidx, group) in groups.iter().enumerate() {
        let mut values: Vec<Option<f64>> = Vec::new();
        for row in rows {
            values.push(max_diff(&row.cells, &group.banner_positions)?);
        }
        let name = format!("Max Diff {}", gidx + 1);
        debug!("compute_max_diffs: {} {:?}", name, values);
        res.push(DerivedColumn {
            name,
            group: gidx,
            values,
        });
    }
    Ok(res)
}
