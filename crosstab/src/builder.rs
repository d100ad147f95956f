pub use crate::config::*;

/// A builder for assembling grids row by row.
///
/// Useful when the tables do not come from a file, or to write tests.
///
/// ```
/// use crosstab::builder::GridBuilder;
/// use crosstab::{parse_table, SourceLayout, SourceTable, TabulationOptions};
/// # use crosstab::CrosstabError;
///
/// let grid = GridBuilder::new()
///     .row(&["Q1 Awareness"])
///     .row(&["", "Men", "Women"])
///     .row(&["", "A", "B"])
///     .row(&["Base", "120", "80"])
///     .row(&["Aware", "20.00%", "45.00%"])
///     .row(&["", "", "A"])
///     .build();
///
/// let options = TabulationOptions {
///     stat_batches: Some("AB".to_string()),
///     ..TabulationOptions::DEFAULT
/// };
/// let table = parse_table(&SourceTable::new("1", grid, SourceLayout::Delimited), &options)?;
/// let spread = table.max_diffs[0].values[0].unwrap();
/// assert!((spread - 0.25).abs() < 1e-9);
///
/// # Ok::<(), CrosstabError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    rows: Vec<Vec<String>>,
}

impl GridBuilder {
    pub fn new() -> GridBuilder {
        GridBuilder { rows: Vec::new() }
    }

    pub fn row(mut self, cells: &[&str]) -> GridBuilder {
        self.rows.push(cells.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Adds an empty row.
    pub fn blank(mut self) -> GridBuilder {
        self.rows.push(Vec::new());
        self
    }

    pub fn build(self) -> Grid {
        Grid::new(self.rows)
    }
}
