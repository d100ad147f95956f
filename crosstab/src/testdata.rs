// Grids shared by the unit tests.

use crate::config::Grid;

/// A text export: three waves tested against each other.
pub fn delimited_grid() -> Grid {
    Grid::from(vec![
        vec![],
        vec!["", ""],
        vec!["Brand Tracker - Filter: all", ""],
        vec!["Q5 Favorability by wave", ""],
        vec!["", ""],
        vec!["Table: 3 - Weighted by: Weight - Level: Top", ""],
        vec!["", "Wave", "", "", ""],
        vec!["", "December", "January", "February", ""],
        vec!["", "A", "B", "C", ""],
        vec!["", ""],
        vec!["Unweighted Base", "991", "1334", "1839", ""],
        vec!["", "", "", "", ""],
        vec!["Base", "988.4", "1334.1", "1839.0", ""],
        vec!["", "100.00%", "100.00%", "100.00%", ""],
        vec!["", "", "", "", ""],
        vec!["", "", "", "", ""],
        vec!["Favorable", "300", "667", "*", ""],
        vec!["", "30.00%", "50.00%", "*", ""],
        vec!["", "", "A", "", ""],
        vec!["", "", "", "", ""],
        vec!["Unfavorable", "100", "*", "-", ""],
        vec!["", "10.12%", "*", "-", ""],
        vec!["", "", "", "", ""],
        vec!["Cell Contents:", ""],
        vec!["- Column Percentages", ""],
        vec!["Statistics: Column Proportions: 95%: A/B/C,", ""],
    ])
}

/// A workbook sheet: percentages stored as fractions, one banner row.
pub fn workbook_grid() -> Grid {
    Grid::from(vec![
        vec!["Brand Tracker"],
        vec!["Q7 Favorability by gender"],
        vec!["Table: 7"],
        vec![],
        vec!["", "Total", "Male", "Female"],
        vec!["", "A", "B", "C"],
        vec!["Base", "200", "100", "100"],
        vec!["", "1", "1", "1"],
        vec!["Favorable", "80", "50", "30"],
        vec!["", "0.4", "0.5", "0.3"],
        vec!["", "", "C", ""],
        vec!["Unfavorable", "120", "*", "-"],
        vec!["", "0.6", "*", "-"],
        vec!["", "B", "", ""],
        vec!["Cell Contents ..."],
    ])
}
