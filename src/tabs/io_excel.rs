// Reading the tables of a workbook export, one table per sheet.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::tabs::io_common::{index_link, table_id_from_sheet};
use crate::tabs::*;

pub fn read_excel_tables(path: &str, cfs: &TabSource) -> BTabsResult<Vec<SourceTable>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let first_sheet = cfs.first_table_sheet_index()?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    debug!("read_excel_tables: sheets: {:?}", sheet_names);

    let entries = match &cfs.index_sheet_name {
        Some(name) => {
            let range = get_range(&mut workbook, path, name)?;
            index_entries(&range_to_grid(&range))
        }
        None => Vec::new(),
    };

    let mut res: Vec<SourceTable> = Vec::new();
    for (sheet_idx, sheet_name) in sheet_names.iter().enumerate() {
        if sheet_idx < first_sheet || cfs.index_sheet_name.as_ref() == Some(sheet_name) {
            debug!("read_excel_tables: skipping sheet {:?}", sheet_name);
            continue;
        }
        let id = match table_id_from_sheet(sheet_name) {
            Some(id) => id,
            None => {
                info!("read_excel_tables: sheet {:?} has no table number, skipping", sheet_name);
                continue;
            }
        };
        let range = get_range(&mut workbook, path, sheet_name)?;
        let grid = range_to_grid(&range);
        debug!("read_excel_tables: sheet {:?}: {} rows", sheet_name, grid.len());
        let mut table = SourceTable::new(&id, grid, SourceLayout::Workbook);
        table.link = index_link(&entries, &id, res.len());
        res.push(table);
    }
    Ok(res)
}

fn get_range(
    workbook: &mut Xlsx<std::io::BufReader<std::fs::File>>,
    path: &str,
    sheet: &str,
) -> BTabsResult<Range<DataType>> {
    let range = workbook
        .worksheet_range(sheet)
        .context(MissingSheetSnafu { path, sheet })?
        .context(ReadingSheetSnafu { path, sheet })?;
    Ok(range)
}

/// Index entries: the non-empty cells of the first column that mention a table.
fn index_entries(grid: &Grid) -> Vec<String> {
    grid.rows()
        .iter()
        .filter_map(|r| r.first())
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && c.contains("Table"))
        .map(|c| c.to_string())
        .collect()
}

// The grid always starts at A1, whatever the used range of the sheet.
fn range_to_grid(range: &Range<DataType>) -> Grid {
    let (row_offset, col_offset) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Grid::default(),
    };
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells: Vec<String> = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_to_string));
        rows.push(cells);
    }
    Grid::new(rows)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) | DataType::DateTime(f) => float_to_string(*f),
        DataType::Bool(true) => "TRUE".to_string(),
        DataType::Bool(false) => "FALSE".to_string(),
        DataType::Empty => String::new(),
        DataType::Error(_) => "#ERROR".to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_conversion() {
        assert_eq!(cell_to_string(&DataType::Float(988.0)), "988");
        assert_eq!(cell_to_string(&DataType::Float(0.35)), "0.35");
        assert_eq!(cell_to_string(&DataType::Int(12)), "12");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(cell_to_string(&DataType::String("Base".to_string())), "Base");
        assert_eq!(
            cell_to_string(&DataType::Error(calamine::CellErrorType::Div0)),
            "#ERROR"
        );
    }

    #[test]
    fn range_is_realigned() {
        let mut range: Range<DataType> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), DataType::String("Q1".to_string()));
        range.set_value((2, 2), DataType::Float(50.0));
        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 3);
        assert!(grid.row(0).map(|r| r.is_empty()).unwrap_or(false));
        assert_eq!(grid.row(1).unwrap(), &["", "Q1", ""]);
        assert_eq!(grid.row(2).unwrap(), &["", "", "50"]);
    }

    #[test]
    fn empty_range() {
        let range: Range<DataType> = Range::empty();
        assert!(range_to_grid(&range).is_empty());
    }

    #[test]
    fn entries_of_the_index_sheet() {
        let grid = Grid::from(vec![
            vec!["Client: Acme"],
            vec![""],
            vec!["Table 1 - Q1 Awareness"],
            vec!["Table 2 - Q2 Usage", "x"],
        ]);
        assert_eq!(
            index_entries(&grid),
            vec![
                "Table 1 - Q1 Awareness".to_string(),
                "Table 2 - Q2 Usage".to_string()
            ]
        );
    }
}
