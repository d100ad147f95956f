use std::path::Path;

/// The file name without its directories, used as the default project name.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// The table number carried by a sheet name, from its first digit on.
/// `T12` gives `12`, `Table 3b` gives `3b`.
pub fn table_id_from_sheet(sheet_name: &str) -> Option<String> {
    sheet_name
        .find(|c: char| c.is_ascii_digit())
        .map(|idx| sheet_name[idx..].trim().to_string())
}

/// Cuts a stream of records into tables. A record made of the delimiter alone
/// closes the current table.
pub fn split_tables(records: Vec<Vec<String>>, delimiter: &str) -> Vec<Vec<Vec<String>>> {
    let mut tables: Vec<Vec<Vec<String>>> = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();
    for record in records {
        let is_delimiter = matches!(record.as_slice(), [cell] if cell.trim() == delimiter);
        if is_delimiter {
            tables.push(std::mem::take(&mut current));
        } else {
            current.push(record);
        }
    }
    // The last table may not be closed.
    if current.iter().any(|r| r.iter().any(|c| !c.trim().is_empty())) {
        tables.push(current);
    }
    tables
}

/// The index entry of a table: the entry at the table number (starting at 1),
/// or at the position of the table when its id is not a number.
pub fn index_link(entries: &[String], table_id: &str, position: usize) -> Option<String> {
    let ordinal = table_id.trim().parse::<usize>().unwrap_or(position + 1);
    ordinal
        .checked_sub(1)
        .and_then(|idx| entries.get(idx))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/wave_3/tabs.xlsx"), "tabs");
        assert_eq!(simplify_file_name("tabs"), "tabs");
    }

    #[test]
    fn sheet_ids() {
        assert_eq!(table_id_from_sheet("T12"), Some("12".to_string()));
        assert_eq!(table_id_from_sheet("Table 3b"), Some("3b".to_string()));
        assert_eq!(table_id_from_sheet("Index"), None);
    }

    #[test]
    fn split_on_delimiter() {
        let records = vec![
            rec(&["Q1"]),
            rec(&["", "Total"]),
            rec(&["|"]),
            rec(&["Q2"]),
            rec(&["|"]),
            rec(&["Q3"]),
            rec(&["a", "|"]),
        ];
        let tables = split_tables(records, "|");
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[1], vec![rec(&["Q2"])]);
        assert_eq!(tables[2].len(), 2);
    }

    #[test]
    fn trailing_blank_lines_are_dropped() {
        let tables = split_tables(vec![rec(&["Q1"]), rec(&["|"]), rec(&[""])], "|");
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn links() {
        let entries = vec!["Table 1 - Q1".to_string(), "Table 2 - Q2".to_string()];
        assert_eq!(index_link(&entries, "2", 0).as_deref(), Some("Table 2 - Q2"));
        assert_eq!(index_link(&entries, "x", 0).as_deref(), Some("Table 1 - Q1"));
        assert_eq!(index_link(&entries, "0", 0), None);
        assert_eq!(index_link(&entries, "5", 0), None);
    }
}
