// The JSON summary and the flat CSV export.

use serde_json::{json, Value as JSValue};

use crate::tabs::*;

pub const TABLE_COLUMN: &str = "Table";
pub const QUESTION_COLUMN: &str = "Question";
pub const STUB_COLUMN: &str = "Stub";
pub const LINK_COLUMN: &str = "TableLink";

/// One output column of a table.
#[derive(Eq, PartialEq, Debug, Clone)]
enum Column {
    Table,
    Question,
    Stub,
    /// Position in the banner points.
    Banner(usize),
    /// Position in the Max Diff columns.
    MaxDiff(usize),
    Link,
}

/// Table, Question, Stub, the banner points with each Max Diff column right
/// after the last banner point of its group, then the link.
fn column_layout(table: &Table) -> Vec<Column> {
    let mut res = vec![Column::Table, Column::Question, Column::Stub];
    for pos in 0..table.banners.len() {
        res.push(Column::Banner(pos));
        for (diff_idx, diff) in table.max_diffs.iter().enumerate() {
            let last = table.comparison_groups[diff.group]
                .banner_positions
                .iter()
                .max()
                .cloned();
            if last == Some(pos) {
                res.push(Column::MaxDiff(diff_idx));
            }
        }
    }
    res.push(Column::Link);
    res
}

fn column_name(table: &Table, column: &Column) -> String {
    match column {
        Column::Table => TABLE_COLUMN.to_string(),
        Column::Question => QUESTION_COLUMN.to_string(),
        Column::Stub => STUB_COLUMN.to_string(),
        Column::Banner(pos) => table.banners[*pos].path.clone(),
        Column::MaxDiff(idx) => table.max_diffs[*idx].name.clone(),
        Column::Link => LINK_COLUMN.to_string(),
    }
}

fn round_diff(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

fn cell_js(table: &Table, row_idx: usize, column: &Column) -> JSValue {
    let row = &table.responses[row_idx];
    match column {
        Column::Table => json!(table.id.to_string()),
        Column::Question => json!(table.question),
        Column::Stub => json!(table.response_stub(row).name),
        Column::Banner(pos) => json!(row.cells[*pos].to_string()),
        Column::MaxDiff(idx) => match table.max_diffs[*idx].values[row_idx] {
            Some(x) => json!(round_diff(x)),
            None => JSValue::Null,
        },
        Column::Link => json!(table.link.clone().unwrap_or_default()),
    }
}

fn cell_text(table: &Table, row_idx: usize, column: &Column) -> String {
    match cell_js(table, row_idx, column) {
        JSValue::String(s) => s,
        JSValue::Null => String::new(),
        x => x.to_string(),
    }
}

fn table_js(table: &Table) -> JSValue {
    let layout = column_layout(table);
    let columns: Vec<String> = layout.iter().map(|c| column_name(table, c)).collect();
    let rows: Vec<JSValue> = (0..table.responses.len())
        .map(|idx| JSValue::Array(layout.iter().map(|c| cell_js(table, idx, c)).collect()))
        .collect();
    let warnings: Vec<String> = table.warnings.iter().map(|w| w.to_string()).collect();
    let significance: Vec<JSValue> = table
        .significance
        .iter()
        .map(|m| {
            json!({
                "row": m.row_index,
                "column": m.column_index,
                "printed": m.printed,
                "expected": m.expected
            })
        })
        .collect();
    json!({
        "table": table.id.to_string(),
        "label": table.label,
        "projectTitle": table.project_title,
        "question": table.question,
        "link": table.link,
        "firstBase": table.first_base,
        "bannerDepth": table.banner_depth,
        "numBases": table.num_bases(),
        "numStubs": table.num_stubs(),
        "columns": columns,
        "rows": rows,
        "warnings": warnings,
        "significance": significance
    })
}

pub fn build_summary_js(project_name: &str, result: &TabulationResult) -> JSValue {
    let tables: Vec<JSValue> = result.tables.iter().map(table_js).collect();
    let failures: Vec<JSValue> = result
        .failures
        .iter()
        .map(|f| json!({"table": f.id.to_string(), "error": f.error.to_string()}))
        .collect();
    let skipped: Vec<String> = result.skipped.iter().map(|id| id.to_string()).collect();
    json!({
        "config": {"projectName": project_name},
        "tables": tables,
        "failures": failures,
        "skipped": skipped
    })
}

/// Writes the rows of the tables sharing the banner of the first table.
pub fn write_flat_csv(path: &str, tables: &[Table]) -> BTabsResult<()> {
    let first = match tables.first() {
        Some(t) => t,
        None => {
            warn!("write_flat_csv: no table to write");
            return Ok(());
        }
    };
    let first_paths: Vec<&str> = first.banners.iter().map(|b| b.path.as_str()).collect();
    let layout = column_layout(first);
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    let header: Vec<String> = layout.iter().map(|c| column_name(first, c)).collect();
    wtr.write_record(&header).context(WritingCsvSnafu { path })?;

    let mut count = 0;
    for table in tables {
        let paths: Vec<&str> = table.banners.iter().map(|b| b.path.as_str()).collect();
        if paths != first_paths || table.max_diffs.len() != first.max_diffs.len() {
            warn!(
                "write_flat_csv: table {} has a different banner, left out of {}",
                table.id, path
            );
            continue;
        }
        for idx in 0..table.responses.len() {
            let record: Vec<String> = layout.iter().map(|c| cell_text(table, idx, c)).collect();
            wtr.write_record(&record).context(WritingCsvSnafu { path })?;
            count += 1;
        }
    }
    wtr.flush().context(WritingOutputSnafu { path })?;
    info!("write_flat_csv: {} rows written to {}", count, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosstab::builder::GridBuilder;

    fn wave_table(id: &str, favorable: &[&str]) -> SourceTable {
        let grid = GridBuilder::new()
            .row(&["Tracker"])
            .row(&["Q1 Awareness"])
            .row(&[format!("Table: {}", id).as_str()])
            .blank()
            .row(&["", "Wave"])
            .row(&["", "Dec", "Jan", "Feb"])
            .row(&["", "A", "B", "C"])
            .row(&["Base", "100", "100", "100"])
            .row(&["Aware", "30", "50", "40"])
            .row(&["", favorable[0], favorable[1], favorable[2]])
            .row(&["Cell Contents"])
            .build();
        SourceTable::new(id, grid, SourceLayout::Delimited)
    }

    fn options(batches: &str) -> TabulationOptions {
        TabulationOptions {
            stat_batches: Some(batches.to_string()),
            ..TabulationOptions::DEFAULT
        }
    }

    #[test]
    fn max_diff_columns_follow_their_group() {
        let t = parse_table(&wave_table("1", &["30.00%", "50.00%", "40.00%"]), &options("AB,BC"))
            .unwrap();
        let layout = column_layout(&t);
        let names: Vec<String> = layout.iter().map(|c| column_name(&t, c)).collect();
        assert_eq!(
            names,
            vec![
                "Table",
                "Question",
                "Stub",
                "Wave{Dec}",
                "Wave{Jan}",
                "Max Diff 1",
                "Wave{Feb}",
                "Max Diff 2",
                "TableLink"
            ]
        );
    }

    #[test]
    fn summary_rows() {
        let t = parse_table(&wave_table("1", &["30.00%", "50.00%", "40.00%"]), &options("ABC"))
            .unwrap();
        let js = table_js(&t);
        assert_eq!(js["table"], json!("1"));
        assert_eq!(js["numBases"], json!(1));
        assert_eq!(
            js["rows"][0],
            json!(["1", "Q1", "Aware", "30.00%", "50.00%", "40.00%", 0.2, "Table: 1"])
        );
    }

    #[test]
    fn summary_of_a_run() {
        let result = TabulationResult {
            tables: Vec::new(),
            failures: vec![TableFailure {
                id: TableId::from("9"),
                error: CrosstabError::NoSectionTransition { rows: 2 },
            }],
            skipped: vec![TableId::from("4")],
        };
        let js = build_summary_js("Tracker", &result);
        assert_eq!(js["config"]["projectName"], json!("Tracker"));
        assert_eq!(js["failures"][0]["table"], json!("9"));
        assert_eq!(
            js["failures"][0]["error"],
            json!("no banner or stub section found in 2 rows")
        );
        assert_eq!(js["skipped"], json!(["4"]));
    }

    #[test]
    fn flat_csv_keeps_matching_banners() {
        let a = parse_table(&wave_table("1", &["30.00%", "50.00%", "40.00%"]), &options("ABC"))
            .unwrap();
        let b = parse_table(&wave_table("2", &["10.00%", "20.00%", "-"]), &options("ABC"))
            .unwrap();
        let mut c = b.clone();
        c.banners[0].path = "Other".to_string();
        let path = std::env::temp_dir().join(format!("totaltabs_flat_{}.csv", std::process::id()));
        let p = path.display().to_string();
        write_flat_csv(&p, &[a, b, c]).unwrap();
        let contents = fs::read_to_string(&p).unwrap();
        let _ = fs::remove_file(&p);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Table,Question,Stub,Wave{Dec},Wave{Jan},Wave{Feb},Max Diff 1,TableLink"
        );
        assert_eq!(lines[1], "1,Q1,Aware,30.00%,50.00%,40.00%,0.2,Table: 1");
        assert_eq!(lines[2], "2,Q1,Aware,10.00%,20.00%,-,0.1,Table: 2");
    }
}
