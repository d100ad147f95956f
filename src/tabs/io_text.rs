// Reading the tables of a delimited text export.

use std::borrow::Cow;

use crosstab::classifier::table_number;

use crate::tabs::io_common::split_tables;
use crate::tabs::*;

pub fn read_text_tables(path: &str, cfs: &TabSource) -> BTabsResult<Vec<SourceTable>> {
    let bytes = fs::read(path).context(OpeningTextSnafu { path })?;
    let text = decode(&bytes);
    let records = read_records(&text, cfs.field_delimiter()?, path)?;
    debug!("read_text_tables: {}: {} records", path, records.len());
    Ok(tables_from_records(records, &cfs.table_delimiter()))
}

/// Text exports are UTF-16 with a byte order mark, or UTF-8.
fn decode(bytes: &[u8]) -> Cow<str> {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        warn!("decode: invalid {} sequences replaced", encoding.name());
    }
    text
}

fn read_records(text: &str, delimiter: u8, path: &str) -> BTabsResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        let record = record_r.context(CsvLineParseSnafu {
            path,
            lineno: idx + 1,
        })?;
        res.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(res)
}

fn tables_from_records(records: Vec<Vec<String>>, table_delimiter: &str) -> Vec<SourceTable> {
    split_tables(records, table_delimiter)
        .into_iter()
        .enumerate()
        .map(|(idx, rows)| {
            let id = rows
                .iter()
                .filter_map(|r| r.first())
                .find(|c| c.contains("Table:"))
                .and_then(|c| table_number(c))
                .unwrap_or_else(|| (idx + 1).to_string());
            debug!("tables_from_records: table {}: {} rows", id, rows.len());
            SourceTable::new(&id, Grid::new(rows), SourceLayout::Delimited)
        })
        .collect()
}
