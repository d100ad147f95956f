mod config;
use log::{debug, info, warn};

use snafu::Snafu;

pub use crate::config::*;

pub mod banner;
pub mod builder;
pub mod classifier;
pub mod diff;
pub mod manual;
pub mod resolver;
pub mod stat_test;
pub mod stubs;

#[cfg(test)]
pub(crate) mod testdata;

use crate::banner::{find_stat_batches, index_banner, parse_stat_batches, resolve_comparison_groups};
use crate::classifier::{classify_grid, read_header};
use crate::diff::compute_max_diffs;
use crate::resolver::CellValueResolver;
use crate::stat_test::check_annotations;
use crate::stubs::index_stubs;

/// Errors that stop the parsing of a table.
#[derive(Debug, Snafu, Clone, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum CrosstabError {
    #[snafu(display("no banner or stub section found in {} rows", rows))]
    NoSectionTransition { rows: usize },
    #[snafu(display("row {}, column {}: cannot read cell {:?}", row, column, content))]
    MalformedCell {
        row: usize,
        column: usize,
        content: String,
    },
    #[snafu(display("row {}: stat letter {} used by two banner points", row, letter))]
    DuplicateLetterCode { row: usize, letter: char },
    #[snafu(display("stat letter {} of batch {:?} matches no banner point", letter, batch))]
    UnknownLetterCode { letter: char, batch: String },
    #[snafu(display("invalid stat batch token {:?}", token))]
    InvalidBatchToken { token: String },
    #[snafu(display("comparison column {} is out of range (row width {})", column, width))]
    ColumnOutOfRange { column: usize, width: usize },
}

impl CrosstabError {
    /// Configuration errors come from the caller and apply to all the tables.
    /// The other errors only concern the table being parsed.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CrosstabError::UnknownLetterCode { .. }
                | CrosstabError::InvalidBatchToken { .. }
                | CrosstabError::ColumnOutOfRange { .. }
        )
    }
}

/// A table that could not be parsed.
#[derive(PartialEq, Debug, Clone)]
pub struct TableFailure {
    pub id: TableId,
    pub error: CrosstabError,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TabulationResult {
    pub tables: Vec<Table>,
    pub failures: Vec<TableFailure>,
    /// Excluded tables, in input order.
    pub skipped: Vec<TableId>,
}

/// Parses a single table.
///
/// The stat batches are taken from the options, or else from the
/// `Statistics:` line of the table itself.
pub fn parse_table(source: &SourceTable, options: &TabulationOptions) -> Result<Table, CrosstabError> {
    let raw = options
        .stat_batches
        .clone()
        .or_else(|| find_stat_batches(&source.grid));
    let batches = match raw {
        Some(r) => parse_stat_batches(&r)?,
        None => Vec::new(),
    };
    parse_with_batches(source, &batches, options)
}

fn parse_with_batches(
    source: &SourceTable,
    batches: &[Vec<char>],
    options: &TabulationOptions,
) -> Result<Table, CrosstabError> {
    info!("parse_table: table {} ({} rows)", source.id, source.grid.len());
    let lines = classify_grid(&source.grid)?;
    let header = read_header(&lines);
    let banner = index_banner(&lines)?;
    let index = index_stubs(&lines);

    let comparison_groups = if banner.points.iter().all(|p| p.letter_code.is_none()) {
        if !batches.is_empty() {
            warn!(
                "parse_table: table {} has no stat letters, no Max Diff computed",
                source.id
            );
        }
        Vec::new()
    } else {
        resolve_comparison_groups(batches, &banner.points)?
    };

    let resolver = CellValueResolver::new(&lines, source.layout);
    let mut responses: Vec<ResponseRow> = Vec::new();
    let mut significance: Vec<SignificanceMismatch> = Vec::new();
    for (pos, stub) in index.stubs.iter().enumerate() {
        if stub.is_base_row() || options.skipped_stub_labels.contains(&stub.name) {
            continue;
        }
        let cells = resolver.resolve_stub(stub, &banner.points)?;
        if options.recompute_significance {
            let bases =
                resolver.base_values(stub.linked_effective_base.or(stub.linked_base), &banner.points);
            significance.extend(check_annotations(
                stub.row_index,
                &cells,
                &bases,
                &comparison_groups,
                &banner.points,
                options.confidence,
            ));
        }
        responses.push(ResponseRow { stub: pos, cells });
    }
    let max_diffs = compute_max_diffs(&responses, &comparison_groups)?;
    debug!(
        "parse_table: table {}: {} responses, {} groups",
        source.id,
        responses.len(),
        comparison_groups.len()
    );

    let link = source.link.clone().or_else(|| header.index_line.clone());
    Ok(Table {
        id: source.id.clone(),
        label: header.label,
        project_title: header.project_title,
        question: header.question,
        index_line: header.index_line,
        link,
        first_base: index.first_base,
        banner_depth: banner.depth,
        banners: banner.points,
        stubs: index.stubs,
        comparison_groups,
        responses,
        max_diffs,
        warnings: index.warnings,
        significance,
    })
}

/// Parses all the tables of a run.
///
/// Excluded tables are skipped. A malformed table is recorded as a failure
/// and the run continues. A configuration error stops the run.
pub fn run_tabulation(
    sources: &[SourceTable],
    options: &TabulationOptions,
) -> Result<TabulationResult, CrosstabError> {
    let raw = options
        .stat_batches
        .clone()
        .or_else(|| sources.iter().find_map(|s| find_stat_batches(&s.grid)));
    info!("run_tabulation: {} tables, stat batches {:?}", sources.len(), raw);
    let batches = match raw {
        Some(r) => parse_stat_batches(&r)?,
        None => Vec::new(),
    };

    let mut tables: Vec<Table> = Vec::new();
    let mut failures: Vec<TableFailure> = Vec::new();
    let mut skipped: Vec<TableId> = Vec::new();
    for source in sources {
        if options.excluded_tables.contains(&source.id) {
            debug!("run_tabulation: skipping excluded table {}", source.id);
            skipped.push(source.id.clone());
            continue;
        }
        match parse_with_batches(source, &batches, options) {
            Ok(table) => tables.push(table),
            Err(e) if e.is_configuration_error() => return Err(e),
            Err(e) => {
                warn!("run_tabulation: table {} could not be parsed: {}", source.id, e);
                failures.push(TableFailure {
                    id: source.id.clone(),
                    error: e,
                });
            }
        }
    }
    Ok(TabulationResult {
        tables,
        failures,
        skipped,
    })
}
