//! Cell value resolution.
//!
//! A logical stub spans up to three rows: the frequencies, the percentages and
//! the stat letters. Workbook exports always print them in this order right
//! under the stub label. Text exports are recognised by the content of each
//! row instead, and the percentages may be on the label row itself.

use std::collections::HashMap;

use log::debug;

use crate::classifier::{ClassifiedLine, Section, StubElem};
use crate::config::*;
use crate::{CrosstabError, MalformedCellSnafu};

/// Parses a plain number. Thousands separators are accepted.
pub fn parse_number(cell: &str) -> Option<f64> {
    let s: String = cell.trim().chars().filter(|c| *c != ',').collect();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses `41.83%` as `0.4183`. Cells without a percent sign are already
/// fractions.
pub fn parse_percent(cell: &str) -> Option<f64> {
    match cell.trim().strip_suffix('%') {
        Some(num) => parse_number(num).map(|v| v / 100.0),
        None => parse_number(cell),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// The stat letters of a cell, if it holds any.
fn annotation_of(cell: &str) -> Option<String> {
    let s = cell.trim();
    if s.is_empty()
        || s.eq_ignore_ascii_case("nan")
        || s.chars().all(|c| c.is_ascii_digit())
        || SuppressionMarker::from_cell(s).is_some()
    {
        None
    } else {
        Some(s.to_string())
    }
}

pub struct CellValueResolver<'a> {
    lines: &'a [ClassifiedLine],
    layout: SourceLayout,
    line_by_row: HashMap<usize, usize>,
}

impl<'a> CellValueResolver<'a> {
    pub fn new(lines: &'a [ClassifiedLine], layout: SourceLayout) -> CellValueResolver<'a> {
        let line_by_row = lines
            .iter()
            .enumerate()
            .map(|(idx, l)| (l.row_index, idx))
            .collect();
        CellValueResolver {
            lines,
            layout,
            line_by_row,
        }
    }

    fn line_of_row(&self, row_index: usize) -> Option<&'a ClassifiedLine> {
        self.line_by_row.get(&row_index).map(|idx| &self.lines[*idx])
    }

    // The rows under the stub label, up to the next label.
    fn block(&self, stub: &Stub) -> &'a [ClassifiedLine] {
        let start = (stub.line + 1).min(self.lines.len());
        let rest = &self.lines[start..];
        let len = rest
            .iter()
            .take_while(|l| l.section == Section::Stubs && !l.has_first_cell())
            .count();
        &rest[..len]
    }

    /// The percentage and stat letter rows of a stub.
    fn triad(&self, stub: &Stub) -> (Option<&'a ClassifiedLine>, Option<&'a ClassifiedLine>) {
        let own = &self.lines[stub.line];
        let block = self.block(stub);
        let find = |elem: StubElem| block.iter().find(|l| l.stub_elem == Some(elem));
        match self.layout {
            SourceLayout::Workbook => {
                let pct = block
                    .first()
                    .filter(|l| l.stub_elem != Some(StubElem::Blank));
                (pct, block.get(1))
            }
            SourceLayout::Delimited if own.stub_elem == Some(StubElem::Percent) => {
                (Some(own), find(StubElem::Stat))
            }
            SourceLayout::Delimited => (find(StubElem::Percent), find(StubElem::Stat)),
        }
    }

    /// Resolves the cells of a response stub, one per banner point.
    pub fn resolve_stub(
        &self,
        stub: &Stub,
        banners: &[BannerPoint],
    ) -> Result<Vec<ResolvedCell>, CrosstabError> {
        let (pct, stat) = self.triad(stub);
        debug!(
            "resolve_stub: {:?} pct row {:?} stat row {:?}",
            stub.name,
            pct.map(|l| l.row_index),
            stat.map(|l| l.row_index)
        );
        let mut res: Vec<ResolvedCell> = Vec::new();
        for banner in banners {
            let cell = match pct {
                Some(line) => resolve_percent(line, stat, banner.column_index)?,
                None => self.normalise(stub, banner.column_index)?,
            };
            res.push(cell);
        }
        Ok(res)
    }

    // Percentages computed from the frequencies and the linked base.
    fn normalise(&self, stub: &Stub, column: usize) -> Result<ResolvedCell, CrosstabError> {
        let line = &self.lines[stub.line];
        let value = match frequency(line, column)? {
            ResolvedValue::Numeric { value, .. } => {
                match stub.linked_base.and_then(|r| self.line_of_row(r)) {
                    None => ResolvedValue::Numeric {
                        value,
                        is_percent: false,
                    },
                    Some(base) => match parse_number(base.cell(column)) {
                        Some(b) if b > 0.0 => ResolvedValue::Numeric {
                            value: value / b,
                            is_percent: true,
                        },
                        _ => ResolvedValue::Suppressed(SuppressionMarker::Undefined),
                    },
                }
            }
            other => other,
        };
        Ok(ResolvedCell {
            value,
            annotation: None,
        })
    }

    /// The numbers printed in a base row, one per banner point.
    pub fn base_values(&self, row_index: Option<usize>, banners: &[BannerPoint]) -> Vec<Option<f64>> {
        let line = row_index.and_then(|r| self.line_of_row(r));
        banners
            .iter()
            .map(|b| line.and_then(|l| parse_number(l.cell(b.column_index))))
            .collect()
    }
}

fn frequency(line: &ClassifiedLine, column: usize) -> Result<ResolvedValue, CrosstabError> {
    let raw = line.cell(column).trim();
    if raw.is_empty() {
        return Ok(ResolvedValue::Missing);
    }
    if let Some(m) = SuppressionMarker::from_cell(raw) {
        return Ok(ResolvedValue::Suppressed(m));
    }
    match parse_number(raw) {
        Some(value) => Ok(ResolvedValue::Numeric {
            value,
            is_percent: false,
        }),
        None => MalformedCellSnafu {
            row: line.row_index,
            column,
            content: raw,
        }
        .fail(),
    }
}

fn resolve_percent(
    pct: &ClassifiedLine,
    stat: Option<&ClassifiedLine>,
    column: usize,
) -> Result<ResolvedCell, CrosstabError> {
    let raw = pct.cell(column).trim();
    if raw.is_empty() {
        return Ok(ResolvedCell::MISSING);
    }
    let annotation = stat.and_then(|l| annotation_of(l.cell(column)));
    let value = if let Some(m) = SuppressionMarker::from_cell(raw) {
        ResolvedValue::Suppressed(m)
    } else if let Some(value) = parse_percent(raw) {
        ResolvedValue::Numeric {
            value,
            is_percent: true,
        }
    } else {
        return MalformedCellSnafu {
            row: pct.row_index,
            column,
            content: raw,
        }
        .fail();
    };
    Ok(ResolvedCell { value, annotation })
}
