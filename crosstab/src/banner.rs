//! Banner indexing and stat batches.

use std::collections::HashMap;

use log::debug;
use snafu::{ensure, OptionExt};

use crate::classifier::{ClassifiedLine, Section, Subtype, TypeCode};
use crate::config::*;
use crate::{
    CrosstabError, DuplicateLetterCodeSnafu, InvalidBatchTokenSnafu, UnknownLetterCodeSnafu,
};

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BannerIndex {
    pub depth: usize,
    pub points: Vec<BannerPoint>,
}

// A (variable, category) pair of banner rows, one entry per banner column.
struct RawLevel {
    variables: Vec<String>,
    categories: Vec<String>,
}

/// Carries the last non-blank cell forward, starting at the second column.
/// Trailing blank cells are dropped.
fn fill_forward(cells: &[String]) -> Vec<String> {
    let end = cells
        .iter()
        .rposition(|c| !c.trim().is_empty())
        .map(|p| p + 1)
        .unwrap_or(0);
    let mut res: Vec<String> = Vec::new();
    let mut last = String::new();
    for cell in cells.iter().take(end).skip(1) {
        if !cell.trim().is_empty() {
            last = cell.trim().to_string();
        }
        res.push(last.clone());
    }
    res
}

/// Extends the row by repeating its last element.
fn pad(row: &mut Vec<String>, width: usize) {
    let last = row.last().cloned().unwrap_or_default();
    while row.len() < width {
        row.push(last.clone());
    }
}

fn level_label(level: &BannerLevel) -> String {
    if level.variable.is_empty() {
        level.category.clone()
    } else {
        format!("{}{{{}}}", level.variable, level.category)
    }
}

/// Builds the banner points from the banner section.
///
/// Rows come in (variable, category) pairs. A trailing row without its pair
/// provides the categories directly. The stats row, if any, gives the letter
/// codes by position.
pub fn index_banner(lines: &[ClassifiedLine]) -> Result<BannerIndex, CrosstabError> {
    let mut stats: Option<&ClassifiedLine> = None;
    let mut levels: Vec<RawLevel> = Vec::new();
    let mut pending: Option<Vec<String>> = None;

    for line in lines
        .iter()
        .filter(|l| l.section == Section::Banner)
    {
        // The stats row has no letter in column B when Total is untested.
        if line.subtype == Subtype::Stats {
            stats = Some(line);
            continue;
        }
        if line.type_code == TypeCode::Blank {
            continue;
        }
        let filled = fill_forward(&line.cells);
        match pending.take() {
            None => pending = Some(filled),
            Some(variables) => levels.push(RawLevel {
                variables,
                categories: filled,
            }),
        }
    }
    if let Some(categories) = pending {
        levels.push(RawLevel {
            variables: Vec::new(),
            categories,
        });
    }

    let letters: Vec<String> = stats
        .map(|l| l.cells.iter().skip(1).map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();
    let num_letters = letters
        .iter()
        .rposition(|c| !c.is_empty())
        .map(|p| p + 1)
        .unwrap_or(0);

    let mut width = levels
        .iter()
        .map(|l| l.categories.len().max(l.variables.len()))
        .max()
        .unwrap_or(0)
        .max(num_letters);
    if levels.is_empty() {
        // No banner: one point per data column of the stubs.
        width = width.max(stub_width(lines));
    }

    for level in levels.iter_mut() {
        // A variable name row always spans all its columns.
        if !level.variables.is_empty() {
            pad(&mut level.variables, width);
        }
        pad(&mut level.categories, width);
    }

    let mut points: Vec<BannerPoint> = Vec::new();
    let mut seen_letters: HashMap<char, usize> = HashMap::new();
    for k in 0..width {
        let column_index = k + 1;
        let point_levels: Vec<BannerLevel> = levels
            .iter()
            .map(|l| BannerLevel {
                variable: l.variables.get(k).cloned().unwrap_or_default(),
                category: l.categories[k].clone(),
            })
            .collect();
        let name = match point_levels.last() {
            Some(l) => l.category.clone(),
            None => format!("Column {}", column_index),
        };
        let path = if point_levels.is_empty() {
            name.clone()
        } else {
            point_levels
                .iter()
                .map(level_label)
                .collect::<Vec<String>>()
                .join(" > ")
        };
        let letter_code = letters.get(k).and_then(|s| s.chars().next());
        if let (Some(c), Some(line)) = (letter_code, stats) {
            ensure!(
                seen_letters.insert(c, column_index).is_none(),
                DuplicateLetterCodeSnafu {
                    row: line.row_index,
                    letter: c
                }
            );
        }
        points.push(BannerPoint {
            name,
            path,
            levels: point_levels,
            letter_code,
            column_index,
        });
    }

    let depth = levels.len().max(1);
    debug!(
        "index_banner: depth {} points {:?}",
        depth,
        points.iter().map(|p| p.path.clone()).collect::<Vec<String>>()
    );
    Ok(BannerIndex { depth, points })
}

fn stub_width(lines: &[ClassifiedLine]) -> usize {
    lines
        .iter()
        .filter(|l| l.section == Section::Stubs)
        .filter_map(|l| l.cells.iter().rposition(|c| !c.trim().is_empty()))
        .max()
        .unwrap_or(0)
}

fn single_letter(token: &str) -> Result<char, CrosstabError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(c),
        _ => InvalidBatchTokenSnafu { token }.fail(),
    }
}

/// Splits a raw batch string into letter groups.
///
/// Batches are separated by commas. A batch is either a run of letters (`ABC`)
/// or letters separated by slashes (`A/B/C`).
pub fn parse_stat_batches(raw: &str) -> Result<Vec<Vec<char>>, CrosstabError> {
    let mut res: Vec<Vec<char>> = Vec::new();
    for batch in raw.split(',').map(|b| b.trim()).filter(|b| !b.is_empty()) {
        let letters: Vec<char> = if batch.contains('/') {
            batch
                .split('/')
                .map(|t| single_letter(t.trim()))
                .collect::<Result<Vec<char>, CrosstabError>>()?
        } else {
            batch
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| single_letter(&c.to_string()))
                .collect::<Result<Vec<char>, CrosstabError>>()?
        };
        res.push(letters);
    }
    Ok(res)
}

/// Finds the batch string in the `Statistics:` line of a grid, if any.
///
/// The batches are the text after the last colon. The last comma-separated
/// item is only kept for its words that contain a slash.
pub fn find_stat_batches(grid: &Grid) -> Option<String> {
    let cell = grid
        .rows()
        .iter()
        .flat_map(|r| r.iter())
        .find(|c| c.contains("Statistics:"))?;
    let tail = cell.rsplit(':').next()?;
    let items: Vec<&str> = tail.split(',').collect();
    let (last, firsts) = items.split_last()?;
    let mut batches: Vec<String> = firsts
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if last.contains('/') {
        batches.extend(
            last.split_whitespace()
                .filter(|w| w.contains('/'))
                .map(|w| w.to_string()),
        );
    }
    debug!("find_stat_batches: {:?} -> {:?}", cell, batches);
    if batches.is_empty() {
        None
    } else {
        Some(batches.join(","))
    }
}

/// Maps the letters of each batch to the banner points that carry them.
pub fn resolve_comparison_groups(
    batches: &[Vec<char>],
    points: &[BannerPoint],
) -> Result<Vec<ComparisonGroup>, CrosstabError> {
    let by_letter: HashMap<char, (usize, usize)> = points
        .iter()
        .enumerate()
        .filter_map(|(pos, p)| p.letter_code.map(|c| (c, (pos, p.column_index))))
        .collect();
    let mut groups: Vec<ComparisonGroup> = Vec::new();
    for batch in batches {
        let mut column_indexes: Vec<usize> = Vec::new();
        let mut banner_positions: Vec<usize> = Vec::new();
        for letter in batch {
            let (pos, col) = by_letter.get(letter).context(UnknownLetterCodeSnafu {
                letter: *letter,
                batch: batch.iter().collect::<String>(),
            })?;
            banner_positions.push(*pos);
            column_indexes.push(*col);
        }
        groups.push(ComparisonGroup {
            letter_codes: batch.clone(),
            column_indexes,
            banner_positions,
        });
    }
    Ok(groups)
}
