//! Line classification of raw grids.
//!
//! The exported grids have no schema. The structure is inferred line by line
//! from which of the first two cells are populated: each row gets a type code,
//! a section (header, banner, stubs, footer), a subtype and, in the stub
//! section, the kind of element it carries.

use log::debug;

use crate::config::Grid;
use crate::{CrosstabError, NoSectionTransitionSnafu};

/// Presence of content in the first two cells: `00`, `01`, `10` or `11`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TypeCode {
    Blank,
    SecondOnly,
    FirstOnly,
    Both,
}

impl TypeCode {
    pub fn from_cells(cells: &[String]) -> TypeCode {
        let col_a = cells.first().map(|c| !c.trim().is_empty()).unwrap_or(false);
        let col_b = cells.get(1).map(|c| !c.trim().is_empty()).unwrap_or(false);
        match (col_a, col_b) {
            (false, false) => TypeCode::Blank,
            (false, true) => TypeCode::SecondOnly,
            (true, false) => TypeCode::FirstOnly,
            (true, true) => TypeCode::Both,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Blank => "00",
            TypeCode::SecondOnly => "01",
            TypeCode::FirstOnly => "10",
            TypeCode::Both => "11",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Section {
    Header,
    Banner,
    Stubs,
    Footer,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Subtype {
    // Header
    Index,
    Label,
    Blank,
    // Banner
    Stats,
    Labels,
    // Stubs
    Base,
    Stub,
    // Footer
    Note,
}

/// What a row of the stub section carries.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum StubElem {
    Frequency,
    Percent,
    Stat,
    Blank,
    Label,
    /// Only suppression markers: impossible to tell frequencies from percents.
    Unknown,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClassifiedLine {
    /// Index of the row in the source grid.
    pub row_index: usize,
    pub cells: Vec<String>,
    pub type_code: TypeCode,
    pub section: Section,
    pub subtype: Subtype,
    pub stub_elem: Option<StubElem>,
}

impl ClassifiedLine {
    pub fn first_cell(&self) -> &str {
        self.cell(0)
    }

    /// The cell at the given column, or an empty string past the end of the row.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn has_first_cell(&self) -> bool {
        !self.first_cell().trim().is_empty()
    }
}

/// Removes the markup left by the exporters.
pub fn clean_cell(cell: &str) -> String {
    let mut res = if let Some(stripped) = cell.strip_suffix("<BR/>") {
        stripped.to_string()
    } else {
        cell.replace("<BR/>", " - ")
    };
    if res.contains("&amp;") {
        res = res.replace("&amp;", "&");
    }
    res
}

fn next_section(section: Section, type_code: TypeCode, cells: &[String]) -> Section {
    match (section, type_code) {
        (Section::Header, TypeCode::SecondOnly) => Section::Banner,
        // No banner at all
        (Section::Header, TypeCode::Both) => Section::Stubs,
        (Section::Banner, TypeCode::FirstOnly | TypeCode::Both) => Section::Stubs,
        (Section::Stubs, TypeCode::FirstOnly)
            if cells
                .first()
                .map(|c| c.starts_with("Cell Contents"))
                .unwrap_or(false) =>
        {
            Section::Footer
        }
        (s, _) => s,
    }
}

fn is_stats_line(cells: &[String]) -> bool {
    let lens: Vec<usize> = cells.iter().map(|c| c.trim().chars().count()).collect();
    lens.iter().any(|l| *l == 1) && lens.iter().all(|l| *l <= 1)
}

fn is_base_label(label: &str) -> bool {
    matches!(
        label.trim().to_lowercase().as_str(),
        "base" | "base:" | "unweighted base" | "effective base"
    )
}

fn stub_elem(type_code: TypeCode, cells: &[String]) -> StubElem {
    let tail: String = cells.iter().skip(1).map(|c| c.as_str()).collect();
    if tail.contains('%') {
        StubElem::Percent
    } else if tail.chars().any(|c| c.is_ascii_digit()) {
        StubElem::Frequency
    } else {
        match type_code {
            TypeCode::SecondOnly => StubElem::Stat,
            // Letters past the second column
            TypeCode::Blank if cells.iter().any(|c| !c.trim().is_empty()) => StubElem::Stat,
            TypeCode::Blank => StubElem::Blank,
            TypeCode::FirstOnly => StubElem::Label,
            TypeCode::Both => StubElem::Unknown,
        }
    }
}

/// Classifies all the rows of a grid.
///
/// Runs of blank lines in the stub section are collapsed to a single line.
/// Fails if the grid never leaves the header.
pub fn classify_grid(grid: &Grid) -> Result<Vec<ClassifiedLine>, CrosstabError> {
    let mut lines: Vec<ClassifiedLine> = Vec::new();
    let mut section = Section::Header;
    // Rows that do not define their own subtype keep the previous one.
    let mut subtype = Subtype::Blank;
    for (row_index, row) in grid.rows().iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
        let type_code = TypeCode::from_cells(&cells);
        section = next_section(section, type_code, &cells);

        subtype = match section {
            Section::Header => match type_code {
                TypeCode::FirstOnly if cells[0].contains("Table:") => Subtype::Index,
                TypeCode::FirstOnly => Subtype::Label,
                _ => Subtype::Blank,
            },
            Section::Banner if is_stats_line(&cells) => Subtype::Stats,
            // Rows with a first cell have already moved to the stubs.
            Section::Banner if type_code == TypeCode::SecondOnly => Subtype::Labels,
            Section::Banner => Subtype::Blank,
            Section::Stubs => match type_code {
                TypeCode::FirstOnly | TypeCode::Both if is_base_label(&cells[0]) => Subtype::Base,
                TypeCode::FirstOnly | TypeCode::Both => Subtype::Stub,
                _ => subtype,
            },
            Section::Footer => Subtype::Note,
        };

        let elem = if section == Section::Stubs {
            Some(stub_elem(type_code, &cells))
        } else {
            None
        };

        if elem == Some(StubElem::Blank)
            && lines.last().and_then(|l| l.stub_elem) == Some(StubElem::Blank)
        {
            continue;
        }

        debug!(
            "classify_grid: row {} {:?} {} {:?} {:?} {:?}",
            row_index,
            section,
            type_code.as_str(),
            subtype,
            elem,
            cells
        );
        lines.push(ClassifiedLine {
            row_index,
            cells,
            type_code,
            section,
            subtype,
            stub_elem: elem,
        });
    }

    if section == Section::Header {
        return NoSectionTransitionSnafu { rows: grid.len() }.fail();
    }
    Ok(lines)
}

/// Titles found in the header section.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableHeader {
    pub label: String,
    pub project_title: String,
    pub question: String,
    pub index_line: Option<String>,
}

pub fn read_header(lines: &[ClassifiedLine]) -> TableHeader {
    let header = lines.iter().filter(|l| l.section == Section::Header);
    let titles: Vec<String> = header
        .clone()
        .filter(|l| l.subtype == Subtype::Label)
        .map(|l| l.first_cell().trim().to_string())
        .collect();
    let index_line = header
        .clone()
        .find(|l| l.subtype == Subtype::Index)
        .map(|l| l.first_cell().trim().to_string());

    let (project_title, label) = match titles.as_slice() {
        [] => (String::new(), "MISSING LABEL".to_string()),
        [label] => (String::new(), label.clone()),
        [project, label, ..] => (project.clone(), label.clone()),
    };
    let question = label.split_whitespace().next().unwrap_or("").to_string();
    TableHeader {
        label,
        project_title,
        question,
        index_line,
    }
}

/// The number following `Table:` in an index line, e.g. `3` in
/// `Table: 3 - Weighted by: Weight`.
pub fn table_number(index_line: &str) -> Option<String> {
    let (_, rest) = index_line.split_once("Table:")?;
    let num: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if num.is_empty() {
        None
    } else {
        Some(num)
    }
}
