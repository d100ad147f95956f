// ********* Input data structures ***********

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::resolver::format_percent;

/// A raw crosstab grid: ordered rows of string cells, possibly empty.
///
/// The grid does not know where it comes from (a workbook sheet or a block of
/// delimited text). It is never modified after construction.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Grid {
        Grid { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[String]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Vec<&str>>> for Grid {
    fn from(rows: Vec<Vec<&str>>) -> Grid {
        Grid::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }
}

/// The identifier of a table: the sheet number for workbooks, the number
/// printed after `Table:` for text exports.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct TableId(pub String);

impl Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> TableId {
        TableId(s.to_string())
    }
}

/// How the rows of a single stub are laid out in the source.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceLayout {
    /// Workbook exports: the frequency row, then the percentage row, then the
    /// stat letter row, identified by position only.
    Workbook,
    /// Delimited text exports: each row is identified by its own content
    /// (percent sign, digits, letters).
    Delimited,
}

/// One table as handed over by a reader.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceTable {
    pub id: TableId,
    pub grid: Grid,
    pub layout: SourceLayout,
    /// Text of the entry pointing to this table in the index sheet, if any.
    pub link: Option<String>,
}

impl SourceTable {
    pub fn new(id: &str, grid: Grid, layout: SourceLayout) -> SourceTable {
        SourceTable {
            id: TableId::from(id),
            grid,
            layout,
            link: None,
        }
    }
}

// ******** Output data structures *********

/// One level of a banner hierarchy: the variable (e.g. `Gender`) and the
/// category under it (e.g. `Female`).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BannerLevel {
    pub variable: String,
    pub category: String,
}

/// A column segment of the crosstab.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BannerPoint {
    /// The category label of the deepest level. Not unique.
    pub name: String,
    /// `Var{Cat} > Var{Cat}` for all the levels.
    pub path: String,
    pub levels: Vec<BannerLevel>,
    /// The letter used in the stat annotations, if the column is tested.
    pub letter_code: Option<char>,
    /// Position of the column in the grid.
    pub column_index: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum BaseKind {
    None,
    Base,
    UnweightedBase,
    EffectiveBase,
}

/// A row label of the stub section: either a response category or one of the
/// base rows.
///
/// The links are grid row indexes of the closest base rows above the stub.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Stub {
    pub name: String,
    pub row_index: usize,
    pub base_kind: BaseKind,
    pub linked_base: Option<usize>,
    pub linked_unweighted_base: Option<usize>,
    pub linked_effective_base: Option<usize>,
    // Position in the classified lines
    pub(crate) line: usize,
}

impl Stub {
    pub fn is_base_row(&self) -> bool {
        self.base_kind != BaseKind::None
    }
}

/// A set of banner points tested against one another.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ComparisonGroup {
    pub letter_codes: Vec<char>,
    /// Grid column of each letter, in the same order.
    pub column_indexes: Vec<usize>,
    /// Position of each letter in the list of banner points, in the same order.
    pub banner_positions: Vec<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SuppressionMarker {
    /// `*`: the base is too small.
    SmallBase,
    /// `-`: zero or undefined.
    Undefined,
}

impl SuppressionMarker {
    pub fn from_cell(cell: &str) -> Option<SuppressionMarker> {
        match cell.trim() {
            "*" => Some(SuppressionMarker::SmallBase),
            "-" => Some(SuppressionMarker::Undefined),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressionMarker::SmallBase => "*",
            SuppressionMarker::Undefined => "-",
        }
    }
}

/// The value printed in a stub x banner cell.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ResolvedValue {
    Numeric { value: f64, is_percent: bool },
    Suppressed(SuppressionMarker),
    Missing,
}

impl ResolvedValue {
    /// The number to use in comparisons. Suppressed and missing values never
    /// count as zero.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            ResolvedValue::Numeric { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl Display for ResolvedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedValue::Numeric {
                value,
                is_percent: true,
            } => write!(f, "{}", format_percent(*value)),
            ResolvedValue::Numeric {
                value,
                is_percent: false,
            } => write!(f, "{}", value),
            ResolvedValue::Suppressed(m) => write!(f, "{}", m.as_str()),
            ResolvedValue::Missing => Ok(()),
        }
    }
}

/// A resolved value with the stat letters printed next to it, if any.
#[derive(PartialEq, Debug, Clone)]
pub struct ResolvedCell {
    pub value: ResolvedValue,
    pub annotation: Option<String>,
}

impl ResolvedCell {
    pub const MISSING: ResolvedCell = ResolvedCell {
        value: ResolvedValue::Missing,
        annotation: None,
    };
}

impl Display for ResolvedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.value, &self.annotation) {
            (ResolvedValue::Missing, _) => Ok(()),
            (v, Some(a)) => write!(f, "{} {}", v, a),
            (v, None) => write!(f, "{}", v),
        }
    }
}

/// The resolved cells of one response stub, in banner order.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseRow {
    /// Position of the stub in `Table::stubs`.
    pub stub: usize,
    pub cells: Vec<ResolvedCell>,
}

/// The `Max Diff N` column of one comparison group, one value per response row.
#[derive(PartialEq, Debug, Clone)]
pub struct DerivedColumn {
    pub name: String,
    /// Position of the group in `Table::comparison_groups`.
    pub group: usize,
    pub values: Vec<Option<f64>>,
}

/// Recoverable anomalies found while parsing a table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ParseWarning {
    /// A response stub with no `Base` row above it.
    MissingBase { row_index: usize, stub: String },
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::MissingBase { row_index, stub } => {
                write!(f, "row {}: stub {:?} has no base row above it", row_index, stub)
            }
        }
    }
}

/// A printed stat annotation that disagrees with the recomputed z test.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SignificanceMismatch {
    pub row_index: usize,
    pub column_index: usize,
    pub printed: String,
    pub expected: String,
}

/// One parsed crosstab.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub label: String,
    pub project_title: String,
    /// First word of the label, usually the question name.
    pub question: String,
    pub index_line: Option<String>,
    pub link: Option<String>,
    /// Frequency of the first `Base` row, as printed.
    pub first_base: Option<String>,
    pub banner_depth: usize,
    pub banners: Vec<BannerPoint>,
    /// All the stub rows, bases included, in grid order.
    pub stubs: Vec<Stub>,
    pub comparison_groups: Vec<ComparisonGroup>,
    /// The response stubs, bases and skipped labels excluded.
    pub responses: Vec<ResponseRow>,
    pub max_diffs: Vec<DerivedColumn>,
    pub warnings: Vec<ParseWarning>,
    pub significance: Vec<SignificanceMismatch>,
}

impl Table {
    pub fn response_stub(&self, row: &ResponseRow) -> &Stub {
        &self.stubs[row.stub]
    }

    /// Weighted `Base` rows only.
    pub fn num_bases(&self) -> usize {
        self.stubs
            .iter()
            .filter(|s| s.base_kind == BaseKind::Base)
            .count()
    }

    /// Response stubs, skipped labels included.
    pub fn num_stubs(&self) -> usize {
        self.stubs.iter().filter(|s| !s.is_base_row()).count()
    }
}

// ********* Configuration **********

/// Confidence levels accepted for the significance tests, with their
/// two-tailed z cutoffs.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ConfidenceLevel {
    P80,
    P85,
    P90,
    P95,
    P99,
}

impl ConfidenceLevel {
    pub fn from_level(level: f64) -> Option<ConfidenceLevel> {
        let all = [
            (0.80, ConfidenceLevel::P80),
            (0.85, ConfidenceLevel::P85),
            (0.90, ConfidenceLevel::P90),
            (0.95, ConfidenceLevel::P95),
            (0.99, ConfidenceLevel::P99),
        ];
        all.iter()
            .find(|(l, _)| (l - level).abs() < 1e-9)
            .map(|(_, c)| *c)
    }

    pub fn z_cutoff(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.282,
            ConfidenceLevel::P85 => 1.44,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.96,
            ConfidenceLevel::P99 => 2.57,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabulationOptions {
    /// The raw stat batches, e.g. `AB,CD` or `A/B/C,D/E`. When missing, the
    /// batches are looked up in the `Statistics:` line of the tables.
    pub stat_batches: Option<String>,
    pub confidence: ConfidenceLevel,
    pub recompute_significance: bool,
    /// Tables to leave out entirely.
    pub excluded_tables: BTreeSet<TableId>,
    /// Response stubs (e.g. `Mean`) indexed but left out of the output rows.
    pub skipped_stub_labels: Vec<String>,
}

impl TabulationOptions {
    pub const DEFAULT: TabulationOptions = TabulationOptions {
        stat_batches: None,
        confidence: ConfidenceLevel::P95,
        recompute_significance: false,
        excluded_tables: BTreeSet::new(),
        skipped_stub_labels: Vec::new(),
    };
}
