//! Stub indexing: links each response stub to the base rows above it.

use log::{debug, warn};

use crate::classifier::{ClassifiedLine, Section, TypeCode};
use crate::config::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StubIndex {
    pub stubs: Vec<Stub>,
    pub warnings: Vec<ParseWarning>,
    /// Frequency of the first `Base` row in the first data column.
    pub first_base: Option<String>,
}

impl StubIndex {
    /// Base rows of all kinds.
    pub fn num_base_rows(&self) -> usize {
        self.stubs.iter().filter(|s| s.is_base_row()).count()
    }

    pub fn num_response_stubs(&self) -> usize {
        self.stubs.len() - self.num_base_rows()
    }
}

/// The kind of base a stub label announces.
///
/// Only `Base` and `Base:` are weighted bases. Any label mentioning
/// `unweighted` or `effective` is the corresponding base.
pub fn base_kind_of(label: &str) -> BaseKind {
    let l = label.trim().to_lowercase();
    if l == "base" || l == "base:" {
        BaseKind::Base
    } else if l.contains("unweighted") {
        BaseKind::UnweightedBase
    } else if l.contains("effective") {
        BaseKind::EffectiveBase
    } else {
        BaseKind::None
    }
}

/// Indexes the stub section.
///
/// Every response stub gets the most recent base rows seen above it, even
/// across stub boundaries. A response stub without a `Base` row above it is
/// kept and reported as a warning.
pub fn index_stubs(lines: &[ClassifiedLine]) -> StubIndex {
    let mut current_base: Option<usize> = None;
    let mut current_unweighted: Option<usize> = None;
    let mut current_effective: Option<usize> = None;
    let mut first_base: Option<String> = None;
    let mut stubs: Vec<Stub> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();

    for (line_idx, line) in lines.iter().enumerate() {
        if line.section != Section::Stubs
            || !matches!(line.type_code, TypeCode::FirstOnly | TypeCode::Both)
        {
            continue;
        }
        let name = line.first_cell().trim().to_string();
        let base_kind = base_kind_of(&name);
        let mut stub = Stub {
            name,
            row_index: line.row_index,
            base_kind,
            linked_base: None,
            linked_unweighted_base: None,
            linked_effective_base: None,
            line: line_idx,
        };
        match base_kind {
            BaseKind::Base => {
                current_base = Some(line.row_index);
                if first_base.is_none() {
                    first_base = Some(line.cell(1).trim().to_string());
                }
            }
            BaseKind::UnweightedBase => current_unweighted = Some(line.row_index),
            BaseKind::EffectiveBase => current_effective = Some(line.row_index),
            BaseKind::None => {
                stub.linked_base = current_base;
                stub.linked_unweighted_base = current_unweighted;
                stub.linked_effective_base = current_effective;
                if current_base.is_none() {
                    let w = ParseWarning::MissingBase {
                        row_index: line.row_index,
                        stub: stub.name.clone(),
                    };
                    warn!("index_stubs: {}", w);
                    warnings.push(w);
                }
            }
        }
        debug!("index_stubs: {:?}", stub);
        stubs.push(stub);
    }

    StubIndex {
        stubs,
        warnings,
        first_base,
    }
}
