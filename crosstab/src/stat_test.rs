//! Column proportion tests, used to check the printed stat letters.

use log::{debug, warn};

use crate::config::*;

/// A column percentage and the (effective) base it was computed on.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Proportion {
    pub value: f64,
    pub effective_base: f64,
}

/// Square of the z statistic of the pooled two-proportion test.
///
/// Returns `None` when a base is empty or the pooled variance vanishes.
pub fn z_score_squared(a: &Proportion, b: &Proportion) -> Option<f64> {
    let (n1, n2) = (a.effective_base, b.effective_base);
    if n1 <= 0.0 || n2 <= 0.0 {
        return None;
    }
    let pooled = (a.value * n1 + b.value * n2) / (n1 + n2);
    let variance = pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2);
    if variance.is_nan() || variance <= 0.0 {
        return None;
    }
    let diff = a.value - b.value;
    Some(diff * diff / variance)
}

pub fn is_significant(a: &Proportion, b: &Proportion, confidence: ConfidenceLevel) -> bool {
    let cutoff = confidence.z_cutoff();
    z_score_squared(a, b)
        .map(|z2| z2 > cutoff * cutoff)
        .unwrap_or(false)
}

fn proportion(cell: &ResolvedCell, base: Option<f64>) -> Option<Proportion> {
    match (cell.value, base) {
        (
            ResolvedValue::Numeric {
                value,
                is_percent: true,
            },
            Some(effective_base),
        ) => Some(Proportion {
            value,
            effective_base,
        }),
        _ => None,
    }
}

/// The letters of the group members significantly lower than `member`.
pub fn expected_letters(
    cells: &[ResolvedCell],
    bases: &[Option<f64>],
    group: &ComparisonGroup,
    member: usize,
    confidence: ConfidenceLevel,
) -> String {
    let pos = group.banner_positions[member];
    let this = match cells
        .get(pos)
        .and_then(|c| proportion(c, bases.get(pos).copied().flatten()))
    {
        Some(p) => p,
        None => return String::new(),
    };
    let mut res = String::new();
    for (other, letter) in group.banner_positions.iter().zip(group.letter_codes.iter()) {
        if *other == pos {
            continue;
        }
        let that = cells
            .get(*other)
            .and_then(|c| proportion(c, bases.get(*other).copied().flatten()));
        if let Some(that) = that {
            if this.value > that.value && is_significant(&this, &that, confidence) {
                res.push(*letter);
            }
        }
    }
    res
}

/// Compares the printed stat letters of a response row with the recomputed
/// ones, group by group. Only the letters of the group are considered.
pub fn check_annotations(
    row_index: usize,
    cells: &[ResolvedCell],
    bases: &[Option<f64>],
    groups: &[ComparisonGroup],
    banners: &[BannerPoint],
    confidence: ConfidenceLevel,
) -> Vec<SignificanceMismatch> {
    let mut res: Vec<SignificanceMismatch> = Vec::new();
    for group in groups {
        for (member, pos) in group.banner_positions.iter().enumerate() {
            let annotation = cells
                .get(*pos)
                .and_then(|c| c.annotation.clone())
                .unwrap_or_default();
            let printed: String = group
                .letter_codes
                .iter()
                .filter(|l| annotation.contains(**l))
                .collect();
            let expected = expected_letters(cells, bases, group, member, confidence);
            debug!(
                "check_annotations: row {} column {} printed {:?} expected {:?}",
                row_index, banners[*pos].column_index, printed, expected
            );
            if printed != expected {
                let m = SignificanceMismatch {
                    row_index,
                    column_index: banners[*pos].column_index,
                    printed,
                    expected,
                };
                warn!("check_annotations: mismatch {:?}", m);
                res.push(m);
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(value: f64, annotation: Option<&str>) -> ResolvedCell {
        ResolvedCell {
            value: ResolvedValue::Numeric {
                value,
                is_percent: true,
            },
            annotation: annotation.map(|s| s.to_string()),
        }
    }

    fn banners(n: usize) -> Vec<BannerPoint> {
        (0..n)
            .map(|k| BannerPoint {
                name: format!("P{}", k),
                path: format!("P{}", k),
                levels: vec![],
                letter_code: Some((b'A' + k as u8) as char),
                column_index: k + 1,
            })
            .collect()
    }

    fn group_abc() -> ComparisonGroup {
        ComparisonGroup {
            letter_codes: vec!['A', 'B', 'C'],
            column_indexes: vec![1, 2, 3],
            banner_positions: vec![0, 1, 2],
        }
    }

    #[test]
    fn cutoffs() {
        assert_eq!(ConfidenceLevel::from_level(0.95), Some(ConfidenceLevel::P95));
        assert_eq!(ConfidenceLevel::from_level(0.99).unwrap().z_cutoff(), 2.57);
        assert_eq!(ConfidenceLevel::from_level(0.80).unwrap().z_cutoff(), 1.282);
        assert_eq!(ConfidenceLevel::from_level(0.97), None);
    }

    #[test]
    fn z_test() {
        let a = Proportion {
            value: 0.5,
            effective_base: 100.0,
        };
        let b = Proportion {
            value: 0.3,
            effective_base: 100.0,
        };
        // pooled 0.4, variance 0.24 * 0.02
        let z2 = z_score_squared(&a, &b).unwrap();
        assert!((z2 - 0.04 / 0.0048).abs() < 1e-9);
        assert!(is_significant(&a, &b, ConfidenceLevel::P95));
        assert!(is_significant(&a, &b, ConfidenceLevel::P99));
        let c = Proportion {
            value: 0.4,
            effective_base: 200.0,
        };
        assert!(!is_significant(&a, &c, ConfidenceLevel::P95));
        assert!(is_significant(&a, &c, ConfidenceLevel::P80));
        let empty = Proportion {
            value: 0.4,
            effective_base: 0.0,
        };
        assert_eq!(z_score_squared(&a, &empty), None);
        let all = Proportion {
            value: 1.0,
            effective_base: 10.0,
        };
        assert_eq!(z_score_squared(&all, &all), None);
    }

    #[test]
    fn matching_letters() {
        let cells = vec![pct(0.4, None), pct(0.5, Some("C")), pct(0.3, None)];
        let bases = vec![Some(200.0), Some(100.0), Some(100.0)];
        let res = check_annotations(
            8,
            &cells,
            &bases,
            &[group_abc()],
            &banners(3),
            ConfidenceLevel::P95,
        );
        assert!(res.is_empty(), "{:?}", res);
    }

    #[test]
    fn letters_against_suppressed_cells() {
        let cells = vec![
            pct(0.6, Some("B")),
            ResolvedCell {
                value: ResolvedValue::Suppressed(SuppressionMarker::SmallBase),
                annotation: None,
            },
            pct(0.55, None),
        ];
        let bases = vec![Some(200.0), Some(5.0), Some(100.0)];
        let res = check_annotations(
            11,
            &cells,
            &bases,
            &[group_abc()],
            &banners(3),
            ConfidenceLevel::P95,
        );
        assert_eq!(
            res,
            vec![SignificanceMismatch {
                row_index: 11,
                column_index: 1,
                printed: "B".to_string(),
                expected: "".to_string(),
            }]
        );
    }

    #[test]
    fn letters_of_other_groups_are_ignored() {
        let cells = vec![pct(0.4, Some("DE")), pct(0.4, None)];
        let group = ComparisonGroup {
            letter_codes: vec!['A', 'B'],
            column_indexes: vec![1, 2],
            banner_positions: vec![0, 1],
        };
        let res = check_annotations(
            3,
            &cells,
            &[Some(50.0), Some(50.0)],
            &[group],
            &banners(2),
            ConfidenceLevel::P90,
        );
        assert!(res.is_empty());
    }
}
