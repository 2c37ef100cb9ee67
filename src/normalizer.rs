use std::collections::BTreeMap;

use crate::fieldmap::{CanonicalField, FieldMap};
use crate::money;

/// Error code recorded on rows that fail normalization. Row-level failures
/// never abort the batch; the row is stored invalid and ingestion continues.
pub const ROW_PARSE_ERROR: &str = "ROW_PARSE_ERROR";

/// A row either yields a parsed charge or a row-scoped failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Valid {
        amount_cents: i64,
        order_ref: Option<String>,
        tracking_ref: Option<String>,
    },
    Invalid {
        code: &'static str,
        detail: String,
    },
}

/// One normalized row, before storage. Carries the verbatim source row so an
/// auditor can always trace a line item back to what the vendor sent.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// 1-based file position; the header row is 1, so data starts at 2.
    pub row_number: i64,
    pub fee_type_raw: String,
    pub amount_raw: String,
    pub outcome: RowOutcome,
    pub raw_row: BTreeMap<String, String>,
}

impl NormalizedRow {
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, RowOutcome::Valid { .. })
    }
}

/// Normalize one raw CSV row against a resolved field map.
pub fn normalize_row(
    raw_row: &[(String, String)],
    map: &FieldMap,
    row_number: i64,
) -> NormalizedRow {
    let lookup = |field: CanonicalField| -> Option<&str> {
        let header = map.get(field)?;
        raw_row
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    };

    let fee_type_raw = lookup(CanonicalField::FeeType).unwrap_or("").trim().to_string();
    let amount_raw = lookup(CanonicalField::Amount).unwrap_or("").trim().to_string();

    let outcome = if fee_type_raw.is_empty() {
        RowOutcome::Invalid {
            code: ROW_PARSE_ERROR,
            detail: "fee type is empty".to_string(),
        }
    } else if amount_raw.is_empty() {
        RowOutcome::Invalid {
            code: ROW_PARSE_ERROR,
            detail: "amount is empty".to_string(),
        }
    } else {
        match money::parse_amount(&amount_raw) {
            Ok(amount_cents) => RowOutcome::Valid {
                amount_cents,
                order_ref: optional_ref(lookup(CanonicalField::OrderRef)),
                tracking_ref: optional_ref(lookup(CanonicalField::TrackingRef)),
            },
            Err(e) => RowOutcome::Invalid {
                code: ROW_PARSE_ERROR,
                detail: e.to_string(),
            },
        }
    };

    NormalizedRow {
        row_number,
        fee_type_raw,
        amount_raw,
        outcome,
        raw_row: raw_row.iter().cloned().collect(),
    }
}

/// Blank references are stored as absent, never as an empty string.
fn optional_ref(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldmap;

    fn test_map() -> FieldMap {
        FieldMap {
            fee_type_raw: Some("fee".to_string()),
            amount: Some("cost".to_string()),
            order_ref: Some("order".to_string()),
            tracking_ref: Some("track".to_string()),
        }
    }

    fn row(fields: &[(&str, &str)]) -> Vec<(String, String)> {
        fields
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_valid_row() {
        let raw = row(&[("fee", " Fuel Surcharge "), ("cost", "$10.00"), ("order", "O-1"), ("track", "T-1")]);
        let item = normalize_row(&raw, &test_map(), 2);
        assert!(item.is_valid());
        assert_eq!(item.fee_type_raw, "Fuel Surcharge");
        assert_eq!(item.amount_raw, "$10.00");
        assert_eq!(
            item.outcome,
            RowOutcome::Valid {
                amount_cents: 1000,
                order_ref: Some("O-1".to_string()),
                tracking_ref: Some("T-1".to_string()),
            }
        );
    }

    #[test]
    fn test_blank_references_stored_as_absent() {
        let raw = row(&[("fee", "Storage"), ("cost", "5.00"), ("order", "  "), ("track", "")]);
        let item = normalize_row(&raw, &test_map(), 2);
        match item.outcome {
            RowOutcome::Valid { order_ref, tracking_ref, .. } => {
                assert_eq!(order_ref, None);
                assert_eq!(tracking_ref, None);
            }
            other => panic!("expected valid row, got {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_references_are_absent() {
        let map = FieldMap {
            fee_type_raw: Some("fee".to_string()),
            amount: Some("cost".to_string()),
            ..FieldMap::default()
        };
        let raw = row(&[("fee", "Storage"), ("cost", "5.00"), ("track", "T-9")]);
        let item = normalize_row(&raw, &map, 2);
        match item.outcome {
            RowOutcome::Valid { tracking_ref, .. } => assert_eq!(tracking_ref, None),
            other => panic!("expected valid row, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_fee_is_row_error() {
        let raw = row(&[("fee", "  "), ("cost", "5.00")]);
        let item = normalize_row(&raw, &test_map(), 3);
        assert!(!item.is_valid());
        assert_eq!(
            item.outcome,
            RowOutcome::Invalid {
                code: ROW_PARSE_ERROR,
                detail: "fee type is empty".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_amount_is_row_error() {
        let raw = row(&[("fee", "Storage"), ("cost", "")]);
        let item = normalize_row(&raw, &test_map(), 3);
        assert_eq!(
            item.outcome,
            RowOutcome::Invalid {
                code: ROW_PARSE_ERROR,
                detail: "amount is empty".to_string(),
            }
        );
    }

    #[test]
    fn test_unparseable_amount_detail_mentions_raw_text() {
        let raw = row(&[("fee", "Storage"), ("cost", "bad")]);
        let item = normalize_row(&raw, &test_map(), 4);
        match item.outcome {
            RowOutcome::Invalid { code, detail } => {
                assert_eq!(code, ROW_PARSE_ERROR);
                assert!(detail.contains("bad"), "detail should mention the raw text: {detail}");
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_preserves_all_fields() {
        let raw = row(&[("fee", "Fuel"), ("cost", "1.00"), ("extra", "kept verbatim")]);
        let item = normalize_row(&raw, &test_map(), 2);
        assert_eq!(item.raw_row.get("extra").map(String::as_str), Some("kept verbatim"));
        assert_eq!(item.raw_row.len(), 3);
    }

    #[test]
    fn test_snapshot_kept_on_invalid_rows_too() {
        let raw = row(&[("fee", ""), ("cost", "1.00")]);
        let item = normalize_row(&raw, &test_map(), 2);
        assert!(!item.is_valid());
        assert_eq!(item.raw_row.len(), 2);
    }

    #[test]
    fn test_row_numbering_stable_across_failures() {
        let hdrs: Vec<String> = vec!["fee".to_string(), "cost".to_string()];
        let map = fieldmap::resolve(&hdrs, None).unwrap();
        let rows = [
            row(&[("fee", "Fuel"), ("cost", "1.00")]),
            row(&[("fee", ""), ("cost", "2.00")]),
            row(&[("fee", "Storage"), ("cost", "3.00")]),
        ];
        let numbers: Vec<i64> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| normalize_row(r, &map, i as i64 + 2).row_number)
            .collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }
}
