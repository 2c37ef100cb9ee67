use std::collections::HashSet;

use crate::models::LineItem;

/// Summary counts for one batch of line items. Derived, never authoritative:
/// recomputable at any time from the items and the current rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditFindings {
    pub unknown_fee_type_rows: usize,
    pub duplicate_rows: usize,
}

/// Audit a batch of normalized line items.
///
/// Only valid items participate. An item's duplicate key is (category or "",
/// amount in cents, reference); items with no tracking or order reference
/// cannot establish duplication and are excluded. Items are walked in
/// ascending row-number order, so the first occurrence of a key is free and
/// each later occurrence counts as one duplicate: extra occurrences, not
/// groups.
pub fn audit(items: &[LineItem]) -> AuditFindings {
    let mut participating: Vec<&LineItem> = items.iter().filter(|i| i.is_valid).collect();
    participating.sort_by_key(|i| i.row_number);

    let mut findings = AuditFindings::default();
    let mut seen: HashSet<(String, i64, String)> = HashSet::new();

    for item in participating {
        if item.fee_type_norm.is_none() {
            findings.unknown_fee_type_rows += 1;
        }

        let Some(reference) = item.reference_key() else {
            continue;
        };
        let Some(cents) = item.amount_cents else {
            continue;
        };
        let key = (
            item.fee_type_norm.clone().unwrap_or_default(),
            cents,
            reference.to_string(),
        );
        if !seen.insert(key) {
            findings.duplicate_rows += 1;
        }
    }

    findings
}
