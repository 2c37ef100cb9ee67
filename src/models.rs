/// One ingested CSV file and the batch of line items produced from it.
#[derive(Debug, Clone)]
pub struct Upload {
    pub id: i64,
    pub filename: String,
    pub checksum: String,
    pub field_map_json: Option<String>,
    pub row_count: i64,
    pub invalid_count: i64,
    pub created_at: String,
}

/// A stored line item. `fee_type_norm` is the only field that changes after
/// insertion; the classifier rewrites it on every batch pass.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: i64,
    pub upload_id: i64,
    pub row_number: i64,
    pub fee_type_raw: String,
    pub amount_raw: String,
    pub amount_cents: Option<i64>,
    pub order_ref: Option<String>,
    pub tracking_ref: Option<String>,
    pub fee_type_norm: Option<String>,
    pub is_valid: bool,
    pub error_code: Option<String>,
    pub error_detail: Option<String>,
    pub raw_row_json: Option<String>,
}

impl LineItem {
    /// Reference used to group potential duplicate charges: tracking wins
    /// over order; an item with neither cannot establish duplication.
    pub fn reference_key(&self) -> Option<&str> {
        self.tracking_ref.as_deref().or(self.order_ref.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(order_ref: Option<&str>, tracking_ref: Option<&str>) -> LineItem {
        LineItem {
            id: 1,
            upload_id: 1,
            row_number: 2,
            fee_type_raw: "Fuel".to_string(),
            amount_raw: "1.00".to_string(),
            amount_cents: Some(100),
            order_ref: order_ref.map(str::to_string),
            tracking_ref: tracking_ref.map(str::to_string),
            fee_type_norm: None,
            is_valid: true,
            error_code: None,
            error_detail: None,
            raw_row_json: None,
        }
    }

    #[test]
    fn test_reference_key_prefers_tracking() {
        assert_eq!(item(Some("O1"), Some("T1")).reference_key(), Some("T1"));
        assert_eq!(item(Some("O1"), None).reference_key(), Some("O1"));
        assert_eq!(item(None, None).reference_key(), None);
    }
}
