use serde::{Deserialize, Serialize};

use crate::error::{Result, WaybillError};

/// The four row attributes the pipeline understands, independent of whatever
/// header text a 3PL vendor puts in its export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    FeeType,
    Amount,
    OrderRef,
    TrackingRef,
}

impl CanonicalField {
    /// Resolution order. When a single header satisfies several fields'
    /// keyword sets, the earliest field here claims it.
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::FeeType,
        CanonicalField::Amount,
        CanonicalField::OrderRef,
        CanonicalField::TrackingRef,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::FeeType => "fee_type_raw",
            Self::Amount => "amount",
            Self::OrderRef => "order_ref",
            Self::TrackingRef => "tracking_ref",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "fee_type_raw" => Some(Self::FeeType),
            "amount" => Some(Self::Amount),
            "order_ref" => Some(Self::OrderRef),
            "tracking_ref" => Some(Self::TrackingRef),
            _ => None,
        }
    }

    /// Keyword synonyms matched case-insensitively as substrings of a header.
    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::FeeType => &[
                "fee_type",
                "fee type",
                "fee",
                "charge type",
                "charge description",
                "description",
                "service",
            ],
            Self::Amount => &["amount", "charge", "total", "fee amount", "cost"],
            Self::OrderRef => &["order", "po number", "purchase order"],
            Self::TrackingRef => &["tracking", "track", "waybill", "awb", "shipment"],
        }
    }
}

/// Resolved correspondence between canonical fields and actual header names
/// for one file. `fee_type_raw` and `amount` must both be bound before any
/// row can be ingested; the reference columns are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    pub fee_type_raw: Option<String>,
    pub amount: Option<String>,
    pub order_ref: Option<String>,
    pub tracking_ref: Option<String>,
}

impl FieldMap {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::FeeType => self.fee_type_raw.as_deref(),
            CanonicalField::Amount => self.amount.as_deref(),
            CanonicalField::OrderRef => self.order_ref.as_deref(),
            CanonicalField::TrackingRef => self.tracking_ref.as_deref(),
        }
    }

    fn set(&mut self, field: CanonicalField, header: String) {
        match field {
            CanonicalField::FeeType => self.fee_type_raw = Some(header),
            CanonicalField::Amount => self.amount = Some(header),
            CanonicalField::OrderRef => self.order_ref = Some(header),
            CanonicalField::TrackingRef => self.tracking_ref = Some(header),
        }
    }

    /// Required fields this map fails to bind.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.fee_type_raw.is_none() {
            missing.push("fee_type_raw");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        missing
    }
}

/// Resolve canonical fields to actual header names.
///
/// An explicit map is validated (known keys, headers present in the file) and
/// passed through untouched. Without one, each canonical field takes the
/// first unclaimed header whose lowercased text contains one of the field's
/// synonyms; a header claimed by an earlier field is never offered to a
/// later one.
pub fn resolve(headers: &[String], explicit: Option<&[(String, String)]>) -> Result<FieldMap> {
    if let Some(pairs) = explicit {
        let mut map = FieldMap::default();
        for (key, header) in pairs {
            let field = CanonicalField::from_key(key)
                .ok_or_else(|| WaybillError::UnknownCanonicalField(key.clone()))?;
            if !headers.iter().any(|h| h == header) {
                return Err(WaybillError::HeaderNotFound {
                    field: field.key(),
                    header: header.clone(),
                });
            }
            map.set(field, header.clone());
        }
        return Ok(map);
    }

    let mut map = FieldMap::default();
    let mut claimed = vec![false; headers.len()];
    for field in CanonicalField::ALL {
        for (i, header) in headers.iter().enumerate() {
            if claimed[i] {
                continue;
            }
            let lower = header.to_lowercase();
            if field.synonyms().iter().any(|syn| lower.contains(syn)) {
                claimed[i] = true;
                map.set(field, header.clone());
                break;
            }
        }
    }
    Ok(map)
}
