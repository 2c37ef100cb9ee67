use regex::RegexBuilder;
use rusqlite::Connection;

use crate::error::Result;

/// How a rule's pattern is applied to fee text. Closed set so dispatch is
/// exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Contains,
    Regex,
}

impl MatchKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(Self::Exact),
            "contains" => Some(Self::Contains),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Regex => "regex",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub id: i64,
    pub pattern: String,
    pub match_kind: MatchKind,
    pub category: String,
    pub priority: i64,
    pub enabled: bool,
}

impl ClassificationRule {
    fn matches(&self, fee_text: &str) -> bool {
        match self.match_kind {
            MatchKind::Exact => fee_text.to_lowercase() == self.pattern.to_lowercase(),
            MatchKind::Contains => fee_text
                .to_lowercase()
                .contains(&self.pattern.to_lowercase()),
            // A search, not a full match. A pattern that fails to compile
            // never matches.
            MatchKind::Regex => RegexBuilder::new(&self.pattern)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(fee_text))
                .unwrap_or(false),
        }
    }
}

/// First matching rule wins. Priority descends; equal priorities break by
/// ascending rule id so a fixed rule set always classifies the same way.
/// Disabled rules and rules with an empty pattern never match.
pub fn classify(fee_text: &str, rules: &[ClassificationRule]) -> Option<String> {
    let mut candidates: Vec<&ClassificationRule> = rules
        .iter()
        .filter(|r| r.enabled && !r.pattern.is_empty())
        .collect();
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    candidates
        .into_iter()
        .find(|r| r.matches(fee_text))
        .map(|r| r.category.clone())
}

pub struct ClassifyOutcome {
    pub classified: usize,
    pub unclassified: usize,
}

/// Re-run classification over every valid line item, optionally scoped to
/// one upload. The rule set is snapshotted once up front, so an in-flight
/// pass never sees a half-applied rule edit. Idempotent for a fixed rule
/// set: each item's category is recomputed from scratch, including clearing
/// categories that no longer match.
pub fn classify_line_items(conn: &Connection, upload_id: Option<i64>) -> Result<ClassifyOutcome> {
    let rules = crate::db::snapshot_rules(conn)?;

    let mut stmt = match upload_id {
        Some(_) => conn.prepare(
            "SELECT id, fee_type_raw FROM line_items WHERE is_valid = 1 AND upload_id = ?1 \
             ORDER BY row_number",
        )?,
        None => conn.prepare(
            "SELECT id, fee_type_raw FROM line_items WHERE is_valid = 1 \
             ORDER BY upload_id, row_number",
        )?,
    };
    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<(i64, String)> {
        Ok((row.get(0)?, row.get(1)?))
    };
    let items: Vec<(i64, String)> = match upload_id {
        Some(id) => stmt
            .query_map([id], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    let mut classified = 0usize;
    let mut unclassified = 0usize;

    for (item_id, fee_text) in &items {
        let category = classify(fee_text, &rules);
        match &category {
            Some(_) => classified += 1,
            None => unclassified += 1,
        }
        conn.execute(
            "UPDATE line_items SET fee_type_norm = ?1 WHERE id = ?2",
            rusqlite::params![category, item_id],
        )?;
    }

    Ok(ClassifyOutcome {
        classified,
        unclassified,
    })
}
