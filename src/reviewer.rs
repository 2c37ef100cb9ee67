use rusqlite::Connection;

use crate::error::Result;

/// A valid line item the classifier could not categorize.
pub struct UnclassifiedItem {
    pub id: i64,
    pub upload_id: i64,
    pub row_number: i64,
    pub fee_type_raw: String,
    pub amount_cents: i64,
}

pub fn get_unclassified_items(
    conn: &Connection,
    upload_id: Option<i64>,
) -> Result<Vec<UnclassifiedItem>> {
    let sql = "SELECT id, upload_id, row_number, fee_type_raw, amount_cents FROM line_items \
               WHERE is_valid = 1 AND fee_type_norm IS NULL";
    let mut stmt = match upload_id {
        Some(_) => conn.prepare(&format!("{sql} AND upload_id = ?1 ORDER BY row_number"))?,
        None => conn.prepare(&format!("{sql} ORDER BY upload_id, row_number"))?,
    };
    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<UnclassifiedItem> {
        Ok(UnclassifiedItem {
            id: row.get(0)?,
            upload_id: row.get(1)?,
            row_number: row.get(2)?,
            fee_type_raw: row.get(3)?,
            amount_cents: row.get(4)?,
        })
    };
    let rows = match upload_id {
        Some(id) => stmt.query_map([id], map_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

/// Categories already known to the rule set, offered as review choices.
pub fn get_known_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM rules WHERE enabled = 1 ORDER BY category",
    )?;
    let rows = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Apply a reviewer's decision: set the item's category and optionally add a
/// contains-rule so future uploads classify the same fee automatically.
pub fn apply_review(
    conn: &Connection,
    item_id: i64,
    category: &str,
    rule_pattern: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE line_items SET fee_type_norm = ?1 WHERE id = ?2",
        rusqlite::params![category, item_id],
    )?;
    if let Some(pattern) = rule_pattern {
        conn.execute(
            "INSERT INTO rules (pattern, match_kind, category) VALUES (?1, 'contains', ?2)",
            rusqlite::params![pattern, category],
        )?;
    }
    Ok(())
}
