use std::path::Path;

use rusqlite::Connection;

use crate::classifier::{ClassificationRule, MatchKind};
use crate::error::{Result, WaybillError};
use crate::models::{LineItem, Upload};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS uploads (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    field_map TEXT,
    row_count INTEGER DEFAULT 0,
    invalid_count INTEGER DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS line_items (
    id INTEGER PRIMARY KEY,
    upload_id INTEGER NOT NULL,
    row_number INTEGER NOT NULL,
    fee_type_raw TEXT NOT NULL,
    amount_raw TEXT NOT NULL,
    amount_cents INTEGER,
    order_ref TEXT,
    tracking_ref TEXT,
    fee_type_norm TEXT,
    is_valid INTEGER NOT NULL DEFAULT 0,
    error_code TEXT,
    error_detail TEXT,
    raw_row_json TEXT,
    FOREIGN KEY (upload_id) REFERENCES uploads(id)
);

CREATE INDEX IF NOT EXISTS idx_line_items_upload ON line_items(upload_id);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    match_kind TEXT NOT NULL DEFAULT 'contains',
    category TEXT NOT NULL,
    priority INTEGER DEFAULT 0,
    enabled INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);
";

// (pattern, match_kind, category, priority)
const DEFAULT_RULES: &[(&str, &str, &str, i64)] = &[
    ("fuel", "contains", "FUEL_SURCHARGE", 100),
    ("storage", "contains", "STORAGE", 90),
    ("pick", "contains", "PICK_PACK", 80),
    ("pack", "contains", "PICK_PACK", 80),
    ("freight", "contains", "SHIPPING", 70),
    ("ship", "contains", "SHIPPING", 70),
    ("postage", "contains", "SHIPPING", 70),
    ("handling", "contains", "HANDLING", 60),
    ("return", "contains", "RETURNS", 60),
    ("label", "contains", "LABELING", 50),
    ("pallet", "contains", "PALLET", 50),
    ("receiving", "contains", "RECEIVING", 50),
    ("surcharge", "contains", "ACCESSORIAL", 10),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM rules", [], |row| row.get(0))?;
    if count == 0 {
        for rule in DEFAULT_RULES {
            conn.execute(
                "INSERT INTO rules (pattern, match_kind, category, priority) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![rule.0, rule.1, rule.2, rule.3],
            )?;
        }
    }
    Ok(())
}

/// Ordered snapshot of the enabled rule set, taken once per batch pass so
/// rule edits never interleave with in-flight classification.
pub fn snapshot_rules(conn: &Connection) -> Result<Vec<ClassificationRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, pattern, match_kind, category, priority, enabled FROM rules \
         WHERE enabled = 1 ORDER BY priority DESC, id ASC",
    )?;
    let rows: Vec<(i64, String, String, String, i64, bool)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, pattern, kind, category, priority, enabled)| {
            let match_kind = MatchKind::parse(&kind)
                .ok_or_else(|| WaybillError::UnknownMatchKind(kind.clone()))?;
            Ok(ClassificationRule {
                id,
                pattern,
                match_kind,
                category,
                priority,
                enabled,
            })
        })
        .collect()
}

pub fn get_upload(conn: &Connection, upload_id: i64) -> Result<Upload> {
    conn.query_row(
        "SELECT id, filename, checksum, field_map, row_count, invalid_count, created_at \
         FROM uploads WHERE id = ?1",
        [upload_id],
        |row| {
            Ok(Upload {
                id: row.get(0)?,
                filename: row.get(1)?,
                checksum: row.get(2)?,
                field_map_json: row.get(3)?,
                row_count: row.get(4)?,
                invalid_count: row.get(5)?,
                created_at: row.get(6)?,
            })
        },
    )
    .map_err(|_| WaybillError::UnknownUpload(upload_id))
}

pub fn list_uploads(conn: &Connection) -> Result<Vec<Upload>> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, checksum, field_map, row_count, invalid_count, created_at \
         FROM uploads ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Upload {
                id: row.get(0)?,
                filename: row.get(1)?,
                checksum: row.get(2)?,
                field_map_json: row.get(3)?,
                row_count: row.get(4)?,
                invalid_count: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Filters for the line-item listing. `valid`/`category`/`unclassified`
/// narrow the result; `None` means no constraint.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub upload_id: Option<i64>,
    pub valid: Option<bool>,
    pub category: Option<String>,
    pub unclassified: bool,
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        id: row.get(0)?,
        upload_id: row.get(1)?,
        row_number: row.get(2)?,
        fee_type_raw: row.get(3)?,
        amount_raw: row.get(4)?,
        amount_cents: row.get(5)?,
        order_ref: row.get(6)?,
        tracking_ref: row.get(7)?,
        fee_type_norm: row.get(8)?,
        is_valid: row.get(9)?,
        error_code: row.get(10)?,
        error_detail: row.get(11)?,
        raw_row_json: row.get(12)?,
    })
}

const ITEM_COLUMNS: &str = "id, upload_id, row_number, fee_type_raw, amount_raw, amount_cents, \
     order_ref, tracking_ref, fee_type_norm, is_valid, error_code, error_detail, raw_row_json";

/// Filtered, paginated listing. `limit = 0` means no page bound.
pub fn list_line_items(
    conn: &Connection,
    filter: &ItemFilter,
    limit: usize,
    offset: usize,
) -> Result<Vec<LineItem>> {
    let mut sql = format!("SELECT {ITEM_COLUMNS} FROM line_items WHERE 1=1");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(upload_id) = filter.upload_id {
        sql.push_str(" AND upload_id = ?");
        params.push(Box::new(upload_id));
    }
    if let Some(valid) = filter.valid {
        sql.push_str(" AND is_valid = ?");
        params.push(Box::new(valid));
    }
    if let Some(category) = &filter.category {
        sql.push_str(" AND fee_type_norm = ?");
        params.push(Box::new(category.clone()));
    }
    if filter.unclassified {
        sql.push_str(" AND is_valid = 1 AND fee_type_norm IS NULL");
    }
    sql.push_str(" ORDER BY upload_id, row_number");
    if limit > 0 {
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Box::new(limit as i64));
        params.push(Box::new(offset as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())), row_to_item)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_line_item(conn: &Connection, item_id: i64) -> Result<LineItem> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM line_items WHERE id = ?1"),
        [item_id],
        row_to_item,
    )
    .map_err(|_| WaybillError::UnknownLineItem(item_id))
}

/// All line items of one upload, in row order. The audit batch.
pub fn upload_line_items(conn: &Connection, upload_id: i64) -> Result<Vec<LineItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM line_items WHERE upload_id = ?1 ORDER BY row_number"
    ))?;
    let rows = stmt
        .query_map([upload_id], row_to_item)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["uploads", "line_items", "rules"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM rules", [], |r| r.get(0)).unwrap();
        assert_eq!(count, DEFAULT_RULES.len() as i64, "seed must not run twice");
    }

    #[test]
    fn test_init_db_seeds_default_rules() {
        let (_dir, conn) = test_db();
        let count: i64 = conn.query_row("SELECT count(*) FROM rules", [], |r| r.get(0)).unwrap();
        assert!(count >= 10, "expected at least 10 seeded rules, got {count}");
    }

    #[test]
    fn test_snapshot_rules_ordered_and_enabled_only() {
        let (_dir, conn) = test_db();
        conn.execute("DELETE FROM rules", []).unwrap();
        conn.execute(
            "INSERT INTO rules (pattern, match_kind, category, priority, enabled) VALUES \
             ('a', 'contains', 'A', 5, 1), \
             ('b', 'contains', 'B', 10, 1), \
             ('c', 'contains', 'C', 10, 1), \
             ('d', 'contains', 'D', 99, 0)",
            [],
        )
        .unwrap();
        let rules = snapshot_rules(&conn).unwrap();
        let cats: Vec<&str> = rules.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_snapshot_rules_rejects_unknown_match_kind() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO rules (pattern, match_kind, category) VALUES ('x', 'starts_with', 'X')",
            [],
        )
        .unwrap();
        let err = snapshot_rules(&conn).unwrap_err();
        assert!(matches!(err, WaybillError::UnknownMatchKind(ref k) if k == "starts_with"));
    }

    #[test]
    fn test_get_upload_unknown_id() {
        let (_dir, conn) = test_db();
        let err = get_upload(&conn, 42).unwrap_err();
        assert!(matches!(err, WaybillError::UnknownUpload(42)));
    }

    fn seed_items(conn: &Connection) -> i64 {
        conn.execute("INSERT INTO uploads (filename, checksum) VALUES ('a.csv', 'c1')", [])
            .unwrap();
        let upload = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO line_items (upload_id, row_number, fee_type_raw, amount_raw, amount_cents, fee_type_norm, is_valid) VALUES \
             (?1, 2, 'Fuel', '1.00', 100, 'FUEL_SURCHARGE', 1), \
             (?1, 3, 'Mystery', '2.00', 200, NULL, 1), \
             (?1, 4, 'Storage', 'bad', NULL, NULL, 0)",
            [upload],
        )
        .unwrap();
        upload
    }

    #[test]
    fn test_list_line_items_validity_filter() {
        let (_dir, conn) = test_db();
        let upload = seed_items(&conn);
        let filter = ItemFilter {
            upload_id: Some(upload),
            valid: Some(false),
            ..ItemFilter::default()
        };
        let invalid = list_line_items(&conn, &filter, 0, 0).unwrap();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].fee_type_raw, "Storage");
    }

    #[test]
    fn test_list_line_items_category_filter() {
        let (_dir, conn) = test_db();
        let upload = seed_items(&conn);
        let filter = ItemFilter {
            upload_id: Some(upload),
            category: Some("FUEL_SURCHARGE".to_string()),
            ..ItemFilter::default()
        };
        let matched = list_line_items(&conn, &filter, 0, 0).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].row_number, 2);
    }

    #[test]
    fn test_list_line_items_unclassified_filter() {
        let (_dir, conn) = test_db();
        let upload = seed_items(&conn);
        let filter = ItemFilter {
            upload_id: Some(upload),
            unclassified: true,
            ..ItemFilter::default()
        };
        let unclassified = list_line_items(&conn, &filter, 0, 0).unwrap();
        // Only the valid item with no category; the invalid row is excluded.
        assert_eq!(unclassified.len(), 1);
        assert_eq!(unclassified[0].fee_type_raw, "Mystery");
    }

    #[test]
    fn test_list_line_items_pagination() {
        let (_dir, conn) = test_db();
        let upload = seed_items(&conn);
        let filter = ItemFilter {
            upload_id: Some(upload),
            ..ItemFilter::default()
        };
        let page1 = list_line_items(&conn, &filter, 2, 0).unwrap();
        let page2 = list_line_items(&conn, &filter, 2, 2).unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 1);
        assert_eq!(page1[0].row_number, 2);
        assert_eq!(page2[0].row_number, 4);
    }

    #[test]
    fn test_upload_line_items_in_row_order() {
        let (_dir, conn) = test_db();
        let upload = seed_items(&conn);
        let rows: Vec<i64> = upload_line_items(&conn, upload)
            .unwrap()
            .iter()
            .map(|i| i.row_number)
            .collect();
        assert_eq!(rows, vec![2, 3, 4]);
    }
}
