use comfy_table::{Cell, Table};

use crate::classifier::MatchKind;
use crate::db::get_connection;
use crate::error::{Result, WaybillError};
use crate::settings::get_data_dir;

pub fn add(pattern: &str, category: &str, match_kind: &str, priority: i64) -> Result<()> {
    let kind = MatchKind::parse(match_kind)
        .ok_or_else(|| WaybillError::UnknownMatchKind(match_kind.to_string()))?;

    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    conn.execute(
        "INSERT INTO rules (pattern, match_kind, category, priority) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![pattern, kind.as_str(), category, priority],
    )?;
    println!("Added rule: '{pattern}' \u{2192} {category}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let mut stmt = conn.prepare(
        "SELECT id, pattern, match_kind, category, priority, enabled FROM rules \
         ORDER BY priority DESC, id ASC",
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

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Kind", "Category", "Priority", "Enabled"]);
    for (id, pattern, kind, category, priority, enabled) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(pattern),
            Cell::new(kind),
            Cell::new(category),
            Cell::new(priority),
            Cell::new(if enabled { "yes" } else { "no" }),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn update(
    id: i64,
    pattern: Option<&str>,
    category: Option<&str>,
    match_kind: Option<&str>,
    priority: Option<i64>,
) -> Result<()> {
    let kind = match match_kind {
        Some(raw) => Some(
            MatchKind::parse(raw).ok_or_else(|| WaybillError::UnknownMatchKind(raw.to_string()))?,
        ),
        None => None,
    };

    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM rules WHERE id = ?1)",
        [id],
        |r| r.get(0),
    )?;
    if !exists {
        return Err(WaybillError::Other(format!("No rule with ID {id}")));
    }

    if let Some(pattern) = pattern {
        conn.execute("UPDATE rules SET pattern = ?1 WHERE id = ?2", rusqlite::params![pattern, id])?;
    }
    if let Some(category) = category {
        conn.execute("UPDATE rules SET category = ?1 WHERE id = ?2", rusqlite::params![category, id])?;
    }
    if let Some(kind) = kind {
        conn.execute(
            "UPDATE rules SET match_kind = ?1 WHERE id = ?2",
            rusqlite::params![kind.as_str(), id],
        )?;
    }
    if let Some(priority) = priority {
        conn.execute("UPDATE rules SET priority = ?1 WHERE id = ?2", rusqlite::params![priority, id])?;
    }

    println!("Updated rule {id}");
    println!("Run `waybill classify` to re-apply rules to stored items.");
    Ok(())
}

pub fn disable(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;

    let row: std::result::Result<(String, String, bool), _> = conn.query_row(
        "SELECT pattern, category, enabled FROM rules WHERE id = ?1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    );

    match row {
        Err(_) => Err(WaybillError::Other(format!("No rule with ID {id}"))),
        Ok((_, _, false)) => Err(WaybillError::Other(format!("Rule {id} is already disabled"))),
        Ok((pattern, category, _)) => {
            conn.execute("UPDATE rules SET enabled = 0 WHERE id = ?1", [id])?;
            println!("Disabled rule {id}: '{pattern}' \u{2192} {category}");
            Ok(())
        }
    }
}
