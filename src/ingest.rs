use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{Result, WaybillError};
use crate::fieldmap::{self, FieldMap};
use crate::normalizer::{normalize_row, RowOutcome};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn existing_upload(conn: &Connection, checksum: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM uploads WHERE checksum = ?1")?;
    let id = stmt
        .query_map([checksum], |row| row.get::<_, i64>(0))?
        .next()
        .transpose()?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// ingest_file
// ---------------------------------------------------------------------------

/// First rows of an upload, echoed back so the operator can eyeball the
/// field mapping before trusting a large file.
#[derive(Debug)]
pub struct PreviewRow {
    pub fee_type_raw: String,
    pub amount_raw: String,
    pub order_ref: Option<String>,
    pub tracking_ref: Option<String>,
}

#[derive(Debug)]
pub struct IngestResult {
    pub upload_id: i64,
    pub inserted: usize,
    pub invalid: usize,
    pub duplicate_file: bool,
    pub headers: Vec<String>,
    pub field_map: FieldMap,
    pub preview: Vec<PreviewRow>,
}

const PREVIEW_ROWS: usize = 10;

/// Ingest one CSV invoice file.
///
/// Structural problems (no header row, bad explicit map, a map missing
/// `fee_type_raw` or `amount`) halt the whole batch before any row is read.
/// Row-level problems never do: the offending row is stored invalid with a
/// `ROW_PARSE_ERROR` detail and ingestion moves on. A byte-identical
/// re-upload is detected by checksum and rejected without touching the
/// database.
pub fn ingest_file(
    conn: &Connection,
    file_path: &Path,
    explicit_map: Option<&[(String, String)]>,
) -> Result<IngestResult> {
    let checksum = compute_checksum(file_path)?;
    if let Some(upload_id) = existing_upload(conn, &checksum)? {
        return Ok(IngestResult {
            upload_id,
            inserted: 0,
            invalid: 0,
            duplicate_file: true,
            headers: Vec::new(),
            field_map: FieldMap::default(),
            preview: Vec::new(),
        });
    }

    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(WaybillError::NoHeaderRow);
    }

    let field_map = fieldmap::resolve(&headers, explicit_map)?;
    let missing = field_map.missing_required();
    if !missing.is_empty() {
        return Err(WaybillError::IncompleteFieldMap(missing.join(", ")));
    }

    let filename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("uploaded.csv");
    conn.execute(
        "INSERT INTO uploads (filename, checksum, field_map) VALUES (?1, ?2, ?3)",
        rusqlite::params![filename, checksum, serde_json::to_string(&field_map)?],
    )?;
    let upload_id = conn.last_insert_rowid();

    let mut inserted = 0usize;
    let mut invalid = 0usize;
    let mut preview = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let pairs: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        // Header is logical row 1, so data rows number from 2.
        let row = normalize_row(&pairs, &field_map, i as i64 + 2);
        let raw_row_json = serde_json::to_string(&row.raw_row)?;
        if row.is_valid() {
            inserted += 1;
        } else {
            invalid += 1;
        }

        match &row.outcome {
            RowOutcome::Valid {
                amount_cents,
                order_ref,
                tracking_ref,
            } => {
                conn.execute(
                    "INSERT INTO line_items (upload_id, row_number, fee_type_raw, amount_raw, \
                     amount_cents, order_ref, tracking_ref, is_valid, raw_row_json) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
                    rusqlite::params![
                        upload_id,
                        row.row_number,
                        row.fee_type_raw,
                        row.amount_raw,
                        amount_cents,
                        order_ref,
                        tracking_ref,
                        raw_row_json,
                    ],
                )?;
                if preview.len() < PREVIEW_ROWS {
                    preview.push(PreviewRow {
                        fee_type_raw: row.fee_type_raw.clone(),
                        amount_raw: row.amount_raw.clone(),
                        order_ref: order_ref.clone(),
                        tracking_ref: tracking_ref.clone(),
                    });
                }
            }
            RowOutcome::Invalid { code, detail } => {
                conn.execute(
                    "INSERT INTO line_items (upload_id, row_number, fee_type_raw, amount_raw, \
                     is_valid, error_code, error_detail, raw_row_json) \
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
                    rusqlite::params![
                        upload_id,
                        row.row_number,
                        row.fee_type_raw,
                        row.amount_raw,
                        code,
                        detail,
                        raw_row_json,
                    ],
                )?;
            }
        }
    }

    conn.execute(
        "UPDATE uploads SET row_count = ?1, invalid_count = ?2 WHERE id = ?3",
        rusqlite::params![inserted as i64, invalid as i64, upload_id],
    )?;

    Ok(IngestResult {
        upload_id,
        inserted,
        invalid,
        duplicate_file: false,
        headers,
        field_map,
        preview,
    })
}
