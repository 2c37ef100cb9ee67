use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::classifier::classify_line_items;
use crate::db::get_connection;
use crate::error::Result;
use crate::ingest::ingest_file;
use crate::settings::get_data_dir;

pub fn run(file: &str, map_args: &[String]) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;

    let explicit: Option<Vec<(String, String)>> = if map_args.is_empty() {
        None
    } else {
        Some(
            map_args
                .iter()
                .map(|raw| super::parse_map_arg(raw))
                .collect::<Result<Vec<_>>>()?,
        )
    };

    let result = ingest_file(&conn, &file_path, explicit.as_deref())?;

    if result.duplicate_file {
        println!(
            "This file has already been ingested (upload {}, duplicate checksum).",
            result.upload_id
        );
        return Ok(());
    }

    println!("Upload {} created from {file}", result.upload_id);
    println!("Headers: {}", result.headers.join(", "));
    println!(
        "{} rows ingested, {} invalid (kept with row errors)",
        result.inserted, result.invalid
    );

    println!("Resolved field map:");
    for (canonical, header) in [
        ("fee_type_raw", &result.field_map.fee_type_raw),
        ("amount", &result.field_map.amount),
        ("order_ref", &result.field_map.order_ref),
        ("tracking_ref", &result.field_map.tracking_ref),
    ] {
        println!("  {canonical:<14} {}", header.as_deref().unwrap_or("(unmapped)"));
    }

    if !result.preview.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Fee", "Amount", "Order Ref", "Tracking Ref"]);
        for row in &result.preview {
            table.add_row(vec![
                Cell::new(&row.fee_type_raw),
                Cell::new(&row.amount_raw),
                Cell::new(row.order_ref.as_deref().unwrap_or("")),
                Cell::new(row.tracking_ref.as_deref().unwrap_or("")),
            ]);
        }
        println!("Preview\n{table}");
    }

    let outcome = classify_line_items(&conn, Some(result.upload_id))?;
    println!(
        "{} classified, {} unclassified",
        outcome.classified, outcome.unclassified
    );

    Ok(())
}
