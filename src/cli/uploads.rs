use comfy_table::{Cell, Table};

use crate::auditor::audit;
use crate::db::{get_connection, get_upload, list_uploads, upload_line_items};
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let uploads = list_uploads(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Filename", "Rows", "Invalid", "Created"]);
    for upload in uploads {
        table.add_row(vec![
            Cell::new(upload.id),
            Cell::new(upload.filename),
            Cell::new(upload.row_count),
            Cell::new(upload.invalid_count),
            Cell::new(upload.created_at),
        ]);
    }
    println!("Uploads\n{table}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let upload = get_upload(&conn, id)?;
    let items = upload_line_items(&conn, id)?;
    let findings = audit(&items);

    println!("Upload {}", upload.id);
    println!("  Filename:     {}", upload.filename);
    println!("  Created:      {}", upload.created_at);
    println!("  Checksum:     {}", upload.checksum);
    println!("  Line items:   {} ({} invalid)", items.len(), upload.invalid_count);
    if let Some(map) = &upload.field_map_json {
        println!("  Field map:    {map}");
    }
    println!("  Unclassified: {}", findings.unknown_fee_type_rows);
    println!("  Duplicates:   {}", findings.duplicate_rows);
    Ok(())
}
