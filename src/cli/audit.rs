use colored::Colorize;

use crate::auditor::audit;
use crate::db::{get_connection, get_upload, upload_line_items};
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn run(upload_id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let upload = get_upload(&conn, upload_id)?;
    let items = upload_line_items(&conn, upload_id)?;
    let findings = audit(&items);

    println!("Audit of upload {} ({})", upload.id, upload.filename);

    let unclassified = findings.unknown_fee_type_rows.to_string();
    let duplicates = findings.duplicate_rows.to_string();
    println!(
        "  Unknown fee type rows: {}",
        if findings.unknown_fee_type_rows > 0 { unclassified.yellow() } else { unclassified.green() }
    );
    println!(
        "  Duplicate rows:        {}",
        if findings.duplicate_rows > 0 { duplicates.red() } else { duplicates.green() }
    );

    if findings.unknown_fee_type_rows > 0 {
        println!("Run `waybill review --upload {upload_id}` to categorize unknown fees.");
    }
    Ok(())
}
