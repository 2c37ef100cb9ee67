use std::path::PathBuf;

use crate::auditor::audit;
use crate::classifier::classify_line_items;
use crate::db::{get_connection, upload_line_items};
use crate::error::Result;
use crate::ingest::ingest_file;
use crate::settings::load_settings;

/// A small but representative 3PL invoice: a repeated charge, a credit in
/// parens, a fee no seeded rule knows, and one unparseable amount.
const DEMO_CSV: &str = "\
Fee Description,Amount,Order ID,Tracking #
Fuel Surcharge,$12.50,SO-1001,1Z999AA101
Storage Fee,$45.00,SO-1002,1Z999AA102
Pick & Pack,$3.25,SO-1003,1Z999AA103
Fuel Surcharge,$12.50,SO-1001,1Z999AA101
Detention Charge,$75.00,SO-1004,1Z999AA104
Return Processing,(8.40),SO-1005,1Z999AA105
Shipping,twelve dollars,SO-1006,1Z999AA106
";

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("waybill.db");

    if !db_path.exists() {
        eprintln!("No database found. Run `waybill init` first.");
        std::process::exit(1);
    }

    let csv_path = data_dir.join("demo_invoice.csv");
    std::fs::write(&csv_path, DEMO_CSV)?;

    let conn = get_connection(&db_path)?;
    let result = ingest_file(&conn, &csv_path, None)?;

    if result.duplicate_file {
        println!("Demo data already loaded (upload {}).", result.upload_id);
        return Ok(());
    }

    let outcome = classify_line_items(&conn, Some(result.upload_id))?;
    let findings = audit(&upload_line_items(&conn, result.upload_id)?);

    println!("Demo invoice loaded!");
    println!("  Upload:        {}", result.upload_id);
    println!("  Rows:          {} ({} invalid)", result.inserted, result.invalid);
    println!("  Classified:    {}", outcome.classified);
    println!("  Unclassified:  {}", outcome.unclassified);
    println!("  Duplicates:    {}", findings.duplicate_rows);
    println!();
    println!("Try these next:");
    println!("  waybill uploads list");
    println!("  waybill items --upload {}", result.upload_id);
    println!("  waybill audit {}", result.upload_id);
    println!("  waybill review --upload {}", result.upload_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    #[test]
    fn test_demo_invoice_exercises_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();

        let csv_path = dir.path().join("demo_invoice.csv");
        std::fs::write(&csv_path, DEMO_CSV).unwrap();

        let result = ingest_file(&conn, &csv_path, None).unwrap();
        assert_eq!(result.inserted, 6);
        assert_eq!(result.invalid, 1);

        let outcome = classify_line_items(&conn, Some(result.upload_id)).unwrap();
        // Detention Charge has no seeded rule.
        assert_eq!(outcome.unclassified, 1);
        assert_eq!(outcome.classified, 5);

        let findings = audit(&upload_line_items(&conn, result.upload_id).unwrap());
        assert_eq!(findings.duplicate_rows, 1);
        assert_eq!(findings.unknown_fee_type_rows, 1);
    }

    #[test]
    fn test_demo_credit_amount_is_negative() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();

        let csv_path = dir.path().join("demo_invoice.csv");
        std::fs::write(&csv_path, DEMO_CSV).unwrap();
        ingest_file(&conn, &csv_path, None).unwrap();

        let cents: i64 = conn
            .query_row(
                "SELECT amount_cents FROM line_items WHERE fee_type_raw = 'Return Processing'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(cents, -840);
    }
}
