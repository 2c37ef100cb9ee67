use crate::db::get_connection;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("waybill.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;

        let uploads: i64 = conn.query_row("SELECT count(*) FROM uploads", [], |r| r.get(0))?;
        let items: i64 = conn.query_row("SELECT count(*) FROM line_items", [], |r| r.get(0))?;
        let invalid: i64 = conn.query_row(
            "SELECT count(*) FROM line_items WHERE is_valid = 0",
            [],
            |r| r.get(0),
        )?;
        let unclassified: i64 = conn.query_row(
            "SELECT count(*) FROM line_items WHERE is_valid = 1 AND fee_type_norm IS NULL",
            [],
            |r| r.get(0),
        )?;
        let rules: i64 = conn.query_row(
            "SELECT count(*) FROM rules WHERE enabled = 1",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Uploads:       {uploads}");
        println!("Line items:    {items}");
        println!("Invalid:       {invalid}");
        println!("Unclassified:  {unclassified}");
        println!("Active rules:  {rules}");
    } else {
        println!();
        println!("Database not found. Run `waybill init` to set up.");
    }

    Ok(())
}
