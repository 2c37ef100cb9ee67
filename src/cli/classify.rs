use crate::classifier::classify_line_items;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn run(upload: Option<i64>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let outcome = classify_line_items(&conn, upload)?;
    println!(
        "{} classified, {} unclassified",
        outcome.classified, outcome.unclassified
    );
    Ok(())
}
