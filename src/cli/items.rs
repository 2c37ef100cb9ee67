use comfy_table::{Cell, Table};

use crate::db::{get_connection, get_line_item, list_line_items, ItemFilter};
use crate::error::Result;
use crate::fmt::money;
use crate::settings::{get_data_dir, load_settings};

pub fn list(
    upload: Option<i64>,
    valid: bool,
    invalid: bool,
    category: Option<String>,
    unclassified: bool,
    page: usize,
) -> Result<()> {
    let settings = load_settings();
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;

    let filter = ItemFilter {
        upload_id: upload,
        valid: match (valid, invalid) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        category,
        unclassified,
    };

    let page = page.max(1);
    let page_size = settings.page_size.max(1);
    let items = list_line_items(&conn, &filter, page_size, (page - 1) * page_size)?;

    if items.is_empty() {
        println!("No line items on page {page}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Upload", "Row", "Fee", "Amount", "Category", "Reference", "Error",
    ]);
    for item in &items {
        let amount = match item.amount_cents {
            Some(cents) => money(cents),
            None => item.amount_raw.clone(),
        };
        let error = match (&item.error_code, &item.error_detail) {
            (Some(code), Some(detail)) => format!("{code}: {detail}"),
            _ => String::new(),
        };
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(item.upload_id),
            Cell::new(item.row_number),
            Cell::new(&item.fee_type_raw),
            Cell::new(amount),
            Cell::new(item.fee_type_norm.as_deref().unwrap_or("")),
            Cell::new(item.reference_key().unwrap_or("")),
            Cell::new(error),
        ]);
    }
    println!("Line items (page {page})\n{table}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let item = get_line_item(&conn, id)?;

    println!("Line item {} (upload {}, row {})", item.id, item.upload_id, item.row_number);
    println!("  Fee:          {}", item.fee_type_raw);
    println!("  Amount raw:   {}", item.amount_raw);
    if let Some(cents) = item.amount_cents {
        println!("  Amount:       {}", money(cents));
    }
    println!("  Category:     {}", item.fee_type_norm.as_deref().unwrap_or("(unclassified)"));
    println!("  Order ref:    {}", item.order_ref.as_deref().unwrap_or(""));
    println!("  Tracking ref: {}", item.tracking_ref.as_deref().unwrap_or(""));
    println!("  Valid:        {}", if item.is_valid { "yes" } else { "no" });
    if let (Some(code), Some(detail)) = (&item.error_code, &item.error_detail) {
        println!("  Error:        {code}: {detail}");
    }
    if let Some(raw) = &item.raw_row_json {
        println!("  Original row: {raw}");
    }
    Ok(())
}
