use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reviewer::{apply_review, get_known_categories, get_unclassified_items};
use crate::settings::get_data_dir;

pub fn run(upload: Option<i64>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("waybill.db"))?;
    let pending = get_unclassified_items(&conn, upload)?;

    if pending.is_empty() {
        println!("{}", "No unclassified line items to review.".green());
        return Ok(());
    }

    let categories = get_known_categories(&conn)?;
    println!("\n{} line items to review\n", pending.len());

    let mut cat_table = Table::new();
    cat_table.set_header(vec!["#", "Category"]);
    for (i, cat) in categories.iter().enumerate() {
        cat_table.add_row(vec![Cell::new(i + 1), Cell::new(cat)]);
    }
    println!("Categories\n{cat_table}\n");

    for item in &pending {
        println!("{}", "\u{2500}".repeat(60));
        println!("  Upload:  {} (row {})", item.upload_id, item.row_number);
        println!("  Fee:     {}", item.fee_type_raw);
        println!("  Amount:  {}", money(item.amount_cents));
        println!();

        let choice: String = Input::new()
            .with_prompt("Category # (or s=skip, q=quit)")
            .interact_text()
            .unwrap_or_else(|_| "s".to_string());

        if choice.to_lowercase() == "q" {
            println!("{}", "Review paused.".yellow());
            return Ok(());
        }
        if choice.to_lowercase() == "s" {
            continue;
        }

        let idx: usize = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= categories.len() => n - 1,
            _ => {
                println!("{}", "Invalid choice, skipping.".red());
                continue;
            }
        };
        let category = categories[idx].clone();

        let create_rule = Confirm::new()
            .with_prompt("Create a rule for future matches?")
            .default(false)
            .interact()
            .unwrap_or(false);

        let rule_pattern = if create_rule {
            // Prefill with the first two words of the fee text
            let words: Vec<&str> = item.fee_type_raw.split_whitespace().collect();
            let suggested = if words.len() >= 2 {
                format!("{} {}", words[0], words[1])
            } else {
                words.first().unwrap_or(&"").to_string()
            };
            let pattern: String = Input::new()
                .with_prompt("Rule pattern")
                .default(suggested)
                .interact_text()
                .unwrap_or_default();
            if pattern.is_empty() { None } else { Some(pattern) }
        } else {
            None
        };

        apply_review(&conn, item.id, &category, rule_pattern.as_deref())?;
        println!("Categorized as {category}");
    }

    println!("{}", "Review complete!".green());
    Ok(())
}
