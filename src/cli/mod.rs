pub mod audit;
pub mod classify;
pub mod demo;
pub mod init;
pub mod items;
pub mod review;
pub mod rules;
pub mod status;
pub mod upload;
pub mod uploads;

use clap::{Parser, Subcommand};

use crate::error::{Result, WaybillError};

/// Split a repeated `--map canonical=header` argument into its two halves.
pub(crate) fn parse_map_arg(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, header)) if !key.is_empty() && !header.is_empty() => {
            Ok((key.to_string(), header.to_string()))
        }
        _ => Err(WaybillError::Other(format!(
            "Invalid --map value '{raw}' (expected canonical=header, e.g. amount=Billed Amt)"
        ))),
    }
}

#[derive(Parser)]
#[command(name = "waybill", about = "Freight-invoice audit CLI for 3PL billing.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Waybill: choose a data directory and initialize the database.
    Init {
        /// Path for Waybill data (default: ~/Documents/waybill)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Ingest a CSV invoice file and classify its line items.
    Upload {
        /// Path to the CSV file to ingest
        file: String,
        /// Explicit field mapping, repeatable: --map amount=Billed Amt
        #[arg(long = "map")]
        map: Vec<String>,
    },
    /// Manage ingested uploads.
    Uploads {
        #[command(subcommand)]
        command: UploadsCommands,
    },
    /// Inspect stored line items.
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Manage classification rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Re-run fee classification over stored line items.
    Classify {
        /// Restrict the pass to one upload
        #[arg(long)]
        upload: Option<i64>,
    },
    /// Audit one upload: unclassified fees and duplicate charges.
    Audit {
        /// Upload ID (shown in `waybill uploads list`)
        upload: i64,
    },
    /// Interactively categorize unclassified line items.
    Review {
        /// Restrict to one upload
        #[arg(long)]
        upload: Option<i64>,
    },
    /// Load a sample invoice and rules to explore Waybill.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum UploadsCommands {
    /// List all uploads.
    List,
    /// Show one upload: counts, field map, audit findings.
    Show {
        /// Upload ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// List line items with filters and paging.
    List {
        /// Restrict to one upload
        #[arg(long)]
        upload: Option<i64>,
        /// Only valid items
        #[arg(long, conflicts_with = "invalid")]
        valid: bool,
        /// Only invalid items
        #[arg(long)]
        invalid: bool,
        /// Only items with this normalized category
        #[arg(long)]
        category: Option<String>,
        /// Only valid items without a category
        #[arg(long, conflicts_with = "category")]
        unclassified: bool,
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Show one line item, including its original row snapshot.
    Show {
        /// Line item ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a classification rule.
    Add {
        /// Pattern to match against fee descriptions
        pattern: String,
        /// Normalized category to assign
        #[arg(long)]
        category: String,
        /// Match kind: exact, contains, regex
        #[arg(long = "match-kind", default_value = "contains")]
        match_kind: String,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
    },
    /// List all classification rules.
    List,
    /// Update an existing rule.
    Update {
        /// Rule ID (shown in `waybill rules list`)
        id: i64,
        /// New pattern
        #[arg(long)]
        pattern: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New match kind: exact, contains, regex
        #[arg(long = "match-kind")]
        match_kind: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Disable a rule by ID.
    Disable {
        /// Rule ID (shown in `waybill rules list`)
        id: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_map_arg() {
        assert_eq!(
            parse_map_arg("amount=Billed Amt").unwrap(),
            ("amount".to_string(), "Billed Amt".to_string())
        );
        assert_eq!(
            parse_map_arg("tracking_ref=Track=No").unwrap(),
            ("tracking_ref".to_string(), "Track=No".to_string())
        );
        assert!(parse_map_arg("amount").is_err());
        assert!(parse_map_arg("=header").is_err());
        assert!(parse_map_arg("amount=").is_err());
    }
}
