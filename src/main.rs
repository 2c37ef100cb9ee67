mod auditor;
mod classifier;
mod cli;
mod db;
mod error;
mod fieldmap;
mod fmt;
mod ingest;
mod models;
mod money;
mod normalizer;
mod reviewer;
mod settings;

use clap::Parser;

use cli::{Cli, Commands, ItemsCommands, RulesCommands, UploadsCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Upload { file, map } => cli::upload::run(&file, &map),
        Commands::Uploads { command } => match command {
            UploadsCommands::List => cli::uploads::list(),
            UploadsCommands::Show { id } => cli::uploads::show(id),
        },
        Commands::Items { command } => match command {
            ItemsCommands::List {
                upload,
                valid,
                invalid,
                category,
                unclassified,
                page,
            } => cli::items::list(upload, valid, invalid, category, unclassified, page),
            ItemsCommands::Show { id } => cli::items::show(id),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                match_kind,
                priority,
            } => cli::rules::add(&pattern, &category, &match_kind, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Update {
                id,
                pattern,
                category,
                match_kind,
                priority,
            } => cli::rules::update(
                id,
                pattern.as_deref(),
                category.as_deref(),
                match_kind.as_deref(),
                priority,
            ),
            RulesCommands::Disable { id } => cli::rules::disable(id),
        },
        Commands::Classify { upload } => cli::classify::run(upload),
        Commands::Audit { upload } => cli::audit::run(upload),
        Commands::Review { upload } => cli::review::run(upload),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
