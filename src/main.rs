mod cli;
mod committer;
mod db;
mod decoder;
mod error;
mod fmt;
mod mapping;
mod models;
mod parsers;
mod settings;
mod validator;

use clap::Parser;

use cli::{CategoriesCommands, Cli, Commands, PeopleCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::People { command } => match command {
            PeopleCommands::Add { name } => cli::people::add(&name),
            PeopleCommands::List => cli::people::list(),
            PeopleCommands::Disable { id } => cli::people::disable(id),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name, category_type } => {
                cli::categories::add(&name, &category_type)
            }
            CategoriesCommands::AddSub { category, name } => {
                cli::categories::add_sub(&category, &name)
            }
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Disable { id } => cli::categories::disable(id),
        },
        Commands::Import {
            file,
            txn_type,
            maps,
            ignores,
            dry_run,
            force,
        } => cli::import::run(&file, &txn_type, &maps, &ignores, dry_run, force),
        Commands::Logs => cli::logs::run(),
        Commands::Status => cli::status::run(),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
