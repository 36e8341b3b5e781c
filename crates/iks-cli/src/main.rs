use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    plan::{self, PlanArgs},
    search::{self, SearchArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "iks", about = "Exhaustive low-energy state search for Ising systems")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a problem graph for its lowest-energy states.
    Search(SearchArgs),
    /// Show the chunk decomposition a budget and system size would produce.
    Plan(PlanArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Search(args) => search::run(&args),
        Command::Plan(args) => plan::run(&args),
    }
}
