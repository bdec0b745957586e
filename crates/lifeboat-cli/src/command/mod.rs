use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{request::PassengerQuery, util::DataPaths};

use self::{
    bootstrap::BootstrapArg, generate_data::GenerateDataArg, predict::PredictArg, stats::StatsArg,
};

mod bootstrap;
mod generate_data;
mod passengers;
mod predict;
mod stats;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Directory holding `titanic.csv` and `models/titanic_model.json`
    #[arg(long, global = true, env = "LIFEBOAT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// List passengers matching optional filters
    Passengers(#[clap(flatten)] PassengerQuery),
    /// Show survival statistics by class, gender, age, embarked or family
    Stats(#[clap(flatten)] StatsArg),
    /// Predict the survival of a passenger
    Predict(#[clap(flatten)] PredictArg),
    /// Create missing artifacts and print the training report
    Bootstrap(#[clap(flatten)] BootstrapArg),
    /// Write a synthetic passenger table
    GenerateData(#[clap(flatten)] GenerateDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let paths = DataPaths::new(args.data_dir);
    match args.mode {
        Mode::Passengers(query) => passengers::run(&paths, &query)?,
        Mode::Stats(arg) => stats::run(&paths, &arg)?,
        Mode::Predict(arg) => predict::run(&paths, &arg)?,
        Mode::Bootstrap(arg) => bootstrap::run(&paths, &arg)?,
        Mode::GenerateData(arg) => generate_data::run(&paths, &arg)?,
    }
    Ok(())
}
