use std::path::PathBuf;

use anyhow::Context as _;
use lifeboat_data::synth::{self, SyntheticConfig};
use serde::Serialize;

use crate::{
    service::Response,
    util::{self, DataPaths},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDataArg {
    /// Seed of the generator
    #[arg(long, default_value_t = SyntheticConfig::default().seed)]
    seed: u64,
    /// Number of passengers
    #[arg(long, default_value_t = SyntheticConfig::default().count)]
    count: usize,
    /// Output CSV path (defaults to the dataset path in the data directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GenerateDataOutput {
    path: PathBuf,
    passengers: usize,
    survivors: usize,
}

pub(crate) fn run(paths: &DataPaths, arg: &GenerateDataArg) -> anyhow::Result<()> {
    let GenerateDataArg {
        seed,
        count,
        output,
    } = arg;
    let path = output.clone().unwrap_or_else(|| paths.dataset());

    let dataset = synth::generate(&SyntheticConfig {
        seed: *seed,
        count: *count,
    })
    .context("Failed to generate synthetic dataset")?;
    util::create_parent_dir(&path)?;
    dataset
        .save_csv(&path)
        .with_context(|| format!("Failed to write dataset: {}", path.display()))?;

    let survivors = dataset.rows().iter().filter(|row| row.survived).count();
    util::print_json(&Response::ok(GenerateDataOutput {
        passengers: dataset.len(),
        survivors,
        path,
    }))
}
