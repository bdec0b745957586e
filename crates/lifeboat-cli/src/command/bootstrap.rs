use chrono::{DateTime, Utc};
use lifeboat_model::model::TrainingSummary;
use serde::Serialize;

use crate::{
    service::{self, BootstrapOptions, BootstrapReport, Response, Service},
    util::{self, DataPaths},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BootstrapArg {
    /// Retrain the model even if it already exists
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BootstrapOutput<'a> {
    #[serde(flatten)]
    report: BootstrapReport,
    passenger_count: usize,
    trained_at: DateTime<Utc>,
    feature_names: Vec<String>,
    training: &'a TrainingSummary,
}

pub(crate) fn run(paths: &DataPaths, arg: &BootstrapArg) -> anyhow::Result<()> {
    let BootstrapArg { force } = *arg;
    let options = BootstrapOptions {
        force,
        ..BootstrapOptions::default()
    };
    let report = service::bootstrap(paths, &options)?;
    let service = Service::load(paths)?;
    let model = service.model();
    util::print_json(&Response::ok(BootstrapOutput {
        report,
        passenger_count: service.dataset().len(),
        trained_at: model.trained_at,
        feature_names: model.pipeline.feature_names(),
        training: &model.training,
    }))
}
