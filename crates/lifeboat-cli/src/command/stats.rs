use crate::{
    service::{Response, Service},
    util::{self, DataPaths},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatsArg {
    /// Grouping: class, gender, age, embarked or family
    grouping: String,
}

pub(crate) fn run(paths: &DataPaths, arg: &StatsArg) -> anyhow::Result<()> {
    let service = Service::start(paths)?;
    util::print_json(&Response::from_result(service.stats(&arg.grouping)))
}
