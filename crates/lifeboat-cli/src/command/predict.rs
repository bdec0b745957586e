use crate::{
    request::PredictRequest,
    service::{Response, Service},
    util::{self, DataPaths},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    #[clap(flatten)]
    request: PredictRequest,
}

pub(crate) fn run(paths: &DataPaths, arg: &PredictArg) -> anyhow::Result<()> {
    let service = Service::start(paths)?;
    let result = service.predict(&arg.request);
    if let Err(error) = &result {
        log::warn!("Rejected prediction request: {error}");
    }
    util::print_json(&Response::from_result(result))
}
